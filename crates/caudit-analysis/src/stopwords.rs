//! Stop-word sets for query normalization and keyword extraction.
//!
//! Two closed lists are used:
//! - the *normalization* set: grammatical words (prepositions, conjunctions, particles,
//!   pronouns) plus commerce filler words that carry no topical signal in search queries
//! - the *extraction* set: a wider Russian list for body-text keyword counting, combined with
//!   the English stop words from the `stop-words` crate
//!
//! All words are stored lowercase; lookups lowercase the probe (Unicode-aware, since most of the
//! vocabulary is Cyrillic).

use std::collections::HashSet;

use stop_words::LANGUAGE;

/// A stop-word filter.
#[derive(Debug, Clone)]
pub struct Stopwords {
    /// Lowercased stop words.
    words: HashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::normalization()
    }
}

impl Stopwords {
    /// Stop words applied by the normalizer before lemmatization.
    pub fn normalization() -> Self {
        let mut words = HashSet::new();
        extend(&mut words, QUERY_GRAMMAR);
        extend(&mut words, COMMERCE_FILLER);
        extend(&mut words, ENGLISH_GRAMMAR);
        Self { words }
    }

    /// Stop words applied when counting keywords in page bodies.
    pub fn extraction() -> Self {
        let mut words = HashSet::new();
        extend(&mut words, BODY_PRONOUNS);
        extend(&mut words, BODY_FUNCTION_WORDS);
        extend(&mut words, BODY_COMMON_WORDS);
        extend(&mut words, COMMERCE_FILLER);
        extend(&mut words, ENGLISH_GRAMMAR);
        extend(&mut words, stop_words::get(LANGUAGE::English));
        Self { words }
    }

    /// Builds a filter from an explicit word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Checks if a word is a stop word (case-insensitive).
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.words.contains(&word.to_lowercase())
    }

    /// Returns the number of stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the filter is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Adds a word list to the set in lowercase.
fn extend(words: &mut HashSet<String>, list: &[&str]) {
    words.extend(list.iter().map(|w| w.to_lowercase()));
}

/// Grammatical words dropped from search queries.
static QUERY_GRAMMAR: &[&str] = &[
    // Prepositions
    "в", "на", "с", "со", "к", "ко", "по", "за", "из", "от", "до", "для", "при", "без", "под",
    "над", "про", "между", "через", "около", "у", "о", "об",
    // Conjunctions
    "и", "а", "но", "или", "что", "как", "чтобы", "если", "когда", "потому", "так", "тоже",
    "также", "либо", "то", "ни", "не",
    // Particles
    "бы", "ли", "же", "вот", "ведь", "уже", "ещё", "еще", "лишь", "только", "даже", "именно",
    "почти", "всё", "все",
    // Pronouns
    "я", "ты", "он", "она", "оно", "мы", "вы", "они", "мой", "твой", "его", "её", "наш", "ваш",
    "их", "этот", "тот", "такой", "какой", "который", "чей", "сам", "самый", "весь", "каждый",
    "любой", "другой", "иной",
    // Common verbs and adverbs
    "это", "быть", "был", "была", "были", "будет", "есть", "нет", "можно", "нужно", "надо",
    "очень", "много", "мало",
];

/// Commerce words present in nearly every shop query.
static COMMERCE_FILLER: &[&str] = &[
    "купить", "цена", "цены", "доставка", "заказ", "заказать", "корзина", "каталог", "магазин",
    "интернет", "онлайн", "руб", "рублей", "рубль", "недорого", "дешево", "распродажа",
];

/// English grammatical words that show up in mixed-language queries.
static ENGLISH_GRAMMAR: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall", "this",
    "that", "these", "those", "it", "its", "they", "them",
];

/// Pronouns and their inflections, for body text.
static BODY_PRONOUNS: &[&str] = &[
    "я", "мы", "ты", "вы", "он", "она", "оно", "они", "мне", "мной", "меня", "нам", "нас",
    "нами", "тебе", "тебя", "тобой", "вам", "вас", "вами", "его", "ему", "им", "её", "ей", "ею",
    "их", "ими", "себя", "себе", "собой", "свой", "своя", "своё", "свои", "этот", "эта", "это",
    "эти", "тот", "та", "то", "те", "какой", "какая", "какое", "какие", "который", "которая",
    "которое", "которые", "чей", "чья", "чьё", "чьи", "кто", "что", "весь", "вся", "всё", "все",
    "сам", "сама", "само", "сами", "самый", "самая", "самое", "самые",
];

/// Prepositions, conjunctions, particles and auxiliary verbs, for body text.
static BODY_FUNCTION_WORDS: &[&str] = &[
    "в", "во", "на", "за", "из", "к", "ко", "от", "до", "по", "под", "над", "при", "про", "без",
    "для", "через", "между", "о", "об", "обо", "у", "с", "со", "и", "а", "но", "да", "или",
    "либо", "ни", "если", "когда", "чтобы", "хотя", "пока", "как", "так", "потому", "поэтому",
    "также", "тоже", "не", "бы", "же", "ли", "ведь", "вот", "вон", "даже", "лишь", "только",
    "уже", "ещё", "еще", "разве", "неужели", "быть", "есть", "был", "была", "было", "были",
    "будет", "будут", "буду", "будем", "будешь", "будете", "являться", "является", "являются",
    "стать", "стал", "стала", "стало", "стали", "станет", "станут", "мочь", "может", "могут",
    "можно", "нужно", "надо", "нельзя",
];

/// Frequent adverbs, numerals and generic nouns/adjectives, for body text.
static BODY_COMMON_WORDS: &[&str] = &[
    "очень", "более", "менее", "много", "мало", "где", "куда", "откуда", "тогда", "почему",
    "зачем", "там", "тут", "здесь", "сюда", "туда", "всегда", "никогда", "иногда", "часто",
    "редко", "сейчас", "теперь", "потом", "раньше", "позже", "сразу", "давно", "один", "одна",
    "одно", "одни", "два", "две", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
    "десять", "первый", "второй", "третий", "год", "года", "году", "лет", "день", "дня", "дней",
    "раз", "время", "человек", "люди", "людей", "другой", "другая", "другое", "другие", "новый",
    "новая", "новое", "новые", "большой", "большая", "большое", "большие", "маленький",
    "маленькая", "маленькое", "маленькие", "хороший", "хорошая", "хорошее", "каждый", "каждая",
    "каждое", "каждые", "любой", "любая", "любое", "любые",
];
