//! Query and keyword normalization.
//!
//! The normalizer turns free text into a set of comparable terms: lowercase, punctuation
//! replaced by spaces, stop words and short tokens removed, each remaining word reduced to a
//! base form by the configured [`Lemmatizer`]. Results are memoized per distinct word in a
//! bounded [`LemmaCache`] owned by the normalizer.

use std::collections::{HashMap, HashSet};

use crate::{AnalysisError, IdentityLemmatizer, Lemmatizer, LemmatizerKind, Stopwords};

/// Default number of distinct words the lemma cache holds.
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// Words of this many characters or fewer are dropped.
const MAX_DROPPED_LEN: usize = 2;

/// Bounded memo of word -> normalized form.
///
/// Once `capacity` entries are stored, new words are still normalized but no longer cached.
#[derive(Debug, Clone)]
pub struct LemmaCache {
    /// Cached results keyed by the lowercased word; `None` marks a dropped word.
    entries: HashMap<String, Option<String>>,
    /// Maximum number of entries.
    capacity: usize,
}

impl LemmaCache {
    /// Creates an empty cache holding at most `capacity` words.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Looks up a cached result.
    fn get(&self, word: &str) -> Option<&Option<String>> {
        self.entries.get(word)
    }

    /// Stores a result unless the cache is full.
    fn insert(&mut self, word: String, normalized: Option<String>) {
        if !self.is_full() {
            self.entries.insert(word, normalized);
        }
    }

    /// Number of cached words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached words.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true when no further words will be admitted.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }
}

/// Text normalizer with a private lemma cache.
///
/// Not synchronized: one instance serves one thread.
pub struct Normalizer {
    /// Morphological backend.
    lemmatizer: Box<dyn Lemmatizer>,
    /// Words dropped before lemmatization.
    stopwords: Stopwords,
    /// Memoized results.
    cache: LemmaCache,
}

impl Normalizer {
    /// Creates a normalizer with the default stop words and cache capacity.
    pub fn new(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        Self {
            lemmatizer,
            stopwords: Stopwords::normalization(),
            cache: LemmaCache::with_capacity(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Creates a normalizer without morphology (surface forms only).
    pub fn identity() -> Self {
        Self::new(Box::new(IdentityLemmatizer))
    }

    /// Creates a normalizer for a configured backend, stemming language and cache size.
    pub fn from_settings(
        kind: LemmatizerKind,
        language: &str,
        capacity: usize,
    ) -> Result<Self, AnalysisError> {
        Ok(Self::new(kind.build(language)?).with_cache_capacity(capacity))
    }

    /// Replaces the stop-word set.
    #[must_use]
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Replaces the cache with an empty one of the given capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = LemmaCache::with_capacity(capacity);
        self
    }

    /// Returns the lemma cache.
    pub fn cache(&self) -> &LemmaCache {
        &self.cache
    }

    /// Normalizes a single token.
    ///
    /// Returns `None` for stop words and tokens of two characters or fewer. A lemma that is
    /// itself a stop word drops the token; a lemma shorter than three characters is discarded
    /// in favor of the lowercased token.
    pub fn normalize_word(&mut self, word: &str) -> Option<String> {
        let lowered = word.trim().to_lowercase();
        if lowered.chars().count() <= MAX_DROPPED_LEN || self.stopwords.contains(&lowered) {
            return None;
        }

        if let Some(cached) = self.cache.get(&lowered) {
            return cached.clone();
        }

        let normalized = match self.lemmatizer.lemma(&lowered) {
            Some(lemma) if self.stopwords.contains(&lemma) => None,
            Some(lemma) if lemma.chars().count() > MAX_DROPPED_LEN => Some(lemma),
            _ => Some(lowered.clone()),
        };

        self.cache.insert(lowered, normalized.clone());
        normalized
    }

    /// Normalizes free text into a set of terms.
    ///
    /// Every character that is neither a letter nor whitespace acts as a separator.
    pub fn normalize_phrase(&mut self, text: &str) -> HashSet<String> {
        let cleaned: String = text
            .chars()
            .map(|c| {
                if c.is_alphabetic() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect::<String>()
            .to_lowercase();

        cleaned
            .split_whitespace()
            .filter_map(|token| self.normalize_word(token))
            .collect()
    }

    /// Share of the query's normalized terms present in `target`.
    ///
    /// Asymmetric: `|query ∩ target| / |query|`. Returns 0.0 when the query normalizes to
    /// nothing.
    pub fn similarity(&mut self, query: &str, target: &HashSet<String>) -> f64 {
        let terms = self.normalize_phrase(query);
        if terms.is_empty() {
            return 0.0;
        }
        let matches = terms.iter().filter(|t| target.contains(*t)).count();
        matches as f64 / terms.len() as f64
    }
}
