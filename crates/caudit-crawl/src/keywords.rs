//! Frequency-based keyword extraction from page text.

use caudit_analysis::Stopwords;
use indexmap::IndexMap;

/// Words shorter than this many characters are ignored.
pub const MIN_KEYWORD_LEN: usize = 3;

/// Extracts the most frequent content words from text.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    /// Words never reported as keywords.
    stopwords: Stopwords,
    /// Minimum word length in characters.
    min_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Stopwords::extraction())
    }
}

impl KeywordExtractor {
    /// Creates an extractor with a custom stop-word set.
    pub fn new(stopwords: Stopwords) -> Self {
        Self {
            stopwords,
            min_len: MIN_KEYWORD_LEN,
        }
    }

    /// Top `top_n` keywords by frequency.
    pub fn extract(&self, text: &str, top_n: usize) -> Vec<String> {
        self.extract_with_counts(text, top_n)
            .into_iter()
            .map(|(word, _)| word)
            .collect()
    }

    /// Top `top_n` keywords with their counts.
    ///
    /// Ties keep the order in which the words first appear.
    pub fn extract_with_counts(&self, text: &str, top_n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self.word_frequency(text).into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(top_n);
        ranked
    }

    /// Count of every kept word, in first-occurrence order.
    pub fn word_frequency(&self, text: &str) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for word in tokenize(text) {
            if word.chars().count() >= self.min_len && !self.stopwords.contains(&word) {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// True for Latin and Cyrillic letters (including `ё`).
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Lowercased runs of Latin or Cyrillic letters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}
