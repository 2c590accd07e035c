//! Morphological backends that reduce a word to its base form.
//!
//! The normalizer only needs `word -> base form`. Two backends ship with caudit:
//! - [`SnowballLemmatizer`]: Snowball stemming through Tantivy's `Stemmer` filter
//! - [`IdentityLemmatizer`]: returns the word unchanged (surface-form matching)

use std::{fmt, str};

use tantivy::tokenizer::{Language, RawTokenizer, Stemmer, TextAnalyzer, TokenStream};

use crate::AnalysisError;

/// Reduces a single lowercase word to a canonical base form.
///
/// Implementations must be deterministic: the normalizer caches results for the lifetime of
/// the instance.
pub trait Lemmatizer {
    /// Returns the base form of `word`, or `None` when the backend produces nothing.
    fn lemma(&mut self, word: &str) -> Option<String>;
}

/// Backend that leaves words as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemma(&mut self, word: &str) -> Option<String> {
        Some(word.to_string())
    }
}

/// Snowball stemmer backed by Tantivy's tokenizer pipeline.
///
/// The whole word is treated as one token (`RawTokenizer`), so the stemmer sees exactly the
/// input the normalizer hands it.
pub struct SnowballLemmatizer {
    /// Single-token analyzer ending in the stemming filter.
    analyzer: TextAnalyzer,
    /// Stemming language.
    language: Language,
}

impl SnowballLemmatizer {
    /// Creates a stemmer for the given language.
    pub fn new(language: Language) -> Self {
        let analyzer = TextAnalyzer::builder(RawTokenizer::default())
            .filter(Stemmer::new(language))
            .build();
        Self { analyzer, language }
    }

    /// Creates a stemmer from a language name such as `"russian"`.
    pub fn from_name(name: &str) -> Result<Self, AnalysisError> {
        Ok(Self::new(parse_language(name)?))
    }

    /// Returns the stemming language.
    pub fn language(&self) -> Language {
        self.language
    }
}

impl fmt::Debug for SnowballLemmatizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballLemmatizer")
            .field("language", &self.language)
            .finish()
    }
}

impl SnowballLemmatizer {
    /// Runs one stemming pass over `word`.
    fn stem_once(&mut self, word: &str) -> Option<String> {
        let mut stream = self.analyzer.token_stream(word);
        stream
            .next()
            .map(|token| token.text.clone())
            .filter(|text| !text.is_empty())
    }
}

impl Lemmatizer for SnowballLemmatizer {
    /// Stems until the output stops changing, so a returned stem is its own stem.
    ///
    /// A single Snowball pass is not idempotent for Russian (`сандалии -> сандал -> санда`).
    fn lemma(&mut self, word: &str) -> Option<String> {
        let mut current = self.stem_once(word)?;
        // Every pass that changes the word shortens it, so the word length bounds the loop.
        for _ in 0..word.chars().count() {
            match self.stem_once(&current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        Some(current)
    }
}

/// Parses a stemmer language name into a Tantivy `Language`.
pub fn parse_language(name: &str) -> Result<Language, AnalysisError> {
    match name.trim().to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(AnalysisError::InvalidLanguage(other.to_string())),
    }
}

/// Selectable morphological backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LemmatizerKind {
    /// Snowball stemming.
    #[default]
    Snowball,
    /// No morphology; lowercase surface forms only.
    Identity,
}

impl LemmatizerKind {
    /// Builds the backend, using `language` for stemming backends.
    pub fn build(self, language: &str) -> Result<Box<dyn Lemmatizer>, AnalysisError> {
        match self {
            Self::Snowball => Ok(Box::new(SnowballLemmatizer::from_name(language)?)),
            Self::Identity => Ok(Box::new(IdentityLemmatizer)),
        }
    }
}

impl fmt::Display for LemmatizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snowball => write!(f, "snowball"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

impl str::FromStr for LemmatizerKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snowball" | "stemmer" => Ok(Self::Snowball),
            "identity" | "none" | "off" => Ok(Self::Identity),
            _ => Err(AnalysisError::UnknownLemmatizer(s.to_string())),
        }
    }
}
