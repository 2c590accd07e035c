//! Error types for the caudit-analysis crate.

use thiserror::Error;

/// Errors raised while building analysis components from configuration.
///
/// The analyses themselves are infallible; only backend construction can fail.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),

    /// Unknown morphological backend name.
    #[error("unknown lemmatizer '{0}', expected one of: snowball, identity")]
    UnknownLemmatizer(String),
}
