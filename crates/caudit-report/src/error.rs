//! Error types for the caudit-report crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A report file or the output directory could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A CSV row could not be written.
    #[error("failed to write CSV {path}: {source}")]
    Csv {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },

    /// The JSON report could not be serialized.
    #[error("failed to write JSON {path}: {source}")]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}
