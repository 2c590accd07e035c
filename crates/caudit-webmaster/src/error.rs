//! Error types for the caudit-webmaster crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading webmaster exports.
#[derive(Debug, Error)]
pub enum WebmasterError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A CSV file could not be parsed.
    #[error("invalid CSV in {path}: {source}")]
    Csv {
        /// Offending file (for ZIP entries, the archive).
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },

    /// A ZIP archive could not be opened or read.
    #[error("invalid ZIP archive {path}: {source}")]
    Zip {
        /// Offending archive.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: zip::result::ZipError,
    },

    /// A report lacks the column that identifies its rows.
    #[error("{path} has no {column} column")]
    MissingColumn {
        /// Offending file.
        path: PathBuf,
        /// Human-readable column name.
        column: &'static str,
    },
}
