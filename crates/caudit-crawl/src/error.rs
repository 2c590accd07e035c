//! Error types for the caudit-crawl crate.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur while fetching or parsing site data.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The sitemap is not well-formed XML.
    #[error("invalid sitemap XML at byte {position}: {source}")]
    Xml {
        /// Byte offset of the error.
        position: u64,
        /// Underlying error.
        #[source]
        source: quick_xml::Error,
    },

    /// A CSS selector failed to compile.
    #[error("invalid CSS selector '{selector}': {message}")]
    Selector {
        /// Selector source.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// No sitemap URL could be derived from the configuration.
    #[error("no sitemap URL configured (set [site] domain or sitemap_url)")]
    NoSitemapUrl,

    /// Failed to read or write the page cache.
    #[error("page cache {path}: {source}")]
    CacheIo {
        /// Cache file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The page cache is not valid JSON.
    #[error("page cache {path} is corrupt: {source}")]
    CacheFormat {
        /// Cache file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}
