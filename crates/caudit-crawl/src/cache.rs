//! Page cache persisted between runs.
//!
//! A JSON object mapping page URL to its [`PageRecord`], in crawl order.

use std::{fs, io, path::Path};

use caudit_analysis::PageRecord;
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::CrawlError;

/// Cached page records keyed by URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCache {
    /// Records in insertion order.
    pages: IndexMap<String, PageRecord>,
}

impl PageCache {
    /// Builds a cache from records; a later record replaces an earlier one with the same URL.
    pub fn from_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = PageRecord>,
    {
        Self {
            pages: pages
                .into_iter()
                .map(|page| (page.url.clone(), page))
                .collect(),
        }
    }

    /// Reads the cache file. A missing file yields an empty cache.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CrawlError::CacheIo {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let pages: IndexMap<String, PageRecord> =
            serde_json::from_str(&contents).map_err(|source| CrawlError::CacheFormat {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), entries = pages.len(), "loaded page cache");
        Ok(Self { pages })
    }

    /// Reads the cache file, treating any failure as an empty cache.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable page cache");
            Self::default()
        })
    }

    /// Writes the cache as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CrawlError> {
        let io_error = |source| CrawlError::CacheIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(&self.pages).map_err(|source| {
            CrawlError::CacheFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(io_error)?;
        info!(path = %path.display(), entries = self.pages.len(), "saved page cache");
        Ok(())
    }

    /// Cached record for a URL.
    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.pages.get(url)
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Cached records in insertion order.
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    /// Consumes the cache, returning its records in insertion order.
    pub fn into_pages(self) -> Vec<PageRecord> {
        self.pages.into_values().collect()
    }
}
