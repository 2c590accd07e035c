//! Site crawling for caudit.
//!
//! Fetches the sitemap, scrapes each selected page for its title, H1, meta description and
//! main-content text, and extracts frequency-ranked keywords. HTTP sits behind the
//! [`Fetcher`] trait so every parser can be exercised on fixture documents.
//!
//! Per-page failures never abort a crawl: they are logged and stored on the page record.

#![warn(missing_docs)]

mod cache;
mod crawl;
mod error;
mod fetch;
mod keywords;
mod scrape;
mod sitemap;

pub use cache::PageCache;
pub use crawl::{CrawlOptions, CrawlSummary, Crawler};
pub use error::CrawlError;
pub use fetch::{Fetcher, HttpFetcher};
pub use keywords::{KeywordExtractor, MIN_KEYWORD_LEN};
pub use scrape::{PageData, PageScraper};
pub use sitemap::{
    SitemapDocument, SitemapEntry, SitemapStats, fetch_sitemap, parse_sitemap, select_entries,
};
