//! Sequential, rate-limited page crawl.

use std::{thread, time::Duration};

use caudit_analysis::PageRecord;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
    CrawlError, Fetcher, KeywordExtractor, PageCache, PageData, PageScraper, SitemapEntry,
};

/// Progress bar layout.
const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Knobs for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Pause between consecutive page requests.
    pub delay: Duration,
    /// Keywords kept per page.
    pub keywords_per_page: usize,
    /// Ignore cached records and fetch every page.
    pub force_refresh: bool,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            keywords_per_page: 10,
            force_refresh: false,
            progress: false,
        }
    }
}

/// Counts from one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Pages fetched over the network.
    pub fetched: usize,
    /// Pages reused from the cache.
    pub reused: usize,
    /// Fetched pages that recorded an error.
    pub failed: usize,
}

/// Scrapes sitemap entries into page records.
pub struct Crawler<'a> {
    /// Transport.
    fetcher: &'a dyn Fetcher,
    /// HTML field extraction.
    scraper: PageScraper,
    /// Body keyword extraction.
    extractor: KeywordExtractor,
    /// Crawl settings.
    options: CrawlOptions,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler with the default scraper and keyword extractor.
    pub fn new(fetcher: &'a dyn Fetcher, options: CrawlOptions) -> Result<Self, CrawlError> {
        Ok(Self {
            fetcher,
            scraper: PageScraper::new()?,
            extractor: KeywordExtractor::default(),
            options,
        })
    }

    /// Crawls `entries` in order.
    ///
    /// A cached record is reused when its `lastmod` equals the sitemap's (both absent counts
    /// as equal) unless `force_refresh` is set. Requests are spaced by the configured delay.
    pub fn crawl(
        &self,
        entries: &[SitemapEntry],
        cache: &PageCache,
    ) -> (Vec<PageRecord>, CrawlSummary) {
        info!(pages = entries.len(), "scraping pages");
        let progress = self.progress_bar(entries.len());
        let mut summary = CrawlSummary::default();
        let mut pages = Vec::with_capacity(entries.len());

        for entry in entries {
            progress.set_message(entry.url.clone());

            if let Some(cached) = self.reusable(entry, cache) {
                debug!(url = %entry.url, "page unchanged, using cache");
                summary.reused += 1;
                pages.push(cached.clone());
                progress.inc(1);
                continue;
            }

            if summary.fetched > 0 && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
            let data = self.scraper.scrape(self.fetcher, &entry.url);
            summary.fetched += 1;
            if data.error.is_some() {
                summary.failed += 1;
            }
            pages.push(self.record(entry, data));
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            fetched = summary.fetched,
            reused = summary.reused,
            failed = summary.failed,
            "scraping complete"
        );
        (pages, summary)
    }

    /// Cached record usable for `entry`, if any.
    fn reusable<'c>(&self, entry: &SitemapEntry, cache: &'c PageCache) -> Option<&'c PageRecord> {
        if self.options.force_refresh {
            return None;
        }
        cache
            .get(&entry.url)
            .filter(|cached| cached.lastmod == entry.lastmod)
    }

    /// Builds the page record for freshly scraped data.
    fn record(&self, entry: &SitemapEntry, data: PageData) -> PageRecord {
        let top_keywords = if data.has_content() {
            self.extractor
                .extract(&data.content_text, self.options.keywords_per_page)
        } else {
            Vec::new()
        };
        PageRecord {
            url: entry.url.clone(),
            lastmod: entry.lastmod.clone(),
            content_type: entry.content_type,
            title: data.title,
            h1: data.h1,
            meta_description: data.meta_description,
            word_count: data.word_count,
            top_keywords,
            error: data.error,
            ..PageRecord::default()
        }
    }

    /// Visible bar when enabled, otherwise a hidden one.
    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar
    }
}
