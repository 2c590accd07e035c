//! Joining webmaster metrics onto crawled pages.

use std::collections::HashMap;

use caudit_analysis::{PageRecord, SourceMetrics};
use indexmap::IndexMap;
use tracing::info;

use crate::PageMetrics;

/// Both sources' metrics for one URL.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UrlMetrics {
    /// Yandex Webmaster.
    pub yandex: SourceMetrics,
    /// Google Search Console.
    pub gsc: SourceMetrics,
}

/// Counts from [`MetricsIndex::enrich`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Pages that matched any metrics row.
    pub matched: usize,
    /// Pages now carrying Yandex metrics.
    pub with_yandex: usize,
    /// Pages now carrying GSC metrics.
    pub with_gsc: usize,
}

/// Per-URL metrics with a path fallback for host or scheme mismatches.
#[derive(Debug, Clone, Default)]
pub struct MetricsIndex {
    /// Metrics keyed by URL, Yandex URLs first.
    by_url: IndexMap<String, UrlMetrics>,
    /// URL path to the first URL listed with it.
    by_path: HashMap<String, String>,
}

impl MetricsIndex {
    /// Merges both sources. GSC rows attach to an existing Yandex URL or are appended; a
    /// later row for the same URL within one source replaces the earlier one.
    pub fn from_sources(yandex: &[PageMetrics], gsc: &[PageMetrics]) -> Self {
        let mut by_url: IndexMap<String, UrlMetrics> = IndexMap::new();
        for row in yandex {
            by_url.entry(row.url.clone()).or_default().yandex = row.metrics;
        }
        for row in gsc {
            by_url.entry(row.url.clone()).or_default().gsc = row.metrics;
        }

        let mut by_path = HashMap::new();
        for url in by_url.keys() {
            by_path
                .entry(url_path(url).to_string())
                .or_insert_with(|| url.clone());
        }
        Self { by_url, by_path }
    }

    /// Number of distinct URLs.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    /// True when no metrics were loaded.
    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }

    /// Metrics for `url`: exact match first, then any URL with the same path.
    pub fn get(&self, url: &str) -> Option<&UrlMetrics> {
        self.by_url.get(url).or_else(|| {
            self.by_path
                .get(url_path(url))
                .and_then(|key| self.by_url.get(key))
        })
    }

    /// Replaces every page's metrics with the indexed ones; unmatched pages are cleared.
    pub fn enrich(&self, pages: &mut [PageRecord]) -> EnrichSummary {
        let mut summary = EnrichSummary::default();
        for page in pages.iter_mut() {
            let metrics = self.get(&page.url).copied().unwrap_or_default();
            page.yandex = metrics.yandex;
            page.gsc = metrics.gsc;
            if metrics != UrlMetrics::default() {
                summary.matched += 1;
            }
            if !page.yandex.is_empty() {
                summary.with_yandex += 1;
            }
            if !page.gsc.is_empty() {
                summary.with_gsc += 1;
            }
        }
        info!(
            pages = pages.len(),
            matched = summary.matched,
            yandex = summary.with_yandex,
            gsc = summary.with_gsc,
            "merged webmaster metrics"
        );
        summary
    }
}

/// Path component of a URL, without query or fragment; `/` when absent.
pub fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.find('/').map_or("", |start| &rest[start..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    match &path[..end] {
        "" => "/",
        path => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str, clicks: u64, impressions: u64) -> PageMetrics {
        PageMetrics {
            url: url.to_string(),
            metrics: SourceMetrics {
                clicks: Some(clicks),
                impressions: Some(impressions),
                ..SourceMetrics::default()
            },
        }
    }

    #[test]
    fn url_paths() {
        assert_eq!(url_path("https://shop.example/blogs/a?x=1#top"), "/blogs/a");
        assert_eq!(url_path("http://shop.example"), "/");
        assert_eq!(url_path("https://shop.example/?q"), "/");
        assert_eq!(url_path("/collection/kedy"), "/collection/kedy");
    }

    #[test]
    fn merges_sources_per_url() {
        let index = MetricsIndex::from_sources(
            &[row("https://shop.example/a", 1, 10), row("https://shop.example/a", 2, 20)],
            &[row("https://shop.example/a", 5, 50), row("https://shop.example/b", 7, 70)],
        );
        assert_eq!(index.len(), 2);
        let a = index.get("https://shop.example/a").unwrap();
        assert_eq!(a.yandex.clicks, Some(2));
        assert_eq!(a.gsc.clicks, Some(5));
        let b = index.get("https://shop.example/b").unwrap();
        assert!(b.yandex.is_empty());
        assert_eq!(b.gsc.impressions, Some(70));
    }

    #[test]
    fn falls_back_to_path() {
        let index = MetricsIndex::from_sources(&[row("https://shop.example/a", 1, 10)], &[]);
        assert!(index.get("http://www.shop.example/a?utm=1").is_some());
        assert!(index.get("https://shop.example/b").is_none());
    }

    #[test]
    fn enrich_replaces_and_clears() {
        let index = MetricsIndex::from_sources(
            &[row("https://shop.example/a", 3, 30)],
            &[row("https://shop.example/a", 4, 40)],
        );
        let mut stale = PageRecord::new("https://shop.example/gone");
        stale.yandex.clicks = Some(99);
        let mut pages = vec![PageRecord::new("https://shop.example/a"), stale];

        let summary = index.enrich(&mut pages);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.with_yandex, 1);
        assert_eq!(summary.with_gsc, 1);
        assert_eq!(pages[0].total_clicks(), 7);
        assert!(pages[1].yandex.is_empty());
    }
}
