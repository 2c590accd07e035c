//! Site-wide statistics shared by the JSON and Markdown reports.

use std::{cmp::Reverse, collections::BTreeMap};

use caudit_analysis::{ContentType, PageRecord};
use serde::Serialize;

/// Pages listed in [`Summary::top_performing_pages`].
pub const TOP_PAGES: usize = 10;
/// Pages listed in [`Summary::content_gaps`].
pub const LOW_CONTENT_PAGES: usize = 20;

/// Crawl outcome of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// The page could not be fetched.
    Error,
    /// Content text was found.
    Ok,
    /// Fetched, but no content area matched.
    NoContent,
}

impl PageStatus {
    /// Status of a crawled page.
    pub fn of(page: &PageRecord) -> Self {
        if page.error.as_deref().is_some_and(|e| !e.is_empty()) {
            Self::Error
        } else if page.word_count > 0 {
            Self::Ok
        } else {
            Self::NoContent
        }
    }

    /// Report label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Ok => "ok",
            Self::NoContent => "no_content",
        }
    }
}

/// A page with clicks from either source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPage {
    /// Page URL.
    pub url: String,
    /// Page title, empty when missing.
    pub title: String,
    /// Yandex clicks.
    pub yandex_clicks: u64,
    /// GSC clicks.
    pub gsc_clicks: u64,
    /// Sum of both sources.
    pub total_clicks: u64,
    /// Yandex impressions.
    pub yandex_impressions: u64,
    /// GSC impressions.
    pub gsc_impressions: u64,
    /// Sum of both sources.
    pub total_impressions: u64,
    /// Yandex average position.
    pub yandex_position: Option<f64>,
    /// GSC average position.
    pub gsc_position: Option<f64>,
}

impl TopPage {
    /// Mean of the known positions.
    pub fn average_position(&self) -> Option<f64> {
        match (self.yandex_position, self.gsc_position) {
            (Some(y), Some(g)) => Some((y + g) / 2.0),
            (Some(p), None) | (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }
}

/// A page whose body text is shorter than the configured minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowContentPage {
    /// Page URL.
    pub url: String,
    /// Page title, empty when missing.
    pub title: String,
    /// Words in the main content.
    pub word_count: usize,
}

/// Aggregate statistics over all crawled pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Page count per content type.
    pub by_type: BTreeMap<ContentType, usize>,
    /// Mean word count over pages with content, rounded.
    pub avg_word_count: usize,
    /// Total words over all pages.
    pub total_word_count: usize,
    /// Pages whose fetch failed.
    pub pages_with_errors: usize,
    /// Pages with any Yandex metric.
    pub pages_with_yandex_data: usize,
    /// Pages with any GSC metric.
    pub pages_with_gsc_data: usize,
    /// Pages with the most clicks, best first.
    pub top_performing_pages: Vec<TopPage>,
    /// Pages with some content but fewer than the minimum words, in crawl order.
    pub content_gaps: Vec<LowContentPage>,
}

impl Summary {
    /// Computes statistics; pages with `0 < words < min_word_count` are low-content.
    pub fn compute(pages: &[PageRecord], min_word_count: usize) -> Self {
        let mut summary = Self::default();
        let mut pages_with_words = 0usize;
        let mut top = Vec::new();

        for page in pages {
            *summary.by_type.entry(page.content_type).or_insert(0) += 1;
            if page.word_count > 0 {
                summary.total_word_count += page.word_count;
                pages_with_words += 1;
            }
            if PageStatus::of(page) == PageStatus::Error {
                summary.pages_with_errors += 1;
            }
            if !page.yandex.is_empty() {
                summary.pages_with_yandex_data += 1;
            }
            if !page.gsc.is_empty() {
                summary.pages_with_gsc_data += 1;
            }
            if page.total_clicks() > 0 {
                top.push(top_page(page));
            }
            if page.word_count > 0
                && page.word_count < min_word_count
                && summary.content_gaps.len() < LOW_CONTENT_PAGES
            {
                summary.content_gaps.push(LowContentPage {
                    url: page.url.clone(),
                    title: page.title_or_empty().to_string(),
                    word_count: page.word_count,
                });
            }
        }

        if pages_with_words > 0 {
            summary.avg_word_count =
                (summary.total_word_count as f64 / pages_with_words as f64).round() as usize;
        }
        top.sort_by_key(|p| Reverse(p.total_clicks));
        top.truncate(TOP_PAGES);
        summary.top_performing_pages = top;
        summary
    }

    /// Content types by page count, largest first.
    pub fn types_by_count(&self) -> Vec<(ContentType, usize)> {
        let mut types: Vec<_> = self.by_type.iter().map(|(t, n)| (*t, *n)).collect();
        types.sort_by_key(|(_, n)| Reverse(*n));
        types
    }
}

/// Top-pages row for a page.
fn top_page(page: &PageRecord) -> TopPage {
    TopPage {
        url: page.url.clone(),
        title: page.title_or_empty().to_string(),
        yandex_clicks: page.yandex.clicks_or_zero(),
        gsc_clicks: page.gsc.clicks_or_zero(),
        total_clicks: page.total_clicks(),
        yandex_impressions: page.yandex.impressions_or_zero(),
        gsc_impressions: page.gsc.impressions_or_zero(),
        total_impressions: page.total_impressions(),
        yandex_position: page.yandex.known_position(),
        gsc_position: page.gsc.known_position(),
    }
}
