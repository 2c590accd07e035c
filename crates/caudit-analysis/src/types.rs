//! Page and query records consumed by the analyses.
//!
//! These are plain in-memory snapshots. The crawler and the webmaster parsers produce them;
//! nothing in this crate performs I/O on them.

use std::{fmt, str};

use serde::{Deserialize, Serialize};

/// Content classification derived from a page's URL path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Blog post or article.
    Blog,
    /// Collection or category listing.
    Collection,
    /// Product card.
    Product,
    /// Anything else.
    #[default]
    Other,
}

impl ContentType {
    /// Classifies a URL by the path segments it contains.
    pub fn from_url(url: &str) -> Self {
        if url.contains("/blogs/") || url.contains("/blog/") {
            Self::Blog
        } else if url.contains("/collection/") || url.contains("/collections/") {
            Self::Collection
        } else if url.contains("/product/") || url.contains("/products/") {
            Self::Product
        } else {
            Self::Other
        }
    }

    /// Returns the lowercase tag used in reports and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Collection => "collection",
            Self::Product => "product",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blog" | "blogs" => Ok(Self::Blog),
            "collection" | "collections" => Ok(Self::Collection),
            "product" | "products" => Ok(Self::Product),
            "other" => Ok(Self::Other),
            _ => Err(format!(
                "unknown content type '{s}', expected one of: blog, collection, product, other"
            )),
        }
    }
}

/// Metrics one webmaster source reports for a page.
///
/// Every field is optional: a source may not know the page at all, or may omit a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceMetrics {
    /// Clicks from search results.
    pub clicks: Option<u64>,
    /// Impressions in search results.
    pub impressions: Option<u64>,
    /// Click-through rate as reported (0-100).
    pub ctr: Option<f64>,
    /// Average result position (0 means unknown).
    pub position: Option<f64>,
}

impl SourceMetrics {
    /// Clicks, with a missing value counted as zero.
    pub fn clicks_or_zero(&self) -> u64 {
        self.clicks.unwrap_or(0)
    }

    /// Impressions, with a missing value counted as zero.
    pub fn impressions_or_zero(&self) -> u64 {
        self.impressions.unwrap_or(0)
    }

    /// Average position when the source actually reported one.
    pub fn known_position(&self) -> Option<f64> {
        self.position.filter(|p| *p > 0.0)
    }

    /// True when the source reported nothing for this page.
    pub fn is_empty(&self) -> bool {
        self.clicks.is_none()
            && self.impressions.is_none()
            && self.ctr.is_none()
            && self.position.is_none()
    }
}

/// One crawled page together with its webmaster metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRecord {
    /// Canonical page URL; unique key.
    pub url: String,
    /// `<lastmod>` value from the sitemap, kept verbatim.
    pub lastmod: Option<String>,
    /// Classification derived from the URL.
    pub content_type: ContentType,
    /// Text of the `<title>` element.
    pub title: Option<String>,
    /// Text of the first `<h1>` element.
    pub h1: Option<String>,
    /// `content` of `<meta name="description">`.
    pub meta_description: Option<String>,
    /// Number of whitespace-separated tokens in the main content.
    pub word_count: usize,
    /// Frequency-ranked keywords from the main content.
    pub top_keywords: Vec<String>,
    /// Fetch or parse error, when scraping failed.
    pub error: Option<String>,
    /// Yandex Webmaster metrics.
    pub yandex: SourceMetrics,
    /// Google Search Console metrics.
    pub gsc: SourceMetrics,
}

impl PageRecord {
    /// Creates an empty record for a URL, classifying it by path.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            content_type: ContentType::from_url(&url),
            url,
            ..Self::default()
        }
    }

    /// Clicks summed over both sources.
    pub fn total_clicks(&self) -> u64 {
        self.yandex
            .clicks_or_zero()
            .saturating_add(self.gsc.clicks_or_zero())
    }

    /// Impressions summed over both sources.
    pub fn total_impressions(&self) -> u64 {
        self.yandex
            .impressions_or_zero()
            .saturating_add(self.gsc.impressions_or_zero())
    }

    /// Title, or an empty string when the page has none.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Aggregated stats for one search query from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Query text as reported.
    pub query: String,
    /// Impressions.
    pub impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Click-through rate (0-100).
    pub ctr: f64,
    /// Average position (0 means unknown).
    pub position: f64,
}

impl QueryRecord {
    /// Creates a record, deriving CTR from clicks and impressions.
    pub fn new(query: impl Into<String>, impressions: u64, clicks: u64) -> Self {
        let ctr = if impressions > 0 {
            clicks as f64 / impressions as f64 * 100.0
        } else {
            0.0
        };
        Self {
            query: query.into(),
            impressions,
            clicks,
            ctr,
            position: 0.0,
        }
    }

    /// Sets the average position.
    #[must_use]
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    /// Overrides the derived CTR with a source-reported value.
    #[must_use]
    pub fn with_ctr(mut self, ctr: f64) -> Self {
        self.ctr = ctr;
        self
    }
}

/// Query records from both webmaster sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySet {
    /// Queries from Yandex Webmaster.
    pub yandex: Vec<QueryRecord>,
    /// Queries from Google Search Console.
    pub gsc: Vec<QueryRecord>,
}

impl QuerySet {
    /// Returns true when neither source has any queries.
    pub fn is_empty(&self) -> bool {
        self.yandex.is_empty() && self.gsc.is_empty()
    }
}
