//! Keyword gap classification.
//!
//! A gap is a search query with real demand (impressions) whose terms the site's content does
//! not cover. Coverage is the asymmetric overlap between the query's normalized terms and the
//! pool of terms drawn from every page's keywords, title, h1 and meta description.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{Normalizer, PageRecord, QueryRecord, QuerySet};

/// Below this similarity a query has no matching content.
pub const NO_CONTENT_THRESHOLD: f64 = 0.3;

/// At or above this similarity a query counts as covered.
pub const WEAK_CONTENT_THRESHOLD: f64 = 0.6;

/// How poorly a query is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    /// Similarity below [`NO_CONTENT_THRESHOLD`].
    NoContent,
    /// Similarity in `[NO_CONTENT_THRESHOLD, WEAK_CONTENT_THRESHOLD)`.
    WeakContent,
}

impl GapType {
    /// Buckets a similarity score; `None` means the query is covered.
    pub fn classify(similarity: f64) -> Option<Self> {
        if similarity < NO_CONTENT_THRESHOLD {
            Some(Self::NoContent)
        } else if similarity < WEAK_CONTENT_THRESHOLD {
            Some(Self::WeakContent)
        } else {
            None
        }
    }

    /// Returns the snake_case tag used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoContent => "no_content",
            Self::WeakContent => "weak_content",
        }
    }
}

/// Metrics one source reports for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QueryStats {
    /// Impressions.
    pub impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Average position (0 means unknown).
    pub position: f64,
}

impl From<&QueryRecord> for QueryStats {
    fn from(record: &QueryRecord) -> Self {
        Self {
            impressions: record.impressions,
            clicks: record.clicks,
            position: record.position,
        }
    }
}

/// A query with impressions but little or no matching content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordGap {
    /// Lowercased query text.
    pub query: String,
    /// Yandex metrics, when Yandex reported the query.
    pub yandex: Option<QueryStats>,
    /// GSC metrics, when GSC reported the query.
    pub gsc: Option<QueryStats>,
    /// Share of the query's terms found in site content.
    pub similarity: f64,
    /// Coverage bucket.
    pub gap_type: GapType,
}

impl KeywordGap {
    /// Impressions summed over both sources.
    pub fn total_impressions(&self) -> u64 {
        self.yandex
            .map_or(0, |s| s.impressions)
            .saturating_add(self.gsc.map_or(0, |s| s.impressions))
    }

    /// Clicks summed over both sources.
    pub fn total_clicks(&self) -> u64 {
        self.yandex
            .map_or(0, |s| s.clicks)
            .saturating_add(self.gsc.map_or(0, |s| s.clicks))
    }
}

/// A query merged across both sources.
#[derive(Debug, Default)]
struct MergedQuery {
    /// Yandex metrics.
    yandex: Option<QueryStats>,
    /// GSC metrics.
    gsc: Option<QueryStats>,
}

impl MergedQuery {
    /// True when either source meets the impression threshold.
    fn meets(&self, min_impressions: u64) -> bool {
        [self.yandex, self.gsc]
            .iter()
            .flatten()
            .any(|s| s.impressions >= min_impressions)
    }
}

/// Unions both sources keyed by lowercased query text, Yandex first.
fn merge_queries(queries: &QuerySet, min_impressions: u64) -> IndexMap<String, MergedQuery> {
    let mut merged: IndexMap<String, MergedQuery> = IndexMap::new();

    for record in &queries.yandex {
        let key = record.query.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        merged.entry(key).or_default().yandex = Some(QueryStats::from(record));
    }
    for record in &queries.gsc {
        let key = record.query.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        merged.entry(key).or_default().gsc = Some(QueryStats::from(record));
    }

    merged.retain(|_, query| query.meets(min_impressions));
    merged
}

/// Builds the pool of normalized terms covered by site content.
pub fn content_terms(normalizer: &mut Normalizer, pages: &[PageRecord]) -> HashSet<String> {
    let mut terms = HashSet::new();
    for page in pages {
        for keyword in &page.top_keywords {
            terms.extend(normalizer.normalize_phrase(keyword));
        }
        for text in [&page.title, &page.h1, &page.meta_description]
            .into_iter()
            .flatten()
        {
            terms.extend(normalizer.normalize_phrase(text));
        }
    }
    terms
}

/// Finds queries with impressions but weak or missing content coverage.
///
/// Results are ordered by total impressions, descending; ties keep merge order (Yandex input
/// order, then GSC-only queries in GSC input order).
pub fn find_keyword_gaps(
    normalizer: &mut Normalizer,
    queries: &QuerySet,
    existing_terms: &HashSet<String>,
    min_impressions: u64,
    max_results: usize,
) -> Vec<KeywordGap> {
    let merged = merge_queries(queries, min_impressions);

    let mut gaps: Vec<KeywordGap> = merged
        .into_iter()
        .filter_map(|(query, stats)| {
            let similarity = normalizer.similarity(&query, existing_terms);
            GapType::classify(similarity).map(|gap_type| KeywordGap {
                query,
                yandex: stats.yandex,
                gsc: stats.gsc,
                similarity,
                gap_type,
            })
        })
        .collect();

    gaps.sort_by(|a, b| b.total_impressions().cmp(&a.total_impressions()));
    gaps.truncate(max_results);
    gaps
}
