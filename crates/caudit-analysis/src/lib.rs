//! Text normalization and SEO gap analysis.
//!
//! This crate is the pure core of caudit. It takes an in-memory snapshot of crawled pages
//! ([`PageRecord`]) and search-query statistics ([`QuerySet`]) and produces three analyses:
//!
//! 1. **Keyword gaps**: queries with impressions whose terms site content does not cover
//! 2. **CTR candidates**: pages whose click-through rate lags the norm for their position
//! 3. **Cannibalization**: groups of pages competing for the same normalized keyword
//!
//! All text comparison goes through a [`Normalizer`]: lowercase, punctuation stripped, stop
//! words removed, each word reduced to a base form by a pluggable [`Lemmatizer`] with a
//! bounded per-instance cache.
//!
//! The crate performs no I/O and none of its analyses fail: missing metrics count as zero and
//! empty inputs produce empty outputs.

#![warn(missing_docs)]

mod analyze;
mod cannibalization;
mod ctr;
mod error;
mod gaps;
mod lemma;
mod normalize;
mod stopwords;
mod types;

pub use analyze::{
    AnalysisParams, AuditAnalysis, DEFAULT_MAX_CTR_CANDIDATES, DEFAULT_MAX_GAPS,
    DEFAULT_MAX_GROUPS, DEFAULT_MIN_IMPRESSIONS, DEFAULT_MIN_PAGES, QueryCounts, analyze,
};
pub use cannibalization::{
    CANNIBALIZATION_KEYWORDS, CannibalizationGroup, GroupPage, Severity, find_cannibalization,
};
pub use ctr::{
    CTR_UNDERPERFORMANCE_RATIO, CtrCandidate, DEFAULT_POSITION, MIN_POTENTIAL_CLICKS,
    expected_ctr, find_ctr_candidates,
};
pub use error::AnalysisError;
pub use gaps::{
    GapType, KeywordGap, NO_CONTENT_THRESHOLD, QueryStats, WEAK_CONTENT_THRESHOLD, content_terms,
    find_keyword_gaps,
};
pub use lemma::{
    IdentityLemmatizer, Lemmatizer, LemmatizerKind, SnowballLemmatizer, parse_language,
};
pub use normalize::{DEFAULT_CACHE_CAPACITY, LemmaCache, Normalizer};
pub use stopwords::Stopwords;
pub use types::{ContentType, PageRecord, QueryRecord, QuerySet, SourceMetrics};
