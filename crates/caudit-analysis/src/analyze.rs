//! Runs every analysis over one snapshot of pages and queries.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    CannibalizationGroup, CtrCandidate, KeywordGap, Normalizer, PageRecord, QuerySet,
    content_terms, find_cannibalization, find_ctr_candidates, find_keyword_gaps,
};

/// Default impression threshold for gaps and CTR candidates.
pub const DEFAULT_MIN_IMPRESSIONS: u64 = 50;

/// Default cap on keyword gaps.
pub const DEFAULT_MAX_GAPS: usize = 50;

/// Default cap on CTR candidates.
pub const DEFAULT_MAX_CTR_CANDIDATES: usize = 30;

/// Default cap on cannibalization groups.
pub const DEFAULT_MAX_GROUPS: usize = 20;

/// Default minimum pages per cannibalization group.
pub const DEFAULT_MIN_PAGES: usize = 2;

/// Thresholds and caps for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParams {
    /// Minimum impressions for gaps and CTR candidates.
    pub min_impressions: u64,
    /// Maximum keyword gaps returned.
    pub max_gaps: usize,
    /// Maximum CTR candidates returned.
    pub max_ctr_candidates: usize,
    /// Maximum cannibalization groups returned.
    pub max_groups: usize,
    /// Minimum distinct pages for a cannibalization group.
    pub min_pages: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            min_impressions: DEFAULT_MIN_IMPRESSIONS,
            max_gaps: DEFAULT_MAX_GAPS,
            max_ctr_candidates: DEFAULT_MAX_CTR_CANDIDATES,
            max_groups: DEFAULT_MAX_GROUPS,
            min_pages: DEFAULT_MIN_PAGES,
        }
    }
}

/// Number of queries each source contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryCounts {
    /// Yandex queries.
    pub yandex: usize,
    /// GSC queries.
    pub gsc: usize,
}

/// Combined results of the three analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditAnalysis {
    /// Queries with weak or missing content.
    pub keyword_gaps: Vec<KeywordGap>,
    /// Pages under-performing their position.
    pub ctr_candidates: Vec<CtrCandidate>,
    /// Pages competing for the same keyword.
    pub cannibalization: Vec<CannibalizationGroup>,
    /// Queries loaded per source.
    pub query_counts: QueryCounts,
}

impl AuditAnalysis {
    /// True when no analysis found anything.
    pub fn is_empty(&self) -> bool {
        self.keyword_gaps.is_empty()
            && self.ctr_candidates.is_empty()
            && self.cannibalization.is_empty()
    }
}

/// Runs keyword gap, CTR and cannibalization analyses.
pub fn analyze(
    normalizer: &mut Normalizer,
    pages: &[PageRecord],
    queries: &QuerySet,
    params: &AnalysisParams,
) -> AuditAnalysis {
    let query_counts = QueryCounts {
        yandex: queries.yandex.len(),
        gsc: queries.gsc.len(),
    };
    info!(
        yandex = query_counts.yandex,
        gsc = query_counts.gsc,
        pages = pages.len(),
        "running content analysis"
    );

    let terms = content_terms(normalizer, pages);
    debug!(terms = terms.len(), "built normalized content index");

    let keyword_gaps = find_keyword_gaps(
        normalizer,
        queries,
        &terms,
        params.min_impressions,
        params.max_gaps,
    );
    let ctr_candidates =
        find_ctr_candidates(pages, params.min_impressions, params.max_ctr_candidates);
    let cannibalization =
        find_cannibalization(normalizer, pages, params.min_pages, params.max_groups);

    info!(
        gaps = keyword_gaps.len(),
        ctr = ctr_candidates.len(),
        groups = cannibalization.len(),
        cached_words = normalizer.cache().len(),
        "analysis complete"
    );

    AuditAnalysis {
        keyword_gaps,
        ctr_candidates,
        cannibalization,
        query_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GapType, QueryRecord, SourceMetrics};

    fn blog(slug: &str, keywords: &[&str], impressions: u64, clicks: u64) -> PageRecord {
        let mut page = PageRecord::new(format!("https://shop.example/blogs/blog/{slug}"));
        page.title = Some(format!("Статья {slug}"));
        page.top_keywords = keywords.iter().map(|k| (*k).to_string()).collect();
        page.yandex = SourceMetrics {
            clicks: Some(clicks),
            impressions: Some(impressions),
            ctr: None,
            position: Some(3.0),
        };
        page
    }

    #[test]
    fn default_params() {
        let params = AnalysisParams::default();
        assert_eq!(params.min_impressions, 50);
        assert_eq!(params.max_gaps, 50);
        assert_eq!(params.max_ctr_candidates, 30);
        assert_eq!(params.max_groups, 20);
        assert_eq!(params.min_pages, 2);
    }

    #[test]
    fn empty_inputs_produce_empty_analysis() {
        let mut normalizer = Normalizer::identity();
        let analysis = analyze(
            &mut normalizer,
            &[],
            &QuerySet::default(),
            &AnalysisParams::default(),
        );
        assert!(analysis.is_empty());
        assert_eq!(analysis.query_counts, QueryCounts::default());
    }

    #[test]
    fn runs_all_three_analyses() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            blog("a", &["лоферы", "кеды"], 1000, 10),
            blog("b", &["лоферы"], 20, 5),
        ];
        let queries = QuerySet {
            yandex: vec![
                QueryRecord::new("премиаты", 200, 1),
                QueryRecord::new("лоферы", 300, 5),
            ],
            gsc: vec![QueryRecord::new("мокасины", 80, 0)],
        };

        let analysis = analyze(
            &mut normalizer,
            &pages,
            &queries,
            &AnalysisParams::default(),
        );

        assert_eq!(analysis.query_counts, QueryCounts { yandex: 2, gsc: 1 });

        let gaps: Vec<(&str, GapType)> = analysis
            .keyword_gaps
            .iter()
            .map(|g| (g.query.as_str(), g.gap_type))
            .collect();
        assert_eq!(
            gaps,
            [
                ("премиаты", GapType::NoContent),
                ("мокасины", GapType::NoContent)
            ]
        );

        assert_eq!(analysis.ctr_candidates.len(), 1);
        assert!(analysis.ctr_candidates[0].url.ends_with("/a"));

        assert_eq!(analysis.cannibalization.len(), 1);
        assert_eq!(analysis.cannibalization[0].keyword, "лоферы");
    }

    #[test]
    fn analysis_serializes_with_snake_case_tags() {
        let mut normalizer = Normalizer::identity();
        let queries = QuerySet {
            yandex: vec![QueryRecord::new("премиаты", 200, 1)],
            gsc: vec![],
        };
        let analysis = analyze(&mut normalizer, &[], &queries, &AnalysisParams::default());
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains(r#""gap_type":"no_content""#));
        assert!(json.contains(r#""query_counts":{"yandex":1,"gsc":0}"#));
    }
}
