//! Keyword cannibalization: several pages competing for the same normalized keyword.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{Normalizer, PageRecord, ctr::truncate_chars};

/// Number of leading keywords per page that take part in grouping.
pub const CANNIBALIZATION_KEYWORDS: usize = 5;

/// Maximum title length carried into a group page, in characters.
const TITLE_LIMIT: usize = 60;

/// How urgent a cannibalization group is, by number of competing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Two pages.
    Minor,
    /// Three or four pages.
    Moderate,
    /// Five or more pages.
    Critical,
}

impl Severity {
    /// Severity for a group of `pages` competing pages.
    pub fn for_page_count(pages: usize) -> Self {
        match pages {
            5.. => Self::Critical,
            3..=4 => Self::Moderate,
            _ => Self::Minor,
        }
    }

    /// Suggested action for the group.
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL: Consolidate into 1-2 pillar articles",
            Self::Moderate => "Consider merging similar content",
            Self::Minor => "Review for overlap, may be intentional",
        }
    }

    /// Returns the lowercase tag used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Moderate => "moderate",
            Self::Minor => "minor",
        }
    }
}

/// One page inside a cannibalization group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPage {
    /// Page URL.
    pub url: String,
    /// Page title, truncated.
    pub title: String,
    /// Yandex clicks.
    pub yandex_clicks: u64,
    /// GSC clicks.
    pub gsc_clicks: u64,
    /// Clicks over both sources.
    pub total_clicks: u64,
    /// Yandex impressions.
    pub yandex_impressions: u64,
    /// GSC impressions.
    pub gsc_impressions: u64,
    /// Impressions over both sources.
    pub total_impressions: u64,
    /// Yandex position, else GSC position, else 0.
    pub position: f64,
}

impl From<&PageRecord> for GroupPage {
    fn from(page: &PageRecord) -> Self {
        Self {
            url: page.url.clone(),
            title: truncate_chars(page.title_or_empty(), TITLE_LIMIT),
            yandex_clicks: page.yandex.clicks_or_zero(),
            gsc_clicks: page.gsc.clicks_or_zero(),
            total_clicks: page.total_clicks(),
            yandex_impressions: page.yandex.impressions_or_zero(),
            gsc_impressions: page.gsc.impressions_or_zero(),
            total_impressions: page.total_impressions(),
            position: page
                .yandex
                .known_position()
                .or_else(|| page.gsc.known_position())
                .unwrap_or(0.0),
        }
    }
}

/// Pages sharing one normalized keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CannibalizationGroup {
    /// Shared normalized keyword.
    pub keyword: String,
    /// Competing pages, most clicked first, no duplicate URLs.
    pub pages: Vec<GroupPage>,
    /// Impressions over all pages.
    pub total_impressions: u64,
    /// Clicks over all pages.
    pub total_clicks: u64,
    /// Urgency by page count.
    pub severity: Severity,
    /// Suggested action.
    pub recommendation: String,
}

/// Distinct normalized forms of a page's leading keywords, in keyword order.
fn page_keywords(normalizer: &mut Normalizer, page: &PageRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    page.top_keywords
        .iter()
        .take(CANNIBALIZATION_KEYWORDS)
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter_map(|k| normalizer.normalize_word(k))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Builds a group from the pages sharing `keyword`, or `None` when too few distinct URLs remain.
fn build_group(
    keyword: String,
    pages: &[&PageRecord],
    min_pages: usize,
) -> Option<CannibalizationGroup> {
    let mut urls = HashSet::new();
    let mut members = Vec::new();
    for page in pages {
        if urls.insert(page.url.as_str()) {
            members.push(GroupPage::from(*page));
        }
    }

    if members.len() < min_pages.max(1) {
        return None;
    }

    members.sort_by(|a, b| b.total_clicks.cmp(&a.total_clicks));
    let total_impressions = members
        .iter()
        .fold(0u64, |sum, p| sum.saturating_add(p.total_impressions));
    let total_clicks = members
        .iter()
        .fold(0u64, |sum, p| sum.saturating_add(p.total_clicks));
    let severity = Severity::for_page_count(members.len());

    Some(CannibalizationGroup {
        keyword,
        pages: members,
        total_impressions,
        total_clicks,
        severity,
        recommendation: severity.recommendation().to_string(),
    })
}

/// Groups pages by shared normalized keyword.
///
/// Only the first [`CANNIBALIZATION_KEYWORDS`] keywords of each page count, each normalized as
/// a whole. Groups are ordered by page count, descending; ties keep first-seen keyword order.
pub fn find_cannibalization(
    normalizer: &mut Normalizer,
    pages: &[PageRecord],
    min_pages: usize,
    max_groups: usize,
) -> Vec<CannibalizationGroup> {
    let mut by_keyword: IndexMap<String, Vec<&PageRecord>> = IndexMap::new();
    for page in pages {
        for keyword in page_keywords(normalizer, page) {
            by_keyword.entry(keyword).or_default().push(page);
        }
    }

    let mut groups: Vec<CannibalizationGroup> = by_keyword
        .into_iter()
        .filter_map(|(keyword, members)| build_group(keyword, &members, min_pages))
        .collect();

    groups.sort_by(|a, b| b.pages.len().cmp(&a.pages.len()));
    groups.truncate(max_groups);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SnowballLemmatizer, SourceMetrics};

    fn page(url: &str, keywords: &[&str]) -> PageRecord {
        let mut page = PageRecord::new(url);
        page.title = Some(format!("Title {url}"));
        page.top_keywords = keywords.iter().map(|k| (*k).to_string()).collect();
        page
    }

    fn with_clicks(mut page: PageRecord, clicks: u64) -> PageRecord {
        page.yandex = SourceMetrics {
            clicks: Some(clicks),
            impressions: Some(clicks * 10),
            ctr: None,
            position: Some(3.0),
        };
        page
    }

    fn russian() -> Normalizer {
        Normalizer::new(Box::new(SnowballLemmatizer::from_name("russian").unwrap()))
    }

    #[test]
    fn inflected_keywords_share_a_group() {
        let mut normalizer = russian();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["лофер", "обувь"]),
            page("https://shop.example/blogs/blog/b", &["лоферы"]),
        ];

        let groups = find_cannibalization(&mut normalizer, &pages, 2, 20);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keyword, "лофер");
        let urls: Vec<&str> = groups[0].pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://shop.example/blogs/blog/a",
                "https://shop.example/blogs/blog/b"
            ]
        );
        assert_eq!(groups[0].severity, Severity::Minor);
        assert_eq!(
            groups[0].recommendation,
            "Review for overlap, may be intentional"
        );
    }

    #[test]
    fn only_leading_keywords_count() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            page(
                "https://shop.example/blogs/blog/a",
                &["один", "два", "три", "четыре", "пять", "кеды"],
            ),
            page("https://shop.example/blogs/blog/b", &["кеды"]),
        ];
        assert!(find_cannibalization(&mut normalizer, &pages, 2, 20).is_empty());
    }

    #[test]
    fn duplicate_urls_are_collapsed() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["кеды"]),
            page("https://shop.example/blogs/blog/a", &["кеды"]),
        ];
        assert!(find_cannibalization(&mut normalizer, &pages, 2, 20).is_empty());
    }

    #[test]
    fn repeated_keyword_within_page_counts_once() {
        let mut normalizer = russian();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["лоферы", "лофер"]),
            page("https://shop.example/blogs/blog/b", &["лофер"]),
        ];
        let groups = find_cannibalization(&mut normalizer, &pages, 2, 20);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pages.len(), 2);
    }

    #[test]
    fn stop_and_blank_keywords_are_skipped() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["  ", "купить", "для"]),
            page("https://shop.example/blogs/blog/b", &["", "купить", "для"]),
        ];
        assert!(find_cannibalization(&mut normalizer, &pages, 2, 20).is_empty());
    }

    #[test]
    fn group_totals_saturate() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["кеды"]),
            page("https://shop.example/blogs/blog/b", &["кеды"]),
        ]
        .map(|mut p| {
            p.yandex.clicks = Some(u64::MAX);
            p.gsc.clicks = Some(1);
            p
        });
        let groups = find_cannibalization(&mut normalizer, &pages, 2, 20);
        assert_eq!(groups[0].total_clicks, u64::MAX);
        assert_eq!(groups[0].pages[0].total_clicks, u64::MAX);
    }

    #[test]
    fn severity_by_page_count() {
        assert_eq!(Severity::for_page_count(2), Severity::Minor);
        assert_eq!(Severity::for_page_count(3), Severity::Moderate);
        assert_eq!(Severity::for_page_count(4), Severity::Moderate);
        assert_eq!(Severity::for_page_count(5), Severity::Critical);
        assert_eq!(Severity::for_page_count(12), Severity::Critical);
        assert_eq!(
            Severity::Critical.recommendation(),
            "CRITICAL: Consolidate into 1-2 pillar articles"
        );
        assert_eq!(
            Severity::Moderate.recommendation(),
            "Consider merging similar content"
        );
    }

    #[test]
    fn pages_sorted_by_clicks_and_totals_summed() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            with_clicks(page("https://shop.example/blogs/blog/a", &["кеды"]), 3),
            with_clicks(page("https://shop.example/blogs/blog/b", &["кеды"]), 30),
            with_clicks(page("https://shop.example/blogs/blog/c", &["кеды"]), 10),
        ];
        let groups = find_cannibalization(&mut normalizer, &pages, 2, 20);
        let group = &groups[0];

        let clicks: Vec<u64> = group.pages.iter().map(|p| p.total_clicks).collect();
        assert_eq!(clicks, [30, 10, 3]);
        assert_eq!(group.total_clicks, 43);
        assert_eq!(group.total_impressions, 430);
        assert_eq!(group.severity, Severity::Moderate);
        assert!((group.pages[0].position - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn groups_sorted_by_size_and_truncated() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["кеды", "мокасины"]),
            page("https://shop.example/blogs/blog/b", &["кеды", "мокасины"]),
            page("https://shop.example/blogs/blog/c", &["мокасины", "сандалии"]),
            page("https://shop.example/blogs/blog/d", &["сандалии"]),
        ];

        let groups = find_cannibalization(&mut normalizer, &pages, 2, 20);
        let keywords: Vec<&str> = groups.iter().map(|g| g.keyword.as_str()).collect();
        assert_eq!(keywords, ["мокасины", "кеды", "сандалии"]);

        let top = find_cannibalization(&mut normalizer, &pages, 2, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].keyword, "мокасины");
    }

    #[test]
    fn min_pages_is_respected() {
        let mut normalizer = Normalizer::identity();
        let pages = [
            page("https://shop.example/blogs/blog/a", &["кеды"]),
            page("https://shop.example/blogs/blog/b", &["кеды"]),
        ];
        assert!(find_cannibalization(&mut normalizer, &pages, 3, 20).is_empty());
        for group in find_cannibalization(&mut normalizer, &pages, 2, 20) {
            assert!(group.pages.len() >= 2);
        }
    }

    #[test]
    fn long_titles_truncated() {
        let mut normalizer = Normalizer::identity();
        let mut first = page("https://shop.example/blogs/blog/a", &["кеды"]);
        first.title = Some("к".repeat(100));
        let pages = [first, page("https://shop.example/blogs/blog/b", &["кеды"])];
        let groups = find_cannibalization(&mut normalizer, &pages, 2, 20);
        let long = groups[0]
            .pages
            .iter()
            .find(|p| p.url.ends_with("/a"))
            .unwrap();
        assert_eq!(long.title.chars().count(), 60);
    }
}
