//! Human-readable Markdown summary with the gap analyses.

use std::fmt::{self, Write};

use caudit_analysis::{
    AuditAnalysis, CannibalizationGroup, CtrCandidate, GapType, KeywordGap, Severity,
};

use crate::Summary;

/// Keyword gap rows shown.
pub const MAX_GAP_ROWS: usize = 30;
/// CTR candidate rows shown.
pub const MAX_CTR_ROWS: usize = 20;
/// Cannibalization groups shown.
pub const MAX_GROUPS_SHOWN: usize = 15;
/// Pages shown per cannibalization group.
pub const MAX_GROUP_PAGES: usize = 7;

/// Everything the Markdown report shows.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownReport<'a> {
    /// Generation time, already formatted.
    pub generated: &'a str,
    /// Number of pages audited.
    pub total_pages: usize,
    /// Site-wide statistics.
    pub summary: &'a Summary,
    /// Gap analyses, when they ran.
    pub analysis: Option<&'a AuditAnalysis>,
    /// Low-content threshold used for the summary.
    pub min_word_count: usize,
}

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "# SEO Content Audit Report\n")?;
        writeln!(out, "**Generated:** {}\n", self.generated)?;
        self.write_overview(out)?;
        self.write_types(out)?;
        self.write_top_pages(out)?;
        if let Some(analysis) = self.analysis {
            write_keyword_gaps(out, &analysis.keyword_gaps)?;
            write_ctr_candidates(out, &analysis.ctr_candidates)?;
            write_cannibalization(out, &analysis.cannibalization)?;
        }
        self.write_low_content(out)
    }
}

impl MarkdownReport<'_> {
    /// Headline numbers.
    fn write_overview(&self, out: &mut impl Write) -> fmt::Result {
        let s = self.summary;
        writeln!(out, "## Overview\n")?;
        writeln!(out, "- **Total Pages Analyzed:** {}", self.total_pages)?;
        writeln!(out, "- **Total Word Count:** {}", thousands(s.total_word_count))?;
        writeln!(out, "- **Average Word Count:** {}", thousands(s.avg_word_count))?;
        writeln!(out, "- **Pages with Yandex Data:** {}", s.pages_with_yandex_data)?;
        writeln!(out, "- **Pages with GSC Data:** {}", s.pages_with_gsc_data)?;
        if let Some(analysis) = self.analysis {
            let counts = analysis.query_counts;
            writeln!(out, "- **Yandex Queries Analyzed:** {}", counts.yandex)?;
            writeln!(out, "- **GSC Queries Analyzed:** {}", counts.gsc)?;
        }
        writeln!(out, "- **Pages with Errors:** {}\n", s.pages_with_errors)
    }

    /// Page counts per content type.
    fn write_types(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "## Content by Type\n")?;
        for (content_type, count) in self.summary.types_by_count() {
            writeln!(out, "- **{content_type}:** {count} pages")?;
        }
        writeln!(out)
    }

    /// Pages with the most clicks.
    fn write_top_pages(&self, out: &mut impl Write) -> fmt::Result {
        let top = &self.summary.top_performing_pages;
        if top.is_empty() {
            return Ok(());
        }
        writeln!(out, "## Top {} Performing Pages (by clicks)\n", top.len())?;
        writeln!(out, "| # | Page | Yandex | GSC | Total | Position |")?;
        writeln!(out, "|---|------|--------|-----|-------|----------|")?;
        for (i, page) in top.iter().enumerate() {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                i + 1,
                link(&page.title, &page.url, 55),
                page.yandex_clicks,
                page.gsc_clicks,
                page.total_clicks,
                position(page.average_position()),
            )?;
        }
        writeln!(out)
    }

    /// Pages that need more text.
    fn write_low_content(&self, out: &mut impl Write) -> fmt::Result {
        let pages = &self.summary.content_gaps;
        if pages.is_empty() {
            return Ok(());
        }
        writeln!(out, "## Low Content Pages (<{} words)\n", self.min_word_count)?;
        writeln!(out, "Pages that may need expansion:\n")?;
        writeln!(out, "| # | Page | Words |")?;
        writeln!(out, "|---|------|-------|")?;
        for (i, page) in pages.iter().enumerate() {
            writeln!(
                out,
                "| {} | {} | {} |",
                i + 1,
                link(&page.title, &page.url, 65),
                page.word_count
            )?;
        }
        writeln!(out)
    }
}

/// Queries without matching content.
fn write_keyword_gaps(out: &mut impl Write, gaps: &[KeywordGap]) -> fmt::Result {
    if gaps.is_empty() {
        return Ok(());
    }
    writeln!(out, "---\n")?;
    writeln!(out, "## 🔍 Keyword Gap Analysis\n")?;
    writeln!(out, "Queries with impressions but no matching content on the site:\n")?;
    writeln!(out, "| # | Query | Yandex Imp. | GSC Imp. | Position | Gap Type |")?;
    writeln!(out, "|---|-------|-------------|----------|----------|----------|")?;
    for (i, gap) in gaps.iter().take(MAX_GAP_ROWS).enumerate() {
        let impressions = |stats: Option<u64>| {
            stats
                .filter(|n| *n > 0)
                .map_or_else(|| "-".to_string(), |n| n.to_string())
        };
        let best_position = gap
            .yandex
            .map(|s| s.position)
            .filter(|p| *p > 0.0)
            .or_else(|| gap.gsc.map(|s| s.position).filter(|p| *p > 0.0));
        let icon = match gap.gap_type {
            GapType::NoContent => "❌",
            GapType::WeakContent => "⚠️",
        };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {icon} {} |",
            i + 1,
            cell(&ellipsize(&gap.query, 40)),
            impressions(gap.yandex.map(|s| s.impressions)),
            impressions(gap.gsc.map(|s| s.impressions)),
            position(best_position),
            gap.gap_type.as_str(),
        )?;
    }
    writeln!(
        out,
        "\n**Legend:** ❌ no_content = not covered at all, ⚠️ weak_content = partial coverage\n"
    )
}

/// Pages whose CTR lags their position.
fn write_ctr_candidates(out: &mut impl Write, candidates: &[CtrCandidate]) -> fmt::Result {
    if candidates.is_empty() {
        return Ok(());
    }
    writeln!(out, "---\n")?;
    writeln!(out, "## 📈 CTR Optimization Candidates\n")?;
    writeln!(out, "Pages with high impressions but low CTR; improve title and description:\n")?;
    writeln!(out, "| # | Page | Impressions | CTR | Expected | Potential |")?;
    writeln!(out, "|---|------|-------------|-----|----------|-----------|")?;
    for (i, candidate) in candidates.iter().take(MAX_CTR_ROWS).enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {:.1}% | {:.0}% | +{} clicks |",
            i + 1,
            link(&candidate.title, &candidate.url, 50),
            candidate.impressions,
            candidate.current_ctr,
            candidate.expected_ctr,
            candidate.potential_clicks,
        )?;
    }
    writeln!(out, "\n**Action:** rewrite title and meta description to lift CTR\n")
}

/// Keywords several pages compete for.
fn write_cannibalization(out: &mut impl Write, groups: &[CannibalizationGroup]) -> fmt::Result {
    if groups.is_empty() {
        return Ok(());
    }
    writeln!(out, "---\n")?;
    writeln!(out, "## ⚠️ Keyword Cannibalization\n")?;
    writeln!(out, "Multiple pages competing for the same keywords:\n")?;
    for group in groups.iter().take(MAX_GROUPS_SHOWN) {
        let icon = match group.severity {
            Severity::Critical => "🚨",
            Severity::Moderate => "⚠️",
            Severity::Minor => "ℹ️",
        };
        writeln!(
            out,
            "### {icon} `{}` ({} pages)\n",
            group.keyword,
            group.pages.len()
        )?;
        writeln!(
            out,
            "**Total:** {} clicks, {} impressions\n",
            group.total_clicks, group.total_impressions
        )?;
        writeln!(out, "**Recommendation:** {}\n", group.recommendation)?;
        writeln!(out, "| Page | Clicks | Impressions | Position |")?;
        writeln!(out, "|------|--------|-------------|----------|")?;
        for page in group.pages.iter().take(MAX_GROUP_PAGES) {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                link(&page.title, &page.url, 45),
                page.total_clicks,
                page.total_impressions,
                position(Some(page.position).filter(|p| *p > 0.0)),
            )?;
        }
        if let Some(hidden) = group.pages.len().checked_sub(MAX_GROUP_PAGES).filter(|n| *n > 0) {
            writeln!(out, "| *...and {hidden} more pages* | | | |")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// At most `limit` characters, with `...` appended when cut.
fn ellipsize(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// Escapes characters that would break a table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// `[title](url)` with the title shortened; the URL stands in for a missing title.
fn link(title: &str, url: &str, limit: usize) -> String {
    let text = if title.trim().is_empty() { url } else { title };
    format!("[{}]({url})", cell(&ellipsize(text, limit)))
}

/// Position with one decimal, or `-`.
fn position(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{p:.1}"))
}

/// Integer with `,` thousands separators.
fn thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
