//! Terminal output: colors, highlighting and result tables.

mod highlight;

use caudit_analysis::{CannibalizationGroup, CtrCandidate, KeywordGap};
use caudit_crawl::SitemapStats;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
pub use highlight::{
    Highlighter, colors, dim, header, indent_content, rule, subheader, success, warning,
};

/// Longest URL or query shown in a table cell.
const MAX_CELL_CHARS: usize = 60;

/// Right-aligned numeric cell.
fn number(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Shortens `text` to [`MAX_CELL_CHARS`] characters.
fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Empty table with the shared style and `columns` as header.
fn styled_table(columns: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(columns.to_vec());
    table
}

/// URL counts per content type plus the selected total.
pub fn sitemap_table(stats: &SitemapStats) -> Table {
    let mut table = styled_table(&["Content type", "URLs"]);
    for (content_type, count) in &stats.by_type {
        table.add_row(vec![Cell::new(content_type.as_str()), number(count)]);
    }
    table.add_row(vec![Cell::new("total"), number(stats.total)]);
    table.add_row(vec![Cell::new("selected for audit"), number(stats.selected)]);
    table
}

/// Keyword gaps, at most `limit` rows.
pub fn gaps_table(gaps: &[KeywordGap], limit: usize) -> Table {
    let mut table = styled_table(&["Query", "Type", "Yandex", "GSC", "Coverage"]);
    for gap in gaps.iter().take(limit) {
        table.add_row(vec![
            Cell::new(clip(&gap.query)),
            Cell::new(gap.gap_type.as_str()),
            number(gap.yandex.map_or(0, |s| s.impressions)),
            number(gap.gsc.map_or(0, |s| s.impressions)),
            number(format!("{:.0}%", gap.similarity * 100.0)),
        ]);
    }
    table
}

/// CTR candidates, at most `limit` rows.
pub fn ctr_table(candidates: &[CtrCandidate], limit: usize) -> Table {
    let mut table = styled_table(&[
        "Page",
        "Impressions",
        "CTR",
        "Expected",
        "Position",
        "Potential",
    ]);
    for candidate in candidates.iter().take(limit) {
        table.add_row(vec![
            Cell::new(clip(&candidate.url)),
            number(candidate.impressions),
            number(format!("{:.2}%", candidate.current_ctr)),
            number(format!("{:.2}%", candidate.expected_ctr)),
            number(format!("{:.1}", candidate.position)),
            number(format!("+{}", candidate.potential_clicks)),
        ]);
    }
    table
}

/// Cannibalization groups, one row per group, at most `limit` rows.
pub fn cannibalization_table(groups: &[CannibalizationGroup], limit: usize) -> Table {
    let mut table = styled_table(&["Keyword", "Severity", "Pages", "Impressions", "Clicks"]);
    for group in groups.iter().take(limit) {
        table.add_row(vec![
            Cell::new(clip(&group.keyword)),
            Cell::new(group.severity.as_str()),
            number(group.pages.len()),
            number(group.total_impressions),
            number(group.total_clicks),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use caudit_analysis::{ContentType, GapType, QueryStats};

    use super::*;

    #[test]
    fn sitemap_table_lists_types_and_totals() {
        let stats = SitemapStats {
            total: 3,
            by_type: BTreeMap::from([(ContentType::Blog, 2), (ContentType::Product, 1)]),
            selected: 2,
        };
        let rendered = sitemap_table(&stats).to_string();
        assert!(rendered.contains("blog"));
        assert!(rendered.contains("product"));
        assert!(rendered.contains("selected for audit"));
    }

    #[test]
    fn gaps_table_respects_limit() {
        let gap = |query: &str| KeywordGap {
            query: query.to_string(),
            yandex: Some(QueryStats {
                impressions: 120,
                clicks: 3,
                position: 8.0,
            }),
            gsc: None,
            similarity: 0.0,
            gap_type: GapType::NoContent,
        };
        let rendered = gaps_table(&[gap("лоферы"), gap("кеды")], 1).to_string();
        assert!(rendered.contains("лоферы"));
        assert!(!rendered.contains("кеды"));
        assert!(rendered.contains("120"));
    }

    #[test]
    fn long_cells_are_clipped() {
        let long = "x".repeat(100);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), MAX_CELL_CHARS);
        assert!(clipped.ends_with("..."));
        assert_eq!(clip("short"), "short");
    }
}
