//! Fuzzy, bilingual column detection.
//!
//! Export headers vary by source and interface language (`Страница`, `Top pages`, `Клики`,
//! `Clicks`, `CTR %`, `Avg. position`, ...). Each header is matched by lowercase substring.

use caudit_analysis::{QueryRecord, SourceMetrics};
use csv::StringRecord;

use crate::numbers::{parse_count, parse_decimal};

/// Substrings identifying a query column.
const QUERY_MARKERS: &[&str] = &["запрос", "query", "queries"];
/// Substrings identifying a page column.
const PAGE_MARKERS: &[&str] = &["страниц", "page", "url", "path"];
/// Substrings identifying a clicks column. The second entry has a Latin `k`.
const CLICK_MARKERS: &[&str] = &["клик", "kлик", "click"];
/// Substrings identifying an impressions column.
const IMPRESSION_MARKERS: &[&str] = &["показ", "impression"];
/// Substrings identifying a CTR column.
const CTR_MARKERS: &[&str] = &["ctr"];
/// Substrings identifying a position column.
const POSITION_MARKERS: &[&str] = &["позиц", "position"];

/// Column indices found in a header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Columns {
    /// Query text.
    pub query: Option<usize>,
    /// Page URL or path.
    pub page: Option<usize>,
    /// Clicks.
    pub clicks: Option<usize>,
    /// Impressions.
    pub impressions: Option<usize>,
    /// Click-through rate.
    pub ctr: Option<usize>,
    /// Average position.
    pub position: Option<usize>,
}

/// True when `header` contains any marker.
fn matches_any(header: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| header.contains(m))
}

impl Columns {
    /// Detects columns; the first header matching a kind wins.
    pub fn detect(headers: &StringRecord) -> Self {
        let mut columns = Self::default();
        for (index, raw) in headers.iter().enumerate() {
            let header = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
            let slot = if matches_any(&header, QUERY_MARKERS) {
                &mut columns.query
            } else if matches_any(&header, PAGE_MARKERS) {
                &mut columns.page
            } else if matches_any(&header, CLICK_MARKERS) {
                &mut columns.clicks
            } else if matches_any(&header, IMPRESSION_MARKERS) {
                &mut columns.impressions
            } else if matches_any(&header, CTR_MARKERS) {
                &mut columns.ctr
            } else if matches_any(&header, POSITION_MARKERS) {
                &mut columns.position
            } else {
                continue;
            };
            slot.get_or_insert(index);
        }
        columns
    }

    /// Trimmed cell for a detected column.
    pub fn cell<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
        column.and_then(|i| record.get(i)).map(str::trim)
    }

    /// Page metrics from a row; unparsable cells are `None`.
    pub fn metrics(&self, record: &StringRecord) -> SourceMetrics {
        SourceMetrics {
            clicks: Self::cell(record, self.clicks).and_then(parse_count),
            impressions: Self::cell(record, self.impressions).and_then(parse_count),
            ctr: Self::cell(record, self.ctr).and_then(parse_decimal),
            position: Self::cell(record, self.position).and_then(parse_decimal),
        }
    }

    /// Query record from a row: trimmed, lowercased query text plus its metrics.
    ///
    /// Empty or missing metric cells count as zero. A row without query text, or with a
    /// metric cell that is present but unparsable, yields `None`.
    pub fn query_record(&self, record: &StringRecord) -> Option<QueryRecord> {
        let query = Self::cell(record, self.query)?.to_lowercase();
        if query.is_empty() {
            return None;
        }
        let impressions = lenient(Self::cell(record, self.impressions), parse_count)?;
        let clicks = lenient(Self::cell(record, self.clicks), parse_count)?;
        let ctr = lenient(Self::cell(record, self.ctr), parse_decimal)?;
        let position = lenient(Self::cell(record, self.position), parse_decimal)?;

        let mut parsed = QueryRecord::new(query, impressions.unwrap_or(0), clicks.unwrap_or(0))
            .with_position(position.unwrap_or(0.0));
        if let Some(ctr) = ctr {
            parsed = parsed.with_ctr(ctr);
        }
        Some(parsed)
    }
}

/// `Some(None)` for a missing or empty cell, `Some(Some(v))` when it parses, `None` otherwise.
fn lenient<T>(cell: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<Option<T>> {
    match cell {
        None | Some("") => Some(None),
        Some(value) => parse(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn detects_yandex_headers() {
        let columns = Columns::detect(&record(&[
            "Path",
            "Dates range",
            "Impressions",
            "Clicks",
            "CTR %",
            "Avg. position",
        ]));
        assert_eq!(columns.page, Some(0));
        assert_eq!(columns.impressions, Some(2));
        assert_eq!(columns.clicks, Some(3));
        assert_eq!(columns.ctr, Some(4));
        assert_eq!(columns.position, Some(5));
        assert!(columns.query.is_none());
    }

    #[test]
    fn detects_russian_gsc_headers() {
        let columns = Columns::detect(&record(&[
            "\u{feff}Самые популярные страницы",
            "Kлики",
            "Показы",
            "CTR",
            "Позиция",
        ]));
        assert_eq!(columns.page, Some(0));
        assert_eq!(columns.clicks, Some(1));
        assert_eq!(columns.impressions, Some(2));
        assert_eq!(columns.ctr, Some(3));
        assert_eq!(columns.position, Some(4));
    }

    #[test]
    fn detects_english_query_headers() {
        let columns = Columns::detect(&record(&[
            "Top queries",
            "Clicks",
            "Impressions",
            "CTR",
            "Position",
        ]));
        assert_eq!(columns.query, Some(0));
        assert!(columns.page.is_none());
    }

    #[test]
    fn page_metrics_tolerate_bad_cells() {
        let columns =
            Columns::detect(&record(&["Page", "Clicks", "Impressions", "CTR", "Position"]));
        let metrics = columns.metrics(&record(&["https://a/x", "1 200", "n/a", "1,5%", ""]));
        assert_eq!(metrics.clicks, Some(1200));
        assert_eq!(metrics.impressions, None);
        assert_eq!(metrics.ctr, Some(1.5));
        assert_eq!(metrics.position, None);
    }

    #[test]
    fn query_records_reject_garbage() {
        let columns = Columns::detect(&record(&[
            "Query",
            "Impressions",
            "Clicks",
            "CTR %",
            "Avg. position",
        ]));
        let parsed = columns
            .query_record(&record(&[" Лоферы ", "1,200", "", "", "3,4"]))
            .unwrap();
        assert_eq!(parsed.query, "лоферы");
        assert_eq!(parsed.impressions, 1200);
        assert_eq!(parsed.clicks, 0);
        assert_eq!(parsed.position, 3.4);

        let with_ctr = columns
            .query_record(&record(&["кеды", "200", "3", "1,5%", ""]))
            .unwrap();
        assert_eq!(with_ctr.ctr, 1.5);

        assert!(columns.query_record(&record(&["лоферы", "many", "1", "", ""])).is_none());
        assert!(columns.query_record(&record(&["  ", "10", "1", "", ""])).is_none());
    }
}
