//! Spreadsheet-friendly page table.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use caudit_analysis::PageRecord;
use serde::Serialize;

use crate::{PageStatus, ReportError};

/// Byte-order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One CSV line; field order is column order.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    /// Page URL.
    url: &'a str,
    /// Sitemap lastmod.
    lastmod: Option<&'a str>,
    /// Content type label.
    content_type: &'static str,
    /// Page title.
    title: Option<&'a str>,
    /// First heading.
    h1: Option<&'a str>,
    /// Meta description.
    meta_description: Option<&'a str>,
    /// Main-content word count.
    word_count: usize,
    /// Keywords joined by ", ".
    top_keywords: String,
    /// Yandex clicks.
    yandex_clicks: Option<u64>,
    /// Yandex impressions.
    yandex_impressions: Option<u64>,
    /// Yandex CTR, percent.
    yandex_ctr: Option<f64>,
    /// Yandex average position.
    yandex_position: Option<f64>,
    /// GSC clicks.
    gsc_clicks: Option<u64>,
    /// GSC impressions.
    gsc_impressions: Option<u64>,
    /// GSC CTR, percent.
    gsc_ctr: Option<f64>,
    /// GSC average position.
    gsc_position: Option<f64>,
    /// Clicks over both sources; blank when zero.
    total_clicks: Option<u64>,
    /// Impressions over both sources; blank when zero.
    total_impressions: Option<u64>,
    /// Crawl status label.
    status: &'static str,
    /// Fetch error.
    error: Option<&'a str>,
}

impl<'a> CsvRow<'a> {
    /// Flattens a page record.
    fn new(page: &'a PageRecord) -> Self {
        Self {
            url: &page.url,
            lastmod: page.lastmod.as_deref(),
            content_type: page.content_type.as_str(),
            title: page.title.as_deref(),
            h1: page.h1.as_deref(),
            meta_description: page.meta_description.as_deref(),
            word_count: page.word_count,
            top_keywords: page.top_keywords.join(", "),
            yandex_clicks: page.yandex.clicks,
            yandex_impressions: page.yandex.impressions,
            yandex_ctr: page.yandex.ctr,
            yandex_position: page.yandex.position,
            gsc_clicks: page.gsc.clicks,
            gsc_impressions: page.gsc.impressions,
            gsc_ctr: page.gsc.ctr,
            gsc_position: page.gsc.position,
            total_clicks: Some(page.total_clicks()).filter(|n| *n > 0),
            total_impressions: Some(page.total_impressions()).filter(|n| *n > 0),
            status: PageStatus::of(page).as_str(),
            error: page.error.as_deref(),
        }
    }
}

/// Column names, for an empty table.
const COLUMNS: &[&str] = &[
    "url",
    "lastmod",
    "content_type",
    "title",
    "h1",
    "meta_description",
    "word_count",
    "top_keywords",
    "yandex_clicks",
    "yandex_impressions",
    "yandex_ctr",
    "yandex_position",
    "gsc_clicks",
    "gsc_impressions",
    "gsc_ctr",
    "gsc_position",
    "total_clicks",
    "total_impressions",
    "status",
    "error",
];

/// Writes the page table to `path`, header first.
pub fn write_csv(path: &Path, pages: &[PageRecord]) -> Result<(), ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
    out.write_all(UTF8_BOM).map_err(io_error)?;

    let mut writer = csv::Writer::from_writer(out);
    for page in pages {
        writer.serialize(CsvRow::new(page)).map_err(csv_error)?;
    }
    if pages.is_empty() {
        // Serde-driven headers only appear with the first row.
        writer.write_record(COLUMNS).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)?;
    Ok(())
}
