//! Full-data JSON report.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use caudit_analysis::PageRecord;
use serde::Serialize;

use crate::{ReportError, Summary};

/// Top-level JSON document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Local time the report was generated, ISO 8601.
    pub generated: String,
    /// Number of pages.
    pub total_pages: usize,
    /// Site-wide statistics.
    pub summary: &'a Summary,
    /// Every page record.
    pub pages: &'a [PageRecord],
}

/// Writes the report as pretty-printed JSON.
pub fn write_json(path: &Path, report: &JsonReport<'_>) -> Result<(), ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut out, report).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.write_all(b"\n").map_err(io_error)?;
    out.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;

    use super::*;

    #[test]
    fn writes_summary_and_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let mut page = PageRecord::new("https://shop.example/blogs/blog/a");
        page.word_count = 120;
        page.yandex.clicks = Some(2);
        let pages = [page];
        let summary = Summary::compute(&pages, 300);

        write_json(
            &path,
            &JsonReport {
                generated: "2024-05-01T10:00:00".into(),
                total_pages: pages.len(),
                summary: &summary,
                pages: &pages,
            },
        )
        .unwrap();

        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["generated"], "2024-05-01T10:00:00");
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["summary"]["by_type"]["blog"], 1);
        assert_eq!(json["summary"]["pages_with_yandex_data"], 1);
        assert_eq!(json["summary"]["content_gaps"][0]["word_count"], 120);
        assert_eq!(json["pages"][0]["yandex"]["clicks"], 2);
        assert_eq!(json["pages"][0]["content_type"], "blog");
    }
}
