//! Yandex Webmaster CSV exports.
//!
//! Yandex exports pages and queries as separate CSV files with the same name pattern; the
//! header row tells them apart (`Path` vs `Query`). Page rows carry a site-relative path.

use std::{fs::File, path::Path};

use caudit_analysis::QueryRecord;

use crate::{
    PageMetrics, ReportKind, WebmasterError,
    table::{csv_reader, read_columns, read_page_rows, read_query_rows},
};

/// Opens a report file.
fn open(path: &Path) -> Result<File, WebmasterError> {
    File::open(path).map_err(|source| WebmasterError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Absolute URL for a page cell: paths are joined to `https://{domain}`.
pub fn yandex_page_url(domain: &str, page: &str) -> String {
    if page.starts_with("http://") || page.starts_with("https://") {
        return page.to_string();
    }
    let domain = domain.trim().trim_end_matches('/');
    if page.starts_with('/') {
        format!("https://{domain}{page}")
    } else {
        format!("https://{domain}/{page}")
    }
}

/// Reads only the header row and classifies the report.
pub fn sniff_report_kind(path: &Path) -> Result<Option<ReportKind>, WebmasterError> {
    let mut reader = csv_reader(open(path)?);
    let columns = read_columns(&mut reader, path)?;
    Ok(ReportKind::detect(&columns))
}

/// Reads a pages report.
pub fn read_yandex_pages(path: &Path, domain: &str) -> Result<Vec<PageMetrics>, WebmasterError> {
    read_page_rows(open(path)?, path, |page| yandex_page_url(domain, page))
}

/// Reads a queries report.
pub fn read_yandex_queries(path: &Path) -> Result<Vec<QueryRecord>, WebmasterError> {
    read_query_rows(open(path)?, path)
}
