//! Row extraction shared by every CSV report.

use std::{io::Read, path::Path};

use caudit_analysis::{QueryRecord, SourceMetrics};
use csv::{Reader, ReaderBuilder};
use tracing::debug;

use crate::{Columns, WebmasterError};

/// Metrics one report lists for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMetrics {
    /// Absolute page URL.
    pub url: String,
    /// Reported metrics.
    pub metrics: SourceMetrics,
}

/// Which rows a report holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Per-page metrics.
    Pages,
    /// Per-query metrics.
    Queries,
}

impl ReportKind {
    /// Classifies a report by its detected columns; a query column takes precedence.
    pub fn detect(columns: &Columns) -> Option<Self> {
        if columns.query.is_some() {
            Some(Self::Queries)
        } else if columns.page.is_some() {
            Some(Self::Pages)
        } else {
            None
        }
    }
}

/// CSV reader tolerant of ragged rows.
pub fn csv_reader<R: Read>(input: R) -> Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(input)
}

/// Wraps a CSV error with the file it came from.
fn csv_error(source: &Path) -> impl Fn(csv::Error) -> WebmasterError + '_ {
    move |err| WebmasterError::Csv {
        path: source.to_path_buf(),
        source: err,
    }
}

/// Reads the header row and detects its columns.
pub fn read_columns<R: Read>(
    reader: &mut Reader<R>,
    source: &Path,
) -> Result<Columns, WebmasterError> {
    Ok(Columns::detect(reader.headers().map_err(csv_error(source))?))
}

/// Reads page rows, mapping each page cell to an absolute URL with `to_url`.
///
/// Rows with an empty page cell are skipped.
pub fn read_page_rows<R: Read>(
    input: R,
    source: &Path,
    to_url: impl Fn(&str) -> String,
) -> Result<Vec<PageMetrics>, WebmasterError> {
    let mut reader = csv_reader(input);
    let columns = read_columns(&mut reader, source)?;
    if columns.page.is_none() {
        return Err(WebmasterError::MissingColumn {
            path: source.to_path_buf(),
            column: "page",
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error(source))?;
        let Some(page) = Columns::cell(&record, columns.page).filter(|p| !p.is_empty()) else {
            continue;
        };
        rows.push(PageMetrics {
            url: to_url(page),
            metrics: columns.metrics(&record),
        });
    }
    debug!(path = %source.display(), rows = rows.len(), "read page report");
    Ok(rows)
}

/// Reads query rows; rows without query text or with unparsable numbers are skipped.
pub fn read_query_rows<R: Read>(
    input: R,
    source: &Path,
) -> Result<Vec<QueryRecord>, WebmasterError> {
    let mut reader = csv_reader(input);
    let columns = read_columns(&mut reader, source)?;
    if columns.query.is_none() {
        return Err(WebmasterError::MissingColumn {
            path: source.to_path_buf(),
            column: "query",
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_error(source))?;
        match columns.query_record(&record) {
            Some(query) => rows.push(query),
            None => skipped += 1,
        }
    }
    debug!(path = %source.display(), rows = rows.len(), skipped, "read query report");
    Ok(rows)
}
