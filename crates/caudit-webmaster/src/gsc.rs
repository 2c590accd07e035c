//! Google Search Console ZIP exports.
//!
//! A GSC performance export is a ZIP of CSV tables (pages, queries, countries, devices, ...)
//! whose names depend on the interface language.

use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use caudit_analysis::QueryRecord;
use tracing::{debug, warn};
use zip::{ZipArchive, result::ZipError};

use crate::{
    PageMetrics, WebmasterError,
    table::{read_page_rows, read_query_rows},
};

/// Entry-name substrings marking the pages table.
const PAGES_ENTRY_MARKERS: &[&str] = &["страниц", "pages"];
/// Entry-name substrings marking the queries table.
const QUERIES_ENTRY_MARKERS: &[&str] = &["запрос", "queries"];

/// Tables read from one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GscExport {
    /// Per-page metrics.
    pub pages: Vec<PageMetrics>,
    /// Per-query metrics.
    pub queries: Vec<QueryRecord>,
}

/// Reads a GSC export from disk.
pub fn read_gsc_zip(path: &Path) -> Result<GscExport, WebmasterError> {
    let file = File::open(path).map_err(|source| WebmasterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_gsc_archive(file, path)
}

/// Reads a GSC export from any seekable source; `source` names it in errors and logs.
///
/// An unreadable table is logged and left empty so the other table still loads.
pub fn parse_gsc_archive<R: Read + Seek>(
    reader: R,
    source: &Path,
) -> Result<GscExport, WebmasterError> {
    let zip_error = |err| WebmasterError::Zip {
        path: source.to_path_buf(),
        source: err,
    };
    let mut archive = ZipArchive::new(reader).map_err(zip_error)?;
    let entries = entry_list(&mut archive).map_err(zip_error)?;

    let mut export = GscExport::default();

    match pages_entry(&entries) {
        Some(index) => {
            let entry = archive.by_index(index).map_err(zip_error)?;
            debug!(entry = entry.name(), "reading GSC pages table");
            match read_page_rows(entry, source, |page| page.to_string()) {
                Ok(pages) => export.pages = pages,
                Err(err) => warn!(error = %err, "skipping GSC pages table"),
            }
        }
        None => warn!(path = %source.display(), "no pages table in GSC export"),
    }

    if let Some(index) = queries_entry(&entries) {
        let entry = archive.by_index(index).map_err(zip_error)?;
        debug!(entry = entry.name(), "reading GSC queries table");
        match read_query_rows(entry, source) {
            Ok(queries) => export.queries = queries,
            Err(err) => warn!(error = %err, "skipping GSC queries table"),
        }
    }

    Ok(export)
}

/// Name and uncompressed size of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryInfo {
    /// Lowercased entry name.
    name: String,
    /// Uncompressed size in bytes.
    size: u64,
}

/// Lists file entries in archive order; directories get an empty name.
fn entry_list<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<EntryInfo>, ZipError> {
    (0..archive.len())
        .map(|index| {
            let entry = archive.by_index_raw(index)?;
            let name = if entry.is_dir() {
                String::new()
            } else {
                entry.name().to_lowercase()
            };
            Ok(EntryInfo {
                name,
                size: entry.size(),
            })
        })
        .collect()
}

/// First entry whose name contains one of `markers`.
fn find_entry(entries: &[EntryInfo], markers: &[&str]) -> Option<usize> {
    entries
        .iter()
        .position(|e| markers.iter().any(|m| e.name.contains(m)))
}

/// Pages table: by name, else the largest CSV.
fn pages_entry(entries: &[EntryInfo]) -> Option<usize> {
    find_entry(entries, PAGES_ENTRY_MARKERS).or_else(|| {
        entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name.ends_with(".csv"))
            .max_by_key(|(_, e)| e.size)
            .map(|(index, _)| index)
    })
}

/// Queries table, by name only.
fn queries_entry(entries: &[EntryInfo]) -> Option<usize> {
    find_entry(entries, QUERIES_ENTRY_MARKERS)
}
