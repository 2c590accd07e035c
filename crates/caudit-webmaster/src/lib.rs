//! Yandex Webmaster and Google Search Console export parsing.
//!
//! Exports are downloaded by hand into a webmasters directory:
//!
//! - Yandex: `{domain}_*.csv` files, one pages report and one queries report
//! - GSC: a `*Performance*.zip` holding CSV tables
//!
//! [`WebmasterData::load`] finds the newest file of each kind, parses it and builds a
//! [`MetricsIndex`] for page enrichment plus a [`QuerySet`] for gap analysis. Column headers
//! are matched in Russian and English, numbers tolerate thousands separators, decimal commas
//! and percent signs.
//!
//! A file that fails to parse is logged and skipped; the other sources still load.

#![warn(missing_docs)]

mod columns;
mod discovery;
mod error;
mod gsc;
mod metrics;
mod numbers;
mod table;
mod yandex;

use std::path::Path;

use caudit_analysis::QuerySet;
use caudit_config::WebmasterPatterns;
use tracing::{info, warn};

pub use columns::Columns;
pub use discovery::{WebmasterFiles, discover_files};
pub use error::WebmasterError;
pub use gsc::{GscExport, parse_gsc_archive, read_gsc_zip};
pub use metrics::{EnrichSummary, MetricsIndex, UrlMetrics, url_path};
pub use numbers::{parse_count, parse_decimal};
pub use table::{PageMetrics, ReportKind, read_page_rows, read_query_rows};
pub use yandex::{read_yandex_pages, read_yandex_queries, sniff_report_kind, yandex_page_url};

/// Everything loaded from the webmasters directory.
#[derive(Debug, Clone, Default)]
pub struct WebmasterData {
    /// Page metrics from both sources.
    pub metrics: MetricsIndex,
    /// Query statistics from both sources.
    pub queries: QuerySet,
    /// The files that were read.
    pub files: WebmasterFiles,
}

impl WebmasterData {
    /// Discovers and parses the exports in `dir`.
    ///
    /// Only directory listing errors propagate; unreadable exports are skipped.
    pub fn load(
        dir: &Path,
        patterns: &WebmasterPatterns,
        domain: &str,
    ) -> Result<Self, WebmasterError> {
        let files = discover_files(dir, patterns)?;
        if files.is_empty() {
            warn!(dir = %dir.display(), "no webmaster exports found");
        }

        let yandex_pages = files
            .yandex_pages
            .as_deref()
            .and_then(|path| skip_on_error(read_yandex_pages(path, domain)))
            .unwrap_or_default();
        let yandex_queries = files
            .yandex_queries
            .as_deref()
            .and_then(|path| skip_on_error(read_yandex_queries(path)))
            .unwrap_or_default();
        let gsc = files
            .gsc_zip
            .as_deref()
            .and_then(|path| skip_on_error(read_gsc_zip(path)))
            .unwrap_or_default();

        info!(
            yandex_pages = yandex_pages.len(),
            yandex_queries = yandex_queries.len(),
            gsc_pages = gsc.pages.len(),
            gsc_queries = gsc.queries.len(),
            "loaded webmaster data"
        );

        Ok(Self {
            metrics: MetricsIndex::from_sources(&yandex_pages, &gsc.pages),
            queries: QuerySet {
                yandex: yandex_queries,
                gsc: gsc.queries,
            },
            files,
        })
    }
}

/// Logs a failed export and turns it into `None`.
fn skip_on_error<T>(result: Result<T, WebmasterError>) -> Option<T> {
    result
        .map_err(|err| warn!(error = %err, "skipping webmaster export"))
        .ok()
}
