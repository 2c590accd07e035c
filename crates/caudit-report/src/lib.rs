//! Audit report generation.
//!
//! One run writes up to three dated files into the output directory:
//!
//! - `site-content-audit-YYYY-MM-DD.csv`: one row per page, UTF-8 with BOM
//! - `site-content-audit-YYYY-MM-DD.json`: summary statistics plus every page record
//! - `content-gaps-YYYY-MM-DD.md`: overview, top pages and the gap analyses
//!
//! The Markdown report is always written; CSV and JSON follow [`ReportFormat`]. After writing,
//! `*-latest.*` symlinks can be pointed at the new files.

#![warn(missing_docs)]

mod csv_report;
mod error;
mod json_report;
mod links;
mod markdown;
mod summary;

use std::{
    fs,
    path::{Path, PathBuf},
};

use caudit_analysis::{AuditAnalysis, PageRecord};
use caudit_config::ReportFormat;
use chrono::{DateTime, Local};
use tracing::info;

pub use csv_report::write_csv;
pub use error::ReportError;
pub use json_report::{JsonReport, write_json};
pub use links::{
    LATEST_CSV, LATEST_JSON, LATEST_MARKDOWN, replace_link, update_latest_links,
};
pub use markdown::{
    MAX_CTR_ROWS, MAX_GAP_ROWS, MAX_GROUP_PAGES, MAX_GROUPS_SHOWN, MarkdownReport,
};
pub use summary::{
    LOW_CONTENT_PAGES, LowContentPage, PageStatus, Summary, TOP_PAGES, TopPage,
};

/// Default low-content threshold in words.
pub const DEFAULT_MIN_WORD_COUNT: usize = 300;

/// Files written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// CSV table, when requested.
    pub csv: Option<PathBuf>,
    /// JSON report, when requested.
    pub json: Option<PathBuf>,
    /// Markdown summary.
    pub markdown: PathBuf,
}

impl ReportPaths {
    /// `(target, link name)` pairs for the latest links.
    pub fn latest_links(&self) -> Vec<(&Path, &'static str)> {
        let mut links = Vec::with_capacity(3);
        if let Some(csv) = &self.csv {
            links.push((csv.as_path(), LATEST_CSV));
        }
        if let Some(json) = &self.json {
            links.push((json.as_path(), LATEST_JSON));
        }
        links.push((self.markdown.as_path(), LATEST_MARKDOWN));
        links
    }

    /// Every written file.
    pub fn all(&self) -> impl Iterator<Item = &Path> {
        self.csv
            .iter()
            .chain(&self.json)
            .chain([&self.markdown])
            .map(PathBuf::as_path)
    }
}

/// Writes dated reports into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    /// Output directory, created on demand.
    output_dir: PathBuf,
    /// Run timestamp; its date names the files.
    generated: DateTime<Local>,
    /// Pages below this many words are low-content.
    min_word_count: usize,
}

impl ReportWriter {
    /// Writer stamped with the current local time.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            generated: Local::now(),
            min_word_count: DEFAULT_MIN_WORD_COUNT,
        }
    }

    /// Overrides the run timestamp.
    pub fn with_generated(mut self, generated: DateTime<Local>) -> Self {
        self.generated = generated;
        self
    }

    /// Overrides the low-content threshold.
    pub fn with_min_word_count(mut self, min_word_count: usize) -> Self {
        self.min_word_count = min_word_count;
        self
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `YYYY-MM-DD` of the run.
    pub fn date_suffix(&self) -> String {
        self.generated.format("%Y-%m-%d").to_string()
    }

    /// Path of the dated CSV report.
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("site-content-audit-{}.csv", self.date_suffix()))
    }

    /// Path of the dated JSON report.
    pub fn json_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("site-content-audit-{}.json", self.date_suffix()))
    }

    /// Path of the dated Markdown report.
    pub fn markdown_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("content-gaps-{}.md", self.date_suffix()))
    }

    /// Writes the reports selected by `format` plus the Markdown summary.
    pub fn write_all(
        &self,
        pages: &[PageRecord],
        analysis: Option<&AuditAnalysis>,
        format: ReportFormat,
    ) -> Result<ReportPaths, ReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let summary = Summary::compute(pages, self.min_word_count);

        let csv = if format.includes_csv() {
            let path = self.csv_path();
            write_csv(&path, pages)?;
            info!(path = %path.display(), "wrote CSV report");
            Some(path)
        } else {
            None
        };

        let json = if format.includes_json() {
            let path = self.json_path();
            let report = JsonReport {
                generated: self.generated.format("%Y-%m-%dT%H:%M:%S").to_string(),
                total_pages: pages.len(),
                summary: &summary,
                pages,
            };
            write_json(&path, &report)?;
            info!(path = %path.display(), "wrote JSON report");
            Some(path)
        } else {
            None
        };

        let markdown = self.markdown_path();
        let generated = self.generated.format("%Y-%m-%d %H:%M:%S").to_string();
        let text = MarkdownReport {
            generated: &generated,
            total_pages: pages.len(),
            summary: &summary,
            analysis,
            min_word_count: self.min_word_count,
        }
        .to_string();
        fs::write(&markdown, text).map_err(|source| ReportError::Io {
            path: markdown.clone(),
            source,
        })?;
        info!(path = %markdown.display(), "wrote Markdown report");

        Ok(ReportPaths {
            csv,
            json,
            markdown,
        })
    }

    /// Points the `*-latest.*` links at `paths`; failures are logged.
    pub fn update_latest_links(&self, paths: &ReportPaths) -> Vec<PathBuf> {
        update_latest_links(&self.output_dir, &paths.latest_links())
    }
}
