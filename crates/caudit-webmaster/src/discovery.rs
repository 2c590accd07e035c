//! Locating export files in the webmasters directory.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use caudit_config::WebmasterPatterns;
use tracing::{debug, warn};

use crate::{ReportKind, WebmasterError, yandex::sniff_report_kind};

/// The exports chosen for one run; each is the newest matching file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebmasterFiles {
    /// Yandex pages report.
    pub yandex_pages: Option<PathBuf>,
    /// Yandex queries report.
    pub yandex_queries: Option<PathBuf>,
    /// GSC performance ZIP.
    pub gsc_zip: Option<PathBuf>,
}

impl WebmasterFiles {
    /// True when no export was found.
    pub fn is_empty(&self) -> bool {
        self.yandex_pages.is_none() && self.yandex_queries.is_none() && self.gsc_zip.is_none()
    }
}

/// A candidate file and its modification time.
type Candidate = (SystemTime, PathBuf);

/// Keeps the newer of two candidates; equal times fall back to the larger path.
fn newer(current: Option<Candidate>, next: Candidate) -> Option<Candidate> {
    match current {
        Some(current) if current >= next => Some(current),
        _ => Some(next),
    }
}

/// Scans `dir` (non-recursively) for exports.
///
/// A missing directory yields no files. Yandex CSVs are classified by their header row;
/// files that cannot be read or classified are skipped with a warning.
pub fn discover_files(
    dir: &Path,
    patterns: &WebmasterPatterns,
) -> Result<WebmasterFiles, WebmasterError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "webmasters directory not found");
        return Ok(WebmasterFiles::default());
    }
    let read_dir = fs::read_dir(dir).map_err(|source| WebmasterError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut pages = None;
    let mut queries = None;
    let mut gsc = None;

    for entry in read_dir {
        let entry = entry.map_err(|source| WebmasterError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if patterns.is_gsc(&path) {
            gsc = newer(gsc, (modified, path));
        } else if patterns.is_yandex(&path) {
            match sniff_report_kind(&path) {
                Ok(Some(ReportKind::Pages)) => pages = newer(pages, (modified, path)),
                Ok(Some(ReportKind::Queries)) => queries = newer(queries, (modified, path)),
                Ok(None) => warn!(path = %path.display(), "unrecognised Yandex report, skipping"),
                Err(err) => warn!(error = %err, "skipping unreadable Yandex report"),
            }
        }
    }

    let files = WebmasterFiles {
        yandex_pages: pages.map(|(_, path)| path),
        yandex_queries: queries.map(|(_, path)| path),
        gsc_zip: gsc.map(|(_, path)| path),
    };
    debug!(?files, "webmaster exports");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::{fs::File, time::Duration};

    use caudit_config::WebmasterSettings;

    use super::*;

    fn patterns() -> WebmasterPatterns {
        WebmasterPatterns::compile(&WebmasterSettings::default(), "shop.example").unwrap()
    }

    fn write_aged(path: &Path, contents: &str, age_secs: u64) {
        fs::write(path, contents).unwrap();
        let time = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn missing_directory_has_no_files() {
        let files = discover_files(Path::new("/nonexistent/webmasters"), &patterns()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn classifies_and_picks_newest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_aged(&root.join("shop.example_old.csv"), "Query,Clicks\nx,1\n", 300);
        write_aged(&root.join("shop.example_new.csv"), "Query,Clicks\ny,1\n", 10);
        write_aged(&root.join("shop.example_pages.csv"), "Path,Clicks\n/a,1\n", 100);
        write_aged(&root.join("shop.example_misc.csv"), "Date,Visits\n2024,1\n", 5);
        write_aged(&root.join("other.example_q.csv"), "Query,Clicks\nz,1\n", 1);
        write_aged(&root.join("shop-Performance-2024.zip"), "zip", 50);
        fs::create_dir(root.join("shop.example_dir.csv")).unwrap();

        let files = discover_files(root, &patterns()).unwrap();
        assert_eq!(files.yandex_queries, Some(root.join("shop.example_new.csv")));
        assert_eq!(files.yandex_pages, Some(root.join("shop.example_pages.csv")));
        assert_eq!(files.gsc_zip, Some(root.join("shop-Performance-2024.zip")));
    }
}
