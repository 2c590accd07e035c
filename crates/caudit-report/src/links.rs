//! `*-latest.*` symlinks pointing at the newest reports.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::fs::symlink;

/// Link name for the newest CSV report.
pub const LATEST_CSV: &str = "site-content-audit-latest.csv";
/// Link name for the newest JSON report.
pub const LATEST_JSON: &str = "site-content-audit-latest.json";
/// Link name for the newest Markdown report.
pub const LATEST_MARKDOWN: &str = "content-gaps-latest.md";

/// Points `dir/link_name` at `target` (a file in `dir`), replacing any previous link.
///
/// The link stores only the target's file name so the directory can be moved.
pub fn replace_link(dir: &Path, target: &Path, link_name: &str) -> io::Result<PathBuf> {
    let link = dir.join(link_name);
    if fs::symlink_metadata(&link).is_ok() {
        fs::remove_file(&link)?;
    }
    let relative = target.file_name().map_or_else(|| target.into(), PathBuf::from);
    create_link(&relative, &link)?;
    debug!(link = %link.display(), target = %relative.display(), "updated latest link");
    Ok(link)
}

/// Creates a symlink.
#[cfg(unix)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    symlink(target, link)
}

/// Symlinks are only created on Unix.
#[cfg(not(unix))]
fn create_link(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are only supported on Unix",
    ))
}

/// Replaces every link in `links` (`(target, link name)`); failures are logged and skipped.
///
/// Returns the links that were created.
pub fn update_latest_links(dir: &Path, links: &[(&Path, &str)]) -> Vec<PathBuf> {
    links
        .iter()
        .filter_map(|(target, name)| match replace_link(dir, target, name) {
            Ok(link) => Some(link),
            Err(err) => {
                warn!(link = *name, error = %err, "could not update latest link");
                None
            }
        })
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_links() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let old = root.join("content-gaps-2024-04-01.md");
        let new = root.join("content-gaps-2024-05-01.md");
        fs::write(&old, "old").unwrap();
        fs::write(&new, "new").unwrap();

        replace_link(root, &old, LATEST_MARKDOWN).unwrap();
        let created = update_latest_links(root, &[(&new, LATEST_MARKDOWN)]);

        let link = root.join(LATEST_MARKDOWN);
        assert_eq!(created, [link.clone()]);
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("content-gaps-2024-05-01.md"));
        assert_eq!(fs::read_to_string(&link).unwrap(), "new");
    }

    #[test]
    fn dangling_links_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        symlink("missing.csv", root.join(LATEST_CSV)).unwrap();
        let target = root.join("site-content-audit-2024-05-01.csv");
        fs::write(&target, "url\n").unwrap();

        replace_link(root, &target, LATEST_CSV).unwrap();
        assert_eq!(fs::read_to_string(root.join(LATEST_CSV)).unwrap(), "url\n");
    }

    #[test]
    fn failures_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing_dir = dir.path().join("nope");
        let created = update_latest_links(&missing_dir, &[(Path::new("x.csv"), LATEST_CSV)]);
        assert!(created.is_empty());
    }
}
