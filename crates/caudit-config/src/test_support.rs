//! Scratch directory trees for unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::discovery::CONFIG_FILENAME;

/// A temporary directory removed on drop.
pub struct TestDir(TempDir);

impl TestDir {
    /// Creates an empty scratch directory.
    pub fn new() -> Self {
        Self(tempfile::tempdir().unwrap())
    }

    /// Scratch root.
    pub fn path(&self) -> &Path {
        self.0.path()
    }

    /// Creates `rel` (and parents) under the root.
    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path().join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes `.caudit.toml` with `content` into `rel`; an empty `rel` is the root.
    pub fn config(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir(rel).join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }
}
