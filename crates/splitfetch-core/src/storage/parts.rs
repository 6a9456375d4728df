//! Run-scoped staging directory for part artifacts.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Prefix of the hidden staging directory created next to the output.
const STAGING_PREFIX: &str = ".splitfetch-";

/// Owns the staging directory of one download run. Each part writes to
/// `part-<index>.tmp` inside it. Dropping the store removes the directory and
/// anything left in it (best effort).
#[derive(Debug)]
pub struct PartStore {
    dir: TempDir,
}

impl PartStore {
    /// Creates a uniquely named staging directory inside `parent`.
    pub fn create_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)?;
        tracing::debug!(dir = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    /// Staging directory path.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the artifact for part `index` (1-based).
    pub fn part_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("part-{}.tmp", index))
    }

    /// Creates (or truncates) the artifact for part `index`.
    pub fn create_part(&self, index: usize) -> io::Result<File> {
        File::create(self.part_path(index))
    }
}
