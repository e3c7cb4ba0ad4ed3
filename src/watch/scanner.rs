//! Input directory scanning.

use crate::io::Format;
use crate::state::Fingerprint;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// An input file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Path to the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl RawFile {
    /// Reads metadata for a single file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file's metadata cannot be read.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified()?,
            path,
        })
    }

    /// Returns the change fingerprint of this file.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.modified, self.size)
    }

    /// Returns the input format of this file.
    #[must_use]
    pub fn format(&self) -> Option<Format> {
        Format::from_path(&self.path)
    }
}

/// Recursively lists input files under a root directory.
///
/// Only `.json` and `.csv` files are returned (extension matched without
/// regard to case). Hidden files and excluded subtrees are skipped.
/// Unreadable subdirectories are logged and skipped; the scan continues
/// with their siblings. Results are ordered by path.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
    excluded: Vec<PathBuf>,
}

impl DirectoryScanner {
    /// Creates a scanner for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded: Vec::new(),
        }
    }

    /// Skips the subtree at `path`, e.g. an archive directory nested in
    /// the input directory.
    #[must_use]
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// Returns the scanned root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists input files.
    #[must_use]
    pub fn scan(&self) -> Vec<RawFile> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.is_visible(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(
                        path = ?e.path().map(Path::display),
                        error = %e,
                        "skipping unreadable entry during scan"
                    );
                    continue;
                },
            };
            if !entry.file_type().is_file() || Format::from_path(entry.path()).is_none() {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => match metadata.modified() {
                    Ok(modified) => files.push(RawFile {
                        path: entry.into_path(),
                        size: metadata.len(),
                        modified,
                    }),
                    Err(e) => warn!(path = %entry.path().display(), error = %e, "no modification time"),
                },
                Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to stat input file"),
            }
        }

        files
    }

    fn is_visible(&self, entry: &DirEntry) -> bool {
        let hidden = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'));
        !hidden && !self.excluded.iter().any(|ex| entry.path().starts_with(ex))
    }
}
