//! File change fingerprints.
//!
//! A fingerprint is modification time plus size, not a content hash: an
//! overwrite that keeps both is not detected, and a touch that changes
//! either is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Change fingerprint of a file, rendered as `"{modTime}_{size}"`.
///
/// `modTime` is fractional seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Builds a fingerprint from file metadata.
    #[must_use]
    pub fn new(modified: SystemTime, size: u64) -> Self {
        let secs = match modified.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs_f64(),
            Err(e) => -e.duration().as_secs_f64(),
        };
        Self(format!("{secs}_{size}"))
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted map of file path to last committed fingerprint.
///
/// A path with no entry counts as changed. The map is loaded once, mutated
/// in memory and written back by [`FileFingerprintStore::flush`] only when
/// something was committed since the last flush.
#[derive(Debug)]
pub struct FileFingerprintStore {
    path: PathBuf,
    entries: BTreeMap<String, Fingerprint>,
    dirty: bool,
}

impl FileFingerprintStore {
    /// Loads the store from `path`.
    ///
    /// A missing or corrupt file yields an empty store (every input will be
    /// treated as changed).
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = super::load_json_map(&path).unwrap_or_else(|e| {
            warn!(error = %e, "fingerprint state unusable, starting empty");
            BTreeMap::new()
        });
        Self {
            path,
            entries,
            dirty: false,
        }
    }

    /// Returns true if `file` has no committed fingerprint or a different one.
    #[must_use]
    pub fn has_changed(&self, file: &Path, fingerprint: &Fingerprint) -> bool {
        self.entries.get(&key(file)) != Some(fingerprint)
    }

    /// Records `fingerprint` as the handled state of `file`.
    pub fn commit(&mut self, file: &Path, fingerprint: Fingerprint) {
        if self.entries.insert(key(file), fingerprint.clone()) != Some(fingerprint) {
            self.dirty = true;
        }
    }

    /// Writes the map back to disk if it changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StateIo`] if the file cannot be written. The
    /// in-memory state is kept and retried on the next flush.
    pub fn flush(&mut self) -> crate::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        super::write_json_atomic(&self.path, &self.entries)?;
        self.dirty = false;
        Ok(())
    }

    /// Forgets files that no longer exist, such as archived inputs.
    ///
    /// Returns the number of entries removed. The change is persisted by
    /// the next [`FileFingerprintStore::flush`].
    pub fn prune_missing(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|file, _| Path::new(file).exists());
        let pruned = before - self.entries.len();
        if pruned > 0 {
            self.dirty = true;
            debug!(pruned, "dropped fingerprints of vanished files");
        }
        pruned
    }

    /// Number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no file is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn key(file: &Path) -> String {
    file.to_string_lossy().into_owned()
}
