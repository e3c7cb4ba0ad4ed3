//! Persisted pipeline state.
//!
//! Two JSON maps survive restarts: file fingerprints (which inputs have
//! already been handled) and dedup markers (which records have already been
//! handed downstream). Both follow a load-mutate-flush discipline and are
//! owned by the single pipeline worker.

mod dedup;
mod fingerprints;

pub use dedup::{DedupStore, MarkPolicy, MarkerState, ProcessedMarker, id_for};
pub use fingerprints::{FileFingerprintStore, Fingerprint};

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

/// Loads a JSON object map from `path`.
///
/// A missing file is an empty map.
///
/// # Errors
///
/// Returns [`Error::StateIo`] if the file exists but cannot be read or is
/// not a JSON object of the expected shape.
pub fn load_json_map<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>> {
    let state_error = |cause: String| Error::StateIo {
        path: path.to_path_buf(),
        cause,
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(state_error(e.to_string())),
    };
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&text).map_err(|e| state_error(e.to_string()))
}

/// Atomically replaces `path` with `map` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`Error::StateIo`] if the file cannot be written.
pub fn write_json_atomic<T: Serialize>(path: &Path, map: &BTreeMap<String, T>) -> Result<()> {
    crate::io::atomic::write_json_pretty(path, map).map_err(|e| Error::StateIo {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })
}
