//! Snapshot export.
//!
//! The snapshot is a JSON array with one object per stored record, newest
//! publication first. It is the hand-off point for downstream consumers,
//! so it is only ever replaced whole: a failed export leaves the previous
//! file in place.

use crate::clean::timestamp;
use crate::models::StoredRecord;
use crate::storage::NewsStore;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes the store out as a JSON snapshot and reads it back.
#[derive(Debug, Clone)]
pub struct SnapshotExporter {
    path: PathBuf,
}

impl SnapshotExporter {
    /// Creates an exporter writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exports the store, logging instead of failing.
    ///
    /// Returns the number of records written; 0 when the store is empty or
    /// the export failed, in which case the previous snapshot is untouched.
    pub fn export(&self, store: &NewsStore, limit: Option<usize>) -> usize {
        let result = self.try_export(store, limit);
        let status = match &result {
            Ok(0) => {
                warn!(path = %self.path.display(), "store is empty, snapshot not written");
                "empty"
            },
            Ok(count) => {
                info!(path = %self.path.display(), records = count, "exported snapshot");
                "success"
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot export failed, previous snapshot kept");
                "error"
            },
        };
        metrics::counter!("snapshot_export_total", "status" => status).increment(1);
        result.unwrap_or(0)
    }

    /// Exports the store.
    ///
    /// Nothing is written when the store is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the query or the write fails.
    pub fn try_export(&self, store: &NewsStore, limit: Option<usize>) -> Result<usize> {
        let rows = store
            .query_all(limit)
            .map_err(|e| Error::Export(format!("query failed: {e}")))?;
        if rows.is_empty() {
            return Ok(0);
        }

        let snapshot: Vec<Value> = rows.iter().map(render_record).collect();
        crate::io::atomic::write_json_pretty(&self.path, &snapshot)
            .map_err(|e| Error::Export(format!("{}: {e}", self.path.display())))?;
        Ok(snapshot.len())
    }

    /// Reads the current snapshot.
    ///
    /// A missing file is an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the file cannot be read or is not a
    /// JSON array.
    pub fn read_snapshot(&self) -> Result<Vec<Value>> {
        let read_error = |cause: String| Error::FileRead {
            path: self.path.clone(),
            cause,
        };
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e.to_string())),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&text).map_err(|e| read_error(e.to_string()))? {
            Value::Array(items) => Ok(items),
            _ => Err(read_error("snapshot is not a JSON array".to_string())),
        }
    }

    /// Creates an empty snapshot (`[]`) if none exists.
    ///
    /// Returns true if a file was created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the file cannot be written.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        crate::io::atomic::write_json_pretty(&self.path, &Vec::<Value>::new())
            .map_err(|e| Error::Export(format!("{}: {e}", self.path.display())))?;
        info!(path = %self.path.display(), "created empty snapshot");
        Ok(true)
    }
}

/// Renders one stored record as a snapshot object.
///
/// Extra fields are emitted alongside the known columns; a known column
/// wins if an extra field has the same name. Timestamp-like fields are
/// rendered as `YYYY-MM-DD HH:MM:SS` when they parse.
#[must_use]
pub fn render_record(stored: &StoredRecord) -> Value {
    let record = &stored.record;
    let mut object = Map::new();

    for (key, value) in &record.extra {
        let value = match value {
            Value::String(s) if timestamp::is_timestamp_field(key) => render_time(s),
            other => other.clone(),
        };
        object.insert(key.clone(), value);
    }

    let text = |value: Option<&String>| value.map_or(Value::Null, |s| Value::String(s.clone()));
    let time = |value: Option<&String>| value.map_or(Value::Null, |s| render_time(s));

    object.insert("id".to_string(), Value::from(stored.id));
    object.insert("title".to_string(), text(record.title.as_ref()));
    object.insert("content".to_string(), text(record.content.as_ref()));
    object.insert("publish_time".to_string(), time(record.publish_time.as_ref()));
    object.insert("source".to_string(), text(record.source.as_ref()));
    object.insert("url".to_string(), text(record.url.as_ref()));
    object.insert("processed_at".to_string(), time(stored.processed_at.as_ref()));
    object.insert("imported_at".to_string(), time(stored.imported_at.as_ref()));

    Value::Object(object)
}

fn render_time(raw: &str) -> Value {
    Value::String(timestamp::normalize_timestamp(raw).0)
}
