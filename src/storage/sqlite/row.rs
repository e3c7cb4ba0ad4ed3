//! Row conversion for the news table.

use crate::models::{NewsRecord, StoredRecord};
use rusqlite::Row;
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};

/// Columns read back by queries, in select order.
pub const SELECT_COLUMNS: &str =
    "id, title, content, publish_time, source, url, processed_at, imported_at, extra";

/// Renders any `SQLite` value as text.
///
/// Rows written by other tools may hold numbers or blobs in text columns;
/// they are read back as their textual form. `NULL` is `None`.
#[must_use]
pub fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        },
    }
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    row.get_ref(idx).map(value_to_string)
}

/// Builds a [`StoredRecord`] from a row selected with [`SELECT_COLUMNS`].
///
/// A malformed `extra` payload is dropped with a warning rather than
/// failing the whole query.
pub fn stored_record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let id: i64 = row.get(0)?;
    let extra = text(row, 8)?
        .map(|raw| parse_extra(id, &raw))
        .unwrap_or_default();

    Ok(StoredRecord {
        id,
        record: NewsRecord {
            title: text(row, 1)?,
            content: text(row, 2)?,
            publish_time: text(row, 3)?,
            source: text(row, 4)?,
            url: text(row, 5)?,
            extra,
        },
        processed_at: text(row, 6)?,
        imported_at: text(row, 7)?,
    })
}

fn parse_extra(id: i64, raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(row = id, "ignoring malformed extra fields");
            Map::new()
        },
    }
}

/// Serializes extra fields for the `extra` column; `None` when empty.
#[must_use]
pub fn extra_to_column(extra: &Map<String, Value>) -> Option<String> {
    if extra.is_empty() {
        return None;
    }
    serde_json::to_string(extra).ok()
}
