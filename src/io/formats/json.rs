//! JSON format adapter.
//!
//! Accepts a JSON array of objects, or a single object which is treated as
//! a one-element array.

use crate::io::traits::RecordSource;
use crate::models::NewsRecord;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::io::Read;
use tracing::warn;

/// JSON record source.
///
/// The whole document is parsed up front; elements that are not objects
/// are skipped with a warning when they are reached.
pub struct JsonRecordSource {
    buffer: VecDeque<Value>,
    position: usize,
}

impl JsonRecordSource {
    /// Creates a source from a reader.
    ///
    /// An empty (or whitespace-only) document yields no records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the document is not valid JSON, or is
    /// neither an array nor an object.
    pub fn new<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::Schema(format!("unreadable JSON document: {e}")))?;

        let trimmed = text.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() {
            return Ok(Self::from_values(Vec::new()));
        }

        let document: Value = serde_json::from_str(trimmed)
            .map_err(|e| Error::Schema(format!("failed to parse JSON: {e}")))?;

        match document {
            Value::Array(items) => Ok(Self::from_values(items)),
            object @ Value::Object(_) => Ok(Self::from_values(vec![object])),
            other => Err(Error::Schema(format!(
                "top-level JSON must be an array or object, found {other}"
            ))),
        }
    }

    fn from_values(items: Vec<Value>) -> Self {
        Self {
            buffer: items.into(),
            position: 0,
        }
    }
}

impl RecordSource for JsonRecordSource {
    fn next(&mut self) -> Result<Option<NewsRecord>> {
        while let Some(item) = self.buffer.pop_front() {
            self.position += 1;
            match NewsRecord::from_json(item) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => warn!(element = self.position, error = %e, "skipping JSON element"),
            }
        }
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<Vec<NewsRecord>> {
        JsonRecordSource::new(text.as_bytes())?.collect_all()
    }

    #[test]
    fn test_array_of_objects() {
        let records = load(r#"[{"title": "a"}, {"title": "b", "x": 1}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].extra["x"], serde_json::json!(1));
    }

    #[test]
    fn test_single_object() {
        let records = load(r#"{"title": "only one"}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("only one"));
    }

    #[test]
    fn test_empty_document() {
        assert!(load("").unwrap().is_empty());
        assert!(load("  \n").unwrap().is_empty());
        assert!(load("[]").unwrap().is_empty());
    }

    #[test]
    fn test_byte_order_mark() {
        let records = load("\u{feff}[{\"title\": \"bom\"}]").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_non_object_elements_skipped() {
        let records = load(r#"[{"title": "keep"}, 42, "text", null]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(load("[{\"title\": "), Err(Error::Schema(_))));
        assert!(matches!(load("\"just a string\""), Err(Error::Schema(_))));
    }
}
