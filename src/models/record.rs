//! News record types.
//!
//! A record moves through three shapes during one pipeline pass:
//! [`NewsRecord`] (as loaded from an input file), [`CleanedRecord`] (after
//! sanitization and validation) and [`StoredRecord`] (as read back from the
//! store). Unrecognized input keys travel in [`NewsRecord::extra`] the whole
//! way and are emitted again in the snapshot.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Field names the pipeline understands, in their stored spelling.
pub const KNOWN_FIELDS: [&str; 5] = ["title", "content", "publish_time", "source", "url"];

/// Input spelling of `publish_time` used by scraper output.
const PUBLISH_TIME_CAMEL: &str = "publishTime";

/// A candidate news record loaded from an input file.
///
/// Known fields are optional because input files are loosely typed. Scalar
/// non-string values (numbers, booleans) are coerced to strings; `null` is
/// treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Headline.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Article body.
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    /// Publication time as found in the input, or normalized after cleaning.
    #[serde(default, deserialize_with = "lenient_string")]
    pub publish_time: Option<String>,
    /// Publishing outlet.
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    /// Link to the original article.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsRecord {
    /// Creates a record with a title and content.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Sets the publication time.
    #[must_use]
    pub fn with_publish_time(mut self, publish_time: impl Into<String>) -> Self {
        self.publish_time = Some(publish_time.into());
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Adds an unrecognized field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns the title, or an empty string when missing.
    #[must_use]
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Returns the content, or an empty string when missing.
    #[must_use]
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Builds a record from a JSON object.
    ///
    /// `publishTime` is read as the publication time unless a non-null
    /// `publish_time` is also present; in that case `publishTime` is kept
    /// as an extra field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Schema`] if the value is not an object or a
    /// known field holds a value that cannot be read as text.
    pub fn from_json(value: Value) -> crate::Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(crate::Error::Schema(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )));
            },
        };
        let snake_missing = object.get("publish_time").is_none_or(Value::is_null);
        if snake_missing && let Some(camel) = object.remove(PUBLISH_TIME_CAMEL) {
            object.insert("publish_time".to_string(), camel);
        }
        serde_json::from_value(Value::Object(object)).map_err(|e| crate::Error::Schema(e.to_string()))
    }
}

/// A record that survived cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    /// The sanitized record.
    pub record: NewsRecord,
    /// When the cleaning pass ran.
    pub processed_at: NaiveDateTime,
}

/// A record as persisted in the store.
///
/// Timestamps are kept as text because rows written by older tooling may
/// carry formats other than the one this crate writes.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Monotonic row id.
    pub id: i64,
    /// The persisted record.
    pub record: NewsRecord,
    /// When the record was cleaned.
    pub processed_at: Option<String>,
    /// When the record was appended to the store.
    pub imported_at: Option<String>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
