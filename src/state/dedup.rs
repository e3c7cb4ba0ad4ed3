//! Content-hash dedup gate for downstream hand-off.
//!
//! Each snapshot record is keyed by an MD5 hex digest over its title and
//! content. A committed marker for a key suppresses any further hand-off of
//! a record with that key. Markers are never removed once committed.
//!
//! Marking is two-phase: [`DedupStore::reserve`] writes a tentative marker
//! before the hand-off, then [`DedupStore::commit`] or
//! [`DedupStore::release`] settles it. [`MarkPolicy`] decides how a
//! tentative marker left behind by a crash is read on the next run.

use crate::clean::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Characters of the title kept in a marker.
const TITLE_SNIPPET_CHARS: usize = 50;

/// How tentative markers are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkPolicy {
    /// Tentative markers count as not yet delivered. A crash between
    /// reserve and commit redelivers the record (at-least-once).
    #[default]
    AfterHandoff,
    /// Tentative markers count as delivered. A crash between reserve and
    /// commit drops the record (at-most-once).
    Eager,
}

impl MarkPolicy {
    /// Returns the policy name as written in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AfterHandoff => "after_handoff",
            Self::Eager => "eager",
        }
    }
}

impl std::fmt::Display for MarkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MarkPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "after_handoff" => Ok(Self::AfterHandoff),
            "eager" => Ok(Self::Eager),
            other => Err(crate::Error::Config(format!("unknown mark policy: {other}"))),
        }
    }
}

/// Settlement state of a marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    /// Reserved ahead of a hand-off that has not returned yet.
    Tentative,
    /// Hand-off confirmed.
    #[default]
    Committed,
}

impl MarkerState {
    const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// A persisted dedup marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedMarker {
    /// When the marker was written.
    pub processed_at: String,
    /// Leading characters of the record title.
    #[serde(default)]
    pub title: String,
    /// Settlement state; absent in files written before two-phase marking.
    #[serde(default, skip_serializing_if = "MarkerState::is_committed")]
    pub state: MarkerState,
}

/// Computes the dedup key of a snapshot record.
///
/// The key is the MD5 hex digest of `title + content`. When both are empty
/// or absent the digest is taken over the record's canonical JSON instead:
/// keys sorted at every level, `", "` and `": "` separators, and every
/// non-ASCII character escaped as `\uXXXX`. This is the text Python's
/// `json.dumps(record, sort_keys=True)` produces, so keys match markers
/// written by Python tooling.
#[must_use]
pub fn id_for(record: &Value) -> String {
    let title = field_text(record, "title");
    let content = field_text(record, "content");
    let digest = if title.is_empty() && content.is_empty() {
        md5::compute(canonical_json(record))
    } else {
        md5::compute(format!("{title}{content}"))
    };
    format!("{digest:x}")
}

fn field_text(record: &Value, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders `value` with sorted keys in the layout described on [`id_for`].
fn canonical_json(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    if canonical(value).serialize(&mut serializer).is_err() {
        return canonical(value).to_string();
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// JSON layout with spaced separators and ASCII-only strings.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if (' '..='~').contains(&c) {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Rebuilds `value` with object keys inserted in sorted order.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical(v))).collect();
            let mut out = Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        },
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

/// Persisted map of content hash to processed marker.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    markers: BTreeMap<String, ProcessedMarker>,
    policy: MarkPolicy,
    dirty: bool,
}

impl DedupStore {
    /// Loads the store from `path`.
    ///
    /// A missing or corrupt file yields an empty store.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, policy: MarkPolicy) -> Self {
        let path = path.into();
        let markers = super::load_json_map(&path).unwrap_or_else(|e| {
            warn!(error = %e, "dedup state unusable, starting empty");
            BTreeMap::new()
        });
        Self {
            path,
            markers,
            policy,
            dirty: false,
        }
    }

    /// Returns true if a record with this key should be handed downstream.
    #[must_use]
    pub fn is_new(&self, id: &str) -> bool {
        match self.markers.get(id) {
            None => true,
            Some(marker) => match marker.state {
                MarkerState::Committed => false,
                MarkerState::Tentative => self.policy == MarkPolicy::AfterHandoff,
            },
        }
    }

    /// Writes a tentative marker ahead of a hand-off.
    ///
    /// A committed marker is never downgraded.
    pub fn reserve(&mut self, id: &str, record: &Value, at: NaiveDateTime) {
        if self.markers.get(id).is_some_and(|m| m.state.is_committed()) {
            return;
        }
        self.insert(id, record, at, MarkerState::Tentative);
    }

    /// Settles a tentative marker as delivered.
    ///
    /// Returns false if there was no marker for `id`.
    pub fn commit(&mut self, id: &str) -> bool {
        match self.markers.get_mut(id) {
            Some(marker) => {
                if !marker.state.is_committed() {
                    marker.state = MarkerState::Committed;
                    self.dirty = true;
                }
                true
            },
            None => false,
        }
    }

    /// Drops a tentative marker after a failed hand-off.
    ///
    /// Committed markers are left alone. Returns true if a marker was removed.
    pub fn release(&mut self, id: &str) -> bool {
        if self
            .markers
            .get(id)
            .is_some_and(|m| m.state == MarkerState::Tentative)
        {
            self.markers.remove(id);
            self.dirty = true;
            return true;
        }
        false
    }

    /// Writes a committed marker directly.
    pub fn mark_processed(&mut self, id: &str, record: &Value, at: NaiveDateTime) {
        self.insert(id, record, at, MarkerState::Committed);
    }

    fn insert(&mut self, id: &str, record: &Value, at: NaiveDateTime, state: MarkerState) {
        let title: String = field_text(record, "title")
            .chars()
            .take(TITLE_SNIPPET_CHARS)
            .collect();
        self.markers.insert(
            id.to_string(),
            ProcessedMarker {
                processed_at: timestamp::format_timestamp(at),
                title,
                state,
            },
        );
        self.dirty = true;
    }

    /// Writes the markers back to disk if they changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StateIo`] if the file cannot be written.
    pub fn flush(&mut self) -> crate::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        super::write_json_atomic(&self.path, &self.markers)?;
        self.dirty = false;
        Ok(())
    }

    /// Returns the marker for `id`, if any.
    #[must_use]
    pub fn marker(&self, id: &str) -> Option<&ProcessedMarker> {
        self.markers.get(id)
    }

    /// Number of markers, tentative included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if there are no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Number of tentative markers.
    #[must_use]
    pub fn tentative_count(&self) -> usize {
        self.markers
            .values()
            .filter(|m| m.state == MarkerState::Tentative)
            .count()
    }

    /// Returns the configured policy.
    #[must_use]
    pub const fn policy(&self) -> MarkPolicy {
        self.policy
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
