//! Intermediate cleaned CSV files.
//!
//! Each successfully cleaned input file leaves a CSV copy of its surviving
//! records in the output directory, named
//! `{baseName}_processed_{yyyyMMdd_HHmmss}.csv`.

use crate::clean::timestamp;
use crate::models::CleanedRecord;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const FIXED_COLUMNS: [&str; 6] = [
    "title",
    "content",
    "publish_time",
    "source",
    "url",
    "processed_at",
];

/// Writes cleaned batches as CSV files.
#[derive(Debug, Clone)]
pub struct ProcessedCsvWriter {
    output_dir: PathBuf,
}

impl ProcessedCsvWriter {
    /// Creates a writer targeting `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `records` cleaned from `source` and returns the new file's path.
    ///
    /// Columns are the fixed record fields followed by every extra key in
    /// the batch, sorted. Extra values that are not strings are written as
    /// JSON text. A name already taken (two files with the same base name
    /// in one second) gets a numeric suffix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the file cannot be created or written.
    pub fn write(
        &self,
        source: &Path,
        records: &[CleanedRecord],
        now: NaiveDateTime,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| Error::Export(format!("{}: {e}", self.output_dir.display())))?;

        let path = self.target_path(source, now);
        let export_error = |e: csv::Error| Error::Export(format!("{}: {e}", path.display()));

        let extra_columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.record.extra.keys().map(String::as_str))
            .filter(|k| !FIXED_COLUMNS.contains(k))
            .collect();

        let mut writer = csv::Writer::from_path(&path).map_err(export_error)?;
        writer
            .write_record(FIXED_COLUMNS.iter().copied().chain(extra_columns.iter().copied()))
            .map_err(export_error)?;

        for cleaned in records {
            let record = &cleaned.record;
            let processed_at = timestamp::format_timestamp(cleaned.processed_at);
            let mut row: Vec<String> = vec![
                record.title.clone().unwrap_or_default(),
                record.content.clone().unwrap_or_default(),
                record.publish_time.clone().unwrap_or_default(),
                record.source.clone().unwrap_or_default(),
                record.url.clone().unwrap_or_default(),
                processed_at,
            ];
            row.extend(extra_columns.iter().map(|key| cell(record.extra.get(*key))));
            writer.write_record(&row).map_err(export_error)?;
        }

        writer
            .flush()
            .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), rows = records.len(), "wrote processed CSV");
        Ok(path)
    }

    fn target_path(&self, source: &Path, now: NaiveDateTime) -> PathBuf {
        let base = source
            .file_stem()
            .map_or_else(|| "input".into(), |s| s.to_string_lossy());
        let stamp = timestamp::file_stamp(now);
        let mut path = self.output_dir.join(format!("{base}_processed_{stamp}.csv"));
        let mut n = 1;
        while path.exists() {
            path = self.output_dir.join(format!("{base}_processed_{stamp}_{n}.csv"));
            n += 1;
        }
        path
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
