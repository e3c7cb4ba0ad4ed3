//! CSV format adapter.
//!
//! The header row names the fields. Recognized headers map onto the known
//! record fields; every other column lands in the record's extra map.

use crate::io::traits::RecordSource;
use crate::models::NewsRecord;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::io::Read;
use tracing::warn;

/// CSV record source.
///
/// Empty cells are treated as missing values. Rows may have fewer or more
/// cells than the header; surplus cells are ignored.
pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    row: usize,
}

impl<R: Read> CsvRecordSource<R> {
    /// Creates a new CSV source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the header row cannot be read.
    pub fn new(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::Schema(format!("failed to read CSV header: {e}")))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        Ok(Self {
            reader: csv_reader,
            headers,
            row: 0,
        })
    }

    fn to_record(&self, row: &csv::StringRecord) -> Result<NewsRecord> {
        let mut object = Map::with_capacity(self.headers.len());
        for (header, cell) in self.headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            let value = if cell.is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            };
            object.insert(header.clone(), value);
        }
        NewsRecord::from_json(Value::Object(object))
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn next(&mut self) -> Result<Option<NewsRecord>> {
        let mut row = csv::StringRecord::new();
        loop {
            let more = self
                .reader
                .read_record(&mut row)
                .map_err(|e| Error::Schema(format!("failed to read CSV row {}: {e}", self.row + 1)))?;
            if !more {
                return Ok(None);
            }
            self.row += 1;
            match self.to_record(&row) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => warn!(row = self.row, error = %e, "skipping CSV row"),
            }
        }
    }
}
