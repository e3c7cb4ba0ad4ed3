//! Core trait for reading input files.

use crate::Result;
use crate::models::NewsRecord;

/// Source of candidate records.
///
/// Implementations read records from one input format and yield them one at
/// a time. Rows that cannot be turned into a record are skipped by the
/// implementation with a warning; only file-level problems surface as
/// errors.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl RecordSource for JsonRecordSource {
///     fn next(&mut self) -> Result<Option<NewsRecord>> {
///         // Return the next buffered object
///     }
/// }
/// ```
pub trait RecordSource {
    /// Reads the next record from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying file cannot be read or parsed.
    fn next(&mut self) -> Result<Option<NewsRecord>>;

    /// Returns an estimate of the total number of records, if known.
    fn size_hint(&self) -> Option<usize> {
        None
    }

    /// Drains the source into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`RecordSource::next`].
    fn collect_all(&mut self) -> Result<Vec<NewsRecord>> {
        let mut records = Vec::with_capacity(self.size_hint().unwrap_or_default());
        while let Some(record) = self.next()? {
            records.push(record);
        }
        Ok(records)
    }
}
