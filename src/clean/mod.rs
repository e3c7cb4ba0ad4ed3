//! Record cleaning.
//!
//! [`TextSanitizer`] is the per-string transform; [`RecordCleaner`] applies
//! it to a batch along with validation and deduplication.

mod cleaner;
mod sanitizer;
pub mod timestamp;

pub use cleaner::{
    CleanOutcome, CleanReport, DEFAULT_MIN_CONTENT_CHARS, DEFAULT_MIN_TITLE_CHARS, RecordCleaner,
};
pub use sanitizer::TextSanitizer;
