//! Export artifacts.
//!
//! - [`SnapshotExporter`]: the JSON snapshot consumed downstream
//! - [`ProcessedCsvWriter`]: per-input CSV copies of cleaned records

mod processed;
mod snapshot;

pub use processed::ProcessedCsvWriter;
pub use snapshot::{SnapshotExporter, render_record};
