//! # Newsflow
//!
//! Incremental ingestion pipeline for semi-structured news records.
//!
//! Files dropped into a watched directory are scanned, cleaned, appended to
//! a durable `SQLite` table and republished as an ordered JSON snapshot.
//! Records that appear in the snapshot are handed to a downstream consumer
//! exactly once per content hash.
//!
//! ## Features
//!
//! - Change detection by size + modification-time fingerprints
//! - Debounced filesystem notifications with a fallback poll
//! - Deterministic text sanitization (markup, entities, boilerplate)
//! - Append-only record store with all-or-nothing snapshot export
//! - Content-hash dedup gate with two-phase marking
//!
//! ## Example
//!
//! ```rust,ignore
//! use newsflow::config::PipelineConfig;
//! use newsflow::pipeline::{Orchestrator, Trigger};
//!
//! let config = PipelineConfig::default();
//! let mut orchestrator = Orchestrator::from_config(&config)?;
//! let report = orchestrator.run_pass(Trigger::Forced);
//! println!("imported {} rows", report.rows_imported);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use thiserror::Error as ThisError;

// Module declarations
pub mod clean;
pub mod config;
pub mod downstream;
pub mod export;
pub mod io;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod state;
pub mod storage;
pub mod watch;

// Re-exports for convenience
pub use clean::{RecordCleaner, TextSanitizer};
pub use config::PipelineConfig;
pub use downstream::Downstream;
pub use export::SnapshotExporter;
pub use models::{CleanedRecord, NewsRecord, StoredRecord};
pub use pipeline::{FileOutcome, Orchestrator, PassReport, Trigger, WatchRunner};
pub use state::{DedupStore, FileFingerprintStore, MarkPolicy};
pub use storage::NewsStore;

/// Error type for newsflow operations.
///
/// Every variant is caught and logged at the operation boundary inside the
/// pipeline; none of them stops the watch loop.
///
/// | Variant | Raised When | Pipeline reaction |
/// |---------|-------------|-------------------|
/// | `Config` | Config value cannot be defaulted | CLI exits with code 2 |
/// | `FileRead` | Input file unreadable or malformed | File skipped, left for retry |
/// | `Schema` | Record is not an object / misses fields | Row dropped |
/// | `Store` | `SQLite` open/insert/query fails | Batch counts as zero imported |
/// | `Export` | Snapshot or processed CSV cannot be written | Previous file kept |
/// | `StateIo` | Fingerprint/dedup map unreadable or unwritable | Treated as empty |
/// | `Watch` | Notifier or worker task fails | Logged |
/// | `Downstream` | Hand-off call returns an error | Markers released |
/// | `Observability` | Logging or metrics setup fails | CLI exits with code 1 |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration is invalid and cannot fall back to a default.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input file could not be read or parsed.
    #[error("failed to read '{}': {cause}", path.display())]
    FileRead {
        /// The offending file.
        path: PathBuf,
        /// The underlying cause.
        cause: String,
    },

    /// A record does not have the expected shape.
    #[error("schema violation: {0}")]
    Schema(String),

    /// A store operation failed.
    #[error("store operation '{operation}' failed: {cause}")]
    Store {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Writing an export artifact failed.
    #[error("export failed: {0}")]
    Export(String),

    /// A persisted state map could not be read or written.
    #[error("state file '{}' unusable: {cause}", path.display())]
    StateIo {
        /// The state file.
        path: PathBuf,
        /// The underlying cause.
        cause: String,
    },

    /// Change notification setup or the watch worker failed.
    #[error("watch error: {0}")]
    Watch(String),

    /// The downstream consumer rejected a hand-off.
    #[error("downstream hand-off failed: {0}")]
    Downstream(String),

    /// Logging or metrics could not be initialized.
    #[error("observability init failed: {0}")]
    Observability(String),
}

impl Error {
    /// Returns the process exit code for this error.
    ///
    /// Configuration errors exit with 2, store errors with 3, everything
    /// else with 1.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Store { .. } => 3,
            _ => 1,
        }
    }
}

/// Result type alias for newsflow operations.
pub type Result<T> = std::result::Result<T, Error>;
