//! Pipeline orchestration.
//!
//! [`Orchestrator::run_pass`] runs one pass: scan the input directory,
//! load/clean/persist/archive every changed file, export the snapshot if
//! anything was imported, then hand records not yet seen downstream.
//! [`WatchRunner`] repeats passes on debounced change notifications.
//! [`prepare_workspace`] lays out directories before the first pass.

mod archive;
mod orchestrator;
mod outcome;
mod runner;
mod workspace;

pub use archive::archive_file;
pub use orchestrator::{Orchestrator, PassState};
pub use outcome::{FileOutcome, FileReport, PassReport, SkipReason, Trigger};
pub use runner::{RunnerSummary, WatchRunner};
pub use workspace::{EXAMPLE_CSV, EXAMPLE_JSON, WorkspaceReport, prepare_workspace};
