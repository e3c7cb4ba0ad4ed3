//! Change detection.
//!
//! - [`DirectoryScanner`] lists input files and their fingerprints
//! - [`ChangeSource`] implementations produce raw notifications
//! - [`Debouncer`] collapses notification bursts into per-channel signals

mod debouncer;
mod scanner;
mod source;

pub use debouncer::{Channel, DebounceStats, Debouncer, MAX_WINDOW};
pub use scanner::{DirectoryScanner, RawFile};
pub use source::{ChangeEvent, ChangeSource, FsNotifySource, PollSource};
