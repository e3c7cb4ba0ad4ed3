//! File I/O subsystem.
//!
//! Reads input files into candidate records and writes JSON artifacts
//! atomically.
//!
//! # Supported Input Formats
//!
//! | Format | Shape | Notes |
//! |--------|-------|-------|
//! | JSON | Array of objects, or one object | Non-object elements skipped |
//! | CSV | Header row + rows | Empty cells are missing values |
//!
//! # Example
//!
//! ```rust,ignore
//! use newsflow::io::load_candidates;
//!
//! let records = load_candidates(Path::new("data/raw/feed.json"))?;
//! println!("loaded {} candidates", records.len());
//! ```

pub mod atomic;
pub mod formats;
mod loader;
pub mod traits;

pub use formats::Format;
pub use loader::load_candidates;
pub use traits::RecordSource;
