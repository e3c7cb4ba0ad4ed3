//! Data models for newsflow.
//!
//! This module contains the record shapes that flow through a pipeline pass.

mod record;

pub use record::{CleanedRecord, KNOWN_FIELDS, NewsRecord, StoredRecord};
