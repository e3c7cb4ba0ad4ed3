//! Shared `SQLite` infrastructure for the record store.
//!
//! ## Module Structure
//!
//! - [`connection`]: opening, pragmas and poison-tolerant locking
//! - [`row`]: conversion between table rows and [`StoredRecord`](crate::models::StoredRecord)
//! - [`metrics`]: per-operation counters and latency histograms

mod connection;
mod metrics;
mod row;

pub use connection::{acquire_lock, configure_connection, open_connection};
pub use metrics::record_operation_metrics;
pub use row::{SELECT_COLUMNS, extra_to_column, stored_record_from_row, value_to_string};
