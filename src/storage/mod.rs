//! Durable record storage.
//!
//! A single `SQLite` table holds every record that survived cleaning. The
//! table is append-only; the snapshot exporter reads it back in
//! publication order.

mod news;
pub mod sqlite;

pub use news::{DEFAULT_TABLE, NewsStore, is_valid_table_name};
