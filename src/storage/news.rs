//! Append-only news record table.

use super::sqlite::{
    SELECT_COLUMNS, acquire_lock, configure_connection, extra_to_column, open_connection,
    record_operation_metrics, stored_record_from_row,
};
use crate::clean::timestamp;
use crate::models::{CleanedRecord, StoredRecord};
use crate::{Error, Result};
use regex::Regex;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Default table name.
pub const DEFAULT_TABLE: &str = "news_articles";

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// Returns true if `name` can be used unquoted as a table name.
#[must_use]
pub fn is_valid_table_name(name: &str) -> bool {
    IDENTIFIER.as_ref().is_some_and(|re| re.is_match(name))
}

/// Durable store for cleaned records.
///
/// Rows are only ever inserted: each gets a monotonic `id` and an
/// `imported_at` stamp and is never updated afterwards. Schema creation is
/// idempotent, so opening an existing database is safe.
///
/// Besides the fixed columns the table carries an `extra` column holding
/// unrecognized input fields as a JSON object.
pub struct NewsStore {
    conn: Mutex<Connection>,
    table: String,
    db_path: Option<PathBuf>,
}

impl NewsStore {
    /// Opens (or creates) the store at `db_path` using table `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `table` is not a plain SQL identifier,
    /// or [`Error::Store`] if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>, table: &str) -> Result<Self> {
        check_table_name(table)?;
        let db_path = db_path.into();
        let conn = open_connection(&db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
            db_path: Some(db_path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory(table: &str) -> Result<Self> {
        check_table_name(table)?;
        let conn = Connection::open_in_memory().map_err(|e| Error::Store {
            operation: "open_memory".to_string(),
            cause: e.to_string(),
        })?;
        configure_connection(&conn);
        let store = Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (`None` for in-memory stores).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        let table = &self.table;
        let schema_error = |operation: &str, e: rusqlite::Error| Error::Store {
            operation: operation.to_string(),
            cause: e.to_string(),
        };

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT,
                    content TEXT,
                    publish_time TIMESTAMP,
                    source TEXT,
                    url TEXT,
                    processed_at TIMESTAMP,
                    imported_at TIMESTAMP,
                    extra TEXT
                )"
            ),
            [],
        )
        .map_err(|e| schema_error("create_table", e))?;

        // Tables created before the extra column existed.
        if !has_column(&conn, table, "extra").map_err(|e| schema_error("table_info", e))? {
            conn.execute(&format!("ALTER TABLE {table} ADD COLUMN extra TEXT"), [])
                .map_err(|e| schema_error("add_extra_column", e))?;
        }

        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_title ON {table}(title);
             CREATE INDEX IF NOT EXISTS idx_{table}_publish_time ON {table}(publish_time);"
        ))
        .map_err(|e| schema_error("create_indexes", e))?;

        Ok(())
    }

    /// Appends a batch of records in one transaction.
    ///
    /// Every row is stamped with the same `imported_at`. Either the whole
    /// batch is inserted or none of it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if any insert fails; the transaction is
    /// rolled back and no rows from the batch are visible.
    #[instrument(skip(self, records), fields(operation = "append", table = %self.table, count = records.len()))]
    pub fn append(&self, records: &[CleanedRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let imported_at = timestamp::format_timestamp(timestamp::now());

            conn.execute("BEGIN IMMEDIATE", []).map_err(|e| Error::Store {
                operation: "begin_transaction".to_string(),
                cause: e.to_string(),
            })?;

            let result = (|| {
                let mut stmt = conn
                    .prepare_cached(&format!(
                        "INSERT INTO {} (title, content, publish_time, source, url, processed_at, imported_at, extra)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        self.table
                    ))
                    .map_err(|e| Error::Store {
                        operation: "prepare_insert".to_string(),
                        cause: e.to_string(),
                    })?;

                for cleaned in records {
                    let record = &cleaned.record;
                    stmt.execute(params![
                        record.title,
                        record.content,
                        record.publish_time,
                        record.source,
                        record.url,
                        timestamp::format_timestamp(cleaned.processed_at),
                        imported_at,
                        extra_to_column(&record.extra),
                    ])
                    .map_err(|e| Error::Store {
                        operation: "insert_record".to_string(),
                        cause: e.to_string(),
                    })?;
                }
                Ok(records.len())
            })();

            if result.is_ok() {
                conn.execute("COMMIT", []).map_err(|e| Error::Store {
                    operation: "commit_transaction".to_string(),
                    cause: e.to_string(),
                })?;
            } else {
                let _ = conn.execute("ROLLBACK", []);
            }
            result
        })();

        record_operation_metrics("append", start, &result);
        match &result {
            Ok(count) => info!(rows = count, table = %self.table, "appended records"),
            Err(e) => warn!(error = %e, table = %self.table, "append failed, batch not imported"),
        }
        result
    }

    /// Returns stored records, newest publication first.
    ///
    /// Rows whose `publish_time` is missing or does not start with a
    /// `YYYY-MM-DD` date sort after all dated rows. Ties are broken by
    /// descending `id`. `limit` caps the number of rows returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the query fails.
    #[instrument(skip(self), fields(operation = "query_all", table = %self.table))]
    pub fn query_all(&self, limit: Option<usize>) -> Result<Vec<StoredRecord>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM {}
                 ORDER BY (publish_time IS NULL
                           OR publish_time NOT GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]*'),
                          publish_time DESC,
                          id DESC
                 LIMIT ?1",
                self.table
            );
            let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

            let mut stmt = conn.prepare(&sql).map_err(|e| Error::Store {
                operation: "prepare_query".to_string(),
                cause: e.to_string(),
            })?;
            let rows = stmt
                .query_map(params![limit], stored_record_from_row)
                .map_err(|e| Error::Store {
                    operation: "query_all".to_string(),
                    cause: e.to_string(),
                })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::Store {
                    operation: "read_row".to_string(),
                    cause: e.to_string(),
                })
        })();

        record_operation_metrics("query_all", start, &result);
        result
    }

    /// Returns the number of stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the query fails.
    pub fn count(&self) -> Result<u64> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| row.get(0))
            .map_err(|e| Error::Store {
                operation: "count".to_string(),
                cause: e.to_string(),
            })?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn check_table_name(table: &str) -> Result<()> {
    if is_valid_table_name(table) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "table name '{table}' must match [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}

fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
