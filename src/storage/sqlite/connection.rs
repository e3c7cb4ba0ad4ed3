//! Connection handling for the `SQLite` record store.
//!
//! The store keeps one [`Connection`] behind a [`Mutex`]; every operation
//! takes the lock for its whole duration, so a batch append and a snapshot
//! query never interleave.

use crate::{Error, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Acquires `mutex`, recovering the guard if a previous holder panicked.
///
/// A panic inside a critical section leaves the connection usable (any open
/// transaction is rolled back by the next `BEGIN`), so the poison flag is
/// logged and cleared rather than propagated.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("store mutex was poisoned, recovering");
            metrics::counter!("store_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Opens (creating if needed) the database file at `path`.
///
/// Missing parent directories are created first.
///
/// # Errors
///
/// Returns [`Error::Store`] if the directory or database cannot be created.
pub fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Store {
            operation: "create_db_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }
    let conn = Connection::open(path).map_err(|e| Error::Store {
        operation: "open".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    configure_connection(&conn);
    Ok(conn)
}

/// Applies the pragmas every store connection runs with.
///
/// - `journal_mode = WAL`: readers (e.g. an external dashboard) do not block
///   the pipeline's appends
/// - `synchronous = NORMAL`: durable across application crashes
/// - `busy_timeout = 5000`: waits for a competing writer instead of failing
///
/// Pragma failures are ignored; in-memory databases, for one, cannot use
/// WAL and report `memory` instead.
pub fn configure_connection(conn: &Connection) {
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
}
