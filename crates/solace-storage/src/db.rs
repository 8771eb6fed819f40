//! The snapshot cache database file.
//!
//! One `cache.db` per data directory, shared by every session in the
//! process and by concurrent `solace` invocations. Writers wait on a busy
//! timeout instead of failing when another process holds the write lock.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;

use solace_core::error::SolaceError;

use crate::migrations;

/// How long a write waits for another process to release the file lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

fn storage_err(context: &str) -> impl Fn(rusqlite::Error) -> SolaceError + '_ {
    move |e| SolaceError::Storage(format!("{}: {}", context, e))
}

/// Snapshot cache connection, migrated on open.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the cache file at `path`, creating missing parents.
    pub fn new(path: &Path) -> Result<Self, SolaceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(storage_err("Failed to open snapshot cache"))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(storage_err("Failed to set pragmas"))?;

        tracing::info!(path = %path.display(), "Snapshot cache file opened");
        Self::prepare(conn)
    }

    /// Private cache that disappears with the value.
    pub fn in_memory() -> Result<Self, SolaceError> {
        let conn =
            Connection::open_in_memory().map_err(storage_err("Failed to open in-memory cache"))?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self, SolaceError> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(storage_err("Failed to set busy timeout"))?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with the connection locked.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, SolaceError>
    where
        F: FnOnce(&Connection) -> Result<T, SolaceError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| SolaceError::Storage("Snapshot cache lock poisoned".to_string()))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
