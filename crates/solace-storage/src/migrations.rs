//! Database schema migrations.
//!
//! Applies the snapshot cache schema and records applied versions in
//! `schema_migrations`.

use rusqlite::Connection;
use tracing::info;

use solace_core::error::SolaceError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), SolaceError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| SolaceError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| SolaceError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: partition_snapshots");
    }

    Ok(())
}

/// Version 1: one snapshot row per partition.
fn apply_v1(conn: &Connection) -> Result<(), SolaceError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS partition_snapshots (
            partition       TEXT PRIMARY KEY NOT NULL,
            payload         TEXT NOT NULL,
            passage_count   INTEGER NOT NULL DEFAULT 0,
            updated_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'partition_snapshots');
        ",
    )
    .map_err(|e| SolaceError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
