//! Durable per-partition snapshot cache.
//!
//! Holds the last successfully fetched passages of each partition. A write
//! replaces the whole snapshot in one statement, so a concurrent reader
//! observes either the previous or the new snapshot, never a mix.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::OptionalExtension;

use solace_core::error::SolaceError;
use solace_core::types::{Partition, Passage};

use crate::db::Database;

/// Key-value store of partition snapshots.
pub trait ContentCache: Send + Sync {
    /// Last written snapshot for `partition`, or `None` if nothing was stored.
    fn load(&self, partition: Partition) -> Result<Option<Vec<Passage>>, SolaceError>;

    /// Replace the snapshot for `partition` wholesale.
    fn store(&self, partition: Partition, passages: &[Passage]) -> Result<(), SolaceError>;
}

/// SQLite-backed [`ContentCache`]; one row per partition.
pub struct SqliteContentCache {
    db: Arc<Database>,
}

impl SqliteContentCache {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl ContentCache for SqliteContentCache {
    fn load(&self, partition: Partition) -> Result<Option<Vec<Passage>>, SolaceError> {
        let payload: Option<String> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT payload FROM partition_snapshots WHERE partition = ?1",
                rusqlite::params![partition.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SolaceError::Storage(format!("Failed to read snapshot: {}", e)))
        })?;

        match payload {
            Some(json) => {
                let passages: Vec<Passage> = serde_json::from_str(&json).map_err(|e| {
                    SolaceError::Storage(format!(
                        "Corrupt snapshot for {}: {}",
                        partition.as_str(),
                        e
                    ))
                })?;
                Ok(Some(passages))
            }
            None => Ok(None),
        }
    }

    fn store(&self, partition: Partition, passages: &[Passage]) -> Result<(), SolaceError> {
        let payload = serde_json::to_string(passages)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO partition_snapshots (partition, payload, passage_count, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(partition) DO UPDATE SET
                    payload = excluded.payload,
                    passage_count = excluded.passage_count,
                    updated_at = excluded.updated_at",
                rusqlite::params![
                    partition.as_str(),
                    payload,
                    passages.len() as i64,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(|e| SolaceError::Storage(format!("Failed to write snapshot: {}", e)))?;
            Ok(())
        })?;
        tracing::debug!(
            partition = %partition,
            passages = passages.len(),
            "Snapshot cached"
        );
        Ok(())
    }
}
