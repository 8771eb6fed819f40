//! Passage retrieval with cache fallback.
//!
//! Every fetch is a single remote attempt bounded by a timeout. On success
//! the durable cache is overwritten with everything the store returned (up
//! to the prefetch size); on any failure the last cached snapshot is served
//! instead. Retrieval never returns an error to the conversation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use solace_core::config::ContentConfig;
use solace_core::types::{Partition, Passage, Snapshot, SnapshotOrigin};
use solace_storage::ContentCache;

use crate::error::ContentError;
use crate::remote::ContentStore;

/// Keep passages sharing at least one tag with `tags` (ignoring case), in
/// source order, truncated to `limit`. An empty tag set keeps everything.
pub fn filter_by_tags(passages: &[Passage], tags: &BTreeSet<String>, limit: usize) -> Vec<Passage> {
    passages
        .iter()
        .filter(|p| tags.is_empty() || p.matches_any_tag(tags))
        .take(limit)
        .cloned()
        .collect()
}

/// Fetches and searches passages, degrading to the durable cache.
pub struct ContentRepository {
    store: Arc<dyn ContentStore>,
    cache: Arc<dyn ContentCache>,
    prefetch_size: usize,
    timeout: Duration,
}

impl ContentRepository {
    pub fn new(
        store: Arc<dyn ContentStore>,
        cache: Arc<dyn ContentCache>,
        prefetch_size: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            prefetch_size,
            timeout,
        }
    }

    pub fn from_config(
        store: Arc<dyn ContentStore>,
        cache: Arc<dyn ContentCache>,
        config: &ContentConfig,
    ) -> Self {
        Self::new(
            store,
            cache,
            config.prefetch_size,
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Up to `limit` passages of `partition`, remote first, cache on failure.
    pub async fn fetch(&self, partition: Partition, limit: usize) -> Vec<Passage> {
        self.fetch_snapshot(partition, limit).await.passages
    }

    /// Like [`fetch`](Self::fetch) but also reports where the passages came from.
    ///
    /// The store is asked for `max(limit, prefetch_size)` so a large `limit`
    /// is not capped by the prefetch size.
    pub async fn fetch_snapshot(&self, partition: Partition, limit: usize) -> Snapshot {
        let mut snapshot = self
            .load_partition(partition, limit.max(self.prefetch_size))
            .await;
        snapshot.passages.truncate(limit);
        snapshot
    }

    /// Passages of `partition` tagged with any of `tags`, at most `limit`.
    pub async fn search(
        &self,
        partition: Partition,
        tags: &BTreeSet<String>,
        limit: usize,
    ) -> Vec<Passage> {
        self.search_snapshot(partition, tags, limit).await.passages
    }

    pub async fn search_snapshot(
        &self,
        partition: Partition,
        tags: &BTreeSet<String>,
        limit: usize,
    ) -> Snapshot {
        let snapshot = self.load_partition(partition, self.prefetch_size).await;
        let passages = filter_by_tags(&snapshot.passages, tags, limit);
        tracing::debug!(
            partition = %partition,
            tags = ?tags,
            candidates = snapshot.passages.len(),
            matched = passages.len(),
            "Tag search complete"
        );
        Snapshot {
            passages,
            ..snapshot
        }
    }

    /// Prime the cache for `partition` with a full prefetch.
    pub async fn prefetch(&self, partition: Partition) -> Snapshot {
        let snapshot = self.load_partition(partition, self.prefetch_size).await;
        if snapshot.is_empty() {
            tracing::warn!(partition = %partition, origin = ?snapshot.origin, "No passages available");
        } else {
            tracing::info!(
                partition = %partition,
                origin = ?snapshot.origin,
                passages = snapshot.passages.len(),
                "Partition primed"
            );
        }
        snapshot
    }

    /// The durable snapshot only; empty when missing or unreadable.
    pub fn cached(&self, partition: Partition) -> Vec<Passage> {
        match self.cache.load(partition) {
            Ok(Some(passages)) => passages,
            Ok(None) => {
                tracing::debug!(partition = %partition, "No cached snapshot");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(partition = %partition, error = %e, "Cached snapshot unreadable");
                Vec::new()
            }
        }
    }

    /// One bounded remote attempt. On success the cache is refreshed before
    /// returning; a failed cache write is logged and does not fail the fetch.
    pub async fn try_fetch_remote(&self, partition: Partition) -> Result<Vec<Passage>, ContentError> {
        self.fetch_remote(partition, self.prefetch_size).await
    }

    async fn fetch_remote(
        &self,
        partition: Partition,
        size: usize,
    ) -> Result<Vec<Passage>, ContentError> {
        let passages = tokio::time::timeout(self.timeout, self.store.fetch_partition(partition, size))
            .await
            .map_err(|_| ContentError::Timeout(self.timeout.as_millis() as u64))??;

        if let Err(e) = self.cache.store(partition, &passages) {
            tracing::warn!(partition = %partition, error = %e, "Failed to refresh snapshot cache");
        }
        Ok(passages)
    }

    async fn load_partition(&self, partition: Partition, size: usize) -> Snapshot {
        match self.fetch_remote(partition, size).await {
            Ok(passages) => {
                tracing::debug!(
                    partition = %partition,
                    passages = passages.len(),
                    "Fetched partition from remote store"
                );
                Snapshot {
                    partition,
                    origin: SnapshotOrigin::Remote,
                    passages,
                }
            }
            Err(e) => {
                let passages = self.cached(partition);
                tracing::warn!(
                    partition = %partition,
                    error = %e,
                    cached = passages.len(),
                    "Remote fetch failed, serving cached snapshot"
                );
                Snapshot {
                    partition,
                    origin: SnapshotOrigin::Cache,
                    passages,
                }
            }
        }
    }
}
