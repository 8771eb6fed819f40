//! Remote passage store.
//!
//! [`ContentStore`] is the seam the repository fetches through;
//! [`HttpContentStore`] talks to the passage API over HTTP:
//! `GET {base_url}/partitions/{partition}/passages?limit={n}` returning a
//! JSON array of passages.

use std::time::Duration;

use async_trait::async_trait;

use solace_core::types::{Partition, Passage};

use crate::error::ContentError;

/// A source of passages that may fail or block on I/O.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Up to `limit` passages of `partition`, in the store's order.
    async fn fetch_partition(
        &self,
        partition: Partition,
        limit: usize,
    ) -> Result<Vec<Passage>, ContentError>;
}

/// HTTP client for the passage API.
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpContentStore {
    /// Create a store. Without a `base_url` every fetch fails with
    /// [`ContentError::NotConfigured`].
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.filter(|u| !u.trim().is_empty()),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn passages_url(&self, partition: Partition) -> Option<String> {
        self.base_url.as_ref().map(|base| {
            format!(
                "{}/partitions/{}/passages",
                base.trim_end_matches('/'),
                partition.as_str()
            )
        })
    }
}

/// Valid records of `partition` truncated to `limit`, plus how many records
/// were rejected. Rejections are counted over the whole payload.
fn keep_valid(records: Vec<Passage>, partition: Partition, limit: usize) -> (Vec<Passage>, usize) {
    let (mut valid, rejected): (Vec<Passage>, Vec<Passage>) = records
        .into_iter()
        .partition(|p| !p.id.trim().is_empty() && p.partition == partition);
    valid.truncate(limit);
    (valid, rejected.len())
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch_partition(
        &self,
        partition: Partition,
        limit: usize,
    ) -> Result<Vec<Passage>, ContentError> {
        let url = self
            .passages_url(partition)
            .ok_or(ContentError::NotConfigured)?;

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let records: Vec<Passage> =
            serde_json::from_str(&body).map_err(|e| ContentError::Decode(e.to_string()))?;

        let (passages, dropped) = keep_valid(records, partition, limit);
        if dropped > 0 {
            tracing::warn!(
                partition = %partition,
                dropped,
                "Dropped passages with empty id or foreign partition"
            );
        }

        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn record(id: &str, source: &str, tags: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "source": source,
            "verse_ref": format!("ref {}", id),
            "language": "en",
            "text": format!("text {}", id),
            "explanation": null,
            "tags": tags,
        })
    }

    async fn passages_handler(
        Path(partition): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        let limit: usize = params
            .get("limit")
            .and_then(|l| l.parse().ok())
            .unwrap_or(usize::MAX);
        let all = vec![
            record("m1", &partition, &["happy"]),
            record("m2", &partition, &["sad"]),
            record("m3", &partition, &[]),
        ];
        Json(serde_json::Value::Array(all.into_iter().take(limit).collect()))
    }

    fn store(base: &str) -> HttpContentStore {
        HttpContentStore::new(Some(base.to_string()), Duration::from_secs(5)).unwrap()
    }

    fn sample(id: &str, partition: Partition) -> Passage {
        serde_json::from_value(record(id, partition.as_str(), &[])).unwrap()
    }

    #[test]
    fn test_rejections_counted_beyond_limit() {
        let records = vec![
            sample("", Partition::Bible),
            sample("q1", Partition::Quran),
            sample("b1", Partition::Bible),
            sample("b2", Partition::Bible),
            sample("b3", Partition::Bible),
        ];
        let (kept, dropped) = keep_valid(records, Partition::Bible, 2);
        let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_no_rejections() {
        let records = vec![sample("b1", Partition::Bible), sample("b2", Partition::Bible)];
        let (kept, dropped) = keep_valid(records, Partition::Bible, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 0);
    }

    #[tokio::test]
    async fn test_fetch_decodes_passages() {
        let base = serve(Router::new().route(
            "/partitions/{partition}/passages",
            get(passages_handler),
        ))
        .await;

        let passages = store(&base)
            .fetch_partition(Partition::Mahabharata, 10)
            .await
            .unwrap();
        let ids: Vec<&str> = passages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(passages[1].tags, vec!["sad"]);
        assert_eq!(passages[0].reference, "ref m1");
    }

    #[tokio::test]
    async fn test_fetch_sends_limit() {
        let base = serve(Router::new().route(
            "/partitions/{partition}/passages",
            get(passages_handler),
        ))
        .await;

        let passages = store(&base)
            .fetch_partition(Partition::Bible, 2)
            .await
            .unwrap();
        assert_eq!(passages.len(), 2);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let base = serve(Router::new().route(
            "/partitions/{partition}/passages",
            get(passages_handler),
        ))
        .await;

        let passages = store(&format!("{}/", base))
            .fetch_partition(Partition::Quran, 1)
            .await
            .unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].partition, Partition::Quran);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let base = serve(Router::new().route(
            "/partitions/{partition}/passages",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;

        let err = store(&base)
            .fetch_partition(Partition::Bible, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Status(503)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let base = serve(Router::new().route(
            "/partitions/{partition}/passages",
            get(|| async { Json(serde_json::json!({"passages": "nope"})) }),
        ))
        .await;

        let err = store(&base)
            .fetch_partition(Partition::Bible, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Decode(_)));
    }

    #[tokio::test]
    async fn test_invalid_records_are_dropped() {
        let base = serve(Router::new().route(
            "/partitions/{partition}/passages",
            get(|| async {
                Json(serde_json::json!([
                    record("", "bible", &[]),
                    record("q1", "quran", &[]),
                    record("b1", "bible", &["general"]),
                ]))
            }),
        ))
        .await;

        let passages = store(&base)
            .fetch_partition(Partition::Bible, 5)
            .await
            .unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].id, "b1");
    }

    #[tokio::test]
    async fn test_unconfigured_store() {
        let store = HttpContentStore::new(None, Duration::from_secs(1)).unwrap();
        assert!(store.base_url().is_none());
        let err = store
            .fetch_partition(Partition::Bible, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotConfigured));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Bind then drop a listener so the port is almost certainly closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = store(&format!("http://{}", addr))
            .fetch_partition(Partition::Bible, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Transport(_)));
    }
}
