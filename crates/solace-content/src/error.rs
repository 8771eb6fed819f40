//! Error types for passage retrieval.

/// Errors from a single remote fetch attempt.
///
/// The repository converts every one of these into a cache fallback; they
/// are only visible through logs and the `try_*` entry points.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content store is not configured")]
    NotConfigured,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("content store returned HTTP {0}")]
    Status(u16),
    #[error("content request timed out after {0} ms")]
    Timeout(u64),
    #[error("malformed content payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ContentError::Decode(err.to_string())
        } else {
            ContentError::Transport(err.to_string())
        }
    }
}
