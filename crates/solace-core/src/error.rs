use thiserror::Error;

/// Top-level error type for the Solace workspace.
///
/// Subsystem crates define their own error types for their I/O seams and
/// convert into this one where a storage or configuration failure has to
/// cross a crate boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolaceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl From<toml::de::Error> for SolaceError {
    fn from(err: toml::de::Error) -> Self {
        SolaceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SolaceError {
    fn from(err: toml::ser::Error) -> Self {
        SolaceError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SolaceError {
    fn from(err: serde_json::Error) -> Self {
        SolaceError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Solace operations.
pub type Result<T> = std::result::Result<T, SolaceError>;
