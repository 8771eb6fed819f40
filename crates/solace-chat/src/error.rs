//! Error types for the conversational pipeline.

/// Errors from a translation attempt.
///
/// Never surfaced to the conversation: [`Translator::translate`] logs them
/// and returns the input text unchanged.
///
/// [`Translator::translate`]: crate::translate::Translator::translate
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("translation service returned HTTP {0}")]
    Status(u16),
    #[error("malformed translation payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TranslateError::Decode(err.to_string())
        } else {
            TranslateError::Transport(err.to_string())
        }
    }
}
