//! Translation client.
//!
//! [`Translator`] is the seam the composer translates through. The
//! Hugging Face client posts to the `Helsinki-NLP/opus-mt-mul-{code}`
//! inference models and treats a missing token as "service disabled".

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use solace_core::config::TranslationConfig;
use solace_core::types::Language;

use crate::error::TranslateError;

/// Translates text into one of the supported languages.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`, reporting why it could not.
    async fn try_translate(&self, text: &str, target: Language) -> Result<String, TranslateError>;

    /// Translate `text`, returning it unchanged on any failure.
    async fn translate(&self, text: &str, target: Language) -> String {
        match self.try_translate(text, target).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(language = %target, error = %e, "Translation failed, using original text");
                text.to_string()
            }
        }
    }
}

/// Translator that always returns its input.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn try_translate(&self, text: &str, _target: Language) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

#[derive(Serialize)]
struct TranslationRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct TranslationResponse {
    translation_text: String,
}

/// Client for the Hugging Face inference API.
pub struct HuggingFaceTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HuggingFaceTranslator {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Build from config; the token comes from the environment or the file.
    pub fn from_config(config: &TranslationConfig) -> Result<Self, TranslateError> {
        Self::new(
            config.endpoint.clone(),
            config.resolve_token(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Whether a token is configured. Without one every call is a pass-through.
    pub fn is_enabled(&self) -> bool {
        self.api_token.is_some()
    }

    /// Inference model translating any supported language into `target`.
    pub fn model_for(target: Language) -> &'static str {
        match target {
            Language::En => "Helsinki-NLP/opus-mt-mul-en",
            Language::Hi => "Helsinki-NLP/opus-mt-mul-hi",
            Language::Te => "Helsinki-NLP/opus-mt-mul-te",
            Language::Ur => "Helsinki-NLP/opus-mt-mul-ur",
        }
    }

    fn model_url(&self, target: Language) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            Self::model_for(target)
        )
    }
}

#[async_trait]
impl Translator for HuggingFaceTranslator {
    async fn try_translate(&self, text: &str, target: Language) -> Result<String, TranslateError> {
        let Some(token) = self.api_token.as_deref() else {
            tracing::debug!(language = %target, "No translation token configured, passing through");
            return Ok(text.to_string());
        };

        let response = self
            .client
            .post(self.model_url(target))
            .bearer_auth(token)
            .json(&TranslationRequest { inputs: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: Vec<TranslationResponse> =
            serde_json::from_str(&body).map_err(|e| TranslateError::Decode(e.to_string()))?;

        parsed
            .into_iter()
            .next()
            .map(|r| r.translation_text)
            .ok_or_else(|| TranslateError::Decode("empty translation list".to_string()))
    }
}
