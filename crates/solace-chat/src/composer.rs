//! Answer composition.
//!
//! Renders a selected passage (or the generic reply) and translates it
//! into the user's language only when the text is not already in it.

use std::sync::Arc;
use std::time::Duration;

use solace_core::types::{Language, Passage};

use crate::translate::Translator;

/// Reply used when no passage could be selected.
pub const GENERIC_REPLY: &str = "I understand. Let's reflect with kindness and courage.";

/// Closing line used when a passage has no explanation.
pub const DEFAULT_REFLECTION: &str = "Reflect on this verse kindly.";

/// Render a passage as reference, text, and life lesson.
pub fn render_passage(passage: &Passage) -> String {
    format!(
        "{}\n\n{}\n\nLife lesson: {}",
        passage.reference,
        passage.text,
        passage
            .explanation
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_REFLECTION)
    )
}

/// Turns a selected passage into a reply in the target language.
pub struct AnswerComposer {
    translator: Arc<dyn Translator>,
    timeout: Duration,
}

impl AnswerComposer {
    pub fn new(translator: Arc<dyn Translator>, timeout: Duration) -> Self {
        Self {
            translator,
            timeout,
        }
    }

    /// Compose the reply for `passage`, or the generic reply when `None`.
    pub async fn compose(&self, passage: Option<&Passage>, target: Language) -> String {
        match passage {
            Some(p) => {
                let rendered = render_passage(p);
                if p.language == target || target.is_base() {
                    return rendered;
                }
                self.translate_bounded(rendered, target).await
            }
            None => {
                if target.is_base() {
                    return GENERIC_REPLY.to_string();
                }
                self.translate_bounded(GENERIC_REPLY.to_string(), target).await
            }
        }
    }

    async fn translate_bounded(&self, text: String, target: Language) -> String {
        match tokio::time::timeout(self.timeout, self.translator.translate(&text, target)).await {
            Ok(translated) => translated,
            Err(_) => {
                tracing::warn!(
                    language = %target,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Translation timed out, using original text"
                );
                text
            }
        }
    }
}
