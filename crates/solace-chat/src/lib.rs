//! Conversational pipeline for Solace.
//!
//! Detects the language and mood of a query, selects a passage through the
//! content repository, and composes a reply in the user's language.

pub mod composer;
pub mod detector;
pub mod error;
pub mod orchestrator;
pub mod translate;

pub use composer::{render_passage, AnswerComposer, DEFAULT_REFLECTION, GENERIC_REPLY};
pub use detector::LanguageMoodDetector;
pub use error::TranslateError;
pub use orchestrator::{ConversationOrchestrator, SessionState};
pub use translate::{HuggingFaceTranslator, PassthroughTranslator, Translator};
