//! Conversation orchestrator: one session's request/response cycle.
//!
//! Sequences detection, passage search, and composition for each
//! submission, and owns the session transcript. Every non-empty submission
//! gets exactly one assistant turn; retrieval and translation failures
//! degrade to cached content or the generic reply.

use std::collections::BTreeSet;
use std::sync::Arc;

use solace_content::{filter_by_tags, ContentRepository};
use solace_core::types::{
    ConversationTurn, DetectionResult, Language, Partition, Passage, Role, Snapshot,
};

use crate::composer::AnswerComposer;
use crate::detector::LanguageMoodDetector;

/// Processing state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Processing,
}

/// Holds a session in `Processing` and puts it back to `Idle` on every exit,
/// including when the `submit` future is dropped mid-flight.
struct ProcessingGuard<'a> {
    state: &'a mut SessionState,
}

impl<'a> ProcessingGuard<'a> {
    fn enter(state: &'a mut SessionState) -> Self {
        *state = SessionState::Processing;
        Self { state }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        *self.state = SessionState::Idle;
    }
}

/// Drives one conversation session.
///
/// The repository and composer are shared handles; the transcript and the
/// selected passage belong to this session alone.
pub struct ConversationOrchestrator {
    detector: LanguageMoodDetector,
    repository: Arc<ContentRepository>,
    composer: Arc<AnswerComposer>,
    partition: Partition,
    language: Language,
    state: SessionState,
    transcript: Vec<ConversationTurn>,
    selected: Option<Passage>,
    last_detection: Option<DetectionResult>,
}

impl ConversationOrchestrator {
    /// Create an idle session with an empty transcript.
    pub fn new(
        repository: Arc<ContentRepository>,
        composer: Arc<AnswerComposer>,
        partition: Partition,
        language: Language,
    ) -> Self {
        Self {
            detector: LanguageMoodDetector::new(),
            repository,
            composer,
            partition,
            language,
            state: SessionState::Idle,
            transcript: Vec::new(),
            selected: None,
            last_detection: None,
        }
    }

    /// Switch the active partition and reply language. The transcript is kept.
    pub fn set_context(&mut self, partition: Partition, language: Language) {
        tracing::info!(partition = %partition, language = %language, "Session context updated");
        self.partition = partition;
        self.language = language;
    }

    /// Prime the durable cache for the active partition.
    pub async fn prime(&self) -> Snapshot {
        self.repository.prefetch(self.partition).await
    }

    /// Handle one user message.
    ///
    /// Returns the appended assistant turn, or `None` when the input was
    /// blank and nothing was recorded.
    pub async fn submit(&mut self, raw_text: &str) -> Option<&ConversationTurn> {
        let text = raw_text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring blank submission");
            return None;
        }

        self.transcript.push(ConversationTurn::new(Role::User, text));
        let _processing = ProcessingGuard::enter(&mut self.state);

        let detection = self.detector.detect(text, self.language);
        tracing::debug!(
            detected_language = %detection.language,
            moods = ?detection.mood_tags,
            "Query classified"
        );

        let selected =
            select_passage(&self.repository, self.partition, &detection.mood_tags).await;
        if selected.is_none() {
            tracing::info!(partition = %self.partition, "No passage available, using generic reply");
        }

        let reply = self.composer.compose(selected.as_ref(), self.language).await;

        self.transcript.push(ConversationTurn::new(Role::Assistant, reply));
        self.selected = selected;
        self.last_detection = Some(detection);
        self.transcript.last()
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Passage behind the latest reply, for bookmarking by collaborators.
    pub fn selected_passage(&self) -> Option<&Passage> {
        self.selected.as_ref()
    }

    pub fn last_detection(&self) -> Option<&DetectionResult> {
        self.last_detection.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

/// Remote search, then the cache filtered by tags, then the cache's first
/// entry.
async fn select_passage(
    repository: &ContentRepository,
    partition: Partition,
    tags: &BTreeSet<String>,
) -> Option<Passage> {
    if let Some(found) = repository.search(partition, tags, 1).await.into_iter().next() {
        return Some(found);
    }

    let cached = repository.cached(partition);
    filter_by_tags(&cached, tags, 1)
        .into_iter()
        .next()
        .or_else(|| cached.into_iter().next())
}

// =============================================================================
// Tests
// =============================================================================
