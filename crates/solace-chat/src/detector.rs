//! Language and mood heuristic.
//!
//! A deterministic script sniff plus keyword matching. No I/O and no
//! model: the same input always yields the same [`DetectionResult`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use solace_core::types::{DetectionResult, Language, Mood, GENERAL_TAG};

// =============================================================================
// Keyword sets (compiled once, reused across calls)
// =============================================================================

fn keywords(mood: Mood) -> &'static str {
    match mood {
        Mood::Sad => r"\b(?:sad\w*|unhappy|depress\w*|down|cry|cries|crying|cried|lonely|grie\w*)\b",
        Mood::Happy => r"\b(?:happy|happiness|joy\w*|grateful|thankful|blessed)\b",
        Mood::Anger => r"\b(?:angry|anger|mad|frustrat\w*|furious)\b",
        Mood::Anxiety => r"\b(?:fear\w*|afraid|anxious|anxiety|worr\w*|stress\w*|nervous)\b",
    }
}

static MOOD_PATTERNS: LazyLock<Vec<(Mood, Regex)>> = LazyLock::new(|| {
    Mood::ALL
        .into_iter()
        .map(|mood| (mood, Regex::new(keywords(mood)).expect("Invalid mood regex")))
        .collect()
});

/// Script ranges in detection priority order; ASCII Latin is checked last.
const SCRIPTS: [(Language, char, char); 3] = [
    (Language::Te, '\u{0C00}', '\u{0C7F}'),
    (Language::Hi, '\u{0900}', '\u{097F}'),
    (Language::Ur, '\u{0600}', '\u{06FF}'),
];

// =============================================================================
// LanguageMoodDetector
// =============================================================================

/// Classifies the language and mood of a free-text query.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageMoodDetector;

impl LanguageMoodDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect language and mood. Never fails.
    pub fn detect(&self, text: &str, preferred: Language) -> DetectionResult {
        DetectionResult {
            language: self.detect_language(text, preferred),
            mood_tags: self.detect_moods(text),
        }
    }

    /// First script (in priority order) with any character present in `text`;
    /// `preferred` when neither a script range nor a Latin letter occurs.
    pub fn detect_language(&self, text: &str, preferred: Language) -> Language {
        for (language, lo, hi) in SCRIPTS {
            if text.chars().any(|c| (lo..=hi).contains(&c)) {
                return language;
            }
        }
        if text.chars().any(|c| c.is_ascii_alphabetic()) {
            return Language::En;
        }
        preferred
    }

    /// Labels of every matching keyword set, or exactly `{"general"}`.
    pub fn detect_moods(&self, text: &str) -> BTreeSet<String> {
        let lower = text.to_lowercase();
        let mut tags: BTreeSet<String> = MOOD_PATTERNS
            .iter()
            .filter(|(_, re)| re.is_match(&lower))
            .map(|(mood, _)| mood.label().to_string())
            .collect();

        if tags.is_empty() {
            tags.insert(GENERAL_TAG.to_string());
        }
        tags
    }
}
