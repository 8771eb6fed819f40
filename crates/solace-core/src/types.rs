use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SolaceError;

// =============================================================================
// Enums
// =============================================================================

/// A named scripture corpus. Every passage belongs to exactly one partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Mahabharata,
    Ramayanam,
    HanumanChalisa,
    SaiBaba,
    Quran,
    Bible,
}

impl Partition {
    pub const ALL: [Partition; 6] = [
        Partition::Mahabharata,
        Partition::Ramayanam,
        Partition::HanumanChalisa,
        Partition::SaiBaba,
        Partition::Quran,
        Partition::Bible,
    ];

    /// Stable wire identifier, also used as the cache key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Mahabharata => "mahabharata",
            Partition::Ramayanam => "ramayanam",
            Partition::HanumanChalisa => "hanuman_chalisa",
            Partition::SaiBaba => "sai_baba",
            Partition::Quran => "quran",
            Partition::Bible => "bible",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Partition::Mahabharata => "Mahabharata",
            Partition::Ramayanam => "Ramayanam",
            Partition::HanumanChalisa => "Hanuman Chalisa",
            Partition::SaiBaba => "Sai Baba Charitra",
            Partition::Quran => "Quran",
            Partition::Bible => "Bible",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Partition {
    type Err = SolaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Partition::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| SolaceError::UnknownPartition(s.to_string()))
    }
}

/// Supported reply languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Te,
    Ur,
}

impl Language {
    /// The corpus's natural language. Replies in this language are never translated.
    pub const BASE: Language = Language::En;

    pub const ALL: [Language; 4] = [Language::En, Language::Hi, Language::Te, Language::Ur];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Te => "te",
            Language::Ur => "ur",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Te => "Telugu",
            Language::Ur => "Urdu",
        }
    }

    pub fn is_base(&self) -> bool {
        *self == Language::BASE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SolaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.code() == wanted)
            .ok_or_else(|| SolaceError::UnsupportedLanguage(s.to_string()))
    }
}

/// Emotional context recognised by the mood heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sad,
    Happy,
    Anger,
    Anxiety,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Sad, Mood::Happy, Mood::Anger, Mood::Anxiety];

    /// Tag label as stored on passages.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Happy => "happy",
            Mood::Anger => "anger",
            Mood::Anxiety => "anxiety",
        }
    }
}

/// Tag used when no mood keyword matched.
pub const GENERAL_TAG: &str = "general";

/// Speaker of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Where a partition snapshot came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    /// Fetched from the remote store during this call.
    Remote,
    /// Loaded from the durable cache after the remote call failed.
    Cache,
}

// =============================================================================
// Content
// =============================================================================

/// One addressable unit of scripture content.
///
/// Immutable once fetched. Field names on the wire follow the corpus schema
/// (`source`, `verse_ref`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    #[serde(rename = "source")]
    pub partition: Partition,
    #[serde(rename = "verse_ref")]
    pub reference: String,
    pub language: Language,
    pub text: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Passage {
    /// True when any of the passage's tags equals any wanted tag, ignoring case.
    pub fn matches_any_tag<'a, I>(&self, wanted: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        let wanted: Vec<String> = wanted.into_iter().map(|t| t.to_lowercase()).collect();
        self.tags
            .iter()
            .any(|tag| wanted.iter().any(|w| *w == tag.to_lowercase()))
    }
}

/// The passages of one partition plus where they came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub partition: Partition,
    pub origin: SnapshotOrigin,
    pub passages: Vec<Passage>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// One message in a session transcript. Turns are append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Output of the language and mood heuristic.
///
/// Invariant: `mood_tags` is never empty; `{"general"}` means nothing matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub language: Language,
    pub mood_tags: BTreeSet<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(tags: &[&str]) -> Passage {
        Passage {
            id: "bg-2-47".to_string(),
            partition: Partition::Mahabharata,
            reference: "Bhagavad Gita 2.47".to_string(),
            language: Language::En,
            text: "You have a right to your actions alone.".to_string(),
            explanation: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_partition_parse_is_case_insensitive() {
        assert_eq!(
            "Hanuman_Chalisa".parse::<Partition>().unwrap(),
            Partition::HanumanChalisa
        );
        assert_eq!(" bible ".parse::<Partition>().unwrap(), Partition::Bible);
    }

    #[test]
    fn test_partition_parse_unknown() {
        let err = "gita".parse::<Partition>().unwrap_err();
        assert!(matches!(err, SolaceError::UnknownPartition(ref s) if s == "gita"));
    }

    #[test]
    fn test_partition_ids_match_serde() {
        for p in Partition::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
            assert_eq!(p.as_str().parse::<Partition>().unwrap(), p);
        }
    }

    #[test]
    fn test_partition_display_names() {
        assert_eq!(Partition::SaiBaba.display_name(), "Sai Baba Charitra");
        assert_eq!(Partition::HanumanChalisa.to_string(), "hanuman_chalisa");
    }

    #[test]
    fn test_language_parse_and_codes() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
        assert!("fr".parse::<Language>().is_err());
        assert_eq!("TE".parse::<Language>().unwrap(), Language::Te);
    }

    #[test]
    fn test_language_base_is_english() {
        assert!(Language::En.is_base());
        assert!(!Language::Ur.is_base());
    }

    #[test]
    fn test_passage_wire_field_names() {
        let json = r#"{
            "id": "m2",
            "source": "mahabharata",
            "verse_ref": "Udyoga Parva 33.1",
            "language": "hi",
            "text": "text",
            "tags": ["sad"]
        }"#;
        let p: Passage = serde_json::from_str(json).unwrap();
        assert_eq!(p.partition, Partition::Mahabharata);
        assert_eq!(p.reference, "Udyoga Parva 33.1");
        assert_eq!(p.language, Language::Hi);
        assert_eq!(p.explanation, None);

        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out["verse_ref"], "Udyoga Parva 33.1");
        assert_eq!(out["source"], "mahabharata");
    }

    #[test]
    fn test_passage_missing_tags_defaults_empty() {
        let json = r#"{"id":"x","source":"quran","verse_ref":"2:286","language":"ur","text":"t"}"#;
        let p: Passage = serde_json::from_str(json).unwrap();
        assert!(p.tags.is_empty());
    }

    #[test]
    fn test_matches_any_tag_ignores_case() {
        let p = passage(&["Sad", "duty"]);
        let wanted = vec!["SAD".to_string()];
        assert!(p.matches_any_tag(&wanted));
        assert!(!p.matches_any_tag(&vec!["happy".to_string()]));
    }

    #[test]
    fn test_matches_any_tag_empty_tags() {
        let p = passage(&[]);
        assert!(!p.matches_any_tag(&vec!["general".to_string()]));
    }

    #[test]
    fn test_conversation_turn_ids_unique() {
        let a = ConversationTurn::new(Role::User, "hi");
        let b = ConversationTurn::new(Role::User, "hi");
        assert_ne!(a.id, b.id);
        assert!(b.created_at >= a.created_at);
    }

    #[test]
    fn test_mood_labels() {
        let labels: Vec<&str> = Mood::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["sad", "happy", "anger", "anxiety"]);
    }
}
