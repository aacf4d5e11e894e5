// Course domain types.
//
// These are the canonical types the whole engine operates on. The
// stream parser produces them incrementally, the repository persists
// them, and the (out-of-scope) rendering layer consumes them.

use serde::{Deserialize, Serialize};

/// Proficiency level of a generated course. Exactly three literals are
/// accepted on the wire; anything else is rejected wherever a level is
/// parsed (config loader errors, the partial extractor ignores it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Parse one of the three level literals. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(CourseLevel::Beginner),
            "intermediate" => Some(CourseLevel::Intermediate),
            "advanced" => Some(CourseLevel::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

/// One sentence of a course.
///
/// The canonical field names follow the persisted document shape. The
/// model endpoint historically emitted a shorter key set
/// (`chinese`/`english`/`difficulty`), so those are accepted as aliases.
/// All four fields are mandatory — a sentence object missing any of them
/// does not parse, which is exactly how the partial extractor drops
/// mid-stream sentences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    #[serde(alias = "chinese")]
    pub source_text: String,
    #[serde(alias = "english")]
    pub target_text: String,
    pub phonetic: String,
    #[serde(alias = "difficulty")]
    pub difficulty_tier: String,
}

/// A fully generated course document.
///
/// `description` and `level` may be absent in the wire document; the
/// generation stream still completes without them. Sentences are ordered
/// and each carries all four required fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: Option<CourseLevel>,
    #[serde(default)]
    pub sentences: Vec<SentenceRecord>,
}

/// Parameters of one generation run.
///
/// `sentence_count` drives the progress formula for Sentence events and
/// is included in the prompt sent to the model endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub level: CourseLevel,
    pub sentence_count: usize,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, level: CourseLevel, sentence_count: usize) -> Self {
        Self {
            topic: topic.into(),
            level,
            sentence_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // CourseLevel: three literals and nothing else
    // ---------------------------------------------------------------

    #[test]
    fn level_parses_the_three_literals() {
        assert_eq!(CourseLevel::parse("beginner"), Some(CourseLevel::Beginner));
        assert_eq!(
            CourseLevel::parse("intermediate"),
            Some(CourseLevel::Intermediate)
        );
        assert_eq!(CourseLevel::parse("advanced"), Some(CourseLevel::Advanced));
    }

    #[test]
    fn level_rejects_anything_else() {
        assert_eq!(CourseLevel::parse("expert"), None);
        assert_eq!(CourseLevel::parse("Beginner"), None);
        assert_eq!(CourseLevel::parse(""), None);
    }

    #[test]
    fn level_round_trips_through_as_str() {
        for level in [
            CourseLevel::Beginner,
            CourseLevel::Intermediate,
            CourseLevel::Advanced,
        ] {
            assert_eq!(CourseLevel::parse(level.as_str()), Some(level));
        }
    }

    // ---------------------------------------------------------------
    // SentenceRecord: canonical keys and legacy aliases
    // ---------------------------------------------------------------

    #[test]
    fn sentence_parses_canonical_keys() {
        let s: SentenceRecord = serde_json::from_str(
            r#"{"source_text":"你好","target_text":"hello","phonetic":"nǐ hǎo","difficulty_tier":"easy"}"#,
        )
        .unwrap();
        assert_eq!(s.source_text, "你好");
        assert_eq!(s.target_text, "hello");
        assert_eq!(s.phonetic, "nǐ hǎo");
        assert_eq!(s.difficulty_tier, "easy");
    }

    #[test]
    fn sentence_parses_legacy_wire_keys() {
        let s: SentenceRecord = serde_json::from_str(
            r#"{"chinese":"谢谢","english":"thanks","phonetic":"xiè xie","difficulty":"easy"}"#,
        )
        .unwrap();
        assert_eq!(s.source_text, "谢谢");
        assert_eq!(s.target_text, "thanks");
        assert_eq!(s.difficulty_tier, "easy");
    }

    #[test]
    fn sentence_missing_a_field_does_not_parse() {
        let result: Result<SentenceRecord, _> = serde_json::from_str(
            r#"{"source_text":"你好","target_text":"hello","phonetic":"nǐ hǎo"}"#,
        );
        assert!(result.is_err());
    }

    // ---------------------------------------------------------------
    // CourseDocument: optional description/level, mandatory sentence fields
    // ---------------------------------------------------------------

    #[test]
    fn document_parses_without_description_or_level() {
        let doc: CourseDocument = serde_json::from_str(
            r#"{"title":"T","sentences":[{"chinese":"x","english":"y","phonetic":"/y/","difficulty":"easy"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.title, "T");
        assert_eq!(doc.description, "");
        assert_eq!(doc.level, None);
        assert_eq!(doc.sentences.len(), 1);
    }

    #[test]
    fn document_with_invalid_level_does_not_parse() {
        let result: Result<CourseDocument, _> =
            serde_json::from_str(r#"{"title":"T","level":"expert","sentences":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn document_full_shape_parses() {
        let doc: CourseDocument = serde_json::from_str(
            r#"{
                "title": "Ordering food",
                "description": "Restaurant basics",
                "level": "beginner",
                "sentences": [
                    {"source_text":"我要这个","target_text":"I want this one","phonetic":"wǒ yào zhè ge","difficulty_tier":"easy"},
                    {"source_text":"买单","target_text":"The bill, please","phonetic":"mǎi dān","difficulty_tier":"medium"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.level, Some(CourseLevel::Beginner));
        assert_eq!(doc.sentences.len(), 2);
        assert_eq!(doc.sentences[1].difficulty_tier, "medium");
    }
}
