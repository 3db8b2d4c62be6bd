//! Retrieval modes, source tags, and the combined-context shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which retrieval sources a chat turn should consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Local knowledge base and remote event search.
    #[default]
    Combined,
    /// Local knowledge base only.
    Local,
    /// Remote event search only.
    Events,
    /// No retrieval at all.
    None,
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMode::Combined => write!(f, "combined"),
            RetrievalMode::Local => write!(f, "local"),
            RetrievalMode::Events => write!(f, "events"),
            RetrievalMode::None => write!(f, "none"),
        }
    }
}

impl FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "combined" => Ok(RetrievalMode::Combined),
            "local" => Ok(RetrievalMode::Local),
            "events" => Ok(RetrievalMode::Events),
            "none" => Ok(RetrievalMode::None),
            other => Err(format!("invalid retrieval mode: '{other}'")),
        }
    }
}

/// Origin of a retrieved context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    KnowledgeBase,
    CurrentEvents,
}

impl fmt::Display for RetrievalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalSource::KnowledgeBase => write!(f, "knowledge_base"),
            RetrievalSource::CurrentEvents => write!(f, "current_events"),
        }
    }
}

/// What a single retrieval source produced for one query.
///
/// Three distinct states: content, a clean empty result, and
/// unavailable/errored. Empty and unavailable must never be conflated --
/// an empty knowledge base is not a broken one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The source returned a formatted, non-empty text block.
    Content(String),
    /// The source answered but had nothing relevant.
    Empty,
    /// The source could not be consulted; carries the reason.
    Unavailable(String),
}

/// The tagged result of consulting one retrieval source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResult {
    pub source: RetrievalSource,
    pub outcome: SourceOutcome,
}

/// The assembled context for one chat turn.
///
/// `sources_used` lists exactly the sources that contributed content to
/// `text`, not those that were merely attempted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub text: String,
    pub sources_used: Vec<RetrievalSource>,
}

impl RetrievedContext {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        for mode in [
            RetrievalMode::Combined,
            RetrievalMode::Local,
            RetrievalMode::Events,
            RetrievalMode::None,
        ] {
            let parsed: RetrievalMode = mode.to_string().parse().unwrap();
            assert_eq!(mode, parsed);
        }
    }

    #[test]
    fn test_mode_default_is_combined() {
        assert_eq!(RetrievalMode::default(), RetrievalMode::Combined);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&RetrievalMode::Events).unwrap();
        assert_eq!(json, "\"events\"");
        let parsed: RetrievalMode = serde_json::from_str("\"combined\"").unwrap();
        assert_eq!(parsed, RetrievalMode::Combined);
    }

    #[test]
    fn test_source_serde_snake_case() {
        let json = serde_json::to_string(&RetrievalSource::KnowledgeBase).unwrap();
        assert_eq!(json, "\"knowledge_base\"");
        let json = serde_json::to_string(&RetrievalSource::CurrentEvents).unwrap();
        assert_eq!(json, "\"current_events\"");
    }

    #[test]
    fn test_empty_context() {
        let ctx = RetrievedContext::empty();
        assert!(ctx.text.is_empty());
        assert!(ctx.sources_used.is_empty());
    }
}
