//! Conversation history types.
//!
//! A session is an opaque string id mapping to an ordered, capacity-bounded
//! list of messages. The persisted form is one JSON record per session id:
//! `{sessionId, lastUpdated, messages:[{role, content}]}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a stored conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: MessageRole,
    pub content: String,
}

impl StoredMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// The persisted record for one session.
///
/// Field names are camelCase on disk so the record matches the documented
/// external shape exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub last_updated: DateTime<Utc>,
    pub messages: Vec<StoredMessage>,
}

impl SessionRecord {
    /// A fresh, empty record for a session id.
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            last_updated: Utc::now(),
            messages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_session_record_serde_shape() {
        let record = SessionRecord {
            session_id: "weekend-plans".to_string(),
            last_updated: Utc::now(),
            messages: vec![
                StoredMessage::user("What events are this weekend?"),
                StoredMessage::assistant("I found 3 music events this weekend."),
            ],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], "weekend-plans");
        assert!(json["lastUpdated"].is_string());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][1]["role"], "assistant");

        let back: SessionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.messages, record.messages);
    }

    #[test]
    fn test_empty_record() {
        let record = SessionRecord::empty("s1");
        assert_eq!(record.session_id, "s1");
        assert!(record.messages.is_empty());
    }
}
