//! Conversation and turn types for SkyNet.
//!
//! Two identity models exist and are kept apart:
//! - [`ChatId`]: integer id generated by the durable store.
//! - [`SessionId`]: opaque token chosen by the client, used by the
//!   process-lifetime session store.
//!
//! Conversations and turns are generic over the id type so each store names
//! exactly one of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

pub use crate::llm::MessageRole;
use crate::persona::Persona;

/// Store-generated identifier of a durable chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| format!("invalid chat id: '{s}'"))
    }
}

/// Client-supplied token identifying an ephemeral session.
///
/// Rejects empty or whitespace-only tokens; the token is stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a session token.
    pub fn new(token: impl Into<String>) -> Result<Self, String> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err("session id must not be empty".to_string());
        }
        Ok(Self(token))
    }

    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Who authored a turn. Turns are never system messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// An identified, ordered transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation<I> {
    pub id: I,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every appended turn and on rename.
    pub updated_at: DateTime<Utc>,
}

/// A conversation as it appears in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary<I> {
    #[serde(flatten)]
    pub conversation: Conversation<I>,
    pub message_count: u32,
}

/// One stored message within a conversation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn<I> {
    pub conversation_id: I,
    pub role: TurnRole,
    pub content: String,
    /// Persona display name (assistant turns only).
    #[serde(
        rename = "personality",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub persona_name: Option<String>,
    /// Persona accent color (assistant turns only).
    #[serde(rename = "color", default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A turn about to be appended. The store stamps `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn<I> {
    pub conversation_id: I,
    pub role: TurnRole,
    pub content: String,
    pub persona_name: Option<String>,
    pub accent_color: Option<String>,
}

impl<I> NewTurn<I> {
    pub fn user(conversation_id: I, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            role: TurnRole::User,
            content: content.into(),
            persona_name: None,
            accent_color: None,
        }
    }

    /// An assistant reply attributed to `persona`.
    pub fn assistant(conversation_id: I, content: impl Into<String>, persona: &Persona) -> Self {
        Self {
            conversation_id,
            role: TurnRole::Assistant,
            content: content.into(),
            persona_name: Some(persona.display_name.clone()),
            accent_color: Some(persona.accent_color.clone()),
        }
    }

    /// Materialize the turn with the given creation time.
    pub fn into_turn(self, created_at: DateTime<Utc>) -> Turn<I> {
        Turn {
            conversation_id: self.conversation_id,
            role: self.role,
            content: self.content,
            persona_name: self.persona_name,
            accent_color: self.accent_color,
            created_at,
        }
    }
}

/// The result of a successful chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply<I> {
    pub reply: String,
    pub persona_name: String,
    pub accent_color: String,
    pub conversation_id: I,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neo() -> Persona {
        Persona {
            key: "hacker".to_string(),
            display_name: "Neo".to_string(),
            system_instruction: "You are Neo.".to_string(),
            accent_color: "#00ff41".to_string(),
        }
    }

    #[test]
    fn test_chat_id_parse() {
        assert_eq!("42".parse::<ChatId>().unwrap(), ChatId(42));
        assert!("abc".parse::<ChatId>().is_err());
        assert_eq!(ChatId(7).to_string(), "7");
    }

    #[test]
    fn test_session_id_rejects_blank() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
        assert_eq!(SessionId::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_session_id_serde_validates() {
        let id: SessionId = serde_json::from_str("\"tok-1\"").unwrap();
        assert_eq!(id.as_str(), "tok-1");
        assert!(serde_json::from_str::<SessionId>("\"\"").is_err());
    }

    #[test]
    fn test_generated_session_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let parsed: TurnRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("system".parse::<TurnRole>().is_err());
        assert_eq!(MessageRole::from(TurnRole::Assistant), MessageRole::Assistant);
    }

    #[test]
    fn test_assistant_turn_carries_persona_metadata() {
        let turn = NewTurn::assistant(ChatId(1), "pong", &neo()).into_turn(Utc::now());
        assert_eq!(turn.persona_name.as_deref(), Some("Neo"));
        assert_eq!(turn.accent_color.as_deref(), Some("#00ff41"));

        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["personality"], "Neo");
        assert_eq!(json["color"], "#00ff41");
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn test_user_turn_omits_persona_fields() {
        let turn = NewTurn::user(ChatId(1), "ping").into_turn(Utc::now());
        let json = serde_json::to_value(&turn).unwrap();
        assert!(json.get("personality").is_none());
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_summary_flattens_conversation() {
        let now = Utc::now();
        let summary = ConversationSummary {
            conversation: Conversation {
                id: ChatId(3),
                title: "Mission".to_string(),
                created_at: now,
                updated_at: now,
            },
            message_count: 4,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "Mission");
        assert_eq!(json["message_count"], 4);
    }
}
