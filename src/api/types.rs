//! Wire types for the chat backend.
//!
//! These mirror the JSON the backend speaks. They are deliberately loose
//! (optional fields, aliases) because the backend contract is not ours;
//! conversion into domain types happens in `core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

/// Body of `POST /chat`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub query: String,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Nested bot payload some backend revisions return instead of `answer`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BotPayload {
    #[serde(default)]
    pub text_content: Option<String>,
}

/// Response of `POST /chat`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub message: Option<BotPayload>,
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

/// What the client keeps from a chat response.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// Raw (markdown) answer text, `None` when the backend sent nothing usable.
    pub text: Option<String>,
    pub session_id: Option<String>,
}

impl From<ChatResponse> for ChatReply {
    fn from(response: ChatResponse) -> Self {
        let text = response
            .answer
            .or_else(|| response.message.and_then(|m| m.text_content))
            .filter(|t| !t.trim().is_empty());
        ChatReply {
            text,
            session_id: response.session_id.filter(|id| !id.is_empty()),
        }
    }
}

/// One record of the newline-delimited streaming chat response.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StreamRecord {
    #[serde(default, alias = "chunk", alias = "delta")]
    pub text: Option<String>,
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

/// Response of `GET /health`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

/// One entry of `GET /chat/sessions`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "createdAt", with = "flexible_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One message of `GET /chat/histories/{id}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    pub sender: Sender,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// The history endpoint has been seen both wrapped and bare.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum HistoryPayload {
    Wrapped { messages: Vec<HistoryMessage> },
    Bare(Vec<HistoryMessage>),
}

impl HistoryPayload {
    pub(crate) fn into_messages(self) -> Vec<HistoryMessage> {
        match self {
            HistoryPayload::Wrapped { messages } | HistoryPayload::Bare(messages) => messages,
        }
    }
}

/// Accepts RFC 3339 timestamps and naive ISO-8601 ones (read as UTC),
/// which is what Python's `isoformat()` emits for naive datetimes.
mod flexible_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}
