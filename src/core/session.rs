//! # Sessions
//!
//! A session is a conversation the backend knows about. Its id always comes
//! from the backend. The unsaved conversation the user is typing into before
//! the first reply is a [`Draft`], addressed by [`ActiveContext::NewChat`].
//!
//! ```text
//! ActiveContext
//! ├── NewChat                 → App.draft
//! └── ExistingSession(id)     → App.sessions[..].id == id
//! ```

use chrono::{DateTime, Utc};

use crate::api::{Sender, SessionSummary};
use crate::core::locale::Locale;
use crate::core::message::Message;

/// Which thread the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveContext {
    NewChat,
    ExistingSession(String),
}

impl ActiveContext {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            ActiveContext::NewChat => None,
            ActiveContext::ExistingSession(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// False until the history fetch has completed (successfully or not).
    pub messages_loaded: bool,
}

impl Session {
    /// Builds an unloaded session from a session-list entry.
    pub fn from_summary(summary: SessionSummary, locale: Locale) -> Self {
        let name = summary
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name(summary.created_at, locale));
        Self {
            id: summary.id,
            name,
            messages: Vec::new(),
            created_at: summary.created_at,
            messages_loaded: false,
        }
    }
}

/// "Session 2024-05-01 10:00" style fallback name.
pub fn default_name(created_at: DateTime<Utc>, locale: Locale) -> String {
    format!(
        "{} {}",
        locale.strings().session_name_prefix,
        created_at.format("%Y-%m-%d %H:%M")
    )
}

/// The new-chat thread, kept until the backend assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub messages: Vec<Message>,
}

impl Draft {
    /// Fresh draft holding only the greeting.
    pub fn new(locale: Locale) -> Self {
        Self {
            messages: vec![Message::bot_plain(locale.strings().greeting)],
        }
    }

    /// True once the user has typed something into it.
    pub fn has_user_messages(&self) -> bool {
        self.messages.iter().any(|m| m.sender == Sender::User)
    }
}

/// Derive a title from the first user message in the thread.
/// Returns the first line, truncated to 60 chars.
pub fn derive_title(messages: &[Message]) -> Option<String> {
    let first = messages.iter().find(|m| m.sender == Sender::User)?;
    let first_line = first.text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return None;
    }
    if first_line.chars().count() > 60 {
        let head: String = first_line.chars().take(57).collect();
        return Some(format!("{head}..."));
    }
    Some(first_line.to_string())
}

/// Sort newest first. Ties keep their relative order.
pub fn sort_by_recency(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
