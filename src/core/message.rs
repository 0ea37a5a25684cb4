//! # Messages
//!
//! A thread is a `Vec<Message>` kept in ascending timestamp order. Bot text
//! from the backend is markdown: it is rendered to HTML once when it enters
//! the store, and the source is kept for the terminal renderer.

use chrono::{DateTime, Utc};
use pulldown_cmark::{Options, Parser, html};

use crate::api::{HistoryMessage, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    /// Locally generated failure notice.
    Error,
    /// Streaming placeholder still receiving text.
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    /// Display body. For bot replies this is the rendered HTML.
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Markdown source of a bot reply.
    pub markdown: Option<String>,
}

fn new_id(prefix: &str) -> String {
    format!("msg-{prefix}-{}", uuid::Uuid::new_v4())
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_id("user"),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            markdown: None,
        }
    }

    /// A bot reply whose markdown is rendered to HTML.
    pub fn bot_markdown(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            id: new_id("bot"),
            text: markdown_to_html(&source),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            markdown: Some(source),
        }
    }

    /// Plain bot text that is not markdown (greetings).
    pub fn bot_plain(text: impl Into<String>) -> Self {
        Self {
            id: new_id("bot"),
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            markdown: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            id: new_id("err"),
            kind: MessageKind::Error,
            ..Self::bot_plain(text)
        }
    }

    /// Empty bot message that streamed text is written into.
    pub fn placeholder() -> Self {
        Self {
            id: new_id("bot"),
            kind: MessageKind::Pending,
            markdown: Some(String::new()),
            ..Self::bot_plain(String::new())
        }
    }

    /// Replaces the markdown body of a bot message and re-renders it.
    pub fn set_markdown(&mut self, source: String) {
        self.text = markdown_to_html(&source);
        self.markdown = Some(source);
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }

    /// Plain bot text with no markdown source, i.e. the draft greeting.
    pub fn is_greeting(&self) -> bool {
        self.sender == Sender::Bot && self.kind == MessageKind::Text && self.markdown.is_none()
    }
}

impl From<HistoryMessage> for Message {
    fn from(entry: HistoryMessage) -> Self {
        let mut message = match entry.sender {
            Sender::User => Message::user(entry.text),
            Sender::Bot => Message::bot_markdown(entry.text),
        };
        if let Some(id) = entry.id {
            message.id = id;
        }
        message.timestamp = entry.timestamp;
        message
    }
}

/// Renders markdown to an HTML fragment.
pub fn markdown_to_html(source: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(source, opts));
    out
}

/// Inserts `message` after every message with an equal or earlier timestamp.
/// For messages created "now" this is a plain push.
pub fn insert_ordered(thread: &mut Vec<Message>, message: Message) {
    let at = thread.partition_point(|m| m.timestamp <= message.timestamp);
    thread.insert(at, message);
}

/// Stable sort by timestamp, ascending.
pub fn sort_thread(thread: &mut [Message]) {
    thread.sort_by_key(|m| m.timestamp);
}

pub fn is_sorted(thread: &[Message]) -> bool {
    thread.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}
