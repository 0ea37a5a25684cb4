//! # Backend Transport
//!
//! Thin async pass-throughs to the chat backend's HTTP/JSON API. Nothing in
//! here knows about sessions being "active" or threads being drafts; that
//! lives in `core`.

pub mod backend;
pub mod client;
pub mod ndjson;
pub mod types;

pub use backend::{ApiError, ChatBackend, RecordStream};
pub use client::HttpBackend;
pub use types::{
    ChatReply, ChatRequest, HealthStatus, HistoryMessage, Sender, SessionSummary, StreamRecord,
};
