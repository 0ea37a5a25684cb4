//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::stream::{self, StreamExt};

use crate::api::{
    ApiError, ChatBackend, ChatReply, ChatRequest, HealthStatus, HistoryMessage, RecordStream,
    Sender, SessionSummary,
};
use crate::core::locale::Locale;
use crate::core::session::Session;
use crate::core::state::App;

/// A backend that answers everything with empty success.
pub struct NoopBackend;

#[async_trait]
impl ChatBackend for NoopBackend {
    async fn send_message(&self, _request: &ChatRequest, _use_rag: bool) -> Result<ChatReply, ApiError> {
        Ok(ChatReply {
            text: None,
            session_id: None,
        })
    }

    async fn send_message_stream(&self, _request: &ChatRequest, _use_rag: bool) -> Result<RecordStream, ApiError> {
        Ok(stream::empty().boxed())
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
        })
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        Ok(Vec::new())
    }

    async fn fetch_history(&self, _session_id: &str) -> Result<Vec<HistoryMessage>, ApiError> {
        Ok(Vec::new())
    }

    async fn delete_session(&self, _session_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Creates an English test App with no sessions and no active context.
pub fn test_app() -> App {
    App::new(Locale::English)
}

/// Midnight UTC on 2024-05-`day`.
pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
}

pub fn summary(id: &str, created_day: u32) -> SessionSummary {
    SessionSummary {
        id: id.to_string(),
        name: Some(format!("Chat {id}")),
        created_at: day(created_day),
    }
}

/// An unloaded session named after its id.
pub fn session(id: &str, created_day: u32) -> Session {
    Session::from_summary(summary(id, created_day), Locale::English)
}

/// A history entry `secs` seconds after 2024-05-01.
pub fn history(id: &str, sender: Sender, text: &str, secs: i64) -> HistoryMessage {
    HistoryMessage {
        id: Some(id.to_string()),
        text: text.to_string(),
        sender,
        timestamp: day(1) + Duration::seconds(secs),
    }
}
