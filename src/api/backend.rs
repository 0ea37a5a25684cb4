use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::types::{ChatReply, ChatRequest, HealthStatus, HistoryMessage, SessionSummary, StreamRecord};

/// Errors that can occur while talking to the backend.
/// None of them are retried; the caller decides what the user sees.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (unusable base URL).
    Config(String),
    /// Connection-level failure (DNS, refused, reset mid-body).
    Network(String),
    /// Backend answered with a non-success status.
    Status { status: u16, message: String },
    /// Body could not be decoded into the expected shape.
    Decode(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Status { status, message } => {
                write!(f, "backend error (HTTP {status}): {message}")
            }
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Lazy, single-pass sequence of streamed chat records.
pub type RecordStream = BoxStream<'static, Result<StreamRecord, ApiError>>;

/// Everything the client needs from the chat backend.
///
/// Implementations are plain pass-throughs: no caching, retry or
/// deduplication.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one message and waits for the whole answer.
    async fn send_message(
        &self,
        request: &ChatRequest,
        use_rag: bool,
    ) -> Result<ChatReply, ApiError>;

    /// Sends one message and decodes the answer as newline-delimited JSON.
    async fn send_message_stream(
        &self,
        request: &ChatRequest,
        use_rag: bool,
    ) -> Result<RecordStream, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>, ApiError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Status {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ApiError::Network("refused".to_string()).status(), None);
    }

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "backend error (HTTP 500): boom");
    }
}
