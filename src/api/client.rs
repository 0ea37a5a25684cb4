//! HTTP implementation of [`ChatBackend`].
//!
//! Endpoints are joined onto the configured base URL as path segments, so a
//! base carrying a prefix (`http://host/api`) keeps it, and session ids are
//! percent-encoded.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ChatBackend, RecordStream};
use super::ndjson;
use super::types::{
    ChatReply, ChatRequest, ChatResponse, HealthStatus, HistoryMessage, HistoryPayload,
    SessionSummary,
};

/// Chat backend reached over HTTP/JSON.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Creates a backend client for `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("invalid backend URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("backend URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues a request and turns non-success statuses into `ApiError::Status`.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<(&ChatRequest, bool)>,
    ) -> Result<Response, ApiError> {
        debug!("{} {}", method, url);
        let mut builder = self.client.request(method.clone(), url.clone());
        if let Some((request, use_rag)) = body {
            builder = builder
                .query(&[("is_using_rag", use_rag)])
                .json(request);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("{} {} -> {}", method, url, response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend error on {} {}: {} - {}", method, url, status, message);
            return Err(ApiError::Status { status, message });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.execute(Method::GET, url, None).await?;
        decode_json(response).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_message(
        &self,
        request: &ChatRequest,
        use_rag: bool,
    ) -> Result<ChatReply, ApiError> {
        info!(
            "Sending chat message: session={:?}, rag={}, len={}",
            request.session_id,
            use_rag,
            request.query.len()
        );
        let url = self.endpoint(&["chat"])?;
        let response = self.execute(Method::POST, url, Some((request, use_rag))).await?;
        let body: ChatResponse = decode_json(response).await?;
        Ok(ChatReply::from(body))
    }

    async fn send_message_stream(
        &self,
        request: &ChatRequest,
        use_rag: bool,
    ) -> Result<RecordStream, ApiError> {
        info!(
            "Sending streaming chat message: session={:?}, rag={}",
            request.session_id, use_rag
        );
        let url = self.endpoint(&["chat"])?;
        let response = self.execute(Method::POST, url, Some((request, use_rag))).await?;
        Ok(ndjson::decode(response.bytes_stream()))
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(&["health"]).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let sessions: Vec<SessionSummary> = self.get_json(&["chat", "sessions"]).await?;
        info!("Fetched {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<HistoryMessage>, ApiError> {
        let payload: HistoryPayload = self.get_json(&["chat", "histories", session_id]).await?;
        let messages = payload.into_messages();
        info!("Fetched {} messages for session {}", messages.len(), session_id);
        Ok(messages)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["chat", "histories", session_id])?;
        self.execute(Method::DELETE, url, None).await?;
        info!("Deleted session {}", session_id);
        Ok(())
    }
}
