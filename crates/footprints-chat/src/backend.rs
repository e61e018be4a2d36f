//! Remote assistant backend: one JSON `POST` per user message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use footprints_core::types::SessionId;

use crate::error::ChatError;

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

/// Successful body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Something that can answer a parent's message.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// Backend reached over HTTP.
///
/// No retries and no timeout beyond the client default.
pub struct HttpChatBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            session_id = %request.session_id,
            chars = request.message.len(),
            "Sending chat message"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Chat request failed");
                ChatError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Chat backend returned an error status");
            return Err(ChatError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "Chat backend returned an unreadable body");
            ChatError::InvalidResponse(e.to_string())
        })?;
        Ok(reply)
    }
}
