//! Agent backend integrations

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use http::HttpAgentClient;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Agent returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Body of a request to the agent endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
    pub agent_id: String,
    /// Conversation id, so the backend can scope its own context
    pub session_id: String,
    pub user_id: String,
    /// Prior messages as `User: ...` / `Assistant: ...` lines
    pub conversation_context: String,
}

/// Transport to the remote agent.
///
/// Implementations return the decoded JSON payload as-is; picking the reply
/// text out of it is the dispatcher's job since the shape is not stable.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn invoke(&self, request: &AgentRequest) -> Result<Value, AgentError>;
}
