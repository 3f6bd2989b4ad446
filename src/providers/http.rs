//! HTTP agent backend

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{AgentBackend, AgentError, AgentRequest};

pub struct HttpAgentClient {
    client: Client,
    endpoint: String,
}

impl HttpAgentClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentBackend for HttpAgentClient {
    async fn invoke(&self, request: &AgentRequest) -> Result<Value, AgentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AgentError::InvalidResponse(e.to_string()))
    }
}
