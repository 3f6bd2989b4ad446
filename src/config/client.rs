//! Client configuration loaded from TOML files
//!
//! Lets a deployment point the chat client at its own agent endpoint and
//! extend the agent list without rebuilding:
//! - Agent endpoint and user id
//! - Default and history agents
//! - Send policy
//! - Extra agent definitions

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::agents::Agent;
use crate::core::InFlightPolicy;

/// Root client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Agent endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Agent selection settings
    #[serde(default)]
    pub agents: AgentsConfig,
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.endpoint.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "endpoint url must be http(s): {}",
                    url
                )));
            }
        }

        for agent in &self.agents.custom {
            if agent.id.trim().is_empty() || agent.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "custom agents need a non-empty id and name".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Agent endpoint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Full URL requests are POSTed to
    #[serde(default)]
    pub url: Option<String>,

    /// User id sent with every request
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Agent selection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Id or name of the agent new conversations start with
    #[serde(default)]
    pub default: Option<String>,

    /// Agent id that receives a summary of every exchange
    #[serde(default)]
    pub history: Option<String>,

    /// "global" (one send at a time) or "per_conversation"
    #[serde(default)]
    pub policy: Option<InFlightPolicy>,

    /// Additional agents (replace built-ins with the same id)
    #[serde(default)]
    pub custom: Vec<Agent>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
