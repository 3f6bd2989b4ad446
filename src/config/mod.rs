//! Application configuration

pub mod client;

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agents::{Agent, AgentRegistry};
use crate::core::{InFlightPolicy, DEFAULT_USER_ID};

pub use client::{ClientConfig, ConfigError};

/// Agent endpoint used when nothing is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/agent";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: String,
    pub user_id: String,
    pub default_agent: Option<String>,
    pub history_agent: Option<String>,
    pub policy: InFlightPolicy,
    pub custom_agents: Vec<Agent>,
    pub client_config: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::load(|key| env::var(key).ok())?)
    }

    /// Read settings through `var`, then overlay the client config it points at
    fn load(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::from_vars(var);

        if let Some(path) = config.client_config_path().map(Path::to_path_buf) {
            let client = ClientConfig::from_file(&path)?;
            tracing::info!("Loaded client config from {}", path.display());
            config.apply(client);
        }

        Ok(config)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: var("MOXIE_AGENT_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
            user_id: var("MOXIE_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.into()),
            default_agent: var("MOXIE_DEFAULT_AGENT"),
            history_agent: var("MOXIE_HISTORY_AGENT"),
            policy: InFlightPolicy::default(),
            custom_agents: Vec::new(),
            client_config: var("MOXIE_CLIENT_CONFIG").map(PathBuf::from),
        }
    }

    /// Overlay a client config; values set in the file win
    pub fn apply(&mut self, client: ClientConfig) {
        if let Some(url) = client.endpoint.url {
            self.endpoint = url;
        }
        if let Some(user_id) = client.endpoint.user_id {
            self.user_id = user_id;
        }
        if client.agents.default.is_some() {
            self.default_agent = client.agents.default;
        }
        if client.agents.history.is_some() {
            self.history_agent = client.agents.history;
        }
        if let Some(policy) = client.agents.policy {
            self.policy = policy;
        }
        self.custom_agents.extend(client.agents.custom);
    }

    /// Built-in agents plus configured ones, with the configured default
    pub fn registry(&self) -> Result<AgentRegistry, ConfigError> {
        let mut registry = AgentRegistry::builtin().with_agents(self.custom_agents.clone());

        if let Some(ref default) = self.default_agent {
            if !registry.set_default(default) {
                return Err(ConfigError::Validation(format!(
                    "default agent '{}' is not a known agent",
                    default
                )));
            }
        }

        Ok(registry)
    }

    pub fn client_config_path(&self) -> Option<&Path> {
        self.client_config.as_deref()
    }
}
