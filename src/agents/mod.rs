//! Agent registry
//!
//! Agents are the backend personas a conversation can be bound to. The set is
//! static for the lifetime of the process: the built-in agents plus any extra
//! definitions from the client config.

use serde::{Deserialize, Serialize};

/// A backend agent identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Identifier sent to the backend as `agent_id`
    pub id: String,

    /// Short machine-friendly name (used on the command line)
    pub name: String,

    /// Display label
    pub label: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    /// First bot message of every new conversation with this agent
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

fn default_icon() -> String {
    "message-circle".to_string()
}

fn default_welcome() -> String {
    builtin::ASSISTANT_WELCOME.to_string()
}

/// Title given to conversations with the default agent
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Built-in agents that don't require configuration
pub mod builtin {
    pub const ASSISTANT_ID: &str = "693174578f91bb17ff418457";
    pub const ASSISTANT_WELCOME: &str = "Hi! I'm your assistant. How can I help you today?";

    pub const RESEARCH_ID: &str = "6931749a8f91bb17ff418458";
    pub const RESEARCH_WELCOME: &str =
        "Hi! I'm your research agent. Give me a topic and I'll dig into sources and summarize what I find.";

    pub const CODING_ID: &str = "693174c18f91bb17ff418459";
    pub const CODING_WELCOME: &str =
        "Hi! I'm your coding agent. Paste some code or describe what you want to build.";
}

/// Lookup table of known agents with a guaranteed default
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    default_index: usize,
}

impl AgentRegistry {
    /// Registry holding only the built-in agents
    pub fn builtin() -> Self {
        Self {
            agents: vec![
                Agent {
                    id: builtin::ASSISTANT_ID.to_string(),
                    name: "assistant".to_string(),
                    label: "Assistant".to_string(),
                    description: "General-purpose helper for everyday questions".to_string(),
                    icon: "message-circle".to_string(),
                    welcome: builtin::ASSISTANT_WELCOME.to_string(),
                },
                Agent {
                    id: builtin::RESEARCH_ID.to_string(),
                    name: "research".to_string(),
                    label: "Research".to_string(),
                    description: "Finds, compares and summarizes sources".to_string(),
                    icon: "search".to_string(),
                    welcome: builtin::RESEARCH_WELCOME.to_string(),
                },
                Agent {
                    id: builtin::CODING_ID.to_string(),
                    name: "coding".to_string(),
                    label: "Coding".to_string(),
                    description: "Writes, reviews and explains code".to_string(),
                    icon: "code".to_string(),
                    welcome: builtin::CODING_WELCOME.to_string(),
                },
            ],
            default_index: 0,
        }
    }

    /// Add agents, replacing any existing agent with the same id
    pub fn with_agents(mut self, agents: impl IntoIterator<Item = Agent>) -> Self {
        for agent in agents {
            match self.agents.iter_mut().find(|a| a.id == agent.id) {
                Some(existing) => *existing = agent,
                None => self.agents.push(agent),
            }
        }
        self
    }

    /// Make the agent with the given id or name the default.
    /// Returns false and leaves the default unchanged if it is unknown.
    pub fn set_default(&mut self, id_or_name: &str) -> bool {
        match self.position(id_or_name) {
            Some(index) => {
                self.default_index = index;
                true
            }
            None => false,
        }
    }

    fn position(&self, id_or_name: &str) -> Option<usize> {
        self.agents
            .iter()
            .position(|a| a.id == id_or_name)
            .or_else(|| {
                self.agents
                    .iter()
                    .position(|a| a.name.eq_ignore_ascii_case(id_or_name))
            })
    }

    /// Look up an agent by id, falling back to its short name
    pub fn get(&self, id_or_name: &str) -> Option<&Agent> {
        self.position(id_or_name).map(|i| &self.agents[i])
    }

    pub fn default_agent(&self) -> &Agent {
        &self.agents[self.default_index]
    }

    /// Look up an agent, using the default for unknown ids
    pub fn resolve(&self, id_or_name: &str) -> &Agent {
        self.get(id_or_name).unwrap_or_else(|| {
            tracing::warn!("Unknown agent '{}', using default", id_or_name);
            self.default_agent()
        })
    }

    pub fn all(&self) -> &[Agent] {
        &self.agents
    }

    /// Placeholder title for a fresh conversation with `agent`
    pub fn default_title(&self, agent: &Agent) -> String {
        if agent.id == self.default_agent().id {
            DEFAULT_TITLE.to_string()
        } else {
            format!("{} Conversation", agent.label)
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
