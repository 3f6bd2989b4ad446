//! Conversation types and state management

mod search;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use search::filter;
pub use store::{ConversationStore, ConversationView, SharedConversationStore, shared_store};

/// Number of characters of the first user message used as the title
pub const TITLE_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// Render as a line of the context string sent to the agent
    pub fn context_line(&self) -> String {
        let speaker = match self.sender {
            Sender::User => "User",
            Sender::Bot => "Assistant",
        };
        format!("{}: {}", speaker, self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub agent_mode: String,

    /// Set once the first user message lands; gates the title rewrite
    #[serde(default)]
    pub has_user_message: bool,
}

impl Conversation {
    pub fn new(agent_mode: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            created_at: Utc::now(),
            agent_mode: agent_mode.into(),
            has_user_message: false,
        }
    }

    pub fn with_welcome(mut self, text: &str) -> Self {
        self.messages.push(Message::bot(text));
        self
    }

    pub fn add_user(&mut self, text: &str) -> Message {
        if !self.has_user_message {
            self.title = text.chars().take(TITLE_MAX_CHARS).collect();
            self.has_user_message = true;
        }
        let message = Message::user(text);
        self.messages.push(message.clone());
        message
    }

    pub fn add_bot(&mut self, text: &str) -> Message {
        let message = Message::bot(text);
        self.messages.push(message.clone());
        message
    }

    /// Newline-joined `User:` / `Assistant:` transcript of every message
    pub fn context_string(&self) -> String {
        self.messages
            .iter()
            .map(Message::context_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Case-insensitive match on the title or any message text.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .messages
                .iter()
                .any(|m| m.text.to_lowercase().contains(needle))
    }
}
