//! Message dispatcher
//!
//! Turns one submitted message into exactly one request to the agent backend
//! and resolves the outcome back into the conversation it came from:
//! 1. Checks preconditions (non-blank text, known conversation, nothing in flight)
//! 2. Captures the context string and appends the user message
//! 3. Calls the backend
//! 4. Appends the extracted reply, or a fixed error notice on failure
//! 5. Optionally notifies the history agent, without waiting on it
//!
//! Failures never escape `send`; they become an in-conversation message.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::conversation::SharedConversationStore;
use crate::providers::{AgentBackend, AgentRequest};

use super::extract::extract_reply;

/// Bot message appended when a request fails
pub const ERROR_REPLY_TEXT: &str = "Sorry, there was an error processing your request.";

/// User id sent with every request
pub const DEFAULT_USER_ID: &str = "default-user";

/// How many sends may be pending at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// One pending send for the whole dispatcher
    #[default]
    Global,
    /// One pending send per conversation
    PerConversation,
}

/// Why a send was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyMessage,
    NoConversation,
    Busy,
}

/// Result of a call to [`Dispatcher::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Preconditions failed; nothing was appended
    Rejected(Rejection),
    /// The agent replied with this text
    Delivered(String),
    /// The request failed and this notice was appended instead
    Failed(String),
}

/// Conversation ids with a pending send
struct InFlight {
    policy: InFlightPolicy,
    pending: Mutex<HashSet<String>>,
}

impl InFlight {
    fn new(policy: InFlightPolicy) -> Self {
        Self {
            policy,
            pending: Mutex::new(HashSet::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashSet<String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_begin(&self, conversation_id: &str) -> Option<InFlightGuard<'_>> {
        let mut pending = self.pending();
        let busy = match self.policy {
            InFlightPolicy::Global => !pending.is_empty(),
            InFlightPolicy::PerConversation => pending.contains(conversation_id),
        };
        if busy {
            return None;
        }

        pending.insert(conversation_id.to_string());
        Some(InFlightGuard {
            in_flight: self,
            conversation_id: conversation_id.to_string(),
        })
    }
}

/// Clears the pending marker on every exit path
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    conversation_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.pending().remove(&self.conversation_id);
    }
}

pub struct Dispatcher {
    store: SharedConversationStore,
    backend: Arc<dyn AgentBackend>,
    user_id: String,
    history_agent: Option<String>,
    in_flight: InFlight,
}

impl Dispatcher {
    pub fn new(store: SharedConversationStore, backend: Arc<dyn AgentBackend>) -> Self {
        Self {
            store,
            backend,
            user_id: DEFAULT_USER_ID.to_string(),
            history_agent: None,
            in_flight: InFlight::new(InFlightPolicy::default()),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Agent that receives a summary of every delivered exchange
    pub fn with_history_agent(mut self, agent_id: Option<String>) -> Self {
        self.history_agent = agent_id;
        self
    }

    pub fn with_policy(mut self, policy: InFlightPolicy) -> Self {
        self.in_flight = InFlight::new(policy);
        self
    }

    pub fn store(&self) -> &SharedConversationStore {
        &self.store
    }

    /// True while any send is waiting on the backend
    pub fn is_loading(&self) -> bool {
        !self.in_flight.pending().is_empty()
    }

    pub fn is_pending(&self, conversation_id: &str) -> bool {
        self.in_flight.pending().contains(conversation_id)
    }

    /// Send `text` to `agent_id` within the conversation `conversation_id`
    pub async fn send(&self, conversation_id: &str, text: &str, agent_id: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(Rejection::EmptyMessage);
        }

        let Some(_guard) = self.in_flight.try_begin(conversation_id) else {
            tracing::debug!("Send ignored, request already in flight");
            return SendOutcome::Rejected(Rejection::Busy);
        };

        // Context is captured under the same lock as the append, so it holds
        // exactly the messages that preceded this one.
        let conversation_context = {
            let mut store = self.store.write().await;
            let Some(conversation) = store.get(conversation_id) else {
                return SendOutcome::Rejected(Rejection::NoConversation);
            };
            let context = conversation.context_string();
            store.append_user_message(conversation_id, text);
            context
        };

        let request = AgentRequest {
            message: text.to_string(),
            agent_id: agent_id.to_string(),
            session_id: conversation_id.to_string(),
            user_id: self.user_id.clone(),
            conversation_context,
        };

        tracing::debug!(
            "Sending message to agent {} for conversation {}",
            agent_id,
            conversation_id
        );

        match self.backend.invoke(&request).await {
            Ok(payload) => {
                let reply = extract_reply(&payload);
                let appended = self
                    .store
                    .write()
                    .await
                    .append_bot_message(conversation_id, &reply);
                if appended.is_none() {
                    tracing::debug!("Conversation {} was deleted before the reply", conversation_id);
                }

                self.notify_history(&request, &reply);
                SendOutcome::Delivered(reply)
            }
            Err(e) => {
                tracing::error!("Error sending message: {}", e);
                self.store
                    .write()
                    .await
                    .append_error_message(conversation_id, ERROR_REPLY_TEXT);
                SendOutcome::Failed(ERROR_REPLY_TEXT.to_string())
            }
        }
    }

    /// The current conversation's id and the agent it is bound to
    pub async fn current_target(&self) -> Option<(String, String)> {
        self.store
            .read()
            .await
            .current()
            .map(|c| (c.id.clone(), c.agent_mode.clone()))
    }

    /// Fire-and-forget summary of a delivered exchange to the history agent
    fn notify_history(&self, request: &AgentRequest, reply: &str) {
        let Some(history_agent) = self.history_agent.clone() else {
            return;
        };

        let summary = AgentRequest {
            message: format!("User: {}\nAssistant: {}", request.message, reply),
            agent_id: history_agent,
            session_id: request.session_id.clone(),
            user_id: request.user_id.clone(),
            conversation_context: request.conversation_context.clone(),
        };
        let backend = Arc::clone(&self.backend);

        tokio::spawn(async move {
            if let Err(e) = backend.invoke(&summary).await {
                tracing::debug!("History notification failed: {}", e);
            }
        });
    }
}
