//! In-memory conversation store
//!
//! Owns every conversation for the lifetime of the process. Conversations are
//! kept most-recent-first, and the store is never empty: it starts with one
//! conversation and replaces the last one when it is deleted.
//!
//! Every operation addressed by id is a no-op when the id is unknown. A reply
//! can arrive after its conversation has been deleted, and that must not fail.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::agents::AgentRegistry;

use super::{filter, Conversation, Message};

/// Store shared between the front end and the dispatcher
pub type SharedConversationStore = Arc<RwLock<ConversationStore>>;

/// Wrap a store for sharing
pub fn shared_store(store: ConversationStore) -> SharedConversationStore {
    Arc::new(RwLock::new(store))
}

/// What the front end renders: the (possibly filtered) list and the open conversation
#[derive(Debug)]
pub struct ConversationView<'a> {
    pub conversations: Vec<&'a Conversation>,
    pub current: Option<&'a Conversation>,
}

pub struct ConversationStore {
    registry: Arc<AgentRegistry>,
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    selected_agent: String,
}

impl ConversationStore {
    /// Create a store holding one fresh conversation with the default agent
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        let selected_agent = registry.default_agent().id.clone();
        let mut store = Self {
            registry,
            conversations: Vec::new(),
            current_id: None,
            selected_agent,
        };
        let agent = store.selected_agent.clone();
        store.create_conversation(&agent);
        store
    }

    /// Start a conversation with `agent_id` and make it current.
    ///
    /// Unknown agents fall back to the default agent.
    pub fn create_conversation(&mut self, agent_id: &str) -> Conversation {
        let agent = self.registry.resolve(agent_id);
        let conversation = Conversation::new(&agent.id, self.registry.default_title(agent))
            .with_welcome(&agent.welcome);

        tracing::debug!(
            "Created conversation {} with agent {}",
            conversation.id,
            agent.label
        );

        self.current_id = Some(conversation.id.clone());
        self.conversations.insert(0, conversation.clone());
        conversation
    }

    /// Remove a conversation, moving the selection if it was current
    pub fn delete_conversation(&mut self, id: &str) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.conversations.remove(index);
        tracing::debug!("Deleted conversation {}", id);

        if self.current_id.as_deref() != Some(id) {
            return;
        }

        match self.conversations.first() {
            Some(first) => self.current_id = Some(first.id.clone()),
            None => {
                self.current_id = None;
                let agent = self.selected_agent.clone();
                self.create_conversation(&agent);
            }
        }
    }

    /// Append a user message, taking the title from it if it is the first one
    pub fn append_user_message(&mut self, conversation_id: &str, text: &str) -> Option<Message> {
        self.get_mut(conversation_id).map(|c| c.add_user(text))
    }

    pub fn append_bot_message(&mut self, conversation_id: &str, text: &str) -> Option<Message> {
        self.get_mut(conversation_id).map(|c| c.add_bot(text))
    }

    /// Error notices are shown as bot messages
    pub fn append_error_message(&mut self, conversation_id: &str, text: &str) -> Option<Message> {
        self.append_bot_message(conversation_id, text)
    }

    pub fn select_conversation(&mut self, id: &str) {
        if self.position(id).is_some() {
            self.current_id = Some(id.to_string());
        }
    }

    /// Switch the selected agent and open a new conversation with it.
    ///
    /// Existing conversations keep their agent. Unknown agents are ignored.
    pub fn select_agent(&mut self, agent_id: &str) -> Option<Conversation> {
        let agent_id = self.registry.get(agent_id)?.id.clone();
        self.selected_agent = agent_id.clone();
        Some(self.create_conversation(&agent_id))
    }

    pub fn selected_agent(&self) -> &str {
        &self.selected_agent
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Filtered conversation list plus the current conversation.
    /// Filtering never changes the selection.
    pub fn view(&self, query: &str) -> ConversationView<'_> {
        ConversationView {
            conversations: filter(&self.conversations, query),
            current: self.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::builtin;
    use crate::conversation::Sender;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(AgentRegistry::builtin()))
    }

    #[test]
    fn test_new_store_has_current_conversation() {
        let store = store();
        assert_eq!(store.len(), 1);
        let current = store.current().unwrap();
        assert_eq!(current.title, "New Conversation");
        assert_eq!(current.agent_mode, builtin::ASSISTANT_ID);
        assert_eq!(current.messages.len(), 1);
        assert_eq!(current.messages[0].sender, Sender::Bot);
        assert_eq!(current.messages[0].text, builtin::ASSISTANT_WELCOME);
    }

    #[test]
    fn test_create_inserts_at_front_and_selects() {
        let mut store = store();
        let first = store.current_id().unwrap().to_string();
        let created = store.create_conversation(builtin::RESEARCH_ID);

        assert_eq!(store.len(), 2);
        assert_eq!(store.conversations()[0].id, created.id);
        assert_eq!(store.conversations()[1].id, first);
        assert_eq!(store.current_id(), Some(created.id.as_str()));
        assert_eq!(created.title, "Research Conversation");
        assert_eq!(created.messages[0].text, builtin::RESEARCH_WELCOME);
        assert!(!created.messages.is_empty());
    }

    #[test]
    fn test_create_with_unknown_agent_uses_default_welcome() {
        let mut store = store();
        let created = store.create_conversation("mystery");
        assert_eq!(created.agent_mode, builtin::ASSISTANT_ID);
        assert_eq!(created.messages[0].text, builtin::ASSISTANT_WELCOME);
    }

    #[test]
    fn test_delete_current_selects_first_remaining() {
        let mut store = store();
        let a = store.current_id().unwrap().to_string();
        let b = store.create_conversation(builtin::ASSISTANT_ID).id;
        let c = store.create_conversation(builtin::ASSISTANT_ID).id;

        store.delete_conversation(&c);
        assert_eq!(store.current_id(), Some(b.as_str()));
        assert_eq!(store.len(), 2);

        store.delete_conversation(&a);
        assert_eq!(store.current_id(), Some(b.as_str()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_last_creates_replacement_with_selected_agent() {
        let mut store = store();
        store.select_agent("research").unwrap();
        let ids: Vec<_> = store.conversations().iter().map(|c| c.id.clone()).collect();
        for id in &ids {
            store.delete_conversation(id);
        }

        assert_eq!(store.len(), 1);
        let replacement = store.current().unwrap();
        assert!(!ids.contains(&replacement.id));
        assert_eq!(replacement.agent_mode, builtin::RESEARCH_ID);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = store();
        let current = store.current_id().unwrap().to_string();
        store.delete_conversation("missing");
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_id(), Some(current.as_str()));
    }

    #[test]
    fn test_never_empty_after_mixed_operations() {
        let mut store = store();
        for round in 0..5 {
            for _ in 0..round {
                store.create_conversation(builtin::CODING_ID);
            }
            while store.len() > 0 {
                let id = store.conversations()[store.len() - 1].id.clone();
                let before = store.len();
                store.delete_conversation(&id);
                assert_ne!(store.len(), 0);
                assert!(store.current().is_some());
                if before == 1 {
                    break;
                }
            }
        }
        assert_ne!(store.len(), 0);
    }

    #[test]
    fn test_append_user_message_rewrites_title_once() {
        let mut store = store();
        let id = store.current_id().unwrap().to_string();

        let message = store
            .append_user_message(&id, "Tell me about the history of the printing press")
            .unwrap();
        assert_eq!(message.sender, Sender::User);
        assert_eq!(store.get(&id).unwrap().title, "Tell me about the history of t");

        store.append_user_message(&id, "And the telegraph?");
        assert_eq!(store.get(&id).unwrap().title, "Tell me about the history of t");
    }

    #[test]
    fn test_title_rewrite_applies_to_agent_specific_default() {
        let mut store = store();
        let id = store.select_agent("research").unwrap().id;
        assert_eq!(store.get(&id).unwrap().title, "Research Conversation");

        store.append_user_message(&id, "Solar sails");
        assert_eq!(store.get(&id).unwrap().title, "Solar sails");
    }

    #[test]
    fn test_appends_to_unknown_conversation_are_noops() {
        let mut store = store();
        assert!(store.append_user_message("missing", "hi").is_none());
        assert!(store.append_bot_message("missing", "hi").is_none());
        assert!(store.append_error_message("missing", "hi").is_none());
        assert_eq!(store.current().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_bot_message_targets_id_not_current() {
        let mut store = store();
        let a = store.current_id().unwrap().to_string();
        let b = store.create_conversation(builtin::ASSISTANT_ID).id;
        assert_eq!(store.current_id(), Some(b.as_str()));

        store.append_bot_message(&a, "late reply");
        assert_eq!(store.get(&a).unwrap().messages.len(), 2);
        assert_eq!(store.get(&b).unwrap().messages.len(), 1);
    }

    #[test]
    fn test_messages_are_append_only() {
        let mut store = store();
        let id = store.current_id().unwrap().to_string();
        let mut seen = store.get(&id).unwrap().messages.clone();

        store.append_user_message(&id, "one");
        store.create_conversation(builtin::ASSISTANT_ID);
        store.append_bot_message(&id, "two");
        store.select_conversation(&id);
        store.append_error_message(&id, "three");

        let now = &store.get(&id).unwrap().messages;
        assert_eq!(&now[..seen.len()], &seen[..]);
        seen = now.clone();
        assert_eq!(seen.len(), 4);
        let texts: Vec<_> = seen.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(&texts[1..], &["one", "two", "three"]);
    }

    #[test]
    fn test_select_conversation() {
        let mut store = store();
        let a = store.current_id().unwrap().to_string();
        store.create_conversation(builtin::ASSISTANT_ID);

        store.select_conversation(&a);
        assert_eq!(store.current_id(), Some(a.as_str()));

        store.select_conversation("missing");
        assert_eq!(store.current_id(), Some(a.as_str()));
    }

    #[test]
    fn test_select_unknown_agent_is_noop() {
        let mut store = store();
        assert!(store.select_agent("missing").is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected_agent(), builtin::ASSISTANT_ID);
    }

    #[test]
    fn test_view_filters_without_changing_selection() {
        let mut store = store();
        let a = store.current_id().unwrap().to_string();
        store.append_user_message(&a, "Sourdough starter tips");
        let b = store.create_conversation(builtin::ASSISTANT_ID).id;

        let view = store.view("sourdough");
        assert_eq!(view.conversations.len(), 1);
        assert_eq!(view.conversations[0].id, a);
        assert_eq!(view.current.unwrap().id, b);

        let view = store.view("");
        assert_eq!(view.conversations.len(), 2);
        assert_eq!(store.current_id(), Some(b.as_str()));
    }
}
