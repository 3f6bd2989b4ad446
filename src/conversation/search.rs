//! Conversation search

use super::Conversation;

/// Conversations whose title or any message contains `query`, ignoring case.
///
/// A blank query returns every conversation in its original order.
pub fn filter<'a>(conversations: &'a [Conversation], query: &str) -> Vec<&'a Conversation> {
    if query.trim().is_empty() {
        return conversations.iter().collect();
    }

    let needle = query.to_lowercase();
    conversations
        .iter()
        .filter(|c| c.matches(&needle))
        .collect()
}
