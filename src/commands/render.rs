//! Plain-text rendering of store state

use chrono::Local;

use crate::agents::AgentRegistry;
use crate::conversation::{Conversation, ConversationView, Message, Sender};

/// Conversation list, numbered for `/switch` and `/delete`, current one marked
pub fn conversation_list(view: &ConversationView<'_>, all: &[Conversation]) -> String {
    if view.conversations.is_empty() {
        return "No matching conversations.".to_string();
    }

    let current_id = view.current.map(|c| c.id.as_str());
    view.conversations
        .iter()
        .map(|c| {
            // Numbers refer to the unfiltered list so they stay valid for /switch
            let number = all.iter().position(|a| a.id == c.id).map_or(0, |i| i + 1);
            let marker = if Some(c.id.as_str()) == current_id { '*' } else { ' ' };
            format!(
                "{} {:>2}. {}  ({})",
                marker,
                number,
                c.title,
                c.created_at.with_timezone(&Local).format("%b %-d, %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn message_line(message: &Message) -> String {
    let speaker = match message.sender {
        Sender::User => "You",
        Sender::Bot => "Assistant",
    };
    format!(
        "[{}] {}: {}",
        message.timestamp.with_timezone(&Local).format("%H:%M"),
        speaker,
        message.text
    )
}

pub fn conversation(conversation: &Conversation) -> String {
    let mut out = format!("== {} ==", conversation.title);
    for message in &conversation.messages {
        out.push('\n');
        out.push_str(&message_line(message));
    }
    out
}

pub fn agents(registry: &AgentRegistry, selected: &str) -> String {
    registry
        .all()
        .iter()
        .map(|a| {
            let marker = if a.id == selected { '*' } else { ' ' };
            if a.description.is_empty() {
                format!("{} {:<10} {}", marker, a.name, a.label)
            } else {
                format!("{} {:<10} {} - {}", marker, a.name, a.label, a.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
