//! Terminal commands
//!
//! Each input line is either a slash command or a message for the current
//! conversation.

pub mod render;

use thiserror::Error;

use crate::conversation::ConversationStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a message to the current conversation
    Send(String),
    /// New conversation, optionally switching agent
    New(Option<String>),
    Agents,
    /// List conversations, optionally filtered
    List(Option<String>),
    Switch(String),
    Delete(String),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("/{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

pub const HELP: &str = "\
Commands:
  <text>             send a message to the current conversation
  //<text>           send a message that starts with '/'
  /new [agent]       start a conversation (optionally with another agent)
  /agents            list available agents
  /list [query]      list conversations, optionally filtered
  /switch <n|id>     open a conversation by list number or id
  /delete <n|id>     delete a conversation
  /show              print the current conversation
  /help              show this help
  /quit              exit";

/// Parse one input line
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();

    // "//text" sends "/text" as a message
    if trimmed.starts_with("//") {
        let text = line.trim_start().trim_end_matches(['\r', '\n']);
        return Ok(Command::Send(text[1..].to_string()));
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Send(line.trim_end_matches(['\r', '\n']).to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    let arg = arg.map(str::to_string);

    match name.to_lowercase().as_str() {
        "new" => Ok(Command::New(arg)),
        "agents" => Ok(Command::Agents),
        "list" | "ls" | "search" => Ok(Command::List(arg)),
        "switch" | "open" => arg.map(Command::Switch).ok_or(CommandError::MissingArgument {
            command: "switch",
            argument: "a conversation number or id",
        }),
        "delete" | "rm" => arg.map(Command::Delete).ok_or(CommandError::MissingArgument {
            command: "delete",
            argument: "a conversation number or id",
        }),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Resolve a `/switch` or `/delete` argument to a conversation id.
///
/// Accepts a 1-based position in the conversation list, a full id, or a
/// unique id prefix.
pub fn resolve_conversation(store: &ConversationStore, target: &str) -> Option<String> {
    let conversations = store.conversations();

    if let Ok(n) = target.parse::<usize>() {
        if let Some(conversation) = n.checked_sub(1).and_then(|i| conversations.get(i)) {
            return Some(conversation.id.clone());
        }
    }

    if let Some(conversation) = store.get(target) {
        return Some(conversation.id.clone());
    }

    let mut matches = conversations.iter().filter(|c| c.id.starts_with(target));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.id.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::agents::{builtin, AgentRegistry};

    #[test]
    fn test_plain_text_is_send() {
        assert_eq!(
            parse("hello there\n").unwrap(),
            Command::Send("hello there".to_string())
        );
        assert_eq!(parse("   ").unwrap(), Command::Send("   ".to_string()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("/new").unwrap(), Command::New(None));
        assert_eq!(
            parse("/new research").unwrap(),
            Command::New(Some("research".to_string()))
        );
        assert_eq!(parse("/agents").unwrap(), Command::Agents);
        assert_eq!(parse("/list").unwrap(), Command::List(None));
        assert_eq!(
            parse("/search  trip to lisbon ").unwrap(),
            Command::List(Some("trip to lisbon".to_string()))
        );
        assert_eq!(parse("/switch 2").unwrap(), Command::Switch("2".to_string()));
        assert_eq!(parse("/rm abc").unwrap(), Command::Delete("abc".to_string()));
        assert_eq!(parse("/SHOW").unwrap(), Command::Show);
        assert_eq!(parse("/help").unwrap(), Command::Help);
        assert_eq!(parse("/quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_missing_argument() {
        assert!(matches!(
            parse("/switch"),
            Err(CommandError::MissingArgument { command: "switch", .. })
        ));
        assert!(matches!(
            parse("/delete   "),
            Err(CommandError::MissingArgument { command: "delete", .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/frobnicate now"),
            Err(CommandError::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_resolve_conversation() {
        let mut store = ConversationStore::new(Arc::new(AgentRegistry::builtin()));
        let older = store.current_id().unwrap().to_string();
        let newer = store.create_conversation(builtin::ASSISTANT_ID).id;

        assert_eq!(resolve_conversation(&store, "1"), Some(newer.clone()));
        assert_eq!(resolve_conversation(&store, "2"), Some(older.clone()));
        assert_eq!(resolve_conversation(&store, "3"), None);
        assert_eq!(resolve_conversation(&store, "0"), None);
        assert_eq!(resolve_conversation(&store, &older), Some(older.clone()));
        assert_eq!(resolve_conversation(&store, &newer[..8]), Some(newer.clone()));
        assert_eq!(resolve_conversation(&store, "not-an-id"), None);
    }

    #[test]
    fn test_double_slash_sends_text() {
        assert_eq!(
            parse("//usr/bin is missing\n").unwrap(),
            Command::Send("/usr/bin is missing".to_string())
        );
        assert_eq!(parse("  //new").unwrap(), Command::Send("/new".to_string()));
        assert_eq!(
            parse("/usr/bin is missing"),
            Err(CommandError::Unknown("usr/bin".to_string()))
        );
    }
}
