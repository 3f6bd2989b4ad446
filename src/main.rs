//! Moxie Chat - terminal client for Moxie agents
//!
//! Holds any number of conversations in memory, each bound to one agent, and
//! relays every message to the agent endpoint. Nothing is persisted: state is
//! gone when the process exits.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod agents;
mod commands;
mod config;
mod conversation;
mod core;
mod providers;

use commands::{render, Command};
use config::Config;
use conversation::{shared_store, ConversationStore};
use crate::core::{Dispatcher, Rejection, SendOutcome};
use providers::HttpAgentClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they don't interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moxie_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let registry = Arc::new(config.registry()?);
    tracing::info!("📦 Loaded {} agent(s)", registry.all().len());

    let store = shared_store(ConversationStore::new(registry));
    let backend = Arc::new(HttpAgentClient::new(config.endpoint.clone()));
    tracing::info!("🔥 Talking to agents at {}", backend.endpoint());

    let dispatcher = Arc::new(
        Dispatcher::new(store.clone(), backend)
            .with_user_id(config.user_id.clone())
            .with_history_agent(config.history_agent.clone())
            .with_policy(config.policy),
    );

    if let Some(current) = store.read().await.current() {
        println!("{}", render::conversation(current));
    }
    println!("(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if !handle(command, &dispatcher).await {
            break;
        }
    }

    if dispatcher.is_loading() {
        tracing::debug!("Exiting with a reply still pending; it will not be shown");
    }

    Ok(())
}

/// Run one command. Returns false when the user asked to quit.
async fn handle(command: Command, dispatcher: &Arc<Dispatcher>) -> bool {
    let store = dispatcher.store();

    match command {
        Command::Send(text) => {
            if text.trim().is_empty() {
                return true;
            }
            let Some((conversation_id, agent_id)) = dispatcher.current_target().await else {
                return true;
            };
            if dispatcher.is_pending(&conversation_id) {
                println!("(still waiting on the reply in this conversation)");
                return true;
            }
            spawn_send(Arc::clone(dispatcher), conversation_id, text, agent_id);
        }
        Command::New(agent) => {
            let mut store = store.write().await;
            let created = match agent {
                Some(agent) => match store.select_agent(&agent) {
                    Some(created) => created,
                    None => {
                        println!("Unknown agent: {} (see /agents)", agent);
                        return true;
                    }
                },
                None => {
                    let selected = store.selected_agent().to_string();
                    store.create_conversation(&selected)
                }
            };
            println!("{}", render::conversation(&created));
        }
        Command::Agents => {
            let store = store.read().await;
            println!("{}", render::agents(store.registry(), store.selected_agent()));
        }
        Command::List(query) => {
            let store = store.read().await;
            let view = store.view(query.as_deref().unwrap_or(""));
            println!("{}", render::conversation_list(&view, store.conversations()));
            if query.is_some() {
                println!("({} of {} conversations)", view.conversations.len(), store.len());
            }
        }
        Command::Switch(target) => {
            let mut store = store.write().await;
            match commands::resolve_conversation(&store, &target) {
                Some(id) => {
                    store.select_conversation(&id);
                    if let Some(current) = store.current() {
                        println!("{}", render::conversation(current));
                    }
                }
                None => println!("No conversation matches '{}'", target),
            }
        }
        Command::Delete(target) => {
            let mut store = store.write().await;
            match commands::resolve_conversation(&store, &target) {
                Some(id) => {
                    store.delete_conversation(&id);
                    if let Some(current) = store.current() {
                        println!("Deleted. Now in: {}", current.title);
                    }
                }
                None => println!("No conversation matches '{}'", target),
            }
        }
        Command::Show => {
            if let Some(current) = store.read().await.current() {
                println!("{}", render::conversation(current));
            }
        }
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => return false,
    }

    true
}

/// Send in the background so the user can keep switching conversations
fn spawn_send(dispatcher: Arc<Dispatcher>, conversation_id: String, text: String, agent_id: String) {
    tokio::spawn(async move {
        let outcome = dispatcher.send(&conversation_id, &text, &agent_id).await;

        let reply = match outcome {
            SendOutcome::Delivered(reply) | SendOutcome::Failed(reply) => reply,
            SendOutcome::Rejected(Rejection::Busy) => {
                println!("(still waiting on the previous reply)");
                return;
            }
            SendOutcome::Rejected(_) => return,
        };

        let store = dispatcher.store().read().await;
        let Some(conversation) = store.get(&conversation_id) else {
            return;
        };
        if store.current_id() == Some(conversation_id.as_str()) {
            println!("Assistant: {}", reply);
        } else {
            println!("Assistant (in '{}'): {}", conversation.title, reply);
        }
    });
}
