//! Line-oriented driver for the palaver engine.
//!
//! A thin, stateless consumer: reads commands and message text from stdin,
//! prints store events as they arrive, and owns the one reactive rule the
//! engine leaves to its presentation layer: re-creating a conversation
//! when none remain.

use palaver::{
    ChatStore, InputCoordinator, Sender, SnapshotStore, SqliteSnapshots, StoreEvent, TimingPolicy,
};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "palaver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let db_path = std::env::var("PALAVER_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.palaver/chat.db")
    });
    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %db_path, "Opening snapshot store");
    let snapshots = Arc::new(SqliteSnapshots::open(&db_path)?) as Arc<dyn SnapshotStore>;
    let store = ChatStore::restore(snapshots, TimingPolicy::default()).await;

    let mut events = store.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut input = InputCoordinator::new(store.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_help();
    show_active(&store);
    while let Some(line) = lines.next_line().await? {
        // The reactive invariant: the store tolerates zero conversations,
        // the presentation layer restores one.
        if store.conversations().is_empty() {
            store.create_conversation();
        }

        let line = line.trim().to_string();
        match line.as_str() {
            "" => {}
            "/quit" => break,
            "/help" => print_help(),
            "/new" => {
                let id = store.create_conversation();
                store.switch_conversation(&id);
            }
            "/list" => list_conversations(&store),
            "/show" => show_active(&store),
            "/clear" => store.clear_messages(),
            "/tts" => {
                store.toggle_tts();
            }
            "/delete" => {
                if let Some(id) = store.active_conversation_id() {
                    store.delete_conversation(&id);
                }
            }
            other if other.starts_with("/switch ") => {
                switch_by_index(&store, other.trim_start_matches("/switch ").trim());
            }
            _ => {
                input.set_draft(line);
                if let Err(e) = input.submit() {
                    println!("! {e}");
                }
            }
        }
    }
    input.teardown();
    Ok(())
}

fn print_help() {
    println!(
        "commands: /new /list /show /switch <n> /delete /clear /tts /help /quit\n\
         anything else is sent as a message"
    );
}

fn print_event(event: &StoreEvent) {
    match event {
        StoreEvent::MessageAppended { message, .. } => {
            let who = match message.sender {
                Sender::User => "you",
                Sender::Assistant => "assistant",
            };
            println!("{who}: {}", message.content);
        }
        StoreEvent::TypingChanged { is_typing: true } => println!("assistant is typing..."),
        StoreEvent::MessageStatusChanged { status, .. } => println!("  [{status:?}]"),
        StoreEvent::ConversationRenamed { name, .. } => println!("(conversation named \"{name}\")"),
        StoreEvent::Notice { title, description } => println!("* {title}: {description}"),
        StoreEvent::TtsChanged { enabled } => {
            println!("(text-to-speech {})", if *enabled { "on" } else { "off" });
        }
        _ => {}
    }
}

fn list_conversations(store: &ChatStore) {
    let active = store.active_conversation_id();
    for (index, conversation) in store.conversations().iter().enumerate() {
        let marker = if active.as_deref() == Some(conversation.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {index}: {} ({} messages)",
            conversation.name,
            conversation.messages.len()
        );
    }
}

fn show_active(store: &ChatStore) {
    let Some(conversation) = store.active_conversation() else {
        println!("(no conversation)");
        return;
    };
    println!("-- {} --", conversation.name);
    for message in &conversation.messages {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Assistant => "assistant",
        };
        println!("{who}: {}", message.content);
    }
}

fn switch_by_index(store: &ChatStore, raw: &str) {
    let conversations = store.conversations();
    match raw.parse::<usize>().ok().and_then(|i| conversations.get(i)) {
        Some(conversation) => store.switch_conversation(&conversation.id),
        None => println!("! no conversation at index {raw}"),
    }
}
