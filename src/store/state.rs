//! Conversation and message data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display label for conversations that have not been auto-named.
pub const DEFAULT_CONVERSATION_NAME: &str = "New Conversation";

/// Number of user-authored messages that triggers auto-naming.
const AUTO_NAME_USER_MESSAGE_COUNT: usize = 2;

/// How much of the naming message feeds the derived label, in characters.
const NAME_SOURCE_LIMIT: usize = 30;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// Delivery status of a message.
///
/// Ordered by lifecycle: `Sent < Delivered < Read`. The reply protocol only
/// ever moves a message forward along this ordering; the store's raw setter
/// is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    /// True when moving to `next` is a forward step.
    pub fn advances_to(self, next: MessageStatus) -> bool {
        next > self
    }
}

/// A single chat message.
///
/// `id`, `sender` and `timestamp` never change after creation; `content`
/// changes only through the store's explicit edit path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
    /// Hint that `content` carries rich markup. Presentation-only.
    #[serde(default)]
    pub formatted: bool,
}

impl Message {
    pub(crate) fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            status: MessageStatus::Sent,
            formatted: false,
        }
    }

    /// An assistant reply. Replies are produced from a markup-bearing
    /// response table, so they carry the `formatted` hint.
    pub(crate) fn reply(content: impl Into<String>) -> Self {
        Self {
            formatted: true,
            ..Self::new(content, Sender::Assistant)
        }
    }
}

/// A named, ordered thread of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    /// Latch for the once-only auto-naming rule. Persisted so the rule
    /// survives restarts and `clear_messages`.
    #[serde(default)]
    pub auto_named: bool,
}

impl Conversation {
    pub(crate) fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: DEFAULT_CONVERSATION_NAME.to_string(),
            messages: Vec::new(),
            auto_named: false,
        }
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn user_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender == Sender::User)
            .count()
    }

    /// Apply the auto-naming rule after an append: the first time the
    /// conversation holds exactly two user-authored messages, derive the
    /// name from the second one and latch. Returns the new name when it
    /// fired.
    pub(crate) fn maybe_auto_name(&mut self) -> Option<String> {
        if self.auto_named || self.user_message_count() != AUTO_NAME_USER_MESSAGE_COUNT {
            return None;
        }
        let source = self
            .messages
            .iter()
            .filter(|m| m.sender == Sender::User)
            .nth(AUTO_NAME_USER_MESSAGE_COUNT - 1)?;
        self.name = derive_name(&source.content);
        self.auto_named = true;
        Some(self.name.clone())
    }
}

/// Derive a conversation label from the naming message: the first 30
/// characters, minus everything that is not alphanumeric or whitespace,
/// falling back to the default label when nothing is left.
pub(crate) fn derive_name(content: &str) -> String {
    let stripped: String = content
        .chars()
        .take(NAME_SOURCE_LIMIT)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    if stripped.is_empty() {
        DEFAULT_CONVERSATION_NAME.to_string()
    } else {
        stripped
    }
}

/// The store's complete in-memory state.
///
/// `is_typing` and `editing_message` are transient; everything else
/// round-trips through the snapshot store.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<String>,
    pub is_typing: bool,
    pub editing_message: Option<Message>,
    pub is_tts_enabled: bool,
}

impl ChatState {
    /// Fresh state with a single empty conversation, as on first launch.
    pub(crate) fn initial() -> Self {
        let conversation = Conversation::new();
        let active = conversation.id.clone();
        Self {
            conversations: vec![conversation],
            active_conversation_id: Some(active),
            is_typing: false,
            editing_message: None,
            is_tts_enabled: true,
        }
    }

    pub(crate) fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_conversation_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub(crate) fn active_conversation_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.active_conversation_id.clone()?;
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Look a message up by id across every conversation.
    pub(crate) fn find_message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.conversations
            .iter_mut()
            .flat_map(|c| c.messages.iter_mut())
            .find(|m| m.id == id)
    }
}
