//! Change notifications broadcast to presentation layers

use super::state::{Message, MessageStatus};

/// Events emitted by [`ChatStore`](super::ChatStore) after each state
/// change.
///
/// Observers treat these as re-render triggers and read current state back
/// through the store's accessors; by the time an event is received the full
/// transition behind it has been applied. Delivery is best-effort: a lagging
/// receiver loses the oldest events, the store never blocks on a send.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    ConversationCreated {
        id: String,
    },
    ConversationDeleted {
        id: String,
    },
    /// Auto-naming fired for this conversation.
    ConversationRenamed {
        id: String,
        name: String,
    },
    ActiveConversationChanged {
        id: Option<String>,
    },
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    MessageContentUpdated {
        message_id: String,
    },
    MessageStatusChanged {
        message_id: String,
        status: MessageStatus,
    },
    MessagesCleared {
        conversation_id: String,
    },
    TypingChanged {
        is_typing: bool,
    },
    EditingChanged {
        message_id: Option<String>,
    },
    TtsChanged {
        enabled: bool,
    },
    /// Transient user-facing notice, e.g. after deleting a conversation.
    /// Fire-and-forget: carries no store state.
    Notice {
        title: String,
        description: String,
    },
}
