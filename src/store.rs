//! The conversation store
//!
//! Owns every conversation and message, orchestrates the simulated reply
//! protocol, and is the single source of truth presentation layers read.
//! All mutations go through the methods here; each applies its whole
//! transition under the state lock, then notifies observers and snapshots
//! the durable fields in the background.

mod events;
#[cfg(test)]
mod proptests;
mod state;

pub use events::StoreEvent;
pub use state::{
    ChatState, Conversation, Message, MessageStatus, Sender, DEFAULT_CONVERSATION_NAME,
};

use crate::persist::{Snapshot, SnapshotStore, SNAPSHOT_VERSION};
use crate::responder;
use crate::timing::TimingPolicy;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Capacity of the change-notification channel. A lagging observer loses
/// the oldest events; the store never blocks on a send.
const EVENT_CHANNEL_CAPACITY: usize = 128;

const DELETE_NOTICE_TITLE: &str = "Conversation Deleted";
const DELETE_NOTICE_DESCRIPTION: &str = "The conversation has been deleted.";

/// Clonable handle to the conversation store.
///
/// Construct one per application with [`ChatStore::restore`] and clone it
/// freely; clones share state. Methods never block their caller and never
/// fail: unknown ids degrade to no-ops. The reply protocol and persistence
/// run as spawned tasks, so the store must live on a tokio runtime.
#[derive(Clone)]
pub struct ChatStore {
    inner: Arc<Mutex<ChatState>>,
    events: broadcast::Sender<StoreEvent>,
    snapshots: Arc<dyn SnapshotStore>,
    timing: TimingPolicy,
}

impl ChatStore {
    /// Restore the store from the snapshot backend, or start fresh with a
    /// single empty, active conversation when no snapshot exists.
    pub async fn restore(snapshots: Arc<dyn SnapshotStore>, timing: TimingPolicy) -> Self {
        let state = match snapshots.load().await {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    conversations = snapshot.conversations.len(),
                    "Restored chat state from snapshot"
                );
                ChatState {
                    conversations: snapshot.conversations,
                    active_conversation_id: snapshot.active_conversation_id,
                    is_typing: false,
                    editing_message: None,
                    is_tts_enabled: snapshot.is_tts_enabled,
                }
            }
            Ok(None) => ChatState::initial(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load snapshot, starting fresh");
                ChatState::initial()
            }
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(state)),
            events,
            snapshots,
            timing,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ==================== State accessors ====================

    pub fn conversations(&self) -> Vec<Conversation> {
        self.state().conversations.clone()
    }

    pub fn active_conversation_id(&self) -> Option<String> {
        self.state().active_conversation_id.clone()
    }

    pub fn active_conversation(&self) -> Option<Conversation> {
        self.state().active_conversation().cloned()
    }

    pub fn is_typing(&self) -> bool {
        self.state().is_typing
    }

    pub fn editing_message(&self) -> Option<Message> {
        self.state().editing_message.clone()
    }

    pub fn is_tts_enabled(&self) -> bool {
        self.state().is_tts_enabled
    }

    // ==================== Conversation operations ====================

    /// Insert a new empty conversation. It becomes active only when nothing
    /// was active before. Returns the new conversation's id.
    pub fn create_conversation(&self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        let became_active = {
            let mut state = self.state();
            state.conversations.push(conversation);
            if state.active_conversation_id.is_none() {
                state.active_conversation_id = Some(id.clone());
                true
            } else {
                false
            }
        };
        tracing::debug!(conv_id = %id, "Created conversation");
        self.notify(StoreEvent::ConversationCreated { id: id.clone() });
        if became_active {
            self.notify(StoreEvent::ActiveConversationChanged {
                id: Some(id.clone()),
            });
        }
        self.persist();
        id
    }

    /// Point the store at a different conversation. The pointer change is
    /// unconditional: no existence check, no effect on `editing_message` or
    /// `is_typing`, and pending reply-protocol timers keep running.
    pub fn switch_conversation(&self, id: &str) {
        self.state().active_conversation_id = Some(id.to_string());
        self.notify(StoreEvent::ActiveConversationChanged {
            id: Some(id.to_string()),
        });
        self.persist();
    }

    /// Remove a conversation. When it was active, the first remaining
    /// conversation (if any) takes over. Emits a user-visible notice.
    pub fn delete_conversation(&self, id: &str) {
        let (removed, active_change) = {
            let mut state = self.state();
            let before = state.conversations.len();
            state.conversations.retain(|c| c.id != id);
            if state.conversations.len() == before {
                (false, None)
            } else if state.active_conversation_id.as_deref() == Some(id) {
                state.active_conversation_id = state.conversations.first().map(|c| c.id.clone());
                (true, Some(state.active_conversation_id.clone()))
            } else {
                (true, None)
            }
        };
        if !removed {
            tracing::debug!(conv_id = %id, "Delete ignored, conversation not found");
            return;
        }
        tracing::info!(conv_id = %id, "Deleted conversation");
        self.notify(StoreEvent::ConversationDeleted { id: id.to_string() });
        if let Some(new_active) = active_change {
            self.notify(StoreEvent::ActiveConversationChanged { id: new_active });
        }
        self.notify(StoreEvent::Notice {
            title: DELETE_NOTICE_TITLE.to_string(),
            description: DELETE_NOTICE_DESCRIPTION.to_string(),
        });
        self.persist();
    }

    // ==================== Message operations ====================

    /// Append a message to the active conversation and return its id.
    ///
    /// The store assigns the id, timestamp and initial `Sent` status. When
    /// no conversation is active the call is a no-op and returns `None`
    /// (callers are expected to guarantee an active conversation).
    /// User-authored messages start the reply protocol; direct assistant
    /// injection does not.
    pub fn add_message(&self, content: impl Into<String>, sender: Sender) -> Option<String> {
        let content = content.into();
        let (conversation_id, message, renamed) = {
            let mut state = self.state();
            let Some(conversation) = state.active_conversation_mut() else {
                tracing::debug!("add_message ignored, no active conversation");
                return None;
            };
            let message = Message::new(content.clone(), sender);
            conversation.messages.push(message.clone());
            let renamed = conversation.maybe_auto_name();
            let conversation_id = conversation.id.clone();
            if sender == Sender::User {
                state.is_typing = true;
            }
            (conversation_id, message, renamed)
        };

        let message_id = message.id.clone();
        self.notify(StoreEvent::MessageAppended {
            conversation_id: conversation_id.clone(),
            message,
        });
        if let Some(name) = renamed {
            tracing::debug!(conv_id = %conversation_id, name = %name, "Auto-named conversation");
            self.notify(StoreEvent::ConversationRenamed {
                id: conversation_id.clone(),
                name,
            });
        }
        if sender == Sender::User {
            self.notify(StoreEvent::TypingChanged { is_typing: true });
            self.spawn_reply(conversation_id, content);
        }
        self.persist();
        Some(message_id)
    }

    /// Replace the content of the message with `id`, wherever it lives.
    /// Status and timestamp are untouched; unknown ids are ignored.
    pub fn update_message_content(&self, id: &str, content: impl Into<String>) {
        let content = content.into();
        let updated = {
            let mut state = self.state();
            match state.find_message_mut(id) {
                Some(message) => {
                    message.content = content;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify(StoreEvent::MessageContentUpdated {
                message_id: id.to_string(),
            });
            self.persist();
        } else {
            tracing::debug!(message_id = %id, "Content update ignored, message not found");
        }
    }

    /// Raw status setter, exposed for symmetry with the rest of the
    /// operation set. Performs no forward-only check; the reply protocol
    /// uses its own guarded path and is the only caller that must preserve
    /// monotonicity.
    pub fn update_message_status(&self, id: &str, status: MessageStatus) {
        let updated = {
            let mut state = self.state();
            match state.find_message_mut(id) {
                Some(message) => {
                    message.status = status;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify(StoreEvent::MessageStatusChanged {
                message_id: id.to_string(),
                status,
            });
            self.persist();
        } else {
            tracing::debug!(message_id = %id, "Status update ignored, message not found");
        }
    }

    /// Set the transient typing indicator. No other side effects.
    pub fn set_typing(&self, is_typing: bool) {
        let changed = {
            let mut state = self.state();
            let changed = state.is_typing != is_typing;
            state.is_typing = is_typing;
            changed
        };
        if changed {
            self.notify(StoreEvent::TypingChanged { is_typing });
        }
    }

    /// Target a message for in-place editing. A second call overwrites the
    /// previous target; at most one edit is in flight.
    pub fn set_editing_message(&self, message: Message) {
        let message_id = message.id.clone();
        self.state().editing_message = Some(message);
        self.notify(StoreEvent::EditingChanged {
            message_id: Some(message_id),
        });
    }

    pub fn clear_editing_message(&self) {
        self.state().editing_message = None;
        self.notify(StoreEvent::EditingChanged { message_id: None });
    }

    /// Empty the active conversation's message list in place. Identity,
    /// name and the auto-naming latch survive.
    pub fn clear_messages(&self) {
        let cleared = {
            let mut state = self.state();
            state.active_conversation_mut().map(|conversation| {
                conversation.messages.clear();
                conversation.id.clone()
            })
        };
        if let Some(conversation_id) = cleared {
            self.notify(StoreEvent::MessagesCleared { conversation_id });
            self.persist();
        }
    }

    /// Flip the persisted TTS preference. Returns the new value.
    pub fn toggle_tts(&self) -> bool {
        let enabled = {
            let mut state = self.state();
            state.is_tts_enabled = !state.is_tts_enabled;
            state.is_tts_enabled
        };
        self.notify(StoreEvent::TtsChanged { enabled });
        self.persist();
        enabled
    }

    // ==================== Simulated reply protocol ====================

    /// Schedule the assistant's reply to a user message.
    ///
    /// Stages run as independent one-shot tasks keyed by conversation and
    /// message id: compose (append the reply and clear the typing indicator
    /// in one transition), then advance the reply to `Delivered` and `Read`.
    /// Each stage re-validates its target before acting, so a conversation
    /// deleted mid-flight turns the remaining stages into no-ops. Nothing
    /// cancels a stage; switching conversations has no effect on them.
    fn spawn_reply(&self, conversation_id: String, utterance: String) {
        let store = self.clone();
        let delay = self.timing.composing_delay(&utterance);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.finish_composing(&conversation_id, &utterance);
        });
    }

    /// Append the composed reply and clear the typing indicator in one
    /// atomic transition, then schedule the delivery receipts.
    fn finish_composing(&self, conversation_id: &str, utterance: &str) {
        let reply_text = responder::respond(utterance);
        let appended = {
            let mut state = self.state();
            state.is_typing = false;
            match state.conversation_mut(conversation_id) {
                Some(conversation) => {
                    let reply = Message::reply(reply_text);
                    conversation.messages.push(reply.clone());
                    Some(reply)
                }
                None => {
                    tracing::debug!(
                        conv_id = %conversation_id,
                        "Reply dropped, conversation deleted mid-compose"
                    );
                    None
                }
            }
        };

        let Some(reply) = appended else {
            // The pending reply no longer has a home; only the indicator
            // needed clearing.
            self.notify(StoreEvent::TypingChanged { is_typing: false });
            return;
        };
        let reply_id = reply.id.clone();
        self.notify(StoreEvent::MessageAppended {
            conversation_id: conversation_id.to_string(),
            message: reply,
        });
        self.notify(StoreEvent::TypingChanged { is_typing: false });
        self.persist();

        // Both receipts are measured from the append and scheduled
        // independently of each other.
        let store = self.clone();
        let id = reply_id.clone();
        let delivered_after = self.timing.delivered;
        tokio::spawn(async move {
            tokio::time::sleep(delivered_after).await;
            store.advance_reply_status(&id, MessageStatus::Delivered);
        });

        let store = self.clone();
        let read_after = self.timing.delivered + self.timing.read;
        tokio::spawn(async move {
            tokio::time::sleep(read_after).await;
            store.advance_reply_status(&reply_id, MessageStatus::Read);
        });
    }

    /// Forward-only status transition used by the reply protocol. A missing
    /// message (its conversation was deleted) or a non-forward step is a
    /// no-op.
    fn advance_reply_status(&self, message_id: &str, status: MessageStatus) {
        let advanced = {
            let mut state = self.state();
            match state.find_message_mut(message_id) {
                Some(message) if message.status.advances_to(status) => {
                    message.status = status;
                    true
                }
                Some(_) => false,
                None => {
                    tracing::debug!(
                        message_id = %message_id,
                        "Status advance dropped, message gone"
                    );
                    false
                }
            }
        };
        if advanced {
            self.notify(StoreEvent::MessageStatusChanged {
                message_id: message_id.to_string(),
                status,
            });
            self.persist();
        }
    }

    // ==================== Plumbing ====================

    fn state(&self) -> MutexGuard<'_, ChatState> {
        self.inner.lock().unwrap()
    }

    fn notify(&self, event: StoreEvent) {
        // No receivers is fine; observers come and go.
        let _ = self.events.send(event);
    }

    /// Snapshot the durable fields in the background. Fire-and-forget:
    /// failures are logged and never touch in-memory state.
    fn persist(&self) {
        let snapshot = {
            let state = self.state();
            Snapshot {
                version: SNAPSHOT_VERSION,
                conversations: state.conversations.clone(),
                active_conversation_id: state.active_conversation_id.clone(),
                is_tts_enabled: state.is_tts_enabled,
            }
        };
        let snapshots = Arc::clone(&self.snapshots);
        tokio::spawn(async move {
            if let Err(e) = snapshots.save(&snapshot).await {
                tracing::warn!(error = %e, "Failed to persist chat snapshot");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemorySnapshots;
    use std::time::Duration;

    async fn fresh_store() -> (ChatStore, Arc<MemorySnapshots>) {
        let snapshots = Arc::new(MemorySnapshots::new());
        let store = ChatStore::restore(
            Arc::clone(&snapshots) as Arc<dyn SnapshotStore>,
            TimingPolicy::default(),
        )
        .await;
        (store, snapshots)
    }

    /// Default delays: composing fires at 3s, Delivered at 4s, Read at 5s
    /// (all measured from the user message). Tests step strictly between
    /// those instants.
    const PAST_COMPOSING: Duration = Duration::from_millis(3500);
    const BETWEEN_RECEIPTS: Duration = Duration::from_secs(1);

    fn drain(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        seen
    }

    #[tokio::test]
    async fn test_starts_with_one_empty_active_conversation() {
        let (store, _) = fresh_store().await;
        let conversations = store.conversations();
        assert_eq!(conversations.len(), 1);
        assert!(conversations[0].messages.is_empty());
        assert_eq!(conversations[0].name, DEFAULT_CONVERSATION_NAME);
        assert_eq!(
            store.active_conversation_id(),
            Some(conversations[0].id.clone())
        );
        assert!(!store.is_typing());
        assert!(store.is_tts_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_message_sets_typing_then_reply_lands_atomically() {
        let (store, _) = fresh_store().await;
        let id = store.add_message("Hi", Sender::User);
        assert!(id.is_some());

        // Immediately after the call: one message, typing shown.
        let conversation = store.active_conversation().unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert!(store.is_typing());

        tokio::time::sleep(PAST_COMPOSING).await;

        let conversation = store.active_conversation().unwrap();
        assert_eq!(conversation.messages.len(), 2);
        let reply = &conversation.messages[1];
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.content, crate::responder::respond("Hi"));
        assert_eq!(reply.status, MessageStatus::Sent);
        assert!(reply.formatted);
        assert!(!store.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_status_advances_delivered_then_read() {
        let (store, _) = fresh_store().await;
        store.add_message("Hi", Sender::User);

        tokio::time::sleep(PAST_COMPOSING).await;
        let reply_id = store.active_conversation().unwrap().messages[1].id.clone();
        let status = |store: &ChatStore| {
            store
                .active_conversation()
                .unwrap()
                .message(&reply_id)
                .unwrap()
                .status
        };
        assert_eq!(status(&store), MessageStatus::Sent);

        tokio::time::sleep(BETWEEN_RECEIPTS).await;
        assert_eq!(status(&store), MessageStatus::Delivered);

        tokio::time::sleep(BETWEEN_RECEIPTS).await;
        assert_eq!(status(&store), MessageStatus::Read);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_one_reply_per_user_message() {
        let (store, _) = fresh_store().await;
        store.add_message("Hi", Sender::User);
        tokio::time::sleep(Duration::from_secs(30)).await;

        let conversation = store.active_conversation().unwrap();
        let assistant_count = conversation
            .messages
            .iter()
            .filter(|m| m.sender == Sender::Assistant)
            .count();
        assert_eq!(assistant_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_assistant_injection_skips_the_reply_protocol() {
        let (store, _) = fresh_store().await;
        store.add_message("injected", Sender::Assistant);
        assert!(!store.is_typing());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.active_conversation().unwrap().messages.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_name_derives_from_second_user_message() {
        let (store, _) = fresh_store().await;
        store.add_message("first question", Sender::User);
        store.add_message("What is <<JSX>>??", Sender::User);
        assert_eq!(
            store.active_conversation().unwrap().name,
            "What is JSX"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_name_fires_exactly_once() {
        let (store, _) = fresh_store().await;
        store.add_message("first", Sender::User);
        store.add_message("the naming one", Sender::User);
        assert_eq!(store.active_conversation().unwrap().name, "the naming one");

        store.add_message("third", Sender::User);
        store.add_message("fourth", Sender::User);
        assert_eq!(store.active_conversation().unwrap().name, "the naming one");

        // Clearing resets the count, not the latch.
        store.clear_messages();
        store.add_message("one", Sender::User);
        store.add_message("two", Sender::User);
        assert_eq!(store.active_conversation().unwrap().name, "the naming one");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_name_falls_back_on_symbol_only_content() {
        let (store, _) = fresh_store().await;
        store.add_message("first", Sender::User);
        store.add_message("??!!", Sender::User);
        let conversation = store.active_conversation().unwrap();
        assert_eq!(conversation.name, DEFAULT_CONVERSATION_NAME);
        assert!(conversation.auto_named);
    }

    #[tokio::test]
    async fn test_delete_sole_conversation_leaves_valid_empty_state() {
        let (store, _) = fresh_store().await;
        let id = store.active_conversation_id().unwrap();
        let mut rx = store.subscribe();

        store.delete_conversation(&id);
        assert!(store.conversations().is_empty());
        assert_eq!(store.active_conversation_id(), None);

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, StoreEvent::Notice { title, .. } if title == "Conversation Deleted")));
    }

    #[tokio::test]
    async fn test_delete_inactive_conversation_keeps_active_pointer() {
        let (store, _) = fresh_store().await;
        let active = store.active_conversation_id().unwrap();
        let other = store.create_conversation();

        store.delete_conversation(&other);
        assert_eq!(store.active_conversation_id(), Some(active));
        assert_eq!(store.conversations().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_active_falls_back_to_first_remaining() {
        let (store, _) = fresh_store().await;
        let first = store.active_conversation_id().unwrap();
        let second = store.create_conversation();

        store.delete_conversation(&first);
        assert_eq!(store.active_conversation_id(), Some(second));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_ignored() {
        let (store, _) = fresh_store().await;
        let mut rx = store.subscribe();
        store.delete_conversation("no-such-conversation");
        assert_eq!(store.conversations().len(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_lands_in_originating_conversation_after_switch() {
        let (store, _) = fresh_store().await;
        let original = store.active_conversation_id().unwrap();
        store.add_message("Hi", Sender::User);

        let other = store.create_conversation();
        store.switch_conversation(&other);

        tokio::time::sleep(PAST_COMPOSING).await;

        let conversations = store.conversations();
        let original = conversations.iter().find(|c| c.id == original).unwrap();
        let other = conversations.iter().find(|c| c.id == other).unwrap();
        assert_eq!(original.messages.len(), 2);
        assert!(other.messages.is_empty());
        assert!(!store.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_is_dropped_when_conversation_deleted_mid_compose() {
        let (store, _) = fresh_store().await;
        let id = store.active_conversation_id().unwrap();
        store.add_message("Hi", Sender::User);
        store.delete_conversation(&id);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.conversations().is_empty());
        assert!(!store.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_receipt_timers_noop_after_conversation_deleted() {
        let (store, _) = fresh_store().await;
        let id = store.active_conversation_id().unwrap();
        store.add_message("Hi", Sender::User);

        tokio::time::sleep(PAST_COMPOSING).await;
        store.delete_conversation(&id);

        // Both receipt timers fire against a missing message.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.conversations().is_empty());
    }

    #[tokio::test]
    async fn test_update_message_content_preserves_status_and_timestamp() {
        let (store, _) = fresh_store().await;
        let id = store.add_message("before", Sender::Assistant).unwrap();
        let original = store.active_conversation().unwrap().messages[0].clone();

        store.update_message_content(&id, "after");
        let updated = store.active_conversation().unwrap().messages[0].clone();
        assert_eq!(updated.content, "after");
        assert_eq!(updated.status, original.status);
        assert_eq!(updated.timestamp, original.timestamp);
        assert_eq!(updated.id, original.id);
    }

    #[tokio::test]
    async fn test_update_operations_ignore_unknown_ids() {
        let (store, _) = fresh_store().await;
        store.add_message("kept", Sender::Assistant);
        store.update_message_content("missing", "nope");
        store.update_message_status("missing", MessageStatus::Read);
        assert_eq!(
            store.active_conversation().unwrap().messages[0].content,
            "kept"
        );
    }

    #[tokio::test]
    async fn test_raw_status_setter_is_unconstrained() {
        let (store, _) = fresh_store().await;
        let id = store.add_message("m", Sender::Assistant).unwrap();
        store.update_message_status(&id, MessageStatus::Read);
        store.update_message_status(&id, MessageStatus::Sent);
        assert_eq!(
            store.active_conversation().unwrap().messages[0].status,
            MessageStatus::Sent
        );
    }

    #[tokio::test]
    async fn test_add_message_without_active_conversation_is_noop() {
        let (store, _) = fresh_store().await;
        let id = store.active_conversation_id().unwrap();
        store.delete_conversation(&id);

        assert_eq!(store.add_message("orphan", Sender::User), None);
        assert!(store.conversations().is_empty());
        assert!(!store.is_typing());
    }

    #[tokio::test]
    async fn test_switch_conversation_is_an_unconditional_pointer_change() {
        let (store, _) = fresh_store().await;
        store.set_editing_message(Message::new("target", Sender::User));
        store.switch_conversation("whatever");
        assert_eq!(store.active_conversation_id(), Some("whatever".to_string()));
        // Neither the edit target nor the typing flag is disturbed.
        assert!(store.editing_message().is_some());
    }

    #[tokio::test]
    async fn test_clear_messages_preserves_conversation_identity() {
        let (store, _) = fresh_store().await;
        store.add_message("a", Sender::Assistant);
        store.add_message("b", Sender::Assistant);
        let before = store.active_conversation().unwrap();

        store.clear_messages();
        let after = store.active_conversation().unwrap();
        assert!(after.messages.is_empty());
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
    }

    #[tokio::test]
    async fn test_editing_target_is_overwritten_not_stacked() {
        let (store, _) = fresh_store().await;
        let a = Message::new("a", Sender::User);
        let b = Message::new("b", Sender::User);
        store.set_editing_message(a);
        store.set_editing_message(b.clone());
        assert_eq!(store.editing_message().unwrap().id, b.id);

        store.clear_editing_message();
        assert!(store.editing_message().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_tts_flips_and_persists() {
        let (store, snapshots) = fresh_store().await;
        assert!(store.is_tts_enabled());
        assert!(!store.toggle_tts());

        // Let the background save run.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!snapshots.latest().unwrap().is_tts_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_round_trip_restores_conversations_and_pointer() {
        let (store, snapshots) = fresh_store().await;
        store.add_message("one", Sender::User);
        store.add_message("two", Sender::User);
        tokio::time::sleep(Duration::from_secs(30)).await; // let replies settle
        store.create_conversation();
        tokio::time::sleep(Duration::from_millis(1)).await; // let the save run

        let snapshot = snapshots.latest().unwrap();
        let reloaded = Arc::new(MemorySnapshots::new());
        reloaded.save(&snapshot).await.unwrap();
        let restored = ChatStore::restore(
            Arc::clone(&reloaded) as Arc<dyn SnapshotStore>,
            TimingPolicy::default(),
        )
        .await;

        assert_eq!(restored.conversations(), store.conversations());
        assert_eq!(
            restored.active_conversation_id(),
            store.active_conversation_id()
        );
        // Transient fields never round-trip.
        assert!(!restored.is_typing());
        assert!(restored.editing_message().is_none());
    }
}
