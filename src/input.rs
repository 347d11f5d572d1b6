//! Input boundary
//!
//! Collects in-progress text, debounces the typing broadcast, and hands
//! finished drafts to the store. Validation lives here: blank or oversized
//! drafts are rejected before they can reach the store.

use crate::debounce::Debouncer;
use crate::store::{ChatStore, Sender};
use std::time::Duration;
use thiserror::Error;

/// Hard limit on a single message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Quiet period for the typing broadcast.
pub const TYPING_DEBOUNCE: Duration = Duration::from_millis(500);

/// Rejections at the input boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("message is empty")]
    Empty,
    #[error("message exceeds {MAX_MESSAGE_CHARS} characters")]
    TooLong,
}

/// Collects keyboard or voice input for the store.
///
/// Owns the draft buffer and the debounced typing broadcast: a burst of
/// [`set_draft`](Self::set_draft) calls collapses to one `set_typing` call
/// carrying the last draft's state. Each presentation surface owns one
/// coordinator and must call [`teardown`](Self::teardown) when it goes
/// away.
pub struct InputCoordinator {
    store: ChatStore,
    draft: String,
    typing: Debouncer<bool>,
}

impl InputCoordinator {
    pub fn new(store: ChatStore) -> Self {
        let broadcast_store = store.clone();
        let typing = Debouncer::new(TYPING_DEBOUNCE, move |is_typing| {
            broadcast_store.set_typing(is_typing);
        });
        Self {
            store,
            draft: String::new(),
            typing,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft and schedule the debounced typing broadcast. An
    /// empty draft broadcasts `false`.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.typing.call(!self.draft.is_empty());
    }

    /// Validate and submit the current draft.
    ///
    /// A pending edit is committed in place (content only) and cleared;
    /// otherwise the draft becomes a user message, which starts the reply
    /// protocol. Returns the appended message's id, or `None` for an edit
    /// commit or a missing active conversation. The draft is cleared on
    /// success and the typing broadcast winds down.
    pub fn submit(&mut self) -> Result<Option<String>, InputError> {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return Err(InputError::Empty);
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(InputError::TooLong);
        }

        let id = if let Some(editing) = self.store.editing_message() {
            self.store.update_message_content(&editing.id, text);
            self.store.clear_editing_message();
            None
        } else {
            self.store.add_message(text, Sender::User)
        };

        self.draft.clear();
        self.typing.call(false);
        Ok(id)
    }

    /// Final broadcast for a surface going away: drop any pending window
    /// and force the indicator off immediately.
    pub fn teardown(&self) {
        self.typing.flush(false);
    }
}
