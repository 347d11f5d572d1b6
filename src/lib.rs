//! palaver - a local conversation engine with a simulated assistant
//!
//! Owns conversations and messages, produces assistant replies by keyword
//! matching with artificial timing, advances per-message delivery status,
//! and keeps one authoritative view of the current state. Presentation
//! layers read [`ChatStore`] accessors and react to [`StoreEvent`]s; nothing
//! in this crate renders, listens for input devices, or talks to a network.

pub mod debounce;
pub mod input;
pub mod persist;
pub mod responder;
pub mod store;
pub mod timing;

pub use input::{InputCoordinator, InputError, MAX_MESSAGE_CHARS};
pub use persist::{MemorySnapshots, Snapshot, SnapshotStore, SqliteSnapshots};
pub use store::{ChatStore, Conversation, Message, MessageStatus, Sender, StoreEvent};
pub use timing::TimingPolicy;
