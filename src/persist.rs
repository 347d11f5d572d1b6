//! Snapshot persistence for the store's durable fields
//!
//! A single JSON payload under one namespace, written after every mutation
//! and restored wholesale at startup. Transient fields (typing indicator,
//! edit target) are deliberately absent from the snapshot.

use crate::store::Conversation;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Storage key for the chat snapshot.
pub const SNAPSHOT_NAMESPACE: &str = "chat-storage";

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed snapshot payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// The persisted subset of store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Payloads written before this field existed deserialize as version 1.
    #[serde(default = "default_version")]
    pub version: u32,
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<String>,
    #[serde(default = "default_tts")]
    pub is_tts_enabled: bool,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_tts() -> bool {
    true
}

/// Where snapshots live.
///
/// The store saves fire-and-forget after every mutation; implementations
/// must tolerate frequent overwrites of the same namespace.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist the snapshot, replacing any previous one.
    async fn save(&self, snapshot: &Snapshot) -> SnapshotResult<()>;

    /// Load the stored snapshot; `None` when nothing was ever saved.
    async fn load(&self) -> SnapshotResult<Option<Snapshot>>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS snapshots (
    namespace TEXT PRIMARY KEY,
    payload   TEXT NOT NULL,
    saved_at  TEXT NOT NULL
);
";

/// Sqlite-backed snapshot store.
#[derive(Clone)]
pub struct SqliteSnapshots {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshots {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> SnapshotResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> SnapshotResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SnapshotResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshots {
    async fn save(&self, snapshot: &Snapshot) -> SnapshotResult<()> {
        let payload = serde_json::to_string(snapshot)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO snapshots (namespace, payload, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace) DO UPDATE SET payload = ?2, saved_at = ?3",
            params![SNAPSHOT_NAMESPACE, payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn load(&self) -> SnapshotResult<Option<Snapshot>> {
        let conn = self.conn.lock().unwrap();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM snapshots WHERE namespace = ?1",
                params![SNAPSHOT_NAMESPACE],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

/// In-memory snapshot store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemorySnapshots {
    slot: Mutex<Option<Snapshot>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last snapshot saved, if any.
    pub fn latest(&self) -> Option<Snapshot> {
        self.slot.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn save(&self, snapshot: &Snapshot) -> SnapshotResult<()> {
        *self.slot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> SnapshotResult<Option<Snapshot>> {
        Ok(self.slot.lock().unwrap().clone())
    }
}
