//! In-memory Session Store
//!
//! Holds one `ConversationState` per logged-in user. Each entry sits behind its
//! own async mutex so a session's turns are processed strictly one at a time,
//! while different sessions proceed independently.

use alma_core::ConversationState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One stored session.
#[derive(Debug)]
pub struct SessionEntry {
    pub created_at: DateTime<Utc>,
    pub state: Mutex<ConversationState>,
}

/// Sessions live until the client deletes them. Nothing expires abandoned
/// sessions, so a long-running server grows with every login that never
/// reaches `DELETE /sessions/{id}`.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new session and returns its id.
    pub async fn insert(&self, state: ConversationState) -> (Uuid, Arc<SessionEntry>) {
        let id = Uuid::new_v4();
        let entry = Arc::new(SessionEntry {
            created_at: Utc::now(),
            state: Mutex::new(state),
        });
        self.sessions.write().await.insert(id, entry.clone());
        (id, entry)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
