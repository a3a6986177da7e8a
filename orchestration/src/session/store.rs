//! In-memory session store.
//!
//! The store is the single source of truth for session existence. The outer
//! `RwLock<HashMap>` gives contention-free access across different session
//! ids; the per-session async `Mutex` serializes operations on one id, which
//! is how the one-in-flight-orchestration-per-session rule is enforced —
//! the turn cursor and message log are not safe for concurrent mutation.
//!
//! Sessions live only in process memory. Durability goes through explicit
//! archival, after which the id is removed here and becomes invalid.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::debug;

use super::types::{Session, SessionId};
use crate::roster::Roster;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("lock poisoned")]
    LockPoisoned,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A session behind its serializing lock.
pub type SharedSession = Arc<Mutex<Session>>;

/// Concurrency-safe map of live sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session and return its id.
    pub fn create(&self, topic: &str, roster: Roster) -> StoreResult<SessionId> {
        let session = Session::new(topic, roster);
        let id = session.id.clone();

        let mut sessions = self.sessions.write().map_err(|_| StoreError::LockPoisoned)?;
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        debug!(session_id = %id, total = sessions.len(), "session created");
        Ok(id)
    }

    /// Fetch a live session by id.
    pub fn get(&self, id: &str) -> StoreResult<SharedSession> {
        let sessions = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Remove a session, invalidating its id.
    pub fn remove(&self, id: &str) -> StoreResult<SharedSession> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::LockPoisoned)?;
        let removed = sessions
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!(session_id = %id, remaining = sessions.len(), "session removed");
        Ok(removed)
    }

    /// Ids of all live sessions.
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .map(|s| s.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Participant, Role};

    fn roster() -> Roster {
        Roster::new(vec![
            Participant::new("Debater_A", Role::Debater, "for"),
            Participant::new("Judge", Role::Judge, "judge"),
        ])
        .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new();
        let id = store.create("topic", roster()).unwrap();

        assert!(store.contains(&id));
        assert_eq!(store.len(), 1);

        let session = store.get(&id).unwrap();
        let guard = session.try_lock().unwrap();
        assert_eq!(guard.topic, "topic");
        assert_eq!(guard.id, id);
    }

    #[test]
    fn test_get_unknown_id() {
        let store = SessionStore::new();
        let err = store.get("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_remove_is_one_shot() {
        let store = SessionStore::new();
        let id = store.create("topic", roster()).unwrap();

        store.remove(&id).unwrap();
        assert!(store.is_empty());

        let err = store.remove(&id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_independent_sessions() {
        let store = SessionStore::new();
        let a = store.create("topic a", roster()).unwrap();
        let b = store.create("topic b", roster()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        store.remove(&a).unwrap();
        assert!(store.contains(&b));
    }

    #[tokio::test]
    async fn test_session_lock_serializes() {
        let store = SessionStore::new();
        let id = store.create("topic", roster()).unwrap();

        let session = store.get(&id).unwrap();
        let guard = session.lock().await;

        // A second fetch sees the same session but cannot lock it while an
        // operation is in flight.
        let again = store.get(&id).unwrap();
        assert!(again.try_lock().is_err());
        drop(guard);
        assert!(again.try_lock().is_ok());
    }
}
