// src/session.rs

use crate::agent::ConversationTurn;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The persistence collaborator: get/set of a session's ordered turns.
/// The core only reads and appends; it never deletes or reorders.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn get_history(&self, session_id: &str) -> Vec<ConversationTurn>;
    async fn set_history(&self, session_id: &str, turns: Vec<ConversationTurn>);
}

/// In-process store. Swappable behind the trait for anything with the same
/// get/set contract.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    entries: DashMap<String, Vec<ConversationTurn>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get_history(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.entries
            .get(session_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    async fn set_history(&self, session_id: &str, turns: Vec<ConversationTurn>) {
        self.entries.insert(session_id.to_string(), turns);
    }
}

/// One async mutex per session id, so each session's read-append-write is
/// atomic while unrelated sessions proceed concurrently.
#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ConversationTurn, Role};

    #[tokio::test]
    async fn store_round_trips_turns() {
        let store = InMemoryHistoryStore::new();
        assert!(store.get_history("s1").await.is_empty());

        let turns = vec![
            ConversationTurn::new(Role::User, "hi"),
            ConversationTurn::new(Role::Assistant, "hello"),
        ];
        store.set_history("s1", turns.clone()).await;
        assert_eq!(store.get_history("s1").await, turns);
        assert!(store.get_history("s2").await.is_empty());
    }

    #[tokio::test]
    async fn same_session_gets_the_same_lock() {
        let locks = SessionLocks::new();
        let a = locks.lock_for("s1");
        let b = locks.lock_for("s1");
        assert!(Arc::ptr_eq(&a, &b));
        let c = locks.lock_for("s2");
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
