//! Session Store
//!
//! Keyed registry of [`SessionState`] values. Reads hand out independent
//! clones so an in-progress mutation never corrupts the stored value before
//! it is explicitly committed. Each session carries its own mutex handle so
//! that invocations for the same session serialize while unrelated sessions
//! proceed in parallel, and a reset epoch so that a commit from a call that
//! straddled an explicit reset is discarded rather than resurrecting stale
//! answers.

use crate::session::SessionState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct Entry {
    state: SessionState,
    lock: Arc<Mutex<()>>,
    epoch: u64,
}

impl Entry {
    fn new() -> Self {
        Self {
            state: SessionState::new(),
            lock: Arc::new(Mutex::new(())),
            epoch: 0,
        }
    }
}

/// Thread-safe registry of session states, keyed by session id.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an independent copy of the stored state, or `None` for a
    /// session that was never created.
    pub async fn get(&self, session_id: &str) -> Option<SessionState> {
        let map = self.inner.lock().await;
        map.get(session_id).map(|e| e.state.clone())
    }

    /// Unconditionally replaces the stored state.
    pub async fn put(&self, session_id: &str, state: SessionState) {
        let mut map = self.inner.lock().await;
        map.entry(session_id.to_string()).or_insert_with(Entry::new).state = state;
    }

    /// Hands out the per-session serialization mutex, lazily creating the
    /// session. Callers hold this across their whole read-modify-write cycle.
    pub async fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        map.entry(session_id.to_string())
            .or_insert_with(Entry::new)
            .lock
            .clone()
    }

    /// Returns an independent copy of the state together with the session's
    /// current reset epoch, lazily creating a fresh session if absent.
    pub async fn snapshot(&self, session_id: &str) -> (SessionState, u64) {
        let mut map = self.inner.lock().await;
        let entry = map.entry(session_id.to_string()).or_insert_with(Entry::new);
        (entry.state.clone(), entry.epoch)
    }

    /// Commits a state only if no reset happened since `epoch` was observed.
    /// Returns false when the commit was discarded.
    pub async fn commit(&self, session_id: &str, epoch: u64, state: SessionState) -> bool {
        let mut map = self.inner.lock().await;
        let entry = map.entry(session_id.to_string()).or_insert_with(Entry::new);
        if entry.epoch != epoch {
            debug!(session_id = %session_id, "discarding commit that straddled a reset");
            return false;
        }
        entry.state = state;
        true
    }

    /// Atomically replaces the session with a fresh empty state and bumps the
    /// epoch so any in-flight commit for the old state is discarded.
    pub async fn reset(&self, session_id: &str) {
        let mut map = self.inner.lock().await;
        let entry = map.entry(session_id.to_string()).or_insert_with(Entry::new);
        entry.state = SessionState::new();
        entry.epoch += 1;
    }

    /// Removes a session entirely. Returns whether it existed.
    pub async fn delete(&self, session_id: &str) -> bool {
        let mut map = self.inner.lock().await;
        map.remove(session_id).is_some()
    }

    /// Drops every session.
    pub async fn clear(&self) {
        let mut map = self.inner.lock().await;
        map.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_independent_copy() {
        let store = SessionStore::new();
        let mut state = SessionState::new();
        state.mark_asked("AA_1");
        store.put("s1", state).await;

        let mut copy = store.get("s1").await.unwrap();
        copy.record_answer("AA_1", "yes");

        // The stored value is untouched until an explicit put/commit.
        let stored = store.get("s1").await.unwrap();
        assert!(stored.answered.is_empty());
    }

    #[tokio::test]
    async fn test_absent_session_is_none_until_snapshot() {
        let store = SessionStore::new();
        assert!(store.get("missing").await.is_none());

        // Snapshot lazily creates the session.
        let (state, epoch) = store.snapshot("missing").await;
        assert!(state.asked.is_empty());
        assert_eq!(epoch, 0);
        assert!(store.get("missing").await.is_some());
    }

    #[tokio::test]
    async fn test_lock_for_returns_same_handle_per_session() {
        let store = SessionStore::new();
        let a = store.lock_for("s1").await;
        let b = store.lock_for("s1").await;
        let other = store.lock_for("s2").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[tokio::test]
    async fn test_commit_respects_reset_epoch() {
        let store = SessionStore::new();
        let (mut state, epoch) = store.snapshot("s1").await;
        state.record_answer("AA_1", "pre-reset answer");

        // A reset lands between the snapshot and the commit.
        store.reset("s1").await;
        assert!(!store.commit("s1", epoch, state).await);

        // The stale answer never resurfaces.
        let stored = store.get("s1").await.unwrap();
        assert!(stored.answers.is_empty());

        // A commit against the fresh epoch succeeds.
        let (mut fresh, fresh_epoch) = store.snapshot("s1").await;
        fresh.record_answer("AA_1", "post-reset answer");
        assert!(store.commit("s1", fresh_epoch, fresh).await);
        assert_eq!(
            store.get("s1").await.unwrap().answers.get("AA_1").unwrap().text,
            "post-reset answer"
        );
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let (mut a, epoch_a) = store.snapshot("a").await;
        a.record_answer("AA_1", "answer for a");
        store.commit("a", epoch_a, a).await;

        let (b, _) = store.snapshot("b").await;
        assert!(b.answers.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = SessionStore::new();
        store.put("a", SessionState::new()).await;
        store.put("b", SessionState::new()).await;
        assert_eq!(store.len().await, 2);

        assert!(store.delete("a").await);
        assert!(!store.delete("a").await);
        assert_eq!(store.len().await, 1);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
