//! In-memory reference [`SessionStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::Result;
use crate::model::{Session, UserId};
use crate::providers::SessionStore;

/// An in-memory [`SessionStore`] keyed by session id.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create(&self, session_id: &str, session: Session) -> Result<()> {
        let mut guard = self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(session_id.to_string(), session);
        Ok(())
    }

    async fn find(&self, session_id: &str) -> Result<Option<Session>> {
        let guard = self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard
            .get(session_id)
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned())
    }

    async fn update(&self, session_id: &str, session: Session) -> Result<()> {
        let mut guard = self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(session_id.to_string(), session);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut guard = self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(session_id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let mut guard = self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Utc::now();
        let before = guard.len();
        guard.retain(|_, v| !v.is_expired(now));
        Ok((before - guard.len()) as u64)
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<u64> {
        let mut guard = self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, v| &v.user_id != user_id);
        Ok((before - guard.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    fn sample(session_id: &str, user_id: &str, ttl_seconds: i64) -> Session {
        Session {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            credential_id: "cred".into(),
            user_verified: true,
            expires_at: Utc::now() + chrono::Duration::seconds(ttl_seconds),
            extra: StdHashMap::new(),
        }
    }

    #[tokio::test]
    async fn create_then_find_roundtrips() {
        let store = InMemorySessionStore::new();
        store.create("s1", sample("s1", "u1", 60)).await.unwrap();
        let found = store.find("s1").await.unwrap();
        assert_eq!(found.unwrap().user_id, "u1");
    }

    #[tokio::test]
    async fn find_returns_none_once_expired() {
        let store = InMemorySessionStore::new();
        store.create("s1", sample("s1", "u1", -1)).await.unwrap();
        assert!(store.find("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_by_user_id_removes_only_that_users_sessions() {
        let store = InMemorySessionStore::new();
        store.create("s1", sample("s1", "u1", 60)).await.unwrap();
        store.create("s2", sample("s2", "u2", 60)).await.unwrap();
        let removed = store.delete_by_user_id(&"u1".to_string()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.find("s2").await.unwrap().is_some());
    }
}
