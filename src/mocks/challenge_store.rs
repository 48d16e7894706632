//! In-memory reference [`ChallengeStore`], suitable for tests and
//! single-process deployments.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::Result;
use crate::model::ChallengeData;
use crate::providers::ChallengeStore;

/// An in-memory [`ChallengeStore`] keyed by challenge value, backed by a
/// `Mutex<HashMap<..>>` so `delete` can atomically check-and-remove.
#[derive(Debug, Default)]
pub struct InMemoryChallengeStore {
    challenges: Mutex<HashMap<String, ChallengeData>>,
}

impl InMemoryChallengeStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeStore for InMemoryChallengeStore {
    async fn create(&self, data: ChallengeData) -> Result<()> {
        let mut guard = self.challenges.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(data.challenge.clone(), data);
        Ok(())
    }

    async fn find(&self, challenge: &str) -> Result<Option<ChallengeData>> {
        let guard = self.challenges.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard
            .get(challenge)
            .filter(|c| !c.is_expired(Utc::now()))
            .cloned())
    }

    async fn delete(&self, challenge: &str) -> Result<bool> {
        let mut guard = self.challenges.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.remove(challenge) {
            Some(data) if !data.is_expired(Utc::now()) => Ok(true),
            _ => Ok(false),
        }
    }

    async fn delete_expired(&self) -> Result<u64> {
        let mut guard = self.challenges.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Utc::now();
        let before = guard.len();
        guard.retain(|_, v| !v.is_expired(now));
        Ok((before - guard.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation;
    use std::sync::Arc;

    fn sample(challenge: &str, ttl_seconds: i64) -> ChallengeData {
        let now = Utc::now();
        ChallengeData {
            challenge: challenge.to_string(),
            user_id: None,
            operation: Operation::Registration,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(ttl_seconds),
        }
    }

    #[tokio::test]
    async fn create_then_find_roundtrips() {
        let store = InMemoryChallengeStore::new();
        store.create(sample("abc", 60)).await.unwrap();
        let found = store.find("abc").await.unwrap();
        assert_eq!(found.unwrap().challenge, "abc");
    }

    #[tokio::test]
    async fn find_returns_none_once_expired() {
        let store = InMemoryChallengeStore::new();
        store.create(sample("abc", -1)).await.unwrap();
        assert!(store.find("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_expired_sweeps_only_expired_entries() {
        let store = InMemoryChallengeStore::new();
        store.create(sample("live", 60)).await.unwrap();
        store.create(sample("dead", -1)).await.unwrap();
        let removed = store.delete_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.find("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_delete_atomicity() {
        let store = Arc::new(InMemoryChallengeStore::new());
        store.create(sample("shared", 60)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.delete("shared").await.unwrap() }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
