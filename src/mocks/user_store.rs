//! In-memory reference [`UserStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::model::{User, UserId};
use crate::providers::UserStore;

/// An in-memory [`UserStore`] keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let guard = self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let guard = self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: User) -> Result<()> {
        let mut guard = self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update(&self, user: User) -> Result<()> {
        let mut guard = self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<()> {
        let mut guard = self.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(id);
        Ok(())
    }
}
