//! In-memory reference [`CredentialStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::{AuthError, Result};
use crate::model::{UserId, WebAuthnCredential};
use crate::providers::CredentialStore;

/// An in-memory [`CredentialStore`] keyed by credential id.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<HashMap<String, WebAuthnCredential>>,
}

impl InMemoryCredentialStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_id(&self, credential_id: &str) -> Result<Option<WebAuthnCredential>> {
        let guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.get(credential_id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<WebAuthnCredential>> {
        let guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard
            .values()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_webauthn_user_id(
        &self,
        webauthn_user_id: &str,
    ) -> Result<Option<WebAuthnCredential>> {
        let guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard
            .values()
            .find(|c| c.webauthn_user_id == webauthn_user_id)
            .cloned())
    }

    async fn create(&self, credential: WebAuthnCredential) -> Result<()> {
        let mut guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(credential.credential_id.clone(), credential);
        Ok(())
    }

    async fn update(&self, credential: WebAuthnCredential) -> Result<()> {
        let mut guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(credential.credential_id.clone(), credential);
        Ok(())
    }

    async fn update_counter(&self, credential_id: &str, new_counter: u32) -> Result<()> {
        let mut guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let credential = guard
            .get_mut(credential_id)
            .ok_or_else(|| AuthError::Storage(format!("no such credential: {credential_id}")))?;
        credential.counter = new_counter;
        Ok(())
    }

    async fn update_last_used(&self, credential_id: &str) -> Result<()> {
        let mut guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let credential = guard
            .get_mut(credential_id)
            .ok_or_else(|| AuthError::Storage(format!("no such credential: {credential_id}")))?;
        credential.last_used_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, credential_id: &str) -> Result<()> {
        let mut guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(credential_id);
        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<u64> {
        let mut guard = self.credentials.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, v| &v.user_id != user_id);
        Ok((before - guard.len()) as u64)
    }
}
