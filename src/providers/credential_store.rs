//! The credential persistence capability. Consumed by the
//! orchestrator to look up credentials during authentication and to record
//! counter/last-used updates.

use std::future::Future;

use crate::error::Result;
use crate::model::{UserId, WebAuthnCredential};

/// Storage capability for persisted WebAuthn credentials.
pub trait CredentialStore: Send + Sync {
    /// Look up a credential by its id.
    fn find_by_id(
        &self,
        credential_id: &str,
    ) -> impl Future<Output = Result<Option<WebAuthnCredential>>> + Send;

    /// List every credential owned by a user.
    fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<WebAuthnCredential>>> + Send;

    /// Look up a credential by its WebAuthn user handle (used for
    /// discoverable-credential / usernameless flows).
    fn find_by_webauthn_user_id(
        &self,
        webauthn_user_id: &str,
    ) -> impl Future<Output = Result<Option<WebAuthnCredential>>> + Send;

    /// Persist a newly verified registration.
    fn create(&self, credential: WebAuthnCredential) -> impl Future<Output = Result<()>> + Send;

    /// Update a credential's general fields (transports, `backed_up`, …).
    fn update(&self, credential: WebAuthnCredential) -> impl Future<Output = Result<()>> + Send;

    /// Advance a credential's signature counter.
    fn update_counter(
        &self,
        credential_id: &str,
        new_counter: u32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Stamp a credential's `last_used_at` to now.
    fn update_last_used(&self, credential_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete a credential.
    fn delete(&self, credential_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Delete every credential owned by a user.
    fn delete_by_user_id(&self, user_id: &UserId) -> impl Future<Output = Result<u64>> + Send;
}
