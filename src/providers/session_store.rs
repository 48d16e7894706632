//! The session persistence capability.

use std::future::Future;

use crate::error::Result;
use crate::model::{Session, UserId};

/// Storage capability for sessions. `find` must return `None` once a
/// session has expired, mirroring [`crate::providers::ChallengeStore::find`].
pub trait SessionStore: Send + Sync {
    /// Persist a freshly created session, keyed by `session_id`.
    fn create(&self, session_id: &str, session: Session) -> impl Future<Output = Result<()>> + Send;

    /// Look up a session by id.
    fn find(&self, session_id: &str) -> impl Future<Output = Result<Option<Session>>> + Send;

    /// Replace a session's stored state (used by `refresh_session`).
    fn update(&self, session_id: &str, session: Session) -> impl Future<Output = Result<()>> + Send;

    /// Delete a session. Idempotent.
    fn delete(&self, session_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Remove every expired session, returning the count removed.
    fn delete_expired(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Delete every session owned by `user_id`.
    fn delete_by_user_id(&self, user_id: &UserId) -> impl Future<Output = Result<u64>> + Send;
}
