//! The transient challenge store capability.

use std::future::Future;

use crate::error::Result;
use crate::model::ChallengeData;

/// Storage capability for transient, TTL-bound challenges.
///
/// Returns use `impl Future` rather than `async fn` so trait objects
/// (`Box<dyn ChallengeStore>`) stay reachable for callers that need dynamic
/// dispatch across adapter implementations.
pub trait ChallengeStore: Send + Sync {
    /// Persist a freshly issued challenge.
    fn create(&self, data: ChallengeData) -> impl Future<Output = Result<()>> + Send;

    /// Look up a challenge by its value. Must return `None` once the
    /// challenge has expired, even if not yet swept by [`delete_expired`].
    ///
    /// [`delete_expired`]: ChallengeStore::delete_expired
    fn find(&self, challenge: &str) -> impl Future<Output = Result<Option<ChallengeData>>> + Send;

    /// Delete a challenge, reporting whether a live entry was actually
    /// removed. Concurrent `delete` calls for the same challenge value must
    /// race correctly so that at most one caller observes `true` — the
    /// orchestrator relies on this single bit to give verification its
    /// at-most-once guarantee, since deletion only happens after
    /// a ceremony has otherwise fully verified.
    fn delete(&self, challenge: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Remove every expired challenge, returning the count removed.
    fn delete_expired(&self) -> impl Future<Output = Result<u64>> + Send;
}
