//! The user persistence capability. Offered for caller
//! convenience; the orchestrator does not call it directly.

use std::future::Future;

use crate::error::Result;
use crate::model::{User, UserId};

/// Storage capability for application users.
pub trait UserStore: Send + Sync {
    /// Look up a user by id.
    fn find_by_id(&self, id: &UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Look up a user by username.
    fn find_by_username(&self, username: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Persist a new user.
    fn create(&self, user: User) -> impl Future<Output = Result<()>> + Send;

    /// Update an existing user's fields.
    fn update(&self, user: User) -> impl Future<Output = Result<()>> + Send;

    /// Delete a user.
    fn delete(&self, id: &UserId) -> impl Future<Output = Result<()>> + Send;
}
