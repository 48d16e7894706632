//! In-memory reference storage adapters. Suitable for tests and
//! single-process deployments; not a substitute for a durable backend.

mod challenge_store;
mod credential_store;
mod session_store;
mod user_store;

pub use challenge_store::InMemoryChallengeStore;
pub use credential_store::InMemoryCredentialStore;
pub use session_store::InMemorySessionStore;
pub use user_store::InMemoryUserStore;
