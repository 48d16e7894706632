//! A WebAuthn/FIDO2 relying-party cryptographic verification core.
//!
//! This crate implements the ceremony logic a relying party needs to accept
//! passkeys: building `PublicKeyCredentialCreationOptions`/
//! `PublicKeyCredentialRequestOptions`, verifying the client's response
//! against the expected challenge/origin/RP ID, parsing authenticator data
//! and COSE public keys, verifying the attestation or assertion signature,
//! and sealing/opening the session token issued once a ceremony succeeds.
//!
//! Storage is abstracted behind four traits in [`providers`] — users,
//! credentials, challenges, and sessions — so callers plug in their own
//! backend; [`mocks`] ships in-memory reference adapters for tests and
//! single-process deployments. [`orchestrator::RelyingParty`] wires
//! configuration, storage, and the ceremony/session logic together into the
//! crate's top-level entry point.
//!
//! ```no_run
//! use passkey_core::config::RelyingPartyConfig;
//! use passkey_core::mocks::{InMemoryChallengeStore, InMemoryCredentialStore, InMemorySessionStore};
//! use passkey_core::orchestrator::RelyingParty;
//!
//! # fn build() -> passkey_core::error::Result<()> {
//! let config = RelyingPartyConfig::new("Example Co", "example.com", vec![0u8; 32])
//!     .with_origin("https://example.com");
//!
//! let rp = RelyingParty::new(
//!     config,
//!     InMemoryChallengeStore::new(),
//!     InMemorySessionStore::new(),
//!     InMemoryCredentialStore::new(),
//! )?;
//! # let _ = rp;
//! # Ok(())
//! # }
//! ```

pub mod authentication;
pub mod authenticator_data;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod mocks;
pub mod model;
pub mod orchestrator;
pub mod providers;
pub mod registration;
pub mod session_token;
pub mod wire;

pub use config::RelyingPartyConfig;
pub use error::{AuthError, Result};
pub use orchestrator::{CleanupReport, RelyingParty};
