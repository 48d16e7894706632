//! Shared data-model types: users, credentials, challenges, and
//! sessions as they flow between the orchestrator and storage adapters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application user identifier. Distinct from the WebAuthn user handle
/// generated at registration time.
pub type UserId = String;

/// The application's view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Application user identifier.
    pub id: UserId,
    /// Login/display username.
    pub username: String,
    /// Optional human-friendly display name.
    pub display_name: Option<String>,
}

/// Authenticator transport hints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// USB.
    Usb,
    /// Near-field communication.
    Nfc,
    /// Bluetooth Low Energy.
    Ble,
    /// Hybrid (caBLE) transport.
    Hybrid,
    /// Platform-internal authenticator.
    Internal,
    /// Caddy/cable transport alias retained by some authenticators.
    Cable,
    /// Smart card.
    #[serde(rename = "smart-card")]
    SmartCard,
}

/// Whether a credential is bound to a single device or syncs across
/// multiple devices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeviceType {
    /// Bound to one physical authenticator.
    SingleDevice,
    /// Synced across a passkey provider's devices.
    MultiDevice,
}

impl DeviceType {
    /// Derive the device type from the backup-eligible flag.
    #[must_use]
    pub const fn from_backup_eligible(backup_eligible: bool) -> Self {
        if backup_eligible {
            Self::MultiDevice
        } else {
            Self::SingleDevice
        }
    }
}

/// A persisted WebAuthn credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebAuthnCredential {
    /// Opaque credential identifier, unique across all users.
    pub credential_id: String,
    /// Raw CBOR bytes of the credential's COSE public key.
    pub public_key_cose: Vec<u8>,
    /// Monotonic signature counter; 0 means "does not track counter".
    pub counter: u32,
    /// Transports reported at registration time.
    pub transports: Vec<Transport>,
    /// Single- vs multi-device credential.
    pub device_type: DeviceType,
    /// Backup-state bit observed at registration.
    pub backed_up: bool,
    /// Owning application user.
    pub user_id: UserId,
    /// 16-64 byte random handle generated at registration.
    pub webauthn_user_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last successful authentication timestamp.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Authenticator Attestation GUID, if attested.
    pub aaguid: Option<String>,
    /// Set when this credential was registered through the non-standard
    /// mobile-attestation compatibility path.
    pub lower_assurance: bool,
}

/// The ceremony a transient challenge was issued for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// A `create` (registration) ceremony.
    Registration,
    /// A `get` (authentication) ceremony.
    Authentication,
}

/// A transient, TTL-bound challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeData {
    /// The Base64URL challenge value; its own unique key in the store.
    pub challenge: String,
    /// The user this challenge was issued for, if known in advance.
    pub user_id: Option<UserId>,
    /// Which ceremony this challenge belongs to.
    pub operation: Operation,
    /// Issuance time.
    pub created_at: DateTime<Utc>,
    /// `created_at + operation_timeout_ms`.
    pub expires_at: DateTime<Utc>,
}

impl ChallengeData {
    /// Whether this challenge has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A session, persisted by the session store and/or carried inside a
/// sealed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Random 32-byte session identifier (Base64URL).
    pub session_id: String,
    /// Owning application user.
    pub user_id: UserId,
    /// The credential used to establish this session.
    pub credential_id: String,
    /// Whether user verification occurred during the authenticating
    /// ceremony.
    pub user_verified: bool,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Caller-defined opaque claims.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Whether this session has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
