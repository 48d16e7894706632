//! Error taxonomy for the relying-party verification core.
//!
//! Every public fallible operation returns [`Result<T>`]. Variants carry the
//! stable error codes callers can match on; none of them interpolate secret
//! material (challenges, signatures, key bytes, `token_secret`) into messages.

use thiserror::Error;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Comprehensive error taxonomy for registration, authentication, and
/// session-token operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════
    /// Relying-party configuration failed validation.
    #[error("invalid relying party configuration: {reason}")]
    Configuration {
        /// Which invariant was violated.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // CBOR / COSE
    // ═══════════════════════════════════════════════════════════
    /// CBOR decoding failed.
    #[error("CBOR decode error: {0}")]
    CborDecode(String),

    /// CBOR encoding failed.
    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    /// COSE key is missing its `kty` field.
    #[error("COSE key missing kty")]
    CoseMissingKty,

    /// COSE EC2 key is missing a required field or has a malformed curve.
    #[error("COSE EC2 key invalid")]
    CoseEc2Invalid,

    /// COSE RSA key is missing a required field.
    #[error("COSE RSA key invalid")]
    CoseRsaInvalid,

    /// COSE OKP key is missing a required field or has a malformed curve.
    #[error("COSE OKP key invalid")]
    CoseOkpInvalid,

    /// COSE key type is not one of EC2/RSA/OKP.
    #[error("unsupported COSE key type")]
    CoseUnsupportedKeyType,

    /// Algorithm could not be inferred and was not explicitly present.
    #[error("unknown COSE algorithm")]
    CoseUnknownAlgorithm,

    // ═══════════════════════════════════════════════════════════
    // Authenticator data
    // ═══════════════════════════════════════════════════════════
    /// `authData` shorter than the fixed 37-byte prefix.
    #[error("authenticator data too short")]
    AuthenticatorDataTooShort,

    /// Attested credential data (AT flag) present but malformed.
    #[error("authenticator data has invalid attested credential data")]
    AuthenticatorDataInvalidCredentialData,

    /// User-present (UP) flag required but not set.
    #[error("user presence required")]
    UserPresenceRequired,

    /// User-verified (UV) flag required but not set.
    #[error("user verification required")]
    UserVerificationRequired,

    // ═══════════════════════════════════════════════════════════
    // Ceremony verification
    // ═══════════════════════════════════════════════════════════
    /// `clientData.type` did not match the expected ceremony type.
    #[error("invalid client data type")]
    InvalidClientDataType,

    /// `clientData.challenge` did not match the expected challenge.
    #[error("challenge mismatch")]
    ChallengeMismatch,

    /// `clientData.origin` is not in the expected origin set.
    #[error("origin mismatch")]
    OriginMismatch,

    /// `authData.rp_id_hash` did not match any expected RP ID.
    #[error("RP ID mismatch")]
    RpidMismatch,

    /// Attested credential data was required but absent.
    #[error("missing credential data")]
    MissingCredentialData,

    /// `response.id` did not match the stored credential id.
    #[error("credential id mismatch")]
    CredentialIdMismatch,

    /// Signature counter did not strictly increase (possible cloned authenticator).
    #[error("counter error: possible cloned authenticator")]
    CounterError,

    /// Signature verification against the signing input failed.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Algorithm or key type is not supported by the signature verifier.
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    // ═══════════════════════════════════════════════════════════
    // Session tokens
    // ═══════════════════════════════════════════════════════════
    /// Token sealing failed (entropy exhaustion or serialization failure).
    #[error("token creation failed")]
    TokenCreationFailed,

    /// Token failed to open: bad envelope, bad tag, or wrong key. Never
    /// distinguishes *why* to avoid leaking an oracle.
    #[error("invalid token")]
    InvalidToken,

    /// Session has passed its `expires_at`.
    #[error("session expired")]
    SessionExpired,

    /// Session id was not found in the session store.
    #[error("session not found")]
    SessionNotFound,

    // ═══════════════════════════════════════════════════════════
    // Storage
    // ═══════════════════════════════════════════════════════════
    /// A storage adapter call failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Returns the stable, machine-matchable error code for this variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::CborDecode(_) => "CBOR_DECODE_ERROR",
            Self::CborEncode(_) => "CBOR_ENCODE_ERROR",
            Self::CoseMissingKty => "COSE_MISSING_KTY",
            Self::CoseEc2Invalid => "COSE_EC2_INVALID",
            Self::CoseRsaInvalid => "COSE_RSA_INVALID",
            Self::CoseOkpInvalid => "COSE_OKP_INVALID",
            Self::CoseUnsupportedKeyType => "COSE_UNSUPPORTED_KEY_TYPE",
            Self::CoseUnknownAlgorithm => "COSE_UNKNOWN_ALGORITHM",
            Self::AuthenticatorDataTooShort => "AUTHENTICATOR_DATA_TOO_SHORT",
            Self::AuthenticatorDataInvalidCredentialData => {
                "AUTHENTICATOR_DATA_INVALID_CREDENTIAL_DATA"
            }
            Self::UserPresenceRequired => "USER_PRESENCE_REQUIRED",
            Self::UserVerificationRequired => "USER_VERIFICATION_REQUIRED",
            Self::InvalidClientDataType => "INVALID_CLIENT_DATA_TYPE",
            Self::ChallengeMismatch => "CHALLENGE_MISMATCH",
            Self::OriginMismatch => "ORIGIN_MISMATCH",
            Self::RpidMismatch => "RPID_MISMATCH",
            Self::MissingCredentialData => "MISSING_CREDENTIAL_DATA",
            Self::CredentialIdMismatch => "CREDENTIAL_ID_MISMATCH",
            Self::CounterError => "COUNTER_ERROR",
            Self::SignatureVerificationFailed => "SIGNATURE_VERIFICATION_FAILED",
            Self::UnsupportedAlgorithm => "UNSUPPORTED_ALGORITHM",
            Self::TokenCreationFailed => "TOKEN_CREATION_FAILED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns `true` if this error reflects a security-relevant mismatch
    /// (phishing, replay, or cloned-authenticator signal) rather than a
    /// routine validation failure.
    #[must_use]
    pub const fn is_security_issue(&self) -> bool {
        matches!(
            self,
            Self::OriginMismatch
                | Self::RpidMismatch
                | Self::ChallengeMismatch
                | Self::CounterError
                | Self::SignatureVerificationFailed
                | Self::InvalidToken
        )
    }
}
