//! Stable numeric/string constants: COSE algorithm identifiers and config
//! defaults, grouped by concern.

/// COSE algorithm identifiers (RFC 8152 §8, IANA COSE Algorithms registry).
pub mod cose_alg {
    /// ECDSA w/ SHA-256 over P-256.
    pub const ES256: i64 = -7;
    /// ECDSA w/ SHA-384 over P-384.
    pub const ES384: i64 = -35;
    /// ECDSA w/ SHA-512 over P-521.
    pub const ES512: i64 = -36;
    /// RSASSA-PKCS1-v1_5 w/ SHA-256.
    pub const RS256: i64 = -257;
    /// RSASSA-PKCS1-v1_5 w/ SHA-384.
    pub const RS384: i64 = -258;
    /// RSASSA-PKCS1-v1_5 w/ SHA-512.
    pub const RS512: i64 = -259;
    /// RSASSA-PSS w/ SHA-256.
    pub const PS256: i64 = -37;
    /// RSASSA-PSS w/ SHA-384.
    pub const PS384: i64 = -38;
    /// RSASSA-PSS w/ SHA-512.
    pub const PS512: i64 = -39;
    /// EdDSA (Ed25519).
    pub const EDDSA: i64 = -8;
}

/// COSE key type identifiers.
pub mod cose_kty {
    /// Octet Key Pair (Ed25519/X25519).
    pub const OKP: i64 = 1;
    /// Double-coordinate elliptic curve.
    pub const EC2: i64 = 2;
    /// RSA.
    pub const RSA: i64 = 3;
}

/// COSE elliptic-curve identifiers.
pub mod cose_crv {
    /// NIST P-256.
    pub const P256: i64 = 1;
    /// NIST P-384.
    pub const P384: i64 = 2;
    /// NIST P-521.
    pub const P521: i64 = 3;
    /// Ed25519.
    pub const ED25519: i64 = 6;
}

/// Integer COSE map keys used by the key parser.
pub mod cose_map_key {
    /// Key type.
    pub const KTY: i64 = 1;
    /// Algorithm.
    pub const ALG: i64 = 3;
    /// Curve (EC2/OKP) or modulus (RSA).
    pub const CRV_OR_N: i64 = -1;
    /// X-coordinate (EC2) or public exponent (RSA) or public key bytes (OKP).
    pub const X_OR_E: i64 = -2;
    /// Y-coordinate (EC2 only).
    pub const Y: i64 = -3;
}

/// `RelyingPartyConfig` field defaults.
pub mod defaults {
    /// Default `challenge_size_bytes`.
    pub const CHALLENGE_SIZE_BYTES: usize = 32;
    /// Minimum accepted `challenge_size_bytes`.
    pub const MIN_CHALLENGE_SIZE_BYTES: usize = 16;
    /// Maximum accepted `challenge_size_bytes`.
    pub const MAX_CHALLENGE_SIZE_BYTES: usize = 64;
    /// Default `operation_timeout_ms`.
    pub const OPERATION_TIMEOUT_MS: u64 = 60_000;
    /// Minimum accepted `operation_timeout_ms`.
    pub const MIN_OPERATION_TIMEOUT_MS: u64 = 10_000;
    /// Default `session_duration_ms` (24 hours).
    pub const SESSION_DURATION_MS: u64 = 24 * 3_600 * 1_000;
    /// Minimum accepted `token_secret` length in bytes.
    pub const MIN_TOKEN_SECRET_LEN: usize = 32;
    /// Length in bytes of a generated session id.
    pub const SESSION_ID_LEN: usize = 32;
    /// Length in bytes of the session-token per-token salt.
    pub const TOKEN_SALT_LEN: usize = 32;
    /// Length in bytes of the AES-GCM IV used by the session-token codec.
    pub const TOKEN_IV_LEN: usize = 16;
    /// Length in bytes of a freshly generated WebAuthn user handle.
    pub const WEBAUTHN_USER_HANDLE_LEN: usize = 32;
}
