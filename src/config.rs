//! Relying-party configuration: a builder-style, immutable-after-construction
//! struct validated once via [`RelyingPartyConfig::validate`].

use crate::constants::defaults;
use crate::error::{AuthError, Result};

/// Attestation conveyance preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttestationPreference {
    /// No attestation statement requested.
    #[default]
    None,
    /// Attestation requested but anonymized/indirect.
    Indirect,
    /// Attestation requested directly from the authenticator.
    Direct,
    /// Enterprise/vendor-facilitated attestation.
    Enterprise,
}

impl AttestationPreference {
    /// The wire string used in `PublicKeyCredentialCreationOptions.attestation`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Indirect => "indirect",
            Self::Direct => "direct",
            Self::Enterprise => "enterprise",
        }
    }
}

/// User verification requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserVerificationPolicy {
    /// The authenticator must perform user verification.
    Required,
    /// User verification is requested but not mandatory.
    #[default]
    Preferred,
    /// User verification is actively discouraged (faster UX).
    Discouraged,
}

impl UserVerificationPolicy {
    /// The wire string used for `userVerification`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Preferred => "preferred",
            Self::Discouraged => "discouraged",
        }
    }

    /// Whether this policy requires UV at verification time.
    #[must_use]
    pub const fn requires_uv(self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Authenticator attachment hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorAttachment {
    /// A platform-bound authenticator (e.g. a phone's built-in sensor).
    Platform,
    /// A roaming/cross-platform authenticator (e.g. a USB security key).
    CrossPlatform,
}

impl AuthenticatorAttachment {
    /// The wire string used for `authenticatorAttachment`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::CrossPlatform => "cross-platform",
        }
    }
}

/// Resident-key requirement hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResidentKeyRequirement {
    /// A discoverable credential is required.
    Required,
    /// A discoverable credential is preferred.
    #[default]
    Preferred,
    /// A discoverable credential is not requested.
    Discouraged,
}

impl ResidentKeyRequirement {
    /// The wire string used for `residentKey`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Preferred => "preferred",
            Self::Discouraged => "discouraged",
        }
    }
}

/// Caller's preferred authenticator type, mapped to an attachment hint at
/// options-generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredAuthenticatorType {
    /// A roaming security key — maps to `cross-platform`.
    SecurityKey,
    /// The user's own device — maps to `platform`.
    LocalDevice,
    /// A remote/companion device — leaves attachment unset.
    RemoteDevice,
}

impl PreferredAuthenticatorType {
    /// Maps this preference onto an [`AuthenticatorAttachment`], or `None`
    /// when the attachment hint should be left unset.
    #[must_use]
    pub const fn to_attachment(self) -> Option<AuthenticatorAttachment> {
        match self {
            Self::SecurityKey => Some(AuthenticatorAttachment::CrossPlatform),
            Self::LocalDevice => Some(AuthenticatorAttachment::Platform),
            Self::RemoteDevice => None,
        }
    }
}

/// Authenticator selection hints layered: defaults ← config ← per-call
/// overrides.
#[derive(Debug, Clone, Default)]
pub struct AuthenticatorSelection {
    /// Attachment hint, if any.
    pub attachment: Option<AuthenticatorAttachment>,
    /// Resident-key requirement.
    pub resident_key: ResidentKeyRequirement,
    /// Per-selection user-verification override.
    pub user_verification: Option<UserVerificationPolicy>,
}

/// Immutable relying-party configuration, constructed via
/// [`RelyingPartyConfig::new`] and refined with `with_*` builder methods.
#[derive(Clone)]
pub struct RelyingPartyConfig {
    /// Human-readable relying-party name shown to the user.
    pub rp_name: String,
    /// The relying party's domain label (e.g. `example.com`).
    pub rp_id: String,
    /// Accepted origins for `clientData.origin`.
    pub origins: Vec<String>,
    /// Offered-to-client algorithm priority order.
    pub supported_algorithms: Vec<i64>,
    /// Attestation conveyance preference.
    pub attestation_preference: AttestationPreference,
    /// Default user-verification policy.
    pub user_verification_policy: UserVerificationPolicy,
    /// Default authenticator-selection hints.
    pub authenticator_selection: AuthenticatorSelection,
    /// Size in bytes of freshly generated challenges.
    pub challenge_size_bytes: usize,
    /// Per-operation timeout surfaced to the client.
    pub operation_timeout_ms: u64,
    /// Session lifetime from creation.
    pub session_duration_ms: u64,
    /// Key material backing the session-token AEAD; zeroized on drop, never
    /// logged.
    pub token_secret: zeroize::Zeroizing<Vec<u8>>,
    /// When set, `verify_registration` additionally accepts a non-standard
    /// JSON attestation envelope and marks the result lower-assurance.
    pub accept_mobile_attestation: bool,
}

impl std::fmt::Debug for RelyingPartyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelyingPartyConfig")
            .field("rp_name", &self.rp_name)
            .field("rp_id", &self.rp_id)
            .field("origins", &self.origins)
            .field("supported_algorithms", &self.supported_algorithms)
            .field("attestation_preference", &self.attestation_preference)
            .field("user_verification_policy", &self.user_verification_policy)
            .field("authenticator_selection", &self.authenticator_selection)
            .field("challenge_size_bytes", &self.challenge_size_bytes)
            .field("operation_timeout_ms", &self.operation_timeout_ms)
            .field("session_duration_ms", &self.session_duration_ms)
            .field("token_secret", &"<redacted>")
            .field("accept_mobile_attestation", &self.accept_mobile_attestation)
            .finish()
    }
}

impl RelyingPartyConfig {
    /// Construct a configuration with sensible defaults for every field
    /// besides the three that have no reasonable default.
    #[must_use]
    pub fn new(rp_name: impl Into<String>, rp_id: impl Into<String>, token_secret: Vec<u8>) -> Self {
        let rp_id = rp_id.into();
        Self {
            rp_name: rp_name.into(),
            origins: Vec::new(),
            supported_algorithms: vec![
                crate::constants::cose_alg::ES256,
                crate::constants::cose_alg::RS256,
                crate::constants::cose_alg::EDDSA,
            ],
            attestation_preference: AttestationPreference::None,
            user_verification_policy: UserVerificationPolicy::Preferred,
            authenticator_selection: AuthenticatorSelection::default(),
            challenge_size_bytes: defaults::CHALLENGE_SIZE_BYTES,
            operation_timeout_ms: defaults::OPERATION_TIMEOUT_MS,
            session_duration_ms: defaults::SESSION_DURATION_MS,
            token_secret: token_secret.into(),
            accept_mobile_attestation: false,
            rp_id,
        }
    }

    /// Add an accepted origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origins.push(origin.into());
        self
    }

    /// Replace the accepted origin set.
    #[must_use]
    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.origins = origins;
        self
    }

    /// Replace the offered algorithm priority order.
    #[must_use]
    pub fn with_supported_algorithms(mut self, algorithms: Vec<i64>) -> Self {
        self.supported_algorithms = algorithms;
        self
    }

    /// Set the attestation conveyance preference.
    #[must_use]
    pub const fn with_attestation_preference(mut self, pref: AttestationPreference) -> Self {
        self.attestation_preference = pref;
        self
    }

    /// Set the default user-verification policy.
    #[must_use]
    pub const fn with_user_verification_policy(mut self, policy: UserVerificationPolicy) -> Self {
        self.user_verification_policy = policy;
        self
    }

    /// Set the default authenticator-selection hints.
    #[must_use]
    pub fn with_authenticator_selection(mut self, selection: AuthenticatorSelection) -> Self {
        self.authenticator_selection = selection;
        self
    }

    /// Set the challenge size in bytes.
    #[must_use]
    pub const fn with_challenge_size_bytes(mut self, size: usize) -> Self {
        self.challenge_size_bytes = size;
        self
    }

    /// Set the per-operation timeout in milliseconds.
    #[must_use]
    pub const fn with_operation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.operation_timeout_ms = timeout_ms;
        self
    }

    /// Set the session duration in milliseconds.
    #[must_use]
    pub const fn with_session_duration_ms(mut self, duration_ms: u64) -> Self {
        self.session_duration_ms = duration_ms;
        self
    }

    /// Enable the non-standard mobile-attestation compatibility path.
    #[must_use]
    pub const fn with_accept_mobile_attestation(mut self, accept: bool) -> Self {
        self.accept_mobile_attestation = accept;
        self
    }

    /// `operation_timeout_ms` as a signed milliseconds value, for
    /// `chrono::Duration` arithmetic.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn operation_timeout_ms_i64(&self) -> i64 {
        self.operation_timeout_ms as i64
    }

    /// `session_duration_ms` as a signed milliseconds value, for
    /// `chrono::Duration` arithmetic.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn session_duration_ms_i64(&self) -> i64 {
        self.session_duration_ms as i64
    }

    /// Validate the configuration's boundary invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] describing the first violated
    /// invariant found.
    pub fn validate(&self) -> Result<()> {
        if self.rp_id.is_empty() {
            return Err(AuthError::Configuration {
                reason: "rp_id must not be empty".into(),
            });
        }
        if self.origins.is_empty() {
            return Err(AuthError::Configuration {
                reason: "at least one origin is required".into(),
            });
        }
        if self.supported_algorithms.is_empty() {
            return Err(AuthError::Configuration {
                reason: "at least one supported algorithm is required".into(),
            });
        }
        if self.token_secret.len() < defaults::MIN_TOKEN_SECRET_LEN {
            return Err(AuthError::Configuration {
                reason: format!(
                    "token_secret must be at least {} bytes",
                    defaults::MIN_TOKEN_SECRET_LEN
                ),
            });
        }
        if !(defaults::MIN_CHALLENGE_SIZE_BYTES..=defaults::MAX_CHALLENGE_SIZE_BYTES)
            .contains(&self.challenge_size_bytes)
        {
            return Err(AuthError::Configuration {
                reason: format!(
                    "challenge_size_bytes must be in [{}, {}]",
                    defaults::MIN_CHALLENGE_SIZE_BYTES,
                    defaults::MAX_CHALLENGE_SIZE_BYTES
                ),
            });
        }
        if self.operation_timeout_ms < defaults::MIN_OPERATION_TIMEOUT_MS {
            return Err(AuthError::Configuration {
                reason: format!(
                    "operation_timeout_ms must be at least {}",
                    defaults::MIN_OPERATION_TIMEOUT_MS
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RelyingPartyConfig {
        RelyingPartyConfig::new("Example Co", "example.com", vec![0u8; 32])
            .with_origin("https://example.com")
    }

    #[test]
    fn default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_short_token_secret() {
        let cfg = RelyingPartyConfig::new("Example Co", "example.com", vec![0u8; 31])
            .with_origin("https://example.com");
        assert!(matches!(
            cfg.validate(),
            Err(AuthError::Configuration { .. })
        ));
    }

    #[test]
    fn challenge_size_boundaries() {
        let cfg15 = base_config().with_challenge_size_bytes(15);
        assert!(cfg15.validate().is_err());
        let cfg16 = base_config().with_challenge_size_bytes(16);
        assert!(cfg16.validate().is_ok());
        let cfg64 = base_config().with_challenge_size_bytes(64);
        assert!(cfg64.validate().is_ok());
        let cfg65 = base_config().with_challenge_size_bytes(65);
        assert!(cfg65.validate().is_err());
    }

    #[test]
    fn operation_timeout_boundary() {
        let cfg = base_config().with_operation_timeout_ms(9_999);
        assert!(cfg.validate().is_err());
        let cfg = base_config().with_operation_timeout_ms(10_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_preserves_explicit_fields() {
        let cfg = base_config()
            .with_attestation_preference(AttestationPreference::Direct)
            .with_user_verification_policy(UserVerificationPolicy::Required)
            .with_accept_mobile_attestation(true);
        assert_eq!(cfg.attestation_preference.as_str(), "direct");
        assert!(cfg.user_verification_policy.requires_uv());
        assert!(cfg.accept_mobile_attestation);
    }
}
