//! Authentication options generation and response verification.

use crate::authenticator_data;
use crate::config::RelyingPartyConfig;
use crate::crypto::cose::CoseKey;
use crate::crypto::hash::{random_bytes, sha256};
use crate::crypto::signature;
use crate::encoding::{b64url_decode, b64url_encode, ct_eq};
use crate::error::{AuthError, Result};
use crate::wire::{self, AuthenticationCredential, CredentialDescriptor, RequestOptions};

const CLIENT_DATA_TYPE_GET: &str = "webauthn.get";

/// Per-call overrides for [`build_request_options`].
#[derive(Debug, Clone, Default)]
pub struct AuthenticationOptionsOverrides {
    /// Credentials the client may use; omitted entirely when empty to
    /// enable discoverable-credential flows.
    pub allow_credentials: Vec<CredentialDescriptor>,
    /// Per-call user-verification override.
    pub user_verification: Option<crate::config::UserVerificationPolicy>,
    /// Per-call RP-ID override.
    pub rp_id: Option<String>,
    /// Extension inputs, passed through opaquely.
    pub extensions: Option<serde_json::Value>,
    /// Per-call timeout override.
    pub timeout_ms: Option<u32>,
}

/// The options JSON plus the raw challenge for the caller to persist.
#[derive(Debug, Clone)]
pub struct AuthenticationOptions {
    /// The `PublicKeyCredentialRequestOptions` to return to the client.
    pub options: RequestOptions,
    /// The raw challenge string, for persistence via the challenge store.
    pub challenge: String,
}

/// Build `PublicKeyCredentialRequestOptions` for an authentication ceremony.
#[must_use]
pub fn build_request_options(
    config: &RelyingPartyConfig,
    overrides: &AuthenticationOptionsOverrides,
) -> AuthenticationOptions {
    let challenge_bytes = random_bytes(config.challenge_size_bytes);
    let challenge = b64url_encode(&challenge_bytes);

    let uv_policy = overrides.user_verification.unwrap_or(config.user_verification_policy);

    let options = RequestOptions {
        challenge: challenge.clone(),
        timeout: Some(
            overrides
                .timeout_ms
                .unwrap_or(u32::try_from(config.operation_timeout_ms).unwrap_or(u32::MAX)),
        ),
        rp_id: overrides.rp_id.clone().or_else(|| Some(config.rp_id.clone())),
        allow_credentials: (!overrides.allow_credentials.is_empty())
            .then(|| overrides.allow_credentials.clone()),
        user_verification: Some(uv_policy.as_str().to_string()),
        extensions: overrides.extensions.clone(),
    };

    AuthenticationOptions { options, challenge }
}

/// The minimal view of a stored credential the core needs to verify an
/// authentication response.
#[derive(Debug, Clone)]
pub struct StoredCredentialView<'a> {
    /// The credential's id, as persisted.
    pub credential_id: &'a str,
    /// Raw CBOR bytes of the credential's COSE public key.
    pub public_key_cose: &'a [u8],
    /// The credential's last-known signature counter.
    pub counter: u32,
}

/// The verified result of a successful authentication ceremony.
#[derive(Debug, Clone)]
pub struct VerifiedAuthenticationInfo {
    /// The counter value to persist (equal to `authData.counter`).
    pub new_counter: u32,
    /// The origin this ceremony ran in.
    pub origin: String,
    /// The RP ID that matched `rp_id_hash`.
    pub matched_rp_id: String,
    /// Whether user verification occurred.
    pub user_verified: bool,
    /// The credential id this assertion was produced by.
    pub credential_id: String,
}

/// Verify a `get` ceremony response.
///
/// # Errors
///
/// Returns the first failing step's error, per this function's fail-fast
/// ordering.
pub fn verify_authentication(
    config: &RelyingPartyConfig,
    credential: &AuthenticationCredential,
    expected_challenge: &str,
    stored: &StoredCredentialView,
    expected_origins: Option<&[String]>,
    expected_rp_ids: Option<&[String]>,
    require_user_verification: Option<bool>,
) -> Result<VerifiedAuthenticationInfo> {
    if credential.id != stored.credential_id {
        return Err(AuthError::CredentialIdMismatch);
    }

    let origins = wire::resolve_origins(config, expected_origins);
    let rp_ids = expected_rp_ids
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| wire::resolve_rp_ids(config, None));
    let require_uv =
        require_user_verification.unwrap_or_else(|| config.user_verification_policy.requires_uv());

    let (client_data_bytes, client_data) =
        wire::decode_client_data(&credential.response.client_data_json)?;
    wire::verify_client_data_context(
        &client_data,
        CLIENT_DATA_TYPE_GET,
        expected_challenge,
        origins,
    )?;

    let auth_data_bytes = b64url_decode(&credential.response.authenticator_data)
        .map_err(|_| AuthError::AuthenticatorDataTooShort)?;
    let auth_data = authenticator_data::parse(&auth_data_bytes)?;

    let matched_rp_id = wire::match_rp_id(&auth_data.rp_id_hash, &rp_ids)?.to_string();
    auth_data.require_flags(true, require_uv)?;

    let new = auth_data.counter;
    let old = stored.counter;
    if !(new == 0 && old == 0) && new <= old {
        return Err(AuthError::CounterError);
    }

    let cose_key: CoseKey = crate::crypto::cose::from_bytes(stored.public_key_cose)?;

    let client_data_hash = sha256(&client_data_bytes);
    let mut signing_input = auth_data_bytes.clone();
    signing_input.extend_from_slice(&client_data_hash);

    let signature_bytes = b64url_decode(&credential.response.signature)
        .map_err(|_| AuthError::SignatureVerificationFailed)?;

    let verified = signature::verify(&signature_bytes, &signing_input, &cose_key)?;
    if !verified {
        return Err(AuthError::SignatureVerificationFailed);
    }

    Ok(VerifiedAuthenticationInfo {
        new_counter: new,
        origin: client_data.origin,
        matched_rp_id,
        user_verified: auth_data.user_verified(),
        credential_id: stored.credential_id.to_string(),
    })
}

/// Constant-time check that the asserted credential id matches what was
/// resolved from storage, exposed for callers that resolve candidates
/// before calling [`verify_authentication`].
#[must_use]
pub fn credential_ids_match(asserted: &str, stored: &str) -> bool {
    ct_eq(asserted.as_bytes(), stored.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelyingPartyConfig;

    fn config() -> RelyingPartyConfig {
        RelyingPartyConfig::new("Example Co", "example.com", vec![0u8; 32])
            .with_origin("https://example.com")
    }

    #[test]
    fn build_request_options_omits_allow_credentials_when_empty() {
        let opts = build_request_options(&config(), &AuthenticationOptionsOverrides::default());
        assert!(opts.options.allow_credentials.is_none());
        assert_eq!(opts.options.rp_id.as_deref(), Some("example.com"));
    }

    #[test]
    fn counter_rule_table() {
        let cases = [(0u32, 0u32, true), (1, 0, true), (1, 1, false), (1, 2, true), (2, 1, false)];
        for (new, old, expect_ok) in cases {
            let ok = (new == 0 && old == 0) || new > old;
            assert_eq!(ok, expect_ok, "new={new} old={old}");
        }
    }

    #[test]
    fn credential_id_mismatch_short_circuits() {
        assert!(!credential_ids_match("a", "b"));
        assert!(credential_ids_match("same", "same"));
    }
}
