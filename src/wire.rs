//! JSON wire types shared by registration and authentication,
//! plus the ceremony-context checks both share (challenge/origin/RP-ID).

use serde::{Deserialize, Serialize};

use crate::config::RelyingPartyConfig;
use crate::crypto::hash::sha256;
use crate::encoding::{b64url_decode, ct_eq};
use crate::error::{AuthError, Result};

/// `PublicKeyCredentialRpEntity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpEntity {
    /// RP ID (domain label).
    pub id: String,
    /// Human-readable RP name.
    pub name: String,
}

/// `PublicKeyCredentialUserEntity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntity {
    /// Base64URL-encoded WebAuthn user handle.
    pub id: String,
    /// Login/display username.
    pub name: String,
    /// Display name shown to the user.
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// `{type: "public-key", alg}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubKeyCredParam {
    /// Always `"public-key"`.
    #[serde(rename = "type")]
    pub type_: String,
    /// COSE algorithm identifier.
    pub alg: i64,
}

/// `PublicKeyCredentialDescriptor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialDescriptor {
    /// Always `"public-key"`.
    #[serde(rename = "type")]
    pub type_: String,
    /// Base64URL credential id.
    pub id: String,
    /// Transport hints, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

/// `authenticatorSelection`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthenticatorSelectionWire {
    /// Attachment hint.
    #[serde(rename = "authenticatorAttachment", skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    /// Resident-key requirement.
    #[serde(rename = "residentKey", skip_serializing_if = "Option::is_none")]
    pub resident_key: Option<String>,
    /// Legacy boolean mirror of `residentKey == "required"`.
    #[serde(rename = "requireResidentKey", skip_serializing_if = "Option::is_none")]
    pub require_resident_key: Option<bool>,
    /// User-verification requirement.
    #[serde(rename = "userVerification", skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

/// `PublicKeyCredentialCreationOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptions {
    /// Base64URL challenge.
    pub challenge: String,
    /// Relying-party entity.
    pub rp: RpEntity,
    /// User entity.
    pub user: UserEntity,
    /// Offered algorithms, in priority order.
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    /// Client-facing operation timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Credentials the authenticator should refuse to re-register.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_credentials: Option<Vec<CredentialDescriptor>>,
    /// Authenticator selection hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionWire>,
    /// Attestation conveyance preference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
    /// Extension inputs, passed through opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// `PublicKeyCredentialRequestOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// Base64URL challenge.
    pub challenge: String,
    /// Client-facing operation timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Expected RP ID, if different from the credential's origin host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    /// Credentials the client may use to satisfy this ceremony.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<Vec<CredentialDescriptor>>,
    /// User-verification requirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
    /// Extension inputs, passed through opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// `RegistrationCredential` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationResponse {
    /// Base64URL-encoded client data.
    pub client_data_json: String,
    /// Base64URL-encoded CBOR attestation object (or, under the mobile
    /// compatibility path, a JSON blob — see [`crate::registration`]).
    pub attestation_object: String,
    /// Transports reported by the authenticator.
    #[serde(default)]
    pub transports: Option<Vec<String>>,
}

/// `RegistrationCredential` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationCredential {
    /// Base64URL credential id.
    pub id: String,
    /// Raw (Base64URL) credential id, identical to `id` for this wire form.
    pub raw_id: String,
    /// The authenticator's response payload.
    pub response: RegistrationResponse,
    /// Reported attachment, if any.
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
    /// Extension outputs, passed through opaquely.
    #[serde(default)]
    pub client_extension_results: serde_json::Value,
    /// Always `"public-key"`.
    #[serde(rename = "type")]
    pub type_: String,
}

/// `AuthenticationCredential` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    /// Base64URL-encoded client data.
    pub client_data_json: String,
    /// Base64URL-encoded `authData`.
    pub authenticator_data: String,
    /// Base64URL-encoded signature.
    pub signature: String,
    /// Base64URL-encoded user handle, for discoverable-credential flows.
    #[serde(default)]
    pub user_handle: Option<String>,
}

/// `AuthenticationCredential` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationCredential {
    /// Base64URL credential id.
    pub id: String,
    /// Raw (Base64URL) credential id, identical to `id` for this wire form.
    pub raw_id: String,
    /// The authenticator's response payload.
    pub response: AuthenticationResponse,
    /// Reported attachment, if any.
    #[serde(default)]
    pub authenticator_attachment: Option<String>,
    /// Extension outputs, passed through opaquely.
    #[serde(default)]
    pub client_extension_results: serde_json::Value,
    /// Always `"public-key"`.
    #[serde(rename = "type")]
    pub type_: String,
}

/// `clientDataJSON` payload, decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientData {
    /// `"webauthn.create"` or `"webauthn.get"`.
    #[serde(rename = "type")]
    pub type_: String,
    /// Base64URL challenge as echoed by the client.
    pub challenge: String,
    /// Origin the ceremony ran in.
    pub origin: String,
    /// Whether the request came from a cross-origin iframe.
    #[serde(default, rename = "crossOrigin")]
    pub cross_origin: Option<bool>,
}

/// Decode and parse `clientDataJSON`, returning both the raw bytes (needed
/// for `clientDataHash`) and the parsed structure.
///
/// # Errors
///
/// Returns [`AuthError::InvalidClientDataType`] on any Base64URL, UTF-8, or
/// JSON decode failure — a client that cannot produce parseable client data
/// has not met the ceremony's minimum contract, regardless of which layer
/// rejected it.
pub fn decode_client_data(client_data_json_b64url: &str) -> Result<(Vec<u8>, ClientData)> {
    let bytes =
        b64url_decode(client_data_json_b64url).map_err(|_| AuthError::InvalidClientDataType)?;
    let parsed: ClientData =
        serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidClientDataType)?;
    Ok((bytes, parsed))
}

/// Verify `clientData.type`, `.challenge`, and `.origin` against the
/// ceremony context.
///
/// # Errors
///
/// Returns [`AuthError::InvalidClientDataType`],
/// [`AuthError::ChallengeMismatch`], or [`AuthError::OriginMismatch`].
pub fn verify_client_data_context(
    client_data: &ClientData,
    expected_type: &str,
    expected_challenge: &str,
    expected_origins: &[String],
) -> Result<()> {
    if client_data.type_ != expected_type {
        return Err(AuthError::InvalidClientDataType);
    }
    if !ct_eq(client_data.challenge.as_bytes(), expected_challenge.as_bytes()) {
        return Err(AuthError::ChallengeMismatch);
    }
    if !expected_origins.iter().any(|o| o == &client_data.origin) {
        return Err(AuthError::OriginMismatch);
    }
    Ok(())
}

/// Match `rp_id_hash` against the SHA-256 of each candidate RP ID,
/// returning the first RP ID that matches.
///
/// # Errors
///
/// Returns [`AuthError::RpidMismatch`] if none match.
pub fn match_rp_id<'a>(rp_id_hash: &[u8; 32], candidates: &'a [String]) -> Result<&'a str> {
    candidates
        .iter()
        .find(|candidate| ct_eq(&sha256(candidate.as_bytes()), rp_id_hash))
        .map(String::as_str)
        .ok_or(AuthError::RpidMismatch)
}

/// Resolve the expected origin set: per-call override, else config default.
#[must_use]
pub fn resolve_origins<'a>(
    config: &'a RelyingPartyConfig,
    override_origins: Option<&'a [String]>,
) -> &'a [String] {
    override_origins.unwrap_or(&config.origins)
}

/// Resolve the expected RP-ID set: per-call override, else `[rp_id]`.
#[must_use]
pub fn resolve_rp_ids(config: &RelyingPartyConfig, override_rp_id: Option<&str>) -> Vec<String> {
    override_rp_id.map_or_else(|| vec![config.rp_id.clone()], |id| vec![id.to_string()])
}
