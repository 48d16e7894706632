//! Registration options generation and response verification.

use serde::{Deserialize, Serialize};

use crate::authenticator_data;
use crate::config::{AuthenticatorSelection, PreferredAuthenticatorType, RelyingPartyConfig};
use crate::constants::defaults;
use crate::crypto::cbor::{self, Value};
use crate::crypto::cose;
use crate::crypto::hash::{random_bytes, sha256};
use crate::encoding::b64url_decode;
use crate::encoding::b64url_encode;
use crate::error::{AuthError, Result};
use crate::model::{DeviceType, Transport};
use crate::wire::{
    self, AuthenticatorSelectionWire, CreationOptions, CredentialDescriptor, PubKeyCredParam,
    RegistrationCredential, RpEntity, UserEntity,
};

const CLIENT_DATA_TYPE_CREATE: &str = "webauthn.create";

/// Per-call overrides for [`build_creation_options`].
#[derive(Debug, Clone, Default)]
pub struct RegistrationOptionsOverrides {
    /// Credentials the authenticator should refuse to re-register.
    pub exclude_credentials: Vec<CredentialDescriptor>,
    /// Authenticator-selection overrides, layered over the config default.
    pub authenticator_selection: Option<AuthenticatorSelection>,
    /// A coarse preferred-authenticator hint, mapped to an attachment.
    pub preferred_authenticator_type: Option<PreferredAuthenticatorType>,
    /// Extension inputs, passed through opaquely.
    pub extensions: Option<serde_json::Value>,
    /// Per-call timeout override.
    pub timeout_ms: Option<u32>,
    /// Per-call attestation preference override.
    pub attestation: Option<crate::config::AttestationPreference>,
}

/// A minimal user-identity input to options generation.
#[derive(Debug, Clone)]
pub struct UserHandleInput<'a> {
    /// Login/display username.
    pub username: &'a str,
    /// Display name shown to the user.
    pub display_name: &'a str,
}

/// The options JSON plus the raw challenge for the caller to persist.
#[derive(Debug, Clone)]
pub struct RegistrationOptions {
    /// The `PublicKeyCredentialCreationOptions` to return to the client.
    pub options: CreationOptions,
    /// The raw challenge string, for persistence via the challenge store.
    pub challenge: String,
    /// The freshly generated WebAuthn user handle (Base64URL).
    pub webauthn_user_id: String,
}

/// Build `PublicKeyCredentialCreationOptions` for a registration ceremony.
#[must_use]
pub fn build_creation_options(
    config: &RelyingPartyConfig,
    user: &UserHandleInput,
    overrides: &RegistrationOptionsOverrides,
) -> RegistrationOptions {
    let challenge_bytes = random_bytes(config.challenge_size_bytes);
    let challenge = b64url_encode(&challenge_bytes);
    let webauthn_user_id = b64url_encode(&random_bytes(defaults::WEBAUTHN_USER_HANDLE_LEN));

    let mut selection = config.authenticator_selection.clone();
    if let Some(ref call_selection) = overrides.authenticator_selection {
        if call_selection.attachment.is_some() {
            selection.attachment = call_selection.attachment;
        }
        selection.resident_key = call_selection.resident_key;
        if call_selection.user_verification.is_some() {
            selection.user_verification = call_selection.user_verification;
        }
    }
    if let Some(preferred) = overrides.preferred_authenticator_type {
        selection.attachment = preferred.to_attachment();
    }
    let uv_policy = selection.user_verification.unwrap_or(config.user_verification_policy);

    let pub_key_cred_params = config
        .supported_algorithms
        .iter()
        .map(|alg| PubKeyCredParam {
            type_: "public-key".into(),
            alg: *alg,
        })
        .collect();

    let exclude_credentials = (!overrides.exclude_credentials.is_empty())
        .then(|| overrides.exclude_credentials.clone());

    let attestation = overrides.attestation.unwrap_or(config.attestation_preference);

    let options = CreationOptions {
        challenge: challenge.clone(),
        rp: RpEntity {
            id: config.rp_id.clone(),
            name: config.rp_name.clone(),
        },
        user: UserEntity {
            id: webauthn_user_id.clone(),
            name: user.username.to_string(),
            display_name: user.display_name.to_string(),
        },
        pub_key_cred_params,
        timeout: Some(
            overrides
                .timeout_ms
                .unwrap_or(u32::try_from(config.operation_timeout_ms).unwrap_or(u32::MAX)),
        ),
        exclude_credentials,
        authenticator_selection: Some(AuthenticatorSelectionWire {
            authenticator_attachment: selection.attachment.map(|a| a.as_str().to_string()),
            resident_key: Some(selection.resident_key.as_str().to_string()),
            require_resident_key: Some(matches!(
                selection.resident_key,
                crate::config::ResidentKeyRequirement::Required
            )),
            user_verification: Some(uv_policy.as_str().to_string()),
        }),
        attestation: Some(attestation.as_str().to_string()),
        extensions: overrides.extensions.clone(),
    };

    RegistrationOptions {
        options,
        challenge,
        webauthn_user_id,
    }
}

/// The non-standard "mobile attestation" compatibility envelope:
/// a JSON blob accepted in place of a CBOR attestation object when
/// [`RelyingPartyConfig::accept_mobile_attestation`] is enabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct MobileAttestationEnvelope {
    /// Base64URL raw CBOR COSE public key bytes.
    public_key: String,
    /// Base64URL credential id.
    credential_id: String,
    /// Optional platform label, informational only.
    #[serde(default)]
    #[allow(dead_code)]
    platform: Option<String>,
}

/// The verified result of a successful registration ceremony.
#[derive(Debug, Clone)]
pub struct VerifiedRegistrationInfo {
    /// Base64URL credential id.
    pub credential_id: String,
    /// Raw CBOR bytes of the credential's COSE public key.
    pub public_key_cose: Vec<u8>,
    /// Signature counter at registration time.
    pub counter: u32,
    /// Transports reported by the authenticator, copied as-is.
    pub transports: Vec<Transport>,
    /// Single- vs multi-device credential.
    pub device_type: DeviceType,
    /// Backup-state bit.
    pub backed_up: bool,
    /// The origin this ceremony ran in.
    pub origin: String,
    /// The RP ID that matched `rp_id_hash`.
    pub matched_rp_id: String,
    /// Whether user verification occurred.
    pub user_verified: bool,
    /// Authenticator Attestation GUID, if attested.
    pub aaguid: Option<String>,
    /// Set when this credential was registered through the mobile
    /// attestation compatibility path.
    pub lower_assurance: bool,
}

fn parse_transports(raw: Option<&[String]>) -> Vec<Transport> {
    raw.map(|transports| {
        transports
            .iter()
            .filter_map(|t| match t.as_str() {
                "usb" => Some(Transport::Usb),
                "nfc" => Some(Transport::Nfc),
                "ble" => Some(Transport::Ble),
                "hybrid" => Some(Transport::Hybrid),
                "internal" => Some(Transport::Internal),
                "cable" => Some(Transport::Cable),
                "smart-card" => Some(Transport::SmartCard),
                _ => None,
            })
            .collect()
    })
    .unwrap_or_default()
}

/// Verify a `create` ceremony response.
///
/// # Errors
///
/// Returns the first failing step's error, per this function's fail-fast
/// ordering.
pub fn verify_registration(
    config: &RelyingPartyConfig,
    credential: &RegistrationCredential,
    expected_challenge: &str,
    expected_origins: Option<&[String]>,
    expected_rp_ids: Option<&[String]>,
    require_user_verification: Option<bool>,
) -> Result<VerifiedRegistrationInfo> {
    let origins = wire::resolve_origins(config, expected_origins);
    let rp_ids = expected_rp_ids
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| wire::resolve_rp_ids(config, None));
    let require_uv =
        require_user_verification.unwrap_or_else(|| config.user_verification_policy.requires_uv());

    let (_, client_data) = wire::decode_client_data(&credential.response.client_data_json)?;
    wire::verify_client_data_context(
        &client_data,
        CLIENT_DATA_TYPE_CREATE,
        expected_challenge,
        origins,
    )?;

    let attestation_bytes = b64url_decode(&credential.response.attestation_object)
        .map_err(|_| AuthError::CborDecode("invalid base64url attestation object".into()))?;

    match cbor::decode(&attestation_bytes) {
        Ok(value) => verify_cbor_attestation(
            &value,
            credential,
            &rp_ids,
            require_uv,
            &client_data.origin,
        ),
        Err(decode_err) => {
            if config.accept_mobile_attestation {
                verify_mobile_attestation(&attestation_bytes, &client_data.origin, &rp_ids)
            } else {
                Err(decode_err)
            }
        }
    }
}

fn verify_cbor_attestation(
    value: &Value,
    credential: &RegistrationCredential,
    rp_ids: &[String],
    require_uv: bool,
    origin: &str,
) -> Result<VerifiedRegistrationInfo> {
    let auth_data_bytes = value
        .map_get_text("authData")
        .or_else(|| value.map_get_int(2))
        .and_then(Value::as_bytes)
        .ok_or(AuthError::MissingCredentialData)?;

    let auth_data = authenticator_data::parse(auth_data_bytes)?;
    let matched_rp_id = wire::match_rp_id(&auth_data.rp_id_hash, rp_ids)?.to_string();
    auth_data.require_flags(true, require_uv)?;

    let attested = auth_data
        .attested_credential_data
        .as_ref()
        .ok_or(AuthError::MissingCredentialData)?;

    // Re-parsing here validates the key shape; the
    // already-parsed key lives on `attested.credential_public_key`.
    cose::parse(&cbor::decode(&attested.credential_public_key_cose)?)?;

    Ok(VerifiedRegistrationInfo {
        credential_id: b64url_encode(&attested.credential_id),
        public_key_cose: attested.credential_public_key_cose.clone(),
        counter: auth_data.counter,
        transports: parse_transports(credential.response.transports.as_deref()),
        device_type: DeviceType::from_backup_eligible(auth_data.backup_eligible()),
        backed_up: auth_data.backup_state(),
        origin: origin.to_string(),
        matched_rp_id,
        user_verified: auth_data.user_verified(),
        aaguid: Some(hex_encode(&attested.aaguid)),
        lower_assurance: false,
    })
}

fn verify_mobile_attestation(
    bytes: &[u8],
    origin: &str,
    rp_ids: &[String],
) -> Result<VerifiedRegistrationInfo> {
    let envelope: MobileAttestationEnvelope = serde_json::from_slice(bytes)
        .map_err(|e| AuthError::CborDecode(format!("invalid mobile attestation envelope: {e}")))?;
    let public_key_cose = b64url_decode(&envelope.public_key)
        .map_err(|_| AuthError::CborDecode("invalid base64url public key".into()))?;
    cose::from_bytes(&public_key_cose)?;
    let credential_id_bytes = b64url_decode(&envelope.credential_id)
        .map_err(|_| AuthError::CborDecode("invalid base64url credential id".into()))?;

    Ok(VerifiedRegistrationInfo {
        credential_id: b64url_encode(&credential_id_bytes),
        public_key_cose,
        counter: 0,
        transports: Vec::new(),
        device_type: DeviceType::SingleDevice,
        backed_up: false,
        origin: origin.to_string(),
        matched_rp_id: rp_ids.first().cloned().unwrap_or_default(),
        user_verified: false,
        aaguid: None,
        lower_assurance: true,
    })
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
