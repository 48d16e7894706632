//! Shared fixtures for the integration tests: building CBOR attestation
//! objects, authenticator data, and signed assertions from scratch, the way
//! a real authenticator would produce them on the wire.

#![allow(dead_code)]

use ed25519_dalek::Signer as Ed25519Signer;
use p256::ecdsa::signature::Signer as P256Signer;
use passkey_core::crypto::cbor::{self, Value};
use passkey_core::crypto::hash::sha256;
use passkey_core::encoding::b64url_encode;
use passkey_core::wire::{
    AuthenticationCredential, AuthenticationResponse, RegistrationCredential, RegistrationResponse,
};

pub struct Es256Keypair {
    pub signing_key: p256::ecdsa::SigningKey,
    pub cose_key_bytes: Vec<u8>,
}

pub fn es256_keypair() -> Es256Keypair {
    let signing_key = p256::ecdsa::SigningKey::random(&mut rand_core::OsRng);
    let point = signing_key.verifying_key().to_encoded_point(false);
    let x = point.x().expect("uncompressed point has x").to_vec();
    let y = point.y().expect("uncompressed point has y").to_vec();
    let cose_key_bytes = cbor::encode(&Value::Map(vec![
        (Value::Uint(1), Value::Uint(2)),
        (Value::Uint(3), Value::NegInt(-7)),
        (Value::NegInt(-1), Value::Uint(1)),
        (Value::NegInt(-2), Value::Bytes(x)),
        (Value::NegInt(-3), Value::Bytes(y)),
    ]))
    .expect("cose map encodes");
    Es256Keypair {
        signing_key,
        cose_key_bytes,
    }
}

pub fn sign_es256(key: &p256::ecdsa::SigningKey, message: &[u8]) -> Vec<u8> {
    let signature: p256::ecdsa::Signature = key.sign(message);
    signature.to_der().as_bytes().to_vec()
}

pub struct Ed25519Keypair {
    pub signing_key: ed25519_dalek::SigningKey,
    pub cose_key_bytes: Vec<u8>,
}

pub fn ed25519_keypair() -> Ed25519Keypair {
    let signing_key = ed25519_dalek::SigningKey::generate(&mut rand_core::OsRng);
    let public_bytes = signing_key.verifying_key().to_bytes().to_vec();
    let cose_key_bytes = cbor::encode(&Value::Map(vec![
        (Value::Uint(1), Value::Uint(1)),
        (Value::Uint(3), Value::NegInt(-8)),
        (Value::NegInt(-1), Value::Uint(6)),
        (Value::NegInt(-2), Value::Bytes(public_bytes)),
    ]))
    .expect("cose map encodes");
    Ed25519Keypair {
        signing_key,
        cose_key_bytes,
    }
}

pub fn sign_ed25519(key: &ed25519_dalek::SigningKey, message: &[u8]) -> Vec<u8> {
    key.sign(message).to_bytes().to_vec()
}

pub fn build_authenticator_data(
    rp_id: &str,
    flags: u8,
    counter: u32,
    attested: Option<(&[u8; 16], &[u8], &[u8])>,
) -> Vec<u8> {
    let mut data = sha256(rp_id.as_bytes()).to_vec();
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    if let Some((aaguid, credential_id, cose_key_bytes)) = attested {
        data.extend_from_slice(aaguid);
        data.extend_from_slice(&u16::try_from(credential_id.len()).unwrap().to_be_bytes());
        data.extend_from_slice(credential_id);
        data.extend_from_slice(cose_key_bytes);
    }
    data
}

pub fn build_attestation_object(auth_data: &[u8]) -> Vec<u8> {
    cbor::encode(&Value::Map(vec![
        (Value::Text("fmt".into()), Value::Text("none".into())),
        (Value::Text("attStmt".into()), Value::Map(vec![])),
        (Value::Text("authData".into()), Value::Bytes(auth_data.to_vec())),
    ]))
    .expect("attestation object encodes")
}

pub fn build_client_data_b64url(type_: &str, challenge: &str, origin: &str) -> (Vec<u8>, String) {
    let json = serde_json::json!({
        "type": type_,
        "challenge": challenge,
        "origin": origin,
        "crossOrigin": false,
    });
    let bytes = serde_json::to_vec(&json).expect("client data serializes");
    let b64 = b64url_encode(&bytes);
    (bytes, b64)
}

pub fn registration_credential(
    credential_id: &str,
    client_data_json: String,
    attestation_object: Vec<u8>,
) -> RegistrationCredential {
    RegistrationCredential {
        id: credential_id.to_string(),
        raw_id: credential_id.to_string(),
        response: RegistrationResponse {
            client_data_json,
            attestation_object: b64url_encode(&attestation_object),
            transports: Some(vec!["internal".to_string()]),
        },
        authenticator_attachment: Some("platform".to_string()),
        client_extension_results: serde_json::json!({}),
        type_: "public-key".to_string(),
    }
}

pub fn authentication_credential(
    credential_id: &str,
    client_data_json: String,
    authenticator_data: Vec<u8>,
    signature: Vec<u8>,
) -> AuthenticationCredential {
    AuthenticationCredential {
        id: credential_id.to_string(),
        raw_id: credential_id.to_string(),
        response: AuthenticationResponse {
            client_data_json,
            authenticator_data: b64url_encode(&authenticator_data),
            signature: b64url_encode(&signature),
            user_handle: None,
        },
        authenticator_attachment: Some("platform".to_string()),
        client_extension_results: serde_json::json!({}),
        type_: "public-key".to_string(),
    }
}
