//! Session token codec: a self-describing, AEAD-sealed envelope
//! carrying a session id and its claims.
//!
//! The nonce-prepended-to-ciphertext storage idiom here mirrors the
//! `aes-gcm` sealing pattern used elsewhere in this codebase's Redis-backed
//! OAuth token store, generalized to a self-describing `{salt, iv, data,
//! tag}` envelope with a fresh per-token key instead of one static key.

use aes_gcm::aead::generic_array::typenum::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{AesGcm, Key, Nonce};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::constants::defaults;
use crate::crypto::hash::random_bytes;
use crate::encoding::{b64url_decode, b64url_encode};
use crate::error::{AuthError, Result};
use crate::model::Session;

type Aes256Gcm16 = AesGcm<aes_gcm::aes::Aes256, U16>;
type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct Envelope {
    salt: String,
    iv: String,
    data: String,
    tag: String,
}

#[derive(Serialize, Deserialize)]
struct TokenPayload {
    session_id: String,
    data: Session,
    created_at: DateTime<Utc>,
}

/// The decoded contents of an opened session token.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedToken {
    /// The session identifier carried in the payload.
    pub session_id: String,
    /// The session claims.
    pub session: Session,
    /// When the token was sealed.
    pub created_at: DateTime<Utc>,
}

fn derive_key(salt: &[u8], token_secret: &[u8]) -> Result<zeroize::Zeroizing<[u8; 32]>> {
    let mut mac = HmacSha256::new_from_slice(salt)
        .map_err(|_| AuthError::TokenCreationFailed)?;
    mac.update(token_secret);
    let key: [u8; 32] = mac.finalize().into_bytes().into();
    Ok(zeroize::Zeroizing::new(key))
}

/// Seal `session` (keyed by `session_id`) into an opaque, Base64URL token.
///
/// # Errors
///
/// Returns [`AuthError::TokenCreationFailed`] only on entropy exhaustion or
/// serialization failure; this function does not fail on well-formed input
/// under normal operation.
pub fn seal(session_id: &str, session: &Session, token_secret: &[u8]) -> Result<String> {
    let salt = random_bytes(defaults::TOKEN_SALT_LEN);
    let iv = random_bytes(defaults::TOKEN_IV_LEN);
    let key_bytes = derive_key(&salt, token_secret)?;

    let payload = TokenPayload {
        session_id: session_id.to_string(),
        data: session.clone(),
        created_at: Utc::now(),
    };
    let plaintext = serde_json::to_vec(&payload).map_err(|_| AuthError::TokenCreationFailed)?;

    let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key_bytes.as_slice()));
    let nonce = Nonce::<Aes256Gcm16>::from_slice(&iv);
    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_ref())
        .map_err(|_| AuthError::TokenCreationFailed)?;
    if sealed.len() < 16 {
        return Err(AuthError::TokenCreationFailed);
    }
    let tag = sealed.split_off(sealed.len() - 16);

    let envelope = Envelope {
        salt: b64url_encode(&salt),
        iv: b64url_encode(&iv),
        data: b64url_encode(&sealed),
        tag: b64url_encode(&tag),
    };
    let envelope_json =
        serde_json::to_vec(&envelope).map_err(|_| AuthError::TokenCreationFailed)?;
    Ok(b64url_encode(&envelope_json))
}

/// Open a token sealed by [`seal`], recovering its session id, session, and
/// sealing time.
///
/// # Errors
///
/// Any malformed envelope, wrong key, or tampered ciphertext collapses to
/// [`AuthError::InvalidToken`] without further detail, to avoid giving an
/// attacker an oracle for which part of the token was wrong.
pub fn open(token: &str, token_secret: &[u8]) -> Result<OpenedToken> {
    let envelope_json = b64url_decode(token).map_err(|_| AuthError::InvalidToken)?;
    let envelope: Envelope =
        serde_json::from_slice(&envelope_json).map_err(|_| AuthError::InvalidToken)?;

    let salt = b64url_decode(&envelope.salt).map_err(|_| AuthError::InvalidToken)?;
    let iv = b64url_decode(&envelope.iv).map_err(|_| AuthError::InvalidToken)?;
    let data = b64url_decode(&envelope.data).map_err(|_| AuthError::InvalidToken)?;
    let tag = b64url_decode(&envelope.tag).map_err(|_| AuthError::InvalidToken)?;

    if iv.len() != defaults::TOKEN_IV_LEN || tag.len() != 16 {
        return Err(AuthError::InvalidToken);
    }

    let key_bytes = derive_key(&salt, token_secret).map_err(|_| AuthError::InvalidToken)?;
    let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key_bytes.as_slice()));
    let nonce = Nonce::<Aes256Gcm16>::from_slice(&iv);

    let mut ciphertext = data;
    ciphertext.extend_from_slice(&tag);

    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| AuthError::InvalidToken)?;

    let payload: TokenPayload =
        serde_json::from_slice(&plaintext).map_err(|_| AuthError::InvalidToken)?;

    Ok(OpenedToken {
        session_id: payload.session_id,
        session: payload.data,
        created_at: payload.created_at,
    })
}

/// Generate a fresh 32-byte, CSPRNG-backed session identifier.
#[must_use]
pub fn generate_session_id() -> String {
    b64url_encode(&random_bytes(defaults::SESSION_ID_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_session() -> Session {
        Session {
            session_id: "sid".into(),
            user_id: "u1".into(),
            credential_id: "c1".into(),
            user_verified: true,
            expires_at: Utc::now() + chrono::Duration::hours(1),
            extra: HashMap::new(),
        }
    }

    #[test]
    fn seal_then_open_roundtrips() {
        let secret = vec![7u8; 32];
        let session = sample_session();
        let token = seal("sid", &session, &secret).unwrap();
        let opened = open(&token, &secret).unwrap();
        assert_eq!(opened.session_id, "sid");
        assert_eq!(opened.session, session);
    }

    #[test]
    fn tampering_last_character_invalidates_token() {
        let secret = vec![7u8; 32];
        let session = sample_session();
        let mut token = seal("sid", &session, &secret).unwrap();
        let last = token.pop().unwrap();
        let replacement = if last == 'A' { 'B' } else { 'A' };
        token.push(replacement);
        assert!(matches!(open(&token, &secret), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn wrong_secret_invalidates_token() {
        let secret = vec![7u8; 32];
        let other_secret = vec![9u8; 32];
        let session = sample_session();
        let token = seal("sid", &session, &secret).unwrap();
        assert!(matches!(
            open(&token, &other_secret),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn generated_session_ids_are_unique_and_base64url() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(crate::encoding::is_base64url(&a));
    }
}
