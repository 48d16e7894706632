//! Byte/encoding primitives: Base64URL, fixed-width big-endian integers, and
//! constant-time comparison.
//!
//! Base64URL here is RFC 4648 §5 with padding stripped on output and
//! tolerated on input — the representation every WebAuthn wire field uses
//! for challenges, ids, and signatures.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{AuthError, Result};

/// Encode raw bytes as Base64URL with no padding.
#[must_use]
pub fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a Base64URL string, tolerating `=` padding on input.
///
/// # Errors
///
/// Returns [`AuthError::Storage`] on an invalid alphabet or malformed
/// encoding. There is no dedicated decode-error variant in the public
/// taxonomy; callers map this into whatever contextual error fits the call
/// site (`ChallengeMismatch`, `InvalidToken`, …) rather than surfacing it
/// directly.
pub fn b64url_decode(s: &str) -> Result<Vec<u8>> {
    if !is_base64url(s) {
        return Err(AuthError::Storage("invalid base64url alphabet".into()));
    }
    let trimmed = s.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| AuthError::Storage(format!("base64url decode: {e}")))
}

/// Returns `true` exactly when `s` consists only of Base64URL alphabet
/// characters (`A-Z a-z 0-9 - _`), ignoring any trailing `=` padding.
#[must_use]
pub fn is_base64url(s: &str) -> bool {
    let trimmed = s.trim_end_matches('=');
    trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Encode raw bytes as standard Base64 (no padding). Used only where a COSE
/// or wire format explicitly calls for it; WebAuthn fields always use
/// [`b64url_encode`].
#[must_use]
pub fn b64_encode(bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(bytes)
}

/// Parse a big-endian `u16` from the first two bytes of `bytes`.
///
/// # Errors
///
/// Returns `None` if fewer than 2 bytes are available.
#[must_use]
pub fn be_u16(bytes: &[u8]) -> Option<u16> {
    let arr: [u8; 2] = bytes.get(0..2)?.try_into().ok()?;
    Some(u16::from_be_bytes(arr))
}

/// Parse a big-endian `u32` from the first four bytes of `bytes`.
#[must_use]
pub fn be_u32(bytes: &[u8]) -> Option<u32> {
    let arr: [u8; 4] = bytes.get(0..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(arr))
}

/// Constant-time equality check for secret- or signature-like byte strings.
///
/// Short-circuits only on length mismatch; once lengths match, every byte is
/// compared.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && constant_time_eq::constant_time_eq(a, b)
}
