//! Signature verification over the algorithms COSE keys can carry: ECDSA
//! (DER) over P-256/P-384/P-521, RSASSA-PKCS1-v1_5, RSASSA-PSS, and Ed25519.
//! Verification primitives come from the RustCrypto family; only the
//! dispatch and signing-input plumbing around them is first-party.

use ed25519_dalek::Verifier as Ed25519Verifier;
use rsa::pkcs1v15::Pkcs1v15Sign;
use rsa::pss::Pss;
use rsa::{BigUint, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use signature::Verifier as EcdsaVerifier;

use crate::constants::cose_alg;
use crate::crypto::cose::{CoseKey, Curve};
use crate::error::{AuthError, Result};

/// Verify `signature` over `message` using `key`, following the scheme
/// implied by the key's effective algorithm.
///
/// Returns `Ok(true)`/`Ok(false)` for the verification outcome itself;
/// cryptographic failures short of a configuration problem collapse to
/// `Ok(false)` rather than leaking their cause. Unsupported algorithm/key
/// combinations are configuration errors and propagate as `Err`.
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedAlgorithm`] if the key's effective
/// algorithm cannot be dispatched, or a [`AuthError::Cose*`](AuthError) error
/// if the algorithm cannot be determined at all.
pub fn verify(signature: &[u8], message: &[u8], key: &CoseKey) -> Result<bool> {
    let alg = key.algorithm()?;
    match key {
        CoseKey::Ec2 { crv, x, y, .. } => verify_ecdsa(*crv, x, y, alg, signature, message),
        CoseKey::Rsa { n, e, .. } => verify_rsa(n, e, alg, signature, message),
        CoseKey::Okp {
            crv: Curve::Ed25519,
            x,
            ..
        } => Ok(verify_ed25519(x, signature, message)),
        CoseKey::Okp { .. } => Err(AuthError::UnsupportedAlgorithm),
    }
}

fn verify_ecdsa(
    crv: Curve,
    x: &[u8],
    y: &[u8],
    alg: i64,
    signature: &[u8],
    message: &[u8],
) -> Result<bool> {
    match (crv, alg) {
        (Curve::P256, cose_alg::ES256) => Ok(verify_p256(x, y, signature, message)),
        (Curve::P384, cose_alg::ES384) => Ok(verify_p384(x, y, signature, message)),
        (Curve::P521, cose_alg::ES512) => Ok(verify_p521(x, y, signature, message)),
        _ => Err(AuthError::UnsupportedAlgorithm),
    }
}

fn verify_p256(x: &[u8], y: &[u8], signature: &[u8], message: &[u8]) -> bool {
    if x.len() != 32 || y.len() != 32 {
        return false;
    }
    let point = p256::EncodedPoint::from_affine_coordinates(
        p256::FieldBytes::from_slice(x),
        p256::FieldBytes::from_slice(y),
        false,
    );
    let Ok(verifying_key) = p256::ecdsa::VerifyingKey::from_encoded_point(&point) else {
        return false;
    };
    let Ok(sig) = p256::ecdsa::Signature::from_der(signature) else {
        return false;
    };
    verifying_key.verify(message, &sig).is_ok()
}

fn verify_p384(x: &[u8], y: &[u8], signature: &[u8], message: &[u8]) -> bool {
    if x.len() != 48 || y.len() != 48 {
        return false;
    }
    let point = p384::EncodedPoint::from_affine_coordinates(
        p384::FieldBytes::from_slice(x),
        p384::FieldBytes::from_slice(y),
        false,
    );
    let Ok(verifying_key) = p384::ecdsa::VerifyingKey::from_encoded_point(&point) else {
        return false;
    };
    let Ok(sig) = p384::ecdsa::Signature::from_der(signature) else {
        return false;
    };
    verifying_key.verify(message, &sig).is_ok()
}

fn verify_p521(x: &[u8], y: &[u8], signature: &[u8], message: &[u8]) -> bool {
    if x.len() != 66 || y.len() != 66 {
        return false;
    }
    let point = p521::EncodedPoint::from_affine_coordinates(
        p521::FieldBytes::from_slice(x),
        p521::FieldBytes::from_slice(y),
        false,
    );
    let Ok(verifying_key) = p521::ecdsa::VerifyingKey::from_encoded_point(&point) else {
        return false;
    };
    let Ok(sig) = p521::ecdsa::Signature::from_der(signature) else {
        return false;
    };
    verifying_key.verify(message, &sig).is_ok()
}

fn verify_rsa(n: &[u8], e: &[u8], alg: i64, signature: &[u8], message: &[u8]) -> Result<bool> {
    let Ok(public_key) = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
    else {
        return Ok(false);
    };
    match alg {
        cose_alg::RS256 => Ok(verify_pkcs1v15::<Sha256>(&public_key, signature, message)),
        cose_alg::RS384 => Ok(verify_pkcs1v15::<Sha384>(&public_key, signature, message)),
        cose_alg::RS512 => Ok(verify_pkcs1v15::<Sha512>(&public_key, signature, message)),
        cose_alg::PS256 => Ok(verify_pss::<Sha256>(&public_key, signature, message)),
        cose_alg::PS384 => Ok(verify_pss::<Sha384>(&public_key, signature, message)),
        cose_alg::PS512 => Ok(verify_pss::<Sha512>(&public_key, signature, message)),
        _ => Err(AuthError::UnsupportedAlgorithm),
    }
}

fn verify_pkcs1v15<D: Digest>(public_key: &RsaPublicKey, signature: &[u8], message: &[u8]) -> bool {
    let digest = D::digest(message);
    public_key
        .verify(Pkcs1v15Sign::new::<D>(), &digest, signature)
        .is_ok()
}

fn verify_pss<D: Digest>(public_key: &RsaPublicKey, signature: &[u8], message: &[u8]) -> bool {
    let digest = D::digest(message);
    public_key
        .verify(Pss::new::<D>(), &digest, signature)
        .is_ok()
}

fn verify_ed25519(x: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let Ok(x_arr): std::result::Result<[u8; 32], _> = x.try_into() else {
        return false;
    };
    let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(&x_arr) else {
        return false;
    };
    let Ok(sig_arr): std::result::Result<[u8; 64], _> = signature.try_into() else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(&sig_arr);
    verifying_key.verify(message, &sig).is_ok()
}
