//! COSE (RFC 8152) public-key parsing, built directly on the [`Value`] tree.

use crate::constants::{cose_alg, cose_crv, cose_kty, cose_map_key};
use crate::crypto::cbor::{self, Value};
use crate::error::{AuthError, Result};

/// An elliptic curve named by its COSE identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// NIST P-256.
    P256,
    /// NIST P-384.
    P384,
    /// NIST P-521.
    P521,
    /// Ed25519.
    Ed25519,
}

/// A parsed COSE public key, tagged by key type. Deliberately a
/// sum type rather than a trait-object hierarchy: callers match on the
/// variant instead of calling through a polymorphic interface.
#[derive(Debug, Clone, PartialEq)]
pub enum CoseKey {
    /// Double-coordinate elliptic-curve key (ECDSA).
    Ec2 {
        /// Explicit algorithm, if present in the key.
        alg: Option<i64>,
        /// The key's curve.
        crv: Curve,
        /// X-coordinate, big-endian, curve-field-width bytes.
        x: Vec<u8>,
        /// Y-coordinate, big-endian, curve-field-width bytes.
        y: Vec<u8>,
    },
    /// RSA key.
    Rsa {
        /// Explicit algorithm, if present in the key.
        alg: Option<i64>,
        /// Modulus, big-endian.
        n: Vec<u8>,
        /// Public exponent, big-endian.
        e: Vec<u8>,
    },
    /// Octet key pair (Ed25519).
    Okp {
        /// Explicit algorithm, if present in the key.
        alg: Option<i64>,
        /// The key's curve (only Ed25519 is recognised).
        crv: Curve,
        /// Public key bytes.
        x: Vec<u8>,
    },
}

impl CoseKey {
    /// The effective algorithm identifier: explicit `alg` if present,
    /// otherwise inferred from key type + curve.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CoseUnknownAlgorithm`] if no `alg` is present and
    /// none can be inferred.
    pub fn algorithm(&self) -> Result<i64> {
        match self {
            Self::Ec2 { alg: Some(a), .. }
            | Self::Rsa { alg: Some(a), .. }
            | Self::Okp { alg: Some(a), .. } => Ok(*a),
            Self::Ec2 { crv, .. } => match crv {
                Curve::P256 => Ok(cose_alg::ES256),
                Curve::P384 => Ok(cose_alg::ES384),
                Curve::P521 => Ok(cose_alg::ES512),
                Curve::Ed25519 => Err(AuthError::CoseUnknownAlgorithm),
            },
            Self::Rsa { .. } => Ok(cose_alg::RS256),
            Self::Okp { crv: Curve::Ed25519, .. } => Ok(cose_alg::EDDSA),
            Self::Okp { .. } => Err(AuthError::CoseUnknownAlgorithm),
        }
    }
}

fn curve_from_id(id: i64) -> Option<Curve> {
    match id {
        cose_crv::P256 => Some(Curve::P256),
        cose_crv::P384 => Some(Curve::P384),
        cose_crv::P521 => Some(Curve::P521),
        cose_crv::ED25519 => Some(Curve::Ed25519),
        _ => None,
    }
}

/// Parse a COSE key from a decoded CBOR map value.
///
/// # Errors
///
/// Returns [`AuthError::CoseMissingKty`], one of the `Cose*Invalid`
/// variants, or [`AuthError::CoseUnsupportedKeyType`].
pub fn parse(value: &Value) -> Result<CoseKey> {
    let kty = value
        .map_get_int(cose_map_key::KTY)
        .and_then(Value::as_i64)
        .ok_or(AuthError::CoseMissingKty)?;
    let alg = value.map_get_int(cose_map_key::ALG).and_then(Value::as_i64);

    match kty {
        cose_kty::EC2 => {
            let crv = value
                .map_get_int(cose_map_key::CRV_OR_N)
                .and_then(Value::as_i64)
                .and_then(curve_from_id)
                .ok_or(AuthError::CoseEc2Invalid)?;
            let x = value
                .map_get_int(cose_map_key::X_OR_E)
                .and_then(Value::as_bytes)
                .ok_or(AuthError::CoseEc2Invalid)?
                .to_vec();
            let y = value
                .map_get_int(cose_map_key::Y)
                .and_then(Value::as_bytes)
                .ok_or(AuthError::CoseEc2Invalid)?
                .to_vec();
            Ok(CoseKey::Ec2 { alg, crv, x, y })
        }
        cose_kty::RSA => {
            let n = value
                .map_get_int(cose_map_key::CRV_OR_N)
                .and_then(Value::as_bytes)
                .ok_or(AuthError::CoseRsaInvalid)?
                .to_vec();
            let e = value
                .map_get_int(cose_map_key::X_OR_E)
                .and_then(Value::as_bytes)
                .ok_or(AuthError::CoseRsaInvalid)?
                .to_vec();
            Ok(CoseKey::Rsa { alg, n, e })
        }
        cose_kty::OKP => {
            let crv = value
                .map_get_int(cose_map_key::CRV_OR_N)
                .and_then(Value::as_i64)
                .and_then(curve_from_id)
                .ok_or(AuthError::CoseOkpInvalid)?;
            let x = value
                .map_get_int(cose_map_key::X_OR_E)
                .and_then(Value::as_bytes)
                .ok_or(AuthError::CoseOkpInvalid)?
                .to_vec();
            Ok(CoseKey::Okp { alg, crv, x })
        }
        _ => Err(AuthError::CoseUnsupportedKeyType),
    }
}

/// Decode raw CBOR bytes and parse them as a COSE key.
///
/// # Errors
///
/// Returns [`AuthError::CborDecode`] if `bytes` is not valid CBOR, or any
/// [`parse`] error if it does not describe a recognised key.
pub fn from_bytes(bytes: &[u8]) -> Result<CoseKey> {
    let value = cbor::decode(bytes)?;
    parse(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ec2_map(alg: Option<i64>, crv: i64, x: Vec<u8>, y: Vec<u8>) -> Value {
        let mut entries = vec![
            (Value::Uint(cose_map_key::KTY as u64), Value::Uint(cose_kty::EC2 as u64)),
            (Value::NegInt(cose_map_key::CRV_OR_N), Value::Uint(crv as u64)),
            (Value::NegInt(cose_map_key::X_OR_E), Value::Bytes(x)),
            (Value::NegInt(cose_map_key::Y), Value::Bytes(y)),
        ];
        if let Some(a) = alg {
            entries.push((Value::Uint(cose_map_key::ALG as u64), Value::NegInt(a)));
        }
        Value::Map(entries)
    }

    #[test]
    fn parses_es256_key_and_infers_algorithm() {
        let x = vec![1u8; 32];
        let y = vec![2u8; 32];
        let value = ec2_map(None, cose_crv::P256, x.clone(), y.clone());
        let key = parse(&value).unwrap();
        match &key {
            CoseKey::Ec2 { crv, x: px, y: py, .. } => {
                assert_eq!(*crv, Curve::P256);
                assert_eq!(px, &x);
                assert_eq!(py, &y);
            }
            _ => panic!("expected EC2"),
        }
        assert_eq!(key.algorithm().unwrap(), cose_alg::ES256);
    }

    #[test]
    fn missing_kty_errors() {
        let value = Value::Map(vec![]);
        assert!(matches!(parse(&value), Err(AuthError::CoseMissingKty)));
    }

    #[test]
    fn unsupported_key_type_errors() {
        let value = Value::Map(vec![(Value::Uint(1), Value::Uint(99))]);
        assert!(matches!(
            parse(&value),
            Err(AuthError::CoseUnsupportedKeyType)
        ));
    }

    #[test]
    fn ec2_missing_y_is_invalid() {
        let value = Value::Map(vec![
            (Value::Uint(1), Value::Uint(2)),
            (Value::NegInt(0), Value::Uint(1)),
            (Value::NegInt(1), Value::Bytes(vec![1; 32])),
        ]);
        assert!(matches!(parse(&value), Err(AuthError::CoseEc2Invalid)));
    }
}
