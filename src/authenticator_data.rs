//! Parser for the fixed-layout `authData` byte string.

use crate::crypto::cbor;
use crate::crypto::cose::CoseKey;
use crate::encoding::be_u32;
use crate::error::{AuthError, Result};

/// `authData` flag bits.
pub mod flags {
    /// User present.
    pub const UP: u8 = 0x01;
    /// User verified.
    pub const UV: u8 = 0x04;
    /// Backup eligible.
    pub const BE: u8 = 0x08;
    /// Backup state.
    pub const BS: u8 = 0x10;
    /// Attested credential data present.
    pub const AT: u8 = 0x40;
    /// Extensions present.
    pub const ED: u8 = 0x80;
}

/// Attested credential data: present only when the AT flag is set.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestedCredentialData {
    /// Authenticator Attestation GUID.
    pub aaguid: [u8; 16],
    /// Opaque credential identifier.
    pub credential_id: Vec<u8>,
    /// Raw CBOR bytes of the credential's COSE public key, exactly as
    /// delivered by the authenticator.
    pub credential_public_key_cose: Vec<u8>,
    /// The parsed COSE public key.
    pub credential_public_key: CoseKey,
}

/// A parsed `authData` byte string.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatorData {
    /// SHA-256 of the RP ID, as delivered by the authenticator.
    pub rp_id_hash: [u8; 32],
    /// Raw flags byte.
    pub flags: u8,
    /// Monotonic signature counter; 0 means "does not track".
    pub counter: u32,
    /// Present iff the AT flag is set.
    pub attested_credential_data: Option<AttestedCredentialData>,
}

impl AuthenticatorData {
    /// User-present bit.
    #[must_use]
    pub const fn user_present(&self) -> bool {
        self.flags & flags::UP != 0
    }

    /// User-verified bit.
    #[must_use]
    pub const fn user_verified(&self) -> bool {
        self.flags & flags::UV != 0
    }

    /// Backup-eligible bit.
    #[must_use]
    pub const fn backup_eligible(&self) -> bool {
        self.flags & flags::BE != 0
    }

    /// Backup-state bit.
    #[must_use]
    pub const fn backup_state(&self) -> bool {
        self.flags & flags::BS != 0
    }

    /// Attested-credential-data-present bit.
    #[must_use]
    pub const fn has_attested_credential_data(&self) -> bool {
        self.flags & flags::AT != 0
    }

    /// Extensions-present bit.
    #[must_use]
    pub const fn has_extensions(&self) -> bool {
        self.flags & flags::ED != 0
    }

    /// Validate presence/verification flag requirements.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserPresenceRequired`] or
    /// [`AuthError::UserVerificationRequired`] as appropriate.
    pub const fn require_flags(
        &self,
        require_user_presence: bool,
        require_user_verification: bool,
    ) -> Result<()> {
        if require_user_presence && !self.user_present() {
            return Err(AuthError::UserPresenceRequired);
        }
        if require_user_verification && !self.user_verified() {
            return Err(AuthError::UserVerificationRequired);
        }
        Ok(())
    }
}

const FIXED_PREFIX_LEN: usize = 37;
const AAGUID_LEN: usize = 16;

/// Parse the fixed-layout `authData` byte string.
///
/// # Errors
///
/// Returns [`AuthError::AuthenticatorDataTooShort`] if `bytes` is shorter
/// than the 37-byte fixed prefix, or
/// [`AuthError::AuthenticatorDataInvalidCredentialData`] if the AT flag is
/// set but the attested credential data or COSE key is malformed.
pub fn parse(bytes: &[u8]) -> Result<AuthenticatorData> {
    if bytes.len() < FIXED_PREFIX_LEN {
        return Err(AuthError::AuthenticatorDataTooShort);
    }

    let mut rp_id_hash = [0u8; 32];
    rp_id_hash.copy_from_slice(&bytes[0..32]);
    let flags = bytes[32];
    let counter =
        be_u32(&bytes[33..37]).ok_or(AuthError::AuthenticatorDataTooShort)?;

    let rest = &bytes[FIXED_PREFIX_LEN..];
    let attested_credential_data = if flags & self::flags::AT != 0 {
        Some(parse_attested_credential_data(
            rest,
            flags & self::flags::ED != 0,
        )?)
    } else {
        None
    };

    Ok(AuthenticatorData {
        rp_id_hash,
        flags,
        counter,
        attested_credential_data,
    })
}

fn parse_attested_credential_data(
    rest: &[u8],
    has_extensions: bool,
) -> Result<AttestedCredentialData> {
    if rest.len() < AAGUID_LEN + 2 {
        return Err(AuthError::AuthenticatorDataInvalidCredentialData);
    }
    let mut aaguid = [0u8; 16];
    aaguid.copy_from_slice(&rest[0..AAGUID_LEN]);

    let cred_id_len = crate::encoding::be_u16(&rest[AAGUID_LEN..AAGUID_LEN + 2])
        .ok_or(AuthError::AuthenticatorDataInvalidCredentialData)? as usize;
    let cred_id_start = AAGUID_LEN + 2;
    let cred_id_end = cred_id_start
        .checked_add(cred_id_len)
        .ok_or(AuthError::AuthenticatorDataInvalidCredentialData)?;
    let credential_id = rest
        .get(cred_id_start..cred_id_end)
        .ok_or(AuthError::AuthenticatorDataInvalidCredentialData)?
        .to_vec();

    let key_region = &rest[cred_id_end..];
    let (value, key_bytes) = if has_extensions {
        let (value, remainder) = cbor::decode_first(key_region)
            .map_err(|_| AuthError::AuthenticatorDataInvalidCredentialData)?;
        let consumed = key_region.len() - remainder.len();
        (value, key_region[..consumed].to_vec())
    } else {
        let value = cbor::decode(key_region)
            .map_err(|_| AuthError::AuthenticatorDataInvalidCredentialData)?;
        (value, key_region.to_vec())
    };

    let credential_public_key = crate::crypto::cose::parse(&value)
        .map_err(|_| AuthError::AuthenticatorDataInvalidCredentialData)?;

    Ok(AttestedCredentialData {
        aaguid,
        credential_id,
        credential_public_key_cose: key_bytes,
        credential_public_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::cbor::Value;

    fn cose_es256_map() -> Value {
        Value::Map(vec![
            (Value::Uint(1), Value::Uint(2)),
            (Value::NegInt(-1), Value::Uint(1)),
            (Value::NegInt(-2), Value::Bytes(vec![1u8; 32])),
            (Value::NegInt(-3), Value::Bytes(vec![2u8; 32])),
        ])
    }

    fn build_auth_data(flags: u8, counter: u32) -> Vec<u8> {
        let mut data = vec![0u8; 32];
        data.push(flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data
    }

    fn build_auth_data_correct(flags: u8, counter: u32) -> Vec<u8> {
        let mut data = vec![0u8; 32];
        data.push(flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data.extend_from_slice(&[0xaa; 16]);
        let cred_id = b"credential-id-16".to_vec();
        data.extend_from_slice(&(cred_id.len() as u16).to_be_bytes());
        data.extend_from_slice(&cred_id);
        let cose_bytes = cbor::encode(&cose_es256_map()).unwrap();
        data.extend_from_slice(&cose_bytes);
        data
    }

    #[test]
    fn too_short_rejected_at_36_accepted_at_37() {
        assert!(matches!(
            parse(&[0u8; 36]),
            Err(AuthError::AuthenticatorDataTooShort)
        ));
        let parsed = parse(&[0u8; 37]).unwrap();
        assert_eq!(parsed.counter, 0);
        assert!(!parsed.has_attested_credential_data());
    }

    #[test]
    fn parses_flags_and_counter() {
        let data = build_auth_data(flags::UP | flags::UV, 7);
        let parsed = parse(&data).unwrap();
        assert!(parsed.user_present());
        assert!(parsed.user_verified());
        assert!(!parsed.backup_eligible());
        assert_eq!(parsed.counter, 7);
    }

    #[test]
    fn parses_attested_credential_data() {
        let data = build_auth_data_correct(flags::UP | flags::UV | flags::AT, 0);
        let parsed = parse(&data).unwrap();
        assert!(parsed.has_attested_credential_data());
        let cred = parsed.attested_credential_data.unwrap();
        assert_eq!(cred.credential_id, b"credential-id-16");
        assert_eq!(cred.aaguid, [0xaa; 16]);
    }

    #[test]
    fn require_flags_enforces_presence_and_verification() {
        let data = build_auth_data(0, 0);
        let parsed = parse(&data).unwrap();
        assert!(matches!(
            parsed.require_flags(true, false),
            Err(AuthError::UserPresenceRequired)
        ));
        let data = build_auth_data(flags::UP, 0);
        let parsed = parse(&data).unwrap();
        assert!(matches!(
            parsed.require_flags(true, true),
            Err(AuthError::UserVerificationRequired)
        ));
    }
}
