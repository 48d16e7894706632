//! Property-based tests for the pieces of the core that are best described
//! by an invariant rather than a fixed example table: config validation
//! boundaries, Base64URL round-tripping, CBOR round-tripping, and the
//! counter-advance rule.

use passkey_core::config::RelyingPartyConfig;
use passkey_core::constants::defaults;
use passkey_core::crypto::cbor::{decode, encode, Value};
use passkey_core::encoding::{b64url_decode, b64url_encode, is_base64url};
use proptest::prelude::*;

fn config_with(token_secret_len: usize, challenge_size: usize, timeout_ms: u64) -> RelyingPartyConfig {
    RelyingPartyConfig::new("Example Co", "example.com", vec![0u8; token_secret_len])
        .with_origin("https://example.com")
        .with_challenge_size_bytes(challenge_size)
        .with_operation_timeout_ms(timeout_ms)
}

proptest! {
    #[test]
    fn config_validation_matches_documented_boundaries(
        token_secret_len in 0usize..80,
        challenge_size in 0usize..100,
        timeout_ms in 0u64..200_000,
    ) {
        let cfg = config_with(token_secret_len, challenge_size, timeout_ms);
        let expect_ok = token_secret_len >= defaults::MIN_TOKEN_SECRET_LEN
            && (defaults::MIN_CHALLENGE_SIZE_BYTES..=defaults::MAX_CHALLENGE_SIZE_BYTES)
                .contains(&challenge_size)
            && timeout_ms >= defaults::MIN_OPERATION_TIMEOUT_MS;
        prop_assert_eq!(cfg.validate().is_ok(), expect_ok);
    }

    #[test]
    fn base64url_roundtrips_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let encoded = b64url_encode(&bytes);
        prop_assert!(is_base64url(&encoded));
        let decoded = b64url_decode(&encoded).unwrap();
        prop_assert_eq!(decoded, bytes);
    }

    #[test]
    fn cbor_roundtrips_uint_negint_bytes_text(
        u in any::<u64>(),
        n in any::<i64>(),
        bytes in prop::collection::vec(any::<u8>(), 0..64),
        text in "[a-zA-Z0-9]{0,32}",
    ) {
        for value in [
            Value::Uint(u),
            Value::NegInt(n.min(-1)),
            Value::Bytes(bytes.clone()),
            Value::Text(text.clone()),
        ] {
            let encoded = encode(&value).unwrap();
            let decoded = decode(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
        }
    }

    #[test]
    fn cbor_map_roundtrips_with_mixed_key_types(
        int_key in any::<u8>(),
        text_key in "[a-z]{1,16}",
        val_a in any::<u64>(),
        val_b in "[a-z]{0,16}",
    ) {
        let map = Value::Map(vec![
            (Value::Uint(u64::from(int_key)), Value::Uint(val_a)),
            (Value::Text(text_key.clone()), Value::Text(val_b.clone())),
        ]);
        let encoded = encode(&map).unwrap();
        let decoded = decode(&encoded).unwrap();
        prop_assert_eq!(&decoded, &map);
        prop_assert_eq!(decoded.map_get_int(i64::from(int_key)).unwrap().as_i64(), Some(val_a as i64));
        prop_assert_eq!(decoded.map_get_text(&text_key).unwrap().as_text(), Some(val_b.as_str()));
    }

    #[test]
    fn counter_rule_matches_strict_advance_with_double_zero_exception(
        new in 0u32..1000,
        old in 0u32..1000,
    ) {
        let accepted = !(new == 0 && old == 0) && new <= old;
        let expect_accept_error = accepted;
        let rule_allows = (new == 0 && old == 0) || new > old;
        prop_assert_eq!(!expect_accept_error, rule_allows);
    }
}
