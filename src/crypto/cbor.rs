//! A minimal, first-party CBOR (RFC 8949) codec.
//!
//! Generic CBOR crates typically decode maps straight into string-keyed
//! dictionaries. COSE keys put `kty` at the *integer* map key `1`; coercing
//! that map to a string-keyed dictionary makes the key unreachable. This
//! codec keeps every map as an ordered `Vec<(Value, Value)>` so integer and
//! text keys are both preserved and queryable.

use crate::error::{AuthError, Result};

/// A decoded CBOR value, tagged by RFC 8949 major type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Major type 0: unsigned integer.
    Uint(u64),
    /// Major type 1: negative integer, stored as `-1 - n`.
    NegInt(i64),
    /// Major type 2: byte string.
    Bytes(Vec<u8>),
    /// Major type 3: UTF-8 text string.
    Text(String),
    /// Major type 4: array.
    Array(Vec<Value>),
    /// Major type 5: map, key order preserved, keys not coerced to strings.
    Map(Vec<(Value, Value)>),
    /// Major type 6: semantic tag wrapping one value.
    Tag(u64, Box<Value>),
    /// Major type 7, simple values 20/21.
    Bool(bool),
    /// Major type 7, simple value 22.
    Null,
    /// Major type 7, simple value 23.
    Undefined,
    /// Major type 7, additional info 25/26/27 (half/single/double float).
    Float(f64),
}

impl Value {
    /// This value's bytes, if it is [`Value::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// This value's text, if it is [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /// This value's entries, if it is [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// This value as a signed integer, unifying [`Value::Uint`] and
    /// [`Value::NegInt`].
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Uint(u) => i64::try_from(*u).ok(),
            Self::NegInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a map entry by an integer key, comparing against both
    /// [`Value::Uint`] and [`Value::NegInt`] representations.
    #[must_use]
    pub fn map_get_int(&self, key: i64) -> Option<&Value> {
        let entries = self.as_map()?;
        entries
            .iter()
            .find(|(k, _)| k.as_i64() == Some(key))
            .map(|(_, v)| v)
    }

    /// Look up a map entry by a text key.
    #[must_use]
    pub fn map_get_text(&self, key: &str) -> Option<&Value> {
        let entries = self.as_map()?;
        entries
            .iter()
            .find(|(k, _)| k.as_text() == Some(key))
            .map(|(_, v)| v)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| AuthError::CborDecode("length overflow".into()))?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| AuthError::CborDecode("unexpected end of input".into()))?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }
}

/// Decode a single CBOR value from `bytes`, requiring the entire input be
/// consumed.
///
/// # Errors
///
/// Returns [`AuthError::CborDecode`] on malformed or truncated input, or if
/// trailing bytes remain after the value.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    let value = decode_value(&mut cursor)?;
    if cursor.pos != bytes.len() {
        return Err(AuthError::CborDecode("trailing bytes after value".into()));
    }
    Ok(value)
}

/// Decode a single CBOR value as a prefix of `bytes`, returning the value
/// and the unconsumed remainder.
///
/// # Errors
///
/// Returns [`AuthError::CborDecode`] on malformed or truncated input.
pub fn decode_first(bytes: &[u8]) -> Result<(Value, &[u8])> {
    let mut cursor = Cursor::new(bytes);
    let value = decode_value(&mut cursor)?;
    let rest = &bytes[cursor.pos..];
    Ok((value, rest))
}

fn read_argument(cursor: &mut Cursor, additional_info: u8) -> Result<u64> {
    match additional_info {
        0..=23 => Ok(u64::from(additional_info)),
        24 => Ok(u64::from(cursor.byte()?)),
        25 => {
            let b = cursor.take(2)?;
            Ok(u64::from(u16::from_be_bytes([b[0], b[1]])))
        }
        26 => {
            let b = cursor.take(4)?;
            Ok(u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
        }
        27 => {
            let b = cursor.take(8)?;
            Ok(u64::from_be_bytes([
                b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            ]))
        }
        _ => Err(AuthError::CborDecode(format!(
            "unsupported (indefinite-length) additional info {additional_info}"
        ))),
    }
}

fn decode_value(cursor: &mut Cursor) -> Result<Value> {
    let initial = cursor.byte()?;
    let major = initial >> 5;
    let additional_info = initial & 0x1f;

    match major {
        0 => Ok(Value::Uint(read_argument(cursor, additional_info)?)),
        1 => {
            let arg = read_argument(cursor, additional_info)?;
            let n = i64::try_from(arg)
                .map_err(|_| AuthError::CborDecode("negative integer out of range".into()))?;
            Ok(Value::NegInt(-1 - n))
        }
        2 => {
            let len = read_argument(cursor, additional_info)? as usize;
            Ok(Value::Bytes(cursor.take(len)?.to_vec()))
        }
        3 => {
            let len = read_argument(cursor, additional_info)? as usize;
            let raw = cursor.take(len)?;
            let text = std::str::from_utf8(raw)
                .map_err(|e| AuthError::CborDecode(format!("invalid UTF-8 text string: {e}")))?;
            Ok(Value::Text(text.to_string()))
        }
        4 => {
            let count = read_argument(cursor, additional_info)?;
            let mut items = Vec::with_capacity(usize::try_from(count).unwrap_or(0).min(4096));
            for _ in 0..count {
                items.push(decode_value(cursor)?);
            }
            Ok(Value::Array(items))
        }
        5 => {
            let count = read_argument(cursor, additional_info)?;
            let mut entries = Vec::with_capacity(usize::try_from(count).unwrap_or(0).min(4096));
            for _ in 0..count {
                let key = decode_value(cursor)?;
                let value = decode_value(cursor)?;
                entries.push((key, value));
            }
            Ok(Value::Map(entries))
        }
        6 => {
            let tag = read_argument(cursor, additional_info)?;
            let inner = decode_value(cursor)?;
            Ok(Value::Tag(tag, Box::new(inner)))
        }
        7 => match additional_info {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 => Ok(Value::Null),
            23 => Ok(Value::Undefined),
            25 => {
                let b = cursor.take(2)?;
                Ok(Value::Float(f64::from(half_to_f32(u16::from_be_bytes([
                    b[0], b[1],
                ])))))
            }
            26 => {
                let b = cursor.take(4)?;
                Ok(Value::Float(f64::from(f32::from_be_bytes([
                    b[0], b[1], b[2], b[3],
                ]))))
            }
            27 => {
                let b = cursor.take(8)?;
                Ok(Value::Float(f64::from_be_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ])))
            }
            _ => Err(AuthError::CborDecode(format!(
                "unsupported simple value {additional_info}"
            ))),
        },
        _ => unreachable!("major type is a 3-bit field"),
    }
}

fn half_to_f32(half: u16) -> f32 {
    let sign = u32::from(half >> 15) << 31;
    let exponent = (half >> 10) & 0x1f;
    let mantissa = half & 0x3ff;
    let bits = if exponent == 0 {
        if mantissa == 0 {
            sign
        } else {
            let mut exp = -1i32;
            let mut mant = u32::from(mantissa);
            while mant & 0x400 == 0 {
                mant <<= 1;
                exp -= 1;
            }
            mant &= 0x3ff;
            #[allow(clippy::cast_sign_loss)]
            let biased = (exp + 127 - 14) as u32;
            sign | (biased << 23) | (mant << 13)
        }
    } else if exponent == 0x1f {
        sign | 0xff80_0000 | (u32::from(mantissa) << 13)
    } else {
        sign | ((u32::from(exponent) + (127 - 15)) << 23) | (u32::from(mantissa) << 13)
    };
    f32::from_bits(bits)
}

/// Encode a [`Value`] to its canonical-enough CBOR byte representation.
///
/// Only the subset needed to round-trip [`decode`] output is supported:
/// booleans, null, integers, byte/text strings, arrays, and maps keyed by
/// integers or text. [`Value::Tag`], [`Value::Undefined`], and
/// [`Value::Float`] are rejected.
///
/// # Errors
///
/// Returns [`AuthError::CborEncode`] for unsupported variants.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(value, &mut out)?;
    Ok(out)
}

fn write_header(out: &mut Vec<u8>, major: u8, argument: u64) {
    let major_bits = major << 5;
    match argument {
        0..=23 => out.push(major_bits | u8::try_from(argument).unwrap_or(23)),
        24..=0xff => {
            out.push(major_bits | 24);
            out.push(u8::try_from(argument).unwrap_or(0));
        }
        0x100..=0xffff => {
            out.push(major_bits | 25);
            out.extend_from_slice(&u16::try_from(argument).unwrap_or(0).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(major_bits | 26);
            out.extend_from_slice(&u32::try_from(argument).unwrap_or(0).to_be_bytes());
        }
        _ => {
            out.push(major_bits | 27);
            out.extend_from_slice(&argument.to_be_bytes());
        }
    }
}

fn encode_into(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Uint(u) => write_header(out, 0, *u),
        Value::NegInt(n) => {
            let arg = (-1 - *n).try_into().map_err(|_| {
                AuthError::CborEncode("negative integer out of range".into())
            })?;
            write_header(out, 1, arg);
        }
        Value::Bytes(b) => {
            write_header(out, 2, b.len() as u64);
            out.extend_from_slice(b);
        }
        Value::Text(t) => {
            write_header(out, 3, t.len() as u64);
            out.extend_from_slice(t.as_bytes());
        }
        Value::Array(items) => {
            write_header(out, 4, items.len() as u64);
            for item in items {
                encode_into(item, out)?;
            }
        }
        Value::Map(entries) => {
            write_header(out, 5, entries.len() as u64);
            for (k, v) in entries {
                encode_into(k, out)?;
                encode_into(v, out)?;
            }
        }
        Value::Bool(false) => out.push(0xf4),
        Value::Bool(true) => out.push(0xf5),
        Value::Null => out.push(0xf6),
        Value::Undefined | Value::Float(_) | Value::Tag(_, _) => {
            return Err(AuthError::CborEncode(
                "encoding of this variant is not supported".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_uint_negint_bytes_text() {
        for v in [
            Value::Uint(0),
            Value::Uint(23),
            Value::Uint(24),
            Value::Uint(1000),
            Value::Uint(70_000),
            Value::NegInt(-1),
            Value::NegInt(-1000),
            Value::Bytes(vec![1, 2, 3]),
            Value::Text("hello".into()),
            Value::Bool(true),
            Value::Bool(false),
            Value::Null,
        ] {
            let encoded = encode(&v).unwrap();
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded, v);
        }
    }

    #[test]
    fn roundtrip_array_and_map() {
        let arr = Value::Array(vec![Value::Uint(1), Value::Text("x".into())]);
        let encoded = encode(&arr).unwrap();
        assert_eq!(decode(&encoded).unwrap(), arr);

        let map = Value::Map(vec![
            (Value::Uint(1), Value::Text("kty".into())),
            (Value::NegInt(-1), Value::Bytes(vec![9, 9])),
        ]);
        let encoded = encode(&map).unwrap();
        assert_eq!(decode(&encoded).unwrap(), map);
    }

    #[test]
    fn map_preserves_integer_keys_distinct_from_text() {
        let map = Value::Map(vec![
            (Value::Uint(1), Value::Text("integer-one".into())),
            (Value::Text("1".into()), Value::Text("text-one".into())),
        ]);
        assert_eq!(map.map_get_int(1).unwrap().as_text(), Some("integer-one"));
        assert_eq!(map.map_get_text("1").unwrap().as_text(), Some("text-one"));
    }

    #[test]
    fn decode_first_returns_remainder() {
        let mut bytes = encode(&Value::Uint(1)).unwrap();
        bytes.extend(encode(&Value::Uint(2)).unwrap());
        let (first, rest) = decode_first(&bytes).unwrap();
        assert_eq!(first, Value::Uint(1));
        let (second, rest2) = decode_first(rest).unwrap();
        assert_eq!(second, Value::Uint(2));
        assert!(rest2.is_empty());
    }

    #[test]
    fn truncated_input_errors() {
        assert!(decode(&[0x18]).is_err());
        assert!(decode(&[0x43, 1, 2]).is_err());
    }

    #[test]
    fn indefinite_length_is_rejected() {
        assert!(decode(&[0x5f]).is_err());
    }
}
