// src/encode/dct/stream.rs

//! Byte serialization of scanned coefficients.
//!
//! A coefficient in `[-127, 127]` is one byte, its two's-complement `i8`
//! bit pattern. Anything wider is written as the escape byte `0x80` (which
//! is `-128` as `i8`) followed by the value as a big-endian `i16`. Images
//! without escapes therefore produce exactly one byte per sample.

use crate::utils::error::{CodecError, Result};

/// Marks a two-byte coefficient.
pub const ESCAPE: u8 = 0x80;

/// Bytes taken by an escaped coefficient.
pub const MAX_TOKEN_LEN: usize = 3;

/// Bytes needed for `value`.
#[inline]
pub fn token_len(value: i16) -> usize {
    if fits_byte(value) { 1 } else { MAX_TOKEN_LEN }
}

#[inline]
fn fits_byte(value: i16) -> bool {
    (-127..=127).contains(&value)
}

/// Appends the tokens for `values` to `out`; returns how many were escaped.
pub fn write_coefficients(values: &[i16], out: &mut Vec<u8>) -> usize {
    let mut escaped = 0;
    out.reserve(values.len());
    for &value in values {
        if fits_byte(value) {
            out.push(value as i8 as u8);
        } else {
            out.push(ESCAPE);
            out.extend_from_slice(&value.to_be_bytes());
            escaped += 1;
        }
    }
    escaped
}

/// Parses exactly `count` coefficients from `bytes`.
///
/// Fails with `CorruptStream` if the tokens run out early, an escape is cut
/// short, or bytes are left over.
pub fn read_coefficients(bytes: &[u8], count: usize) -> Result<Vec<i16>> {
    if bytes.len() == count && !bytes.contains(&ESCAPE) {
        let signed: &[i8] = bytemuck::cast_slice(bytes);
        return Ok(signed.iter().map(|&v| v as i16).collect());
    }

    let mut values = Vec::with_capacity(count);
    let mut pos = 0;
    while pos < bytes.len() {
        if values.len() == count {
            return Err(CodecError::corrupt(format!(
                "{} bytes left after {} coefficients",
                bytes.len() - pos,
                count
            )));
        }
        let byte = bytes[pos];
        if byte == ESCAPE {
            let wide = bytes.get(pos + 1..pos + 3).ok_or_else(|| {
                CodecError::corrupt(format!("escape at byte {} is cut short", pos))
            })?;
            values.push(i16::from_be_bytes([wide[0], wide[1]]));
            pos += 3;
        } else {
            values.push(byte as i8 as i16);
            pos += 1;
        }
    }

    if values.len() != count {
        return Err(CodecError::corrupt(format!(
            "stream holds {} coefficients, expected {}",
            values.len(),
            count
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_narrow_values_are_one_byte_each() {
        let values: Vec<i16> = (-127..=127).collect();
        let mut bytes = Vec::new();
        assert_eq!(write_coefficients(&values, &mut bytes), 0);
        assert_eq!(bytes.len(), values.len());
        assert!(!bytes.contains(&ESCAPE));

        // the byte is the i8 bit pattern, in both directions
        let as_i8: &[i8] = bytemuck::cast_slice(&bytes);
        for (&v, &b) in values.iter().zip(as_i8) {
            assert_eq!(v, b as i16);
        }
        assert_eq!(read_coefficients(&bytes, values.len()).unwrap(), values);
    }

    #[test]
    fn test_wide_values_are_escaped() {
        let values = [0i16, -128, 341, -1024, 5];
        let mut bytes = Vec::new();
        assert_eq!(write_coefficients(&values, &mut bytes), 3);
        assert_eq!(bytes.len(), 2 + 3 * 3);
        assert_eq!(&bytes[1..4], &[ESCAPE, 0xFF, 0x80]);
        assert_eq!(read_coefficients(&bytes, values.len()).unwrap(), values);
    }

    #[test]
    fn test_token_len() {
        assert_eq!(token_len(127), 1);
        assert_eq!(token_len(-127), 1);
        assert_eq!(token_len(-128), 3);
        assert_eq!(token_len(i16::MAX), 3);
    }

    #[test]
    fn test_count_mismatch_is_corrupt() {
        let bytes = [1u8, 2, 3];
        assert!(matches!(
            read_coefficients(&bytes, 4),
            Err(CodecError::CorruptStream(_))
        ));
        assert!(matches!(
            read_coefficients(&bytes, 2),
            Err(CodecError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_cut_escape_is_corrupt() {
        let bytes = [1u8, ESCAPE, 0x01];
        assert!(matches!(
            read_coefficients(&bytes, 2),
            Err(CodecError::CorruptStream(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_coefficients_roundtrip(values in proptest::collection::vec(any::<i16>(), 0..512)) {
            let mut bytes = Vec::new();
            write_coefficients(&values, &mut bytes);
            let expected_len: usize = values.iter().map(|&v| token_len(v)).sum();
            prop_assert_eq!(bytes.len(), expected_len);
            prop_assert_eq!(read_coefficients(&bytes, values.len()).unwrap(), values);
        }
    }
}
