//! SQLite variable-length integers.
//!
//! A varint is 1-9 bytes, big-endian. Each of the first eight bytes carries
//! seven bits of the value, with the high bit set when another byte follows.
//! A ninth byte, if reached, contributes all eight of its bits.

use crate::sqlite::error::{Error, Result};

/// Longest possible encoding in bytes
pub const MAX_VARINT_LEN: usize = 9;

/// Utility functions for handling SQLite variable-length integers (varints)
pub trait Varint {
    /// Decodes the varint at the start of the slice and returns the value and
    /// the number of bytes consumed.
    ///
    /// Stops at the end of the slice when the encoding is cut short, in which
    /// case the byte count is whatever was available.
    fn read_varint(&self) -> (u64, usize);

    /// Like [`Varint::read_varint`], but a cut-short encoding is an error.
    fn try_read_varint(&self) -> Result<(u64, usize)>;
}

impl Varint for [u8] {
    fn read_varint(&self) -> (u64, usize) {
        let (value, len, _) = decode(self);
        (value, len)
    }

    fn try_read_varint(&self) -> Result<(u64, usize)> {
        match decode(self) {
            (value, len, true) => Ok((value, len)),
            _ => Err(Error::MalformedVarint),
        }
    }
}

fn decode(bytes: &[u8]) -> (u64, usize, bool) {
    let mut value = 0u64;

    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        if i == MAX_VARINT_LEN - 1 {
            value = (value << 8) | byte as u64;
            return (value, MAX_VARINT_LEN, true);
        }
        value = (value << 7) | (byte & 0x7f) as u64;
        if byte & 0x80 == 0 {
            return (value, i + 1, true);
        }
    }

    (value, bytes.len().min(MAX_VARINT_LEN), false)
}

/// Encodes `value` in the shortest varint form
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    if value & 0xff00_0000_0000_0000 != 0 {
        let mut out = vec![0u8; MAX_VARINT_LEN];
        out[8] = value as u8;
        value >>= 8;
        for byte in out[..8].iter_mut().rev() {
            *byte = (value & 0x7f) as u8 | 0x80;
            value >>= 7;
        }
        return out;
    }

    let mut out = Vec::with_capacity(8);
    loop {
        out.push((value & 0x7f) as u8);
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    out.reverse();

    let last = out.len() - 1;
    for byte in &mut out[..last] {
        *byte |= 0x80;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_two_byte_values() {
        assert_eq!([0x7fu8].read_varint(), (127, 1));
        assert_eq!([0x81u8, 0x00].read_varint(), (128, 2));
        assert_eq!([0x00u8, 0xff].read_varint(), (0, 1));
    }

    #[test]
    fn test_nine_byte_value_uses_full_last_byte() {
        let bytes = [0xffu8; 9];
        assert_eq!(bytes.read_varint(), (u64::MAX, 9));
    }

    #[test]
    fn test_round_trip_across_lengths() -> Result<()> {
        let samples = [
            0u64,
            1,
            127,
            128,
            240,
            16_383,
            16_384,
            2_097_151,
            2_097_152,
            (1 << 35) + 17,
            (1 << 49) - 1,
            (1 << 56) - 1,
            1 << 56,
            u64::MAX - 1,
            u64::MAX,
        ];
        for n in samples {
            let encoded = encode_varint(n);
            assert!((1..=MAX_VARINT_LEN).contains(&encoded.len()));
            assert_eq!(encoded.as_slice().try_read_varint()?, (n, encoded.len()));
        }
        Ok(())
    }

    #[test]
    fn test_encoding_lengths() {
        assert_eq!(encode_varint(127).len(), 1);
        assert_eq!(encode_varint(128).len(), 2);
        assert_eq!(encode_varint((1 << 56) - 1).len(), 8);
        assert_eq!(encode_varint(1 << 56).len(), 9);
    }

    #[test]
    fn test_truncated_input_reports_available_bytes() {
        assert_eq!([0x81u8, 0x82].read_varint().1, 2);
        assert_eq!([0u8; 0].read_varint(), (0, 0));
        assert!(matches!(
            [0x81u8, 0x82].try_read_varint(),
            Err(Error::MalformedVarint)
        ));
        assert!(matches!(
            [0u8; 0].try_read_varint(),
            Err(Error::MalformedVarint)
        ));
    }
}
