//! Variable-length integer framing.
//!
//! Each byte carries seven value bits, least significant group first. The
//! high bit is set on every byte except the last one. Encodings are minimal:
//! no trailing all-zero continuation group is ever produced.

use super::error::CodecError;

/// Largest value that fits in a single varint byte.
const SEVEN_BIT_MAX: u64 = 0x7F;

/// Continuation flag carried in the high bit.
const CONTINUATION: u8 = 0x80;

/// Encodes a non-negative integer as a minimal varint.
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(10);

    while value > SEVEN_BIT_MAX {
        encoded.push(CONTINUATION | (value & SEVEN_BIT_MAX) as u8);
        value >>= 7;
    }
    encoded.push(value as u8);

    encoded
}

/// Decodes a varint by pulling bytes from `read_byte` until a byte with the
/// continuation bit clear is seen.
///
/// Values that would overflow 64 bits are reported as corrupted data.
pub fn decode_varint<F>(mut read_byte: F) -> Result<u64, CodecError>
where
    F: FnMut() -> Result<u8, CodecError>,
{
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = read_byte()?;
        let group = u64::from(byte & SEVEN_BIT_MAX as u8);

        if shift >= u64::BITS || (group << shift) >> shift != group {
            return Err(CodecError::Corrupted("length prefix overflows".to_string()));
        }
        value |= group << shift;

        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u64) -> u64 {
        let encoded = encode_varint(value);
        let mut bytes = encoded.into_iter();
        decode_varint(|| {
            bytes
                .next()
                .ok_or_else(|| CodecError::Corrupted("eof".to_string()))
        })
        .unwrap()
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(1), vec![0x01]);
        assert_eq!(encode_varint(127), vec![0x7F]);
        assert_eq!(encode_varint(128), vec![0x80, 0x01]);
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
        assert_eq!(encode_varint(16_384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_roundtrip_broad_range() {
        let mut values = vec![0, 1, 127, 128, 255, 256, 16_383, 16_384, u32::MAX as u64];
        values.push(u64::MAX - 1);
        values.push(u64::MAX);
        values.extend((0..64).map(|shift| 1u64 << shift));
        values.extend((1..64).map(|shift| (1u64 << shift) - 1));

        for value in values {
            assert_eq!(roundtrip(value), value, "value {}", value);
        }
    }

    #[test]
    fn test_encoding_is_minimal() {
        for shift in 0..64 {
            let value = 1u64 << shift;
            let encoded = encode_varint(value);

            // Last byte terminates and is never an empty trailing group
            let last = *encoded.last().unwrap();
            assert_eq!(last & CONTINUATION, 0);
            if encoded.len() > 1 {
                assert_ne!(last, 0, "superfluous trailing group for {}", value);
            }

            let expected_len = ((64 - value.leading_zeros()) as usize).div_ceil(7).max(1);
            assert_eq!(encoded.len(), expected_len);
        }
    }

    #[test]
    fn test_decode_stops_at_terminal_byte() {
        let data = [0xAC, 0x02, 0xFF, 0xFF];
        let mut pos = 0;
        let value = decode_varint(|| {
            let byte = data[pos];
            pos += 1;
            Ok(byte)
        })
        .unwrap();

        assert_eq!(value, 300);
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_decode_overflow_is_corruption() {
        let result = decode_varint(|| Ok(0xFF));
        assert!(matches!(result, Err(CodecError::Corrupted(_))));
    }

    #[test]
    fn test_decode_propagates_reader_error() {
        let result = decode_varint(|| Err(CodecError::Corrupted("empty".to_string())));
        assert_eq!(result, Err(CodecError::Corrupted("empty".to_string())));
    }
}
