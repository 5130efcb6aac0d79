//! Capacity model: how many bits a message needs and whether they fit.

use super::bits::frame_message;
use super::error::CodecError;

/// Bits needed to embed `message` including its varint length prefix.
pub fn required_bits(message: &[u8]) -> usize {
    frame_message(message).len() * 8
}

/// Rejects a message whose framed size exceeds the carrier's capacity.
///
/// Every codec calls this (or an equivalent stricter check) before the
/// output carrier is allocated.
pub fn check_capacity(needed: usize, capacity: usize) -> Result<(), CodecError> {
    if needed > capacity {
        return Err(CodecError::CapacityExceeded { needed, capacity });
    }
    Ok(())
}
