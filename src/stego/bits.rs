//! Bitstream framing and the pull-based bit cursor.
//!
//! Messages are framed as `[varint length][message bytes]` and split into
//! bits least-significant-bit first. Every codec describes where those bits
//! live through a [`Placement`]; the same placement drives both embedding and
//! the [`BitCursor`] used for extraction, which keeps the two directions
//! symmetric.

use super::error::CodecError;
use super::varint::{decode_varint, encode_varint};

/// Physical location of one embedded bit in a carrier sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitLocation {
    /// Index of the sample byte.
    pub offset: usize,
    /// Bit position inside that byte (0 = least significant).
    pub shift: u8,
}

impl BitLocation {
    pub fn new(offset: usize, shift: u8) -> Self {
        Self { offset, shift }
    }
}

/// A codec's addressing scheme, yielding bit locations in embedding order.
pub trait Placement {
    /// Returns the location of the next bit.
    fn next_location(&mut self) -> Result<BitLocation, CodecError>;

    /// Upper bound on how many more locations this placement can yield.
    fn remaining_bits(&self) -> usize;
}

/// Prefixes a message with its varint-encoded length.
pub fn frame_message(message: &[u8]) -> Vec<u8> {
    let mut framed = encode_varint(message.len() as u64);
    framed.extend_from_slice(message);
    framed
}

/// Splits bytes into bits, least significant bit of each byte first.
pub fn message_bits(data: &[u8]) -> impl Iterator<Item = u8> + '_ {
    data.iter()
        .flat_map(|&byte| (0..8).map(move |bit| (byte >> bit) & 1))
}

/// Reserves one location per bit of `data`.
///
/// Runs to completion before anything is written, so a placement that fails
/// midway leaves the carrier untouched.
pub fn plan_locations<P: Placement>(
    placement: &mut P,
    data: &[u8],
) -> Result<Vec<BitLocation>, CodecError> {
    (0..data.len() * 8)
        .map(|_| placement.next_location())
        .collect()
}

/// Writes the bits of `data` into `samples` at the given locations.
pub fn embed(samples: &mut [u8], locations: &[BitLocation], data: &[u8]) {
    for (location, bit) in locations.iter().zip(message_bits(data)) {
        let sample = &mut samples[location.offset];
        *sample = (*sample & !(1u8 << location.shift)) | (bit << location.shift);
    }
}

/// Pull-based reader over a carrier, following a placement.
pub struct BitCursor<'a, P> {
    samples: &'a [u8],
    placement: P,
}

impl<'a, P: Placement> BitCursor<'a, P> {
    pub fn new(samples: &'a [u8], placement: P) -> Self {
        Self { samples, placement }
    }

    /// Reads the next embedded bit.
    pub fn next_bit(&mut self) -> Result<u8, CodecError> {
        let location = self.placement.next_location()?;
        let sample = self
            .samples
            .get(location.offset)
            .ok_or_else(|| CodecError::Corrupted("data runs past the carrier".to_string()))?;
        Ok((sample >> location.shift) & 1)
    }

    /// Reassembles the next byte from eight bits, least significant first.
    pub fn next_byte(&mut self) -> Result<u8, CodecError> {
        let mut byte = 0u8;
        for bit in 0..8 {
            byte |= self.next_bit()? << bit;
        }
        Ok(byte)
    }

    /// Remaining addressable bits.
    pub fn remaining_bits(&self) -> usize {
        self.placement.remaining_bits()
    }

    /// Reads a varint length prefix.
    pub fn read_length(&mut self) -> Result<u64, CodecError> {
        decode_varint(|| self.next_byte())
    }

    /// Reads exactly `length` bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>, CodecError> {
        (0..length).map(|_| self.next_byte()).collect()
    }

    /// Reads a length-prefixed message.
    ///
    /// A length that cannot fit in what is left of the carrier is rejected
    /// before any buffer is allocated.
    pub fn read_framed(&mut self) -> Result<Vec<u8>, CodecError> {
        let length = self.read_length()?;
        let available = (self.remaining_bits() / 8) as u64;
        if length > available {
            return Err(CodecError::Corrupted(format!(
                "embedded length {} exceeds remaining capacity of {} bytes",
                length, available
            )));
        }
        self.read_bytes(length as usize)
    }
}
