//! Uniform bit-plane codec.
//!
//! Stores the framed message in the low (or, with `msb`, the high) `bits`
//! bits of every carrier sample, in sample order. A typical RGB image holds
//! `3 * bits` message bits per pixel.
//!
//! Bit index `b` lives in sample `b / bits` at sub-position `b % bits`,
//! counted from the least significant end unless `msb` is set.

use tracing::debug;

use super::bits::{embed, frame_message, plan_locations, BitCursor, BitLocation, Placement};
use super::capacity::check_capacity;
use super::error::CodecError;
use super::params::{CodecParam, CodecParams, ParamDefault, ParamSchema, ParamType};
use super::Codec;
use crate::carrier::{Carrier, ColorMode};

pub const BITS: CodecParam = CodecParam {
    name: "bits",
    kind: ParamType::Int,
    default: ParamDefault::Int(1),
    required: false,
    help: "Number of bits per sample used to store data (1-8).",
    range: Some((1, 8)),
};

pub const MSB: CodecParam = CodecParam {
    name: "msb",
    kind: ParamType::Bool,
    default: ParamDefault::Bool(false),
    required: false,
    help: "Use the most significant bits of each sample instead of the least.",
    range: None,
};

pub const SCHEMA: ParamSchema = ParamSchema {
    common: &[BITS, MSB],
    encode: &[],
    decode: &[],
};

/// Resolved bit-plane settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPlane {
    bits: u8,
    msb: bool,
}

impl Default for BitPlane {
    fn default() -> Self {
        Self { bits: 1, msb: false }
    }
}

impl BitPlane {
    pub fn new(bits: u8, msb: bool) -> Result<Self, CodecError> {
        if !(1..=8).contains(&bits) {
            return Err(CodecError::ParameterOutOfRange {
                name: BITS.name.to_string(),
                value: i64::from(bits),
                min: 1,
                max: 8,
            });
        }
        Ok(Self { bits, msb })
    }

    /// Reads `bits` and `msb` from caller parameters.
    pub fn from_params(params: &CodecParams) -> Result<Self, CodecError> {
        // Range already checked against BITS.range
        let bits = params.int(&BITS)? as u8;
        Self::new(bits, params.bool(&MSB)?)
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn msb(&self) -> bool {
        self.msb
    }

    /// Embeddable bits for a carrier of `samples` bytes.
    pub fn capacity(&self, samples: usize) -> usize {
        samples * self.bits as usize
    }

    /// Maps a linear bit index to its sample and bit position.
    pub fn address(&self, bit_index: usize) -> BitLocation {
        let bits = self.bits as usize;
        let sub = (bit_index % bits) as u8;
        let shift = if self.msb { 7 - sub } else { sub };
        BitLocation::new(bit_index / bits, shift)
    }

    /// Sequential placement over a carrier of `samples` bytes.
    pub fn placement(&self, samples: usize) -> UniformPlacement {
        UniformPlacement {
            plane: *self,
            capacity: self.capacity(samples),
            next: 0,
        }
    }

    /// Embeds `message` into a copy of `carrier`.
    pub fn embed(&self, carrier: &Carrier, message: &[u8]) -> Result<Carrier, CodecError> {
        let data = frame_message(message);
        let needed = data.len() * 8;
        let capacity = self.capacity(carrier.len());
        check_capacity(needed, capacity)?;

        let locations = plan_locations(&mut self.placement(carrier.len()), &data)?;
        let mut samples = carrier.samples().to_vec();
        embed(&mut samples, &locations, &data);

        debug!(
            bits = self.bits,
            msb = self.msb,
            needed,
            capacity,
            "embedded message in bit plane"
        );
        Ok(carrier.with_samples(samples))
    }

    /// Extracts a message embedded with the same settings.
    pub fn extract(&self, carrier: &Carrier) -> Result<Vec<u8>, CodecError> {
        let mut cursor = BitCursor::new(carrier.samples(), self.placement(carrier.len()));
        cursor.read_framed()
    }
}

/// Bit-plane addressing as a [`Placement`].
#[derive(Debug, Clone)]
pub struct UniformPlacement {
    plane: BitPlane,
    capacity: usize,
    next: usize,
}

impl Placement for UniformPlacement {
    fn next_location(&mut self) -> Result<BitLocation, CodecError> {
        if self.next >= self.capacity {
            return Err(CodecError::Corrupted("data runs past the carrier".to_string()));
        }
        let location = self.plane.address(self.next);
        self.next += 1;
        Ok(location)
    }

    fn remaining_bits(&self) -> usize {
        self.capacity - self.next
    }
}

/// The `lsb` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsbCodec;

impl Codec for LsbCodec {
    fn short_name(&self) -> &'static str {
        "lsb"
    }

    fn display_name(&self) -> &'static str {
        "LSB"
    }

    fn help(&self) -> &'static str {
        "store the message in the low bits of every sample"
    }

    fn params(&self) -> ParamSchema {
        SCHEMA
    }

    fn accepted_modes(&self) -> &'static [ColorMode] {
        &ColorMode::ALL
    }

    fn encode(
        &self,
        carrier: &Carrier,
        message: &[u8],
        params: &CodecParams,
    ) -> Result<Carrier, CodecError> {
        carrier.ensure_mode(self.accepted_modes())?;
        params.validate(SCHEMA.for_encode())?;
        BitPlane::from_params(params)?.embed(carrier, message)
    }

    fn decode(&self, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>, CodecError> {
        carrier.ensure_mode(self.accepted_modes())?;
        params.validate(SCHEMA.for_decode())?;
        BitPlane::from_params(params)?.extract(carrier)
    }
}
