//! Sentinel-delimited codec (`concat`).
//!
//! Instead of addressing individual bits, the message is obfuscated, hex
//! encoded and written verbatim over the first samples of the carrier between
//! the ASCII markers `START` and `END`. Cheap and easy to spot; it exists as a
//! low-assurance alternative to the bit-level codecs.
//!
//! Each message byte `x` becomes the 16-bit value `(x << shift) ^ x`, written
//! as four lowercase hex digits.

use tracing::debug;

use super::error::CodecError;
use super::params::{CodecParam, CodecParams, ParamDefault, ParamSchema, ParamType};
use super::Codec;
use crate::carrier::{Carrier, ColorMode};

pub const START: &[u8] = b"START";
pub const END: &[u8] = b"END";

/// Hex digits per obfuscated byte.
const DIGITS: usize = 4;

pub const SHIFT: CodecParam = CodecParam {
    name: "shift",
    kind: ParamType::Int,
    default: ParamDefault::Int(1),
    required: false,
    help: "Bit shift used to obfuscate each byte (1-7).",
    range: Some((1, 7)),
};

pub const SCHEMA: ParamSchema = ParamSchema {
    common: &[SHIFT],
    encode: &[],
    decode: &[],
};

pub fn obfuscate(byte: u8, shift: u32) -> u16 {
    (u16::from(byte) << shift) ^ u16::from(byte)
}

/// Inverts [`obfuscate`], or returns `None` if `value` is not an image of it.
pub fn deobfuscate(value: u16, shift: u32) -> Option<u8> {
    // The low `shift` bits pass through unchanged, each higher bit is XORed
    // with the bit `shift` places below it.
    let mut byte = 0u16;
    for i in 0..8 {
        let mut bit = (value >> i) & 1;
        if i >= shift {
            bit ^= (byte >> (i - shift)) & 1;
        }
        byte |= bit << i;
    }

    let byte = byte as u8;
    (obfuscate(byte, shift) == value).then_some(byte)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Byte range of the hex body between the first `START` and the next `END`.
fn locate_body(samples: &[u8]) -> Option<(usize, usize)> {
    let start = find(samples, START)? + START.len();
    let end = start + find(&samples[start..], END)?;
    Some((start, end))
}

fn encode_body(message: &[u8], shift: u32) -> Vec<u8> {
    let mut payload = Vec::with_capacity(START.len() + message.len() * DIGITS + END.len());
    payload.extend_from_slice(START);
    for &byte in message {
        payload.extend_from_slice(format!("{:04x}", obfuscate(byte, shift)).as_bytes());
    }
    payload.extend_from_slice(END);
    payload
}

fn decode_body(body: &[u8], shift: u32) -> Result<Vec<u8>, CodecError> {
    if body.len() % DIGITS != 0 {
        return Err(CodecError::Corrupted(format!(
            "hex body of {} digits is not a multiple of {}",
            body.len(),
            DIGITS
        )));
    }

    body.chunks(DIGITS)
        .map(|chunk| {
            let value = std::str::from_utf8(chunk)
                .ok()
                .and_then(|s| u16::from_str_radix(s, 16).ok())
                .ok_or_else(|| CodecError::Corrupted("malformed hex body".to_string()))?;
            deobfuscate(value, shift).ok_or_else(|| {
                CodecError::Corrupted(format!("{:04x} is not valid for shift {}", value, shift))
            })
        })
        .collect()
}

/// The `concat` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatCodec;

impl Codec for ConcatCodec {
    fn short_name(&self) -> &'static str {
        "concat"
    }

    fn display_name(&self) -> &'static str {
        "Concat"
    }

    fn help(&self) -> &'static str {
        "write an obfuscated copy of the message between sentinel markers"
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
        let shift = params.int(&SHIFT)? as u32;

        if locate_body(carrier.samples()).is_some() {
            return Err(CodecError::AlreadyEmbedded);
        }

        let payload = encode_body(message, shift);
        if payload.len() > carrier.len() {
            return Err(CodecError::CapacityExceeded {
                needed: payload.len() * 8,
                capacity: carrier.len() * 8,
            });
        }

        let mut samples = carrier.samples().to_vec();
        samples[..payload.len()].copy_from_slice(&payload);
        debug!(shift, payload = payload.len(), "wrote sentinel payload");
        Ok(carrier.with_samples(samples))
    }

    fn decode(&self, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>, CodecError> {
        carrier.ensure_mode(self.accepted_modes())?;
        params.validate(SCHEMA.for_decode())?;
        let shift = params.int(&SHIFT)? as u32;

        let (start, end) = locate_body(carrier.samples())
            .ok_or_else(|| CodecError::Corrupted("no START/END markers".to_string()))?;
        decode_body(&carrier.samples()[start..end], shift)
    }
}
