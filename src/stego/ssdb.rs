//! Seed-spaced data bits codec.
//!
//! The password is hashed (SHA-256, hex digest) into the seed of a
//! generator that picks carrier samples at random. Each freshly picked sample
//! stores one bit in its LSB; samples already used in the same call are
//! skipped. The decoder replays the same sequence from the same password.
//!
//! This only obfuscates placement order, it is not encryption.
//!
//! The carrier must hold at least twice as many samples as message bits,
//! which keeps collisions rare. That margin and the collision bound below are
//! empirical: they do not guarantee success below the margin, they just make
//! failure unlikely and bounded in time.
//!
//! Decoding never fails on a wrong password: it returns garbage instead.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::bits::{embed, frame_message, plan_locations, BitCursor, BitLocation, Placement};
use super::capacity::check_capacity;
use super::error::CodecError;
use super::params::{CodecParam, CodecParams, ParamDefault, ParamSchema, ParamType};
use super::Codec;
use crate::carrier::{Carrier, ColorMode};
use crate::crypto::placement_rng;

/// Consecutive already-used picks tolerated before giving up.
pub const MAX_COLLISIONS: usize = 100;

/// Samples required per message bit.
pub const CAPACITY_MARGIN: usize = 2;

pub const PASSWORD: CodecParam = CodecParam {
    name: "password",
    kind: ParamType::String,
    default: ParamDefault::None,
    required: true,
    help: "The password used to encode/decode.",
    range: None,
};

pub const SCHEMA: ParamSchema = ParamSchema {
    common: &[PASSWORD],
    encode: &[],
    decode: &[],
};

/// Password-seeded sample picker.
pub struct SeedPlacement {
    rng: ChaCha20Rng,
    len: usize,
    visited: HashSet<usize>,
    budget: usize,
}

impl SeedPlacement {
    /// Placement over `len` samples seeded from `password`.
    pub fn new(password: &str, len: usize) -> Self {
        Self {
            rng: placement_rng(password),
            len,
            visited: HashSet::new(),
            budget: len / CAPACITY_MARGIN,
        }
    }
}

impl Placement for SeedPlacement {
    fn next_location(&mut self) -> Result<BitLocation, CodecError> {
        if self.len == 0 {
            return Err(CodecError::PlacementExhausted { collisions: 0 });
        }

        let mut collisions = 0;
        loop {
            // Sampled as u64 so the sequence does not depend on the word size
            let index = self.rng.gen_range(0..self.len as u64) as usize;
            if self.visited.insert(index) {
                self.budget = self.budget.saturating_sub(1);
                return Ok(BitLocation::new(index, 0));
            }

            collisions += 1;
            if collisions > MAX_COLLISIONS {
                return Err(CodecError::PlacementExhausted { collisions });
            }
        }
    }

    fn remaining_bits(&self) -> usize {
        self.budget
    }
}

/// The `ssdb` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct SsdbCodec;

impl Codec for SsdbCodec {
    fn short_name(&self) -> &'static str {
        "ssdb"
    }

    fn display_name(&self) -> &'static str {
        "Seed Spaced"
    }

    fn help(&self) -> &'static str {
        "scatter the message over samples picked by a password-seeded generator"
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
        let password = params.string(&PASSWORD)?;

        let data = frame_message(message);
        let needed = data.len() * 8;
        check_capacity(needed * CAPACITY_MARGIN, carrier.len())?;

        let locations = plan_locations(&mut SeedPlacement::new(&password, carrier.len()), &data)?;
        let mut samples = carrier.samples().to_vec();
        embed(&mut samples, &locations, &data);

        debug!(needed, samples = carrier.len(), "scattered message bits");
        Ok(carrier.with_samples(samples))
    }

    fn decode(&self, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>, CodecError> {
        carrier.ensure_mode(self.accepted_modes())?;
        params.validate(SCHEMA.for_decode())?;
        let password = params.string(&PASSWORD)?;

        let mut cursor = BitCursor::new(
            carrier.samples(),
            SeedPlacement::new(&password, carrier.len()),
        );

        let length = match cursor.read_length() {
            Ok(length) => length,
            Err(e) => {
                warn!(error = %e, "unreadable length prefix, wrong password?");
                return Ok(Vec::new());
            }
        };

        let available = (cursor.remaining_bits() / 8) as u64;
        if length > available {
            warn!(length, available, "length prefix exceeds carrier, wrong password?");
        }

        let mut message = Vec::with_capacity(length.min(available) as usize);
        for _ in 0..length.min(available) {
            match cursor.next_byte() {
                Ok(byte) => message.push(byte),
                Err(e) => {
                    warn!(error = %e, "placement stopped early, wrong password?");
                    break;
                }
            }
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};

    fn random_carrier(width: u32, height: u32) -> Carrier {
        let mut samples = vec![0u8; (width * height * 3) as usize];
        ChaCha20Rng::seed_from_u64(99).fill_bytes(&mut samples);
        Carrier::new(width, height, ColorMode::Rgb, samples).unwrap()
    }

    fn with_password(password: &str) -> CodecParams {
        CodecParams::new().with("password", password)
    }

    #[test]
    fn test_roundtrip() {
        let carrier = random_carrier(64, 64);
        let params = with_password("correct horse");
        let all_bytes: Vec<u8> = (0..=255).collect();
        let messages: [&[u8]; 3] = [b"", b"Hello, world!", &all_bytes];

        for message in messages {
            let encoded = SsdbCodec.encode(&carrier, message, &params).unwrap();
            assert_eq!(SsdbCodec.decode(&encoded, &params).unwrap(), message);
        }
    }

    #[test]
    fn test_same_password_same_sequence() {
        let mut a = SeedPlacement::new("seed", 10_000);
        let mut b = SeedPlacement::new("seed", 10_000);
        for _ in 0..500 {
            assert_eq!(a.next_location().unwrap(), b.next_location().unwrap());
        }
    }

    #[test]
    fn test_sequence_is_pinned() {
        let mut placement = SeedPlacement::new("pw", 1_000_003);
        let offsets: Vec<usize> = (0..5)
            .map(|_| placement.next_location().unwrap().offset)
            .collect();
        assert_eq!(offsets, [970296, 982028, 296686, 281783, 888070]);
    }

    #[test]
    fn test_no_index_repeats() {
        let mut placement = SeedPlacement::new("unique", 1000);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(placement.next_location().unwrap().offset));
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let carrier = random_carrier(32, 32);
        let params = with_password("repeat");
        let first = SsdbCodec.encode(&carrier, b"same", &params).unwrap();
        let second = SsdbCodec.encode(&carrier, b"same", &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_password_returns_garbage() {
        let carrier = random_carrier(64, 64);
        let encoded = SsdbCodec
            .encode(&carrier, b"attack at dawn", &with_password("right"))
            .unwrap();

        let decoded = SsdbCodec.decode(&encoded, &with_password("wrong")).unwrap();
        assert_ne!(decoded, b"attack at dawn");
    }

    #[test]
    fn test_missing_password() {
        let carrier = random_carrier(16, 16);
        assert_eq!(
            SsdbCodec.encode(&carrier, b"x", &CodecParams::new()),
            Err(CodecError::MissingParameter("password".to_string()))
        );
        assert!(SsdbCodec.decode(&carrier, &CodecParams::new()).is_err());
    }

    #[test]
    fn test_margin_enforced() {
        // 300 samples hold at most 150 bits
        let carrier = Carrier::filled(10, 10, ColorMode::Rgb, 0x80);
        let params = with_password("margin");

        assert!(SsdbCodec.encode(&carrier, &[1u8; 17], &params).is_ok());
        let result = SsdbCodec.encode(&carrier, &[1u8; 18], &params);
        assert!(matches!(result, Err(CodecError::CapacityExceeded { needed: 304, capacity: 300 })));
    }

    #[test]
    fn test_exhaustion_is_bounded() {
        let mut placement = SeedPlacement::new("tiny", 4);
        let mut result = Ok(BitLocation::new(0, 0));
        for _ in 0..5 {
            result = placement.next_location();
        }
        assert!(matches!(result, Err(CodecError::PlacementExhausted { .. })));
    }

    #[test]
    fn test_empty_carrier_decodes_to_garbage() {
        let carrier = Carrier::filled(0, 0, ColorMode::Rgb, 0);
        assert_eq!(SsdbCodec.decode(&carrier, &with_password("x")).unwrap(), b"");
    }
}
