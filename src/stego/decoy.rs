//! Decoy codec (`not`).
//!
//! The roles of image and message are swapped: the message is rendered as
//! visible text on a fresh white canvas, and the *carrier* (serialized as PNG)
//! is hidden inside that canvas with the `lsb` bit-plane layout.
//!
//! Decoding returns the hidden PNG bytes, so
//! `Carrier::from_bytes(&decode(encode(c, m)))` gives back `c`.

use tracing::debug;

use super::error::CodecError;
use super::lsb::{self, BitPlane};
use super::noise::{canvas_size, pixels_for, DEFAULT_MIN_PIXELS};
use super::params::{CodecParams, ParamSchema};
use super::Codec;
use crate::carrier::{Carrier, ColorMode};
use crate::text::render::text_canvas;

/// The `not` codec.
#[derive(Debug, Clone, Copy)]
pub struct DecoyCodec {
    min_pixels: usize,
}

impl Default for DecoyCodec {
    fn default() -> Self {
        Self {
            min_pixels: DEFAULT_MIN_PIXELS,
        }
    }
}

impl DecoyCodec {
    /// Overrides the canvas floor.
    pub const fn with_min_pixels(min_pixels: usize) -> Self {
        Self { min_pixels }
    }

    /// Decodes and parses the hidden carrier.
    pub fn recover(&self, carrier: &Carrier, params: &CodecParams) -> Result<Carrier, CodecError> {
        let payload = self.decode(carrier, params)?;
        Carrier::from_bytes(&payload)
    }
}

impl Codec for DecoyCodec {
    fn short_name(&self) -> &'static str {
        "not"
    }

    fn display_name(&self) -> &'static str {
        "Not"
    }

    fn help(&self) -> &'static str {
        "hide the image inside a render of your message"
    }

    fn params(&self) -> ParamSchema {
        lsb::SCHEMA
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
        params.validate(lsb::SCHEMA.for_encode())?;
        let plane = BitPlane::from_params(params)?;

        let payload = carrier.to_png_bytes()?;
        let (width, height) = canvas_size(pixels_for(&payload, &plane, self.min_pixels))?;
        debug!(width, height, payload = payload.len(), "rendering decoy canvas");

        let text = String::from_utf8_lossy(message);
        let canvas = Carrier::new(
            width,
            height,
            ColorMode::Rgb,
            text_canvas(width, height, &text).into_raw(),
        )?;

        plane.embed(&canvas, &payload)
    }

    fn decode(&self, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>, CodecError> {
        carrier.ensure_mode(self.accepted_modes())?;
        params.validate(lsb::SCHEMA.for_decode())?;
        BitPlane::from_params(params)?.extract(carrier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn noise_carrier(width: u32, height: u32, mode: ColorMode) -> Carrier {
        let mut samples = vec![0u8; width as usize * height as usize * mode.channels()];
        ChaCha20Rng::seed_from_u64(3).fill_bytes(&mut samples);
        Carrier::new(width, height, mode, samples).unwrap()
    }

    fn codec() -> DecoyCodec {
        DecoyCodec::with_min_pixels(120 * 90)
    }

    #[test]
    fn test_recovers_original_carrier() {
        let original = noise_carrier(12, 9, ColorMode::Rgb);
        let params = CodecParams::new();

        let encoded = codec().encode(&original, b"nothing to see here", &params).unwrap();
        assert_eq!(encoded.mode(), ColorMode::Rgb);
        assert_eq!(codec().recover(&encoded, &params).unwrap(), original);
    }

    #[test]
    fn test_decode_returns_png_payload() {
        let original = noise_carrier(4, 4, ColorMode::LumaAlpha);
        let encoded = codec().encode(&original, b"", &CodecParams::new()).unwrap();

        let payload = codec().decode(&encoded, &CodecParams::new()).unwrap();
        assert_eq!(payload, original.to_png_bytes().unwrap());
    }

    #[test]
    fn test_message_is_visible() {
        let original = noise_carrier(4, 4, ColorMode::Rgb);
        let encoded = codec().encode(&original, b"look at me", &CodecParams::new()).unwrap();

        let dark = encoded
            .samples()
            .chunks(3)
            .filter(|px| px.iter().all(|&s| s <= 1))
            .count();
        let light = encoded
            .samples()
            .chunks(3)
            .filter(|px| px.iter().all(|&s| s >= 254))
            .count();
        assert!(dark > 0);
        assert!(light > dark);
    }

    #[test]
    fn test_canvas_grows_for_large_carriers() {
        let original = noise_carrier(100, 80, ColorMode::Rgb);
        let encoded = codec().encode(&original, b"big", &CodecParams::new()).unwrap();

        let payload = original.to_png_bytes().unwrap();
        assert!(encoded.pixel_count() * 3 >= payload.len() * 8);
        assert_eq!(codec().recover(&encoded, &CodecParams::new()).unwrap(), original);
    }

    #[test]
    fn test_wider_bit_plane() {
        let original = noise_carrier(10, 10, ColorMode::Rgba);
        let params = CodecParams::new().with("bits", 2);
        let encoded = codec().encode(&original, b"two bits", &params).unwrap();
        assert_eq!(codec().recover(&encoded, &params).unwrap(), original);
    }
}
