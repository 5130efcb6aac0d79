//! Noise-canvas codec.
//!
//! Throws the caller's carrier away and embeds the message into a freshly
//! generated image of random RGB samples, using the bit-plane layout of the
//! `lsb` codec. With no clean original to diff against, a before/after
//! comparison reveals nothing.

use rand::RngCore;
use tracing::debug;

use super::capacity::required_bits;
use super::error::CodecError;
use super::lsb::{self, BitPlane};
use super::params::{CodecParams, ParamSchema};
use super::Codec;
use crate::carrier::{Carrier, ColorMode};
use crate::crypto::entropy_rng;

/// Smallest generated canvas, in pixels.
pub const DEFAULT_MIN_PIXELS: usize = 1024 * 768;

/// Dimensions of a 4:3 canvas holding at least `pixels` pixels.
pub fn canvas_size(pixels: usize) -> Result<(u32, u32), CodecError> {
    let pixels = pixels.max(1);
    let width = ((pixels as f64) * 4.0 / 3.0).sqrt().ceil().max(1.0) as usize;
    let height = pixels.div_ceil(width);

    let too_large = || CodecError::InvalidCarrier(format!("cannot build a canvas of {} pixels", pixels));
    Ok((
        u32::try_from(width).map_err(|_| too_large())?,
        u32::try_from(height).map_err(|_| too_large())?,
    ))
}

/// Pixels an RGB canvas needs to hold `data` at the given bit depth.
pub(crate) fn pixels_for(data: &[u8], plane: &BitPlane, min_pixels: usize) -> usize {
    let per_pixel = 3 * plane.bits() as usize;
    required_bits(data).div_ceil(per_pixel).max(min_pixels)
}

/// The `noise` codec.
#[derive(Debug, Clone, Copy)]
pub struct NoiseCodec {
    min_pixels: usize,
}

impl Default for NoiseCodec {
    fn default() -> Self {
        Self {
            min_pixels: DEFAULT_MIN_PIXELS,
        }
    }
}

impl NoiseCodec {
    /// Overrides the canvas floor. Mostly useful to keep tests fast.
    pub const fn with_min_pixels(min_pixels: usize) -> Self {
        Self { min_pixels }
    }
}

impl Codec for NoiseCodec {
    fn short_name(&self) -> &'static str {
        "noise"
    }

    fn display_name(&self) -> &'static str {
        "Noise"
    }

    fn help(&self) -> &'static str {
        "encode your message inside random noise"
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

        let (width, height) = canvas_size(pixels_for(message, &plane, self.min_pixels))?;
        let mut samples = vec![0u8; width as usize * height as usize * 3];
        entropy_rng().fill_bytes(&mut samples);
        debug!(width, height, "generated noise canvas");

        let canvas = Carrier::new(width, height, ColorMode::Rgb, samples)?;
        plane.embed(&canvas, message)
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

    const SMALL: usize = 64 * 48;

    #[test]
    fn test_canvas_size_default_floor() {
        assert_eq!(canvas_size(DEFAULT_MIN_PIXELS).unwrap(), (1024, 768));
    }

    #[test]
    fn test_canvas_size_covers_request() {
        for pixels in [1, 2, 7, 100, 3071, 26_670, 1_000_003] {
            let (w, h) = canvas_size(pixels).unwrap();
            assert!(w as usize * h as usize >= pixels, "pixels={}", pixels);
            // Roughly 4:3
            assert!(w >= h);
        }
    }

    #[test]
    fn test_roundtrip_on_floor_canvas() {
        let codec = NoiseCodec::with_min_pixels(SMALL);
        let carrier = Carrier::filled(2, 2, ColorMode::Luma, 0);
        let params = CodecParams::new();

        let encoded = codec.encode(&carrier, b"Hello, world!", &params).unwrap();
        assert_eq!((encoded.width(), encoded.height()), (64, 48));
        assert_eq!(encoded.mode(), ColorMode::Rgb);
        assert_eq!(codec.decode(&encoded, &params).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_canvas_grows_with_message() {
        let codec = NoiseCodec::with_min_pixels(SMALL);
        let carrier = Carrier::filled(1, 1, ColorMode::Rgb, 0);
        let message = vec![0x5A; 10_000];

        let encoded = codec.encode(&carrier, &message, &CodecParams::new()).unwrap();
        assert!(encoded.pixel_count() * 3 >= required_bits(&message));
        assert_eq!(codec.decode(&encoded, &CodecParams::new()).unwrap(), message);
    }

    #[test]
    fn test_deeper_planes_need_fewer_pixels() {
        let message = vec![1u8; 5000];
        let shallow = pixels_for(&message, &BitPlane::new(1, false).unwrap(), 0);
        let deep = pixels_for(&message, &BitPlane::new(4, false).unwrap(), 0);
        assert_eq!(shallow, required_bits(&message).div_ceil(3));
        assert!(deep * 4 >= shallow && deep < shallow);
    }

    #[test]
    fn test_msb_roundtrip() {
        let codec = NoiseCodec::with_min_pixels(SMALL);
        let params = CodecParams::new().with("bits", 3).with("msb", true);
        let carrier = Carrier::filled(1, 1, ColorMode::Rgba, 0);

        let encoded = codec.encode(&carrier, b"high bits", &params).unwrap();
        assert_eq!(codec.decode(&encoded, &params).unwrap(), b"high bits");
    }

    #[test]
    fn test_canvases_are_fresh_noise() {
        let codec = NoiseCodec::with_min_pixels(SMALL);
        let carrier = Carrier::filled(1, 1, ColorMode::Rgb, 0);
        let a = codec.encode(&carrier, b"same", &CodecParams::new()).unwrap();
        let b = codec.encode(&carrier, b"same", &CodecParams::new()).unwrap();
        assert_ne!(a.samples(), b.samples());
    }
}
