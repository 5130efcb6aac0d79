//! Edge-restricted codec.
//!
//! One colour channel is picked as the mask. An edge map is computed from
//! that channel alone, and data is written into the least significant bit of
//! the *other* colour channels, only at pixels the map marks as edges. The
//! mask channel itself is never modified apart from its header bit, so the
//! decoder can rebuild the identical map from the encoded image.
//!
//! Pixel 0 is the header: every colour channel has its LSB cleared except the
//! mask channel, whose LSB is set. Data starts at pixel 1.
//!
//! Edge map pipeline, run on a single channel plane:
//! 1. 3x3 contour filter (`8c - sum(neighbours) + 255`), dark on edges
//! 2. contrast boost by a factor of 15 around the mean
//! 3. 3x3 median filter
//! 4. threshold at 128, dark pixels are eligible
//! 5. the one-pixel frame is cleared

use rand::Rng;
use tracing::debug;

use super::bits::{embed, frame_message, plan_locations, BitCursor, BitLocation, Placement};
use super::error::CodecError;
use super::params::{CodecParams, ParamSchema};
use super::Codec;
use crate::carrier::{Carrier, ColorMode};
use crate::crypto::entropy_rng;

/// Colour layouts with at least two colour channels.
pub const ACCEPTED_MODES: [ColorMode; 2] = [ColorMode::Rgb, ColorMode::Rgba];

const CONTRAST_FACTOR: i32 = 15;
const THRESHOLD: u8 = 128;

/// Per-pixel carrier eligibility derived from one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    eligible: Vec<bool>,
}

impl EdgeMap {
    pub fn is_eligible(&self, pixel: usize) -> bool {
        self.eligible.get(pixel).copied().unwrap_or(false)
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible.iter().filter(|&&e| e).count()
    }
}

/// Runs the edge detection pipeline over a `width * height` plane.
pub fn edge_map(plane: &[u8], width: u32, height: u32) -> Result<EdgeMap, CodecError> {
    let (w, h) = (width as usize, height as usize);
    if plane.len() != w * h {
        return Err(CodecError::InvalidCarrier(format!(
            "plane holds {} samples, expected {}x{}",
            plane.len(),
            width,
            height
        )));
    }

    let contour = contour(plane, w, h);
    let boosted = boost_contrast(&contour, CONTRAST_FACTOR);
    let cleaned = median(&boosted, w, h);

    let eligible = cleaned
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let (x, y) = (i % w, i / w);
            let border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            !border && v < THRESHOLD
        })
        .collect();

    Ok(EdgeMap { eligible })
}

/// Collects the 3x3 neighbourhood of (x, y), clamping at the image bounds.
fn neighbourhood(plane: &[u8], w: usize, h: usize, x: usize, y: usize) -> [u8; 9] {
    let mut out = [0u8; 9];
    let mut k = 0;
    for dy in [-1isize, 0, 1] {
        for dx in [-1isize, 0, 1] {
            let nx = (x as isize + dx).clamp(0, w as isize - 1) as usize;
            let ny = (y as isize + dy).clamp(0, h as isize - 1) as usize;
            out[k] = plane[ny * w + nx];
            k += 1;
        }
    }
    out
}

fn contour(plane: &[u8], w: usize, h: usize) -> Vec<u8> {
    let mut out = vec![0u8; plane.len()];
    for y in 0..h {
        for x in 0..w {
            let n = neighbourhood(plane, w, h, x, y);
            let sum: i32 = n.iter().map(|&v| i32::from(v)).sum();
            let centre = i32::from(n[4]);
            // Kernel: -1 everywhere, 8 in the centre, offset 255
            let value = 9 * centre - sum + 255;
            out[y * w + x] = value.clamp(0, 255) as u8;
        }
    }
    out
}

fn boost_contrast(plane: &[u8], factor: i32) -> Vec<u8> {
    if plane.is_empty() {
        return Vec::new();
    }
    let total: u64 = plane.iter().map(|&v| u64::from(v)).sum();
    let len = plane.len() as u64;
    let mean = ((total + len / 2) / len) as i32;

    plane
        .iter()
        .map(|&v| (mean + factor * (i32::from(v) - mean)).clamp(0, 255) as u8)
        .collect()
}

fn median(plane: &[u8], w: usize, h: usize) -> Vec<u8> {
    let mut out = vec![0u8; plane.len()];
    for y in 0..h {
        for x in 0..w {
            let mut n = neighbourhood(plane, w, h, x, y);
            n.sort_unstable();
            out[y * w + x] = n[4];
        }
    }
    out
}

/// Plane of `channel` as it reads after the header bit is written.
pub fn mask_plane(carrier: &Carrier, channel: usize) -> Vec<u8> {
    let mut plane = carrier.channel_plane(channel);
    if let Some(first) = plane.first_mut() {
        *first |= 1;
    }
    plane
}

/// Tries the channels in turn from `start` and keeps the first whose map has
/// strictly more eligible pixels than `needed`.
fn select_mask(
    start: usize,
    color_channels: usize,
    needed: usize,
    mut map_for: impl FnMut(usize) -> Result<EdgeMap, CodecError>,
) -> Result<(usize, EdgeMap), CodecError> {
    let mut best = 0;
    for attempt in 0..color_channels {
        let candidate = (start + attempt) % color_channels;
        let map = map_for(candidate)?;
        let eligible = map.eligible_count();
        debug!(channel = candidate, eligible, needed, "edge map candidate");

        if eligible > needed {
            return Ok((candidate, map));
        }
        best = best.max(eligible);
    }

    Err(CodecError::CapacityExceeded {
        needed,
        capacity: best,
    })
}

/// Walks eligible pixels from pixel 1, covering every colour channel except
/// the mask.
struct EdgePlacement<'a> {
    map: &'a EdgeMap,
    mask: usize,
    stride: usize,
    color_channels: usize,
    pixel: usize,
    channel: usize,
    remaining: usize,
}

impl<'a> EdgePlacement<'a> {
    fn new(map: &'a EdgeMap, mask: usize, mode: ColorMode) -> Self {
        let color_channels = mode.color_channels();
        Self {
            map,
            mask,
            stride: mode.channels(),
            color_channels,
            pixel: 1,
            channel: 0,
            remaining: map.eligible_count() * (color_channels - 1),
        }
    }
}

impl Placement for EdgePlacement<'_> {
    fn next_location(&mut self) -> Result<BitLocation, CodecError> {
        loop {
            if self.pixel >= self.map.eligible.len() {
                return Err(CodecError::Corrupted("data runs past the carrier".to_string()));
            }
            if !self.map.is_eligible(self.pixel) || self.channel >= self.color_channels {
                self.pixel += 1;
                self.channel = 0;
                continue;
            }
            if self.channel == self.mask {
                self.channel += 1;
                continue;
            }

            let offset = self.pixel * self.stride + self.channel;
            self.channel += 1;
            self.remaining = self.remaining.saturating_sub(1);
            return Ok(BitLocation::new(offset, 0));
        }
    }

    fn remaining_bits(&self) -> usize {
        self.remaining
    }
}

/// The `edges` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgesCodec;

impl EdgesCodec {
    /// Encodes starting the channel rotation at `channel`, or at a random
    /// channel when `None`.
    pub fn encode_on_channel(
        &self,
        carrier: &Carrier,
        message: &[u8],
        channel: Option<usize>,
    ) -> Result<Carrier, CodecError> {
        carrier.ensure_mode(&ACCEPTED_MODES)?;

        let color_channels = carrier.mode().color_channels();
        let start = match channel {
            Some(c) if c >= color_channels => {
                return Err(CodecError::ParameterOutOfRange {
                    name: "channel".to_string(),
                    value: c as i64,
                    min: 0,
                    max: color_channels as i64 - 1,
                })
            }
            Some(c) => c,
            None => entropy_rng().gen_range(0..color_channels),
        };

        let data = frame_message(message);
        let needed = data.len() * 8;

        let (mask, map) = select_mask(start, color_channels, needed, |channel| {
            edge_map(&mask_plane(carrier, channel), carrier.width(), carrier.height())
        })?;

        let locations = plan_locations(&mut EdgePlacement::new(&map, mask, carrier.mode()), &data)?;

        let mut samples = carrier.samples().to_vec();
        for (c, sample) in samples.iter_mut().take(color_channels).enumerate() {
            *sample = (*sample & !1) | u8::from(c == mask);
        }
        embed(&mut samples, &locations, &data);

        debug!(mask, bits = locations.len(), "embedded message along edges");
        Ok(carrier.with_samples(samples))
    }

    /// Reads the header pixel and returns the mask channel.
    pub fn mask_channel(carrier: &Carrier) -> Result<usize, CodecError> {
        if carrier.pixel_count() == 0 {
            return Err(CodecError::Corrupted("empty carrier".to_string()));
        }

        let color_channels = carrier.mode().color_channels();
        let marked: Vec<usize> = (0..color_channels)
            .filter(|&c| carrier.samples()[c] & 1 == 1)
            .collect();

        match marked.as_slice() {
            [mask] => Ok(*mask),
            [] => Err(CodecError::Corrupted("no mask channel marker".to_string())),
            _ => Err(CodecError::Corrupted("conflicting mask channel markers".to_string())),
        }
    }
}

impl Codec for EdgesCodec {
    fn short_name(&self) -> &'static str {
        "edges"
    }

    fn display_name(&self) -> &'static str {
        "Edges"
    }

    fn help(&self) -> &'static str {
        "store the message only along edges found in one colour channel"
    }

    fn params(&self) -> ParamSchema {
        ParamSchema::EMPTY
    }

    fn accepted_modes(&self) -> &'static [ColorMode] {
        &ACCEPTED_MODES
    }

    fn encode(
        &self,
        carrier: &Carrier,
        message: &[u8],
        params: &CodecParams,
    ) -> Result<Carrier, CodecError> {
        params.validate(ParamSchema::EMPTY.for_encode())?;
        self.encode_on_channel(carrier, message, None)
    }

    fn decode(&self, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>, CodecError> {
        carrier.ensure_mode(&ACCEPTED_MODES)?;
        params.validate(ParamSchema::EMPTY.for_decode())?;

        let mask = Self::mask_channel(carrier)?;
        let map = edge_map(
            &carrier.channel_plane(mask),
            carrier.width(),
            carrier.height(),
        )?;
        debug!(mask, eligible = map.eligible_count(), "decoding along edges");

        let mut cursor = BitCursor::new(
            carrier.samples(),
            EdgePlacement::new(&map, mask, carrier.mode()),
        );
        cursor.read_framed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn noise_carrier(width: u32, height: u32, mode: ColorMode) -> Carrier {
        let mut samples = vec![0u8; width as usize * height as usize * mode.channels()];
        ChaCha20Rng::seed_from_u64(42).fill_bytes(&mut samples);
        Carrier::new(width, height, mode, samples).unwrap()
    }

    #[test]
    fn test_flat_plane_has_no_edges() {
        let plane = vec![200u8; 16 * 16];
        assert_eq!(edge_map(&plane, 16, 16).unwrap().eligible_count(), 0);
    }

    #[test]
    fn test_border_is_never_eligible() {
        let carrier = noise_carrier(32, 24, ColorMode::Rgb);
        let map = edge_map(&carrier.channel_plane(0), 32, 24).unwrap();

        for x in 0..32 {
            assert!(!map.is_eligible(x));
            assert!(!map.is_eligible(23 * 32 + x));
        }
        for y in 0..24 {
            assert!(!map.is_eligible(y * 32));
            assert!(!map.is_eligible(y * 32 + 31));
        }
        assert!(map.eligible_count() > 0);
    }

    #[test]
    fn test_isolated_dot_marks_a_cross() {
        // One bright pixel on a dark field: its ring goes dark in the contour
        // pass and the median keeps the dot plus its four direct neighbours.
        let mut plane = vec![20u8; 9 * 9];
        plane[4 * 9 + 4] = 230;
        let map = edge_map(&plane, 9, 9).unwrap();

        for pixel in [4 * 9 + 4, 3 * 9 + 4, 5 * 9 + 4, 4 * 9 + 3, 4 * 9 + 5] {
            assert!(map.is_eligible(pixel), "pixel {}", pixel);
        }
        assert!(!map.is_eligible(3 * 9 + 3));
        assert_eq!(map.eligible_count(), 5);
    }

    #[test]
    fn test_roundtrip_every_mask_channel() {
        let carrier = noise_carrier(128, 128, ColorMode::Rgb);
        let messages: [&[u8]; 3] = [b"", b"Hello, world!", &[0xA5; 256]];

        for channel in 0..3 {
            for message in messages {
                let encoded = EdgesCodec
                    .encode_on_channel(&carrier, message, Some(channel))
                    .unwrap();
                assert_eq!(EdgesCodec::mask_channel(&encoded).unwrap(), channel);
                assert_eq!(EdgesCodec.decode(&encoded, &CodecParams::new()).unwrap(), message);
            }
        }
    }

    #[test]
    fn test_rgba_alpha_untouched() {
        let carrier = noise_carrier(64, 64, ColorMode::Rgba);
        let encoded = EdgesCodec.encode(&carrier, b"alpha stays", &CodecParams::new()).unwrap();

        assert_eq!(encoded.channel_plane(3), carrier.channel_plane(3));
        assert_eq!(EdgesCodec.decode(&encoded, &CodecParams::new()).unwrap(), b"alpha stays");
    }

    #[test]
    fn test_mask_channel_unchanged_except_header() {
        let carrier = noise_carrier(80, 60, ColorMode::Rgb);
        let encoded = EdgesCodec
            .encode_on_channel(&carrier, &[0x3C; 100], Some(1))
            .unwrap();

        let before = carrier.channel_plane(1);
        let after = encoded.channel_plane(1);
        assert_eq!(after[0], before[0] | 1);
        assert_eq!(&after[1..], &before[1..]);
    }

    #[test]
    fn test_edge_map_reproducible_after_encode() {
        let carrier = noise_carrier(80, 60, ColorMode::Rgb);
        let encoded = EdgesCodec
            .encode_on_channel(&carrier, b"stable mask", Some(2))
            .unwrap();

        let at_encode = edge_map(&mask_plane(&carrier, 2), 80, 60).unwrap();
        let at_decode = edge_map(&encoded.channel_plane(2), 80, 60).unwrap();
        assert_eq!(at_encode, at_decode);
    }

    #[test]
    fn test_plane_size_mismatch() {
        assert!(matches!(
            edge_map(&[0u8; 10], 4, 4),
            Err(CodecError::InvalidCarrier(_))
        ));
    }

    #[test]
    fn test_rotates_past_flat_channel() {
        let mut samples = noise_carrier(64, 64, ColorMode::Rgb).into_samples();
        for pixel in samples.chunks_mut(3) {
            pixel[0] = 128;
        }
        let carrier = Carrier::new(64, 64, ColorMode::Rgb, samples).unwrap();

        let encoded = EdgesCodec
            .encode_on_channel(&carrier, b"rotate me", Some(0))
            .unwrap();
        assert_eq!(EdgesCodec::mask_channel(&encoded).unwrap(), 1);
        assert_eq!(EdgesCodec.decode(&encoded, &CodecParams::new()).unwrap(), b"rotate me");
    }

    fn map_with(eligible: usize) -> EdgeMap {
        EdgeMap {
            eligible: vec![true; eligible],
        }
    }

    #[test]
    fn test_exact_fit_moves_to_next_channel() {
        let (mask, map) =
            select_mask(0, 3, 16, |c| Ok(map_with(if c == 0 { 16 } else { 17 }))).unwrap();
        assert_eq!(mask, 1);
        assert_eq!(map.eligible_count(), 17);

        let result = select_mask(1, 3, 16, |_| Ok(map_with(16)));
        assert_eq!(
            result.err(),
            Some(CodecError::CapacityExceeded {
                needed: 16,
                capacity: 16
            })
        );
    }

    #[test]
    fn test_rotation_wraps_around() {
        let (mask, _) =
            select_mask(2, 3, 8, |c| Ok(map_with(if c == 0 { 9 } else { 0 }))).unwrap();
        assert_eq!(mask, 0);
    }

    #[test]
    fn test_flat_carrier_is_too_small() {
        let carrier = Carrier::filled(50, 50, ColorMode::Rgb, 128);
        let result = EdgesCodec.encode(&carrier, b"nowhere to go", &CodecParams::new());
        assert!(matches!(result, Err(CodecError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_message_too_long() {
        let carrier = noise_carrier(40, 40, ColorMode::Rgb);
        let before = carrier.clone();
        let result = EdgesCodec.encode(&carrier, &vec![0u8; 10_000], &CodecParams::new());

        assert!(matches!(result, Err(CodecError::CapacityExceeded { .. })));
        assert_eq!(carrier, before);
    }

    #[test]
    fn test_channel_override_out_of_range() {
        let carrier = noise_carrier(20, 20, ColorMode::Rgb);
        assert!(matches!(
            EdgesCodec.encode_on_channel(&carrier, b"x", Some(3)),
            Err(CodecError::ParameterOutOfRange { .. })
        ));
    }

    #[test]
    fn test_decode_conflicting_markers() {
        let mut samples = noise_carrier(20, 20, ColorMode::Rgb).into_samples();
        samples[0] |= 1;
        samples[1] |= 1;
        let carrier = Carrier::new(20, 20, ColorMode::Rgb, samples).unwrap();

        assert!(matches!(
            EdgesCodec.decode(&carrier, &CodecParams::new()),
            Err(CodecError::Corrupted(_))
        ));
    }

    #[test]
    fn test_decode_missing_marker() {
        let carrier = Carrier::filled(20, 20, ColorMode::Rgb, 0);
        assert!(matches!(
            EdgesCodec.decode(&carrier, &CodecParams::new()),
            Err(CodecError::Corrupted(_))
        ));
    }

    #[test]
    fn test_rejects_grayscale() {
        let carrier = Carrier::filled(20, 20, ColorMode::Luma, 0);
        let err = EdgesCodec.encode(&carrier, b"x", &CodecParams::new()).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedMode { .. }));
    }
}
