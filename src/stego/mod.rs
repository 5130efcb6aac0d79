//! Steganography codecs for hiding bytes in raster images.
//!
//! Every codec implements [`Codec`] and is listed in a fixed registry keyed by
//! its short name:
//! - `lsb`: uniform bit-plane embedding
//! - `edges`: embedding restricted to edges of one colour channel
//! - `noise`: uniform embedding into a freshly generated noise image
//! - `not`: the carrier hidden inside a render of the message
//! - `ssdb`: password-seeded scattered placement
//! - `concat`: obfuscated hex between sentinel markers

pub mod bits;
pub mod capacity;
pub mod concat;
pub mod decoy;
pub mod edges;
pub mod error;
pub mod lsb;
pub mod noise;
pub mod params;
pub mod ssdb;
pub mod varint;

pub use capacity::{check_capacity, required_bits};
pub use concat::ConcatCodec;
pub use decoy::DecoyCodec;
pub use edges::{edge_map, EdgeMap, EdgesCodec};
pub use error::CodecError;
pub use lsb::{BitPlane, LsbCodec};
pub use noise::NoiseCodec;
pub use params::{CodecParam, CodecParams, ParamDefault, ParamSchema, ParamType, ParamValue};
pub use ssdb::SsdbCodec;
pub use varint::{decode_varint, encode_varint};

use crate::carrier::{Carrier, ColorMode};

/// Shared contract of every embedding strategy.
///
/// `encode` never modifies its input and either returns a complete new
/// carrier or fails before writing anything. Implementations hold no mutable
/// state, so one instance can serve concurrent callers.
pub trait Codec: Send + Sync {
    /// Stable registry key.
    fn short_name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// One-line description.
    fn help(&self) -> &'static str;

    fn params(&self) -> ParamSchema;

    /// Carrier layouts this codec can work with.
    fn accepted_modes(&self) -> &'static [ColorMode];

    /// Embeds `message` into a copy of `carrier`.
    fn encode(
        &self,
        carrier: &Carrier,
        message: &[u8],
        params: &CodecParams,
    ) -> Result<Carrier, CodecError>;

    /// Extracts the embedded message.
    fn decode(&self, carrier: &Carrier, params: &CodecParams) -> Result<Vec<u8>, CodecError>;
}

static REGISTRY: [&dyn Codec; 6] = [
    &LsbCodec,
    &EdgesCodec,
    &NoiseCodec::with_min_pixels(noise::DEFAULT_MIN_PIXELS),
    &DecoyCodec::with_min_pixels(noise::DEFAULT_MIN_PIXELS),
    &SsdbCodec,
    &ConcatCodec,
];

/// All registered codecs, in display order.
pub fn codecs() -> &'static [&'static dyn Codec] {
    &REGISTRY
}

/// Looks a codec up by short name.
pub fn find_codec(short_name: &str) -> Result<&'static dyn Codec, CodecError> {
    REGISTRY
        .iter()
        .copied()
        .find(|codec| codec.short_name() == short_name)
        .ok_or_else(|| CodecError::UnknownCodec(short_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_order() {
        let names: Vec<&str> = codecs().iter().map(|c| c.short_name()).collect();
        assert_eq!(names, vec!["lsb", "edges", "noise", "not", "ssdb", "concat"]);
    }

    #[test]
    fn test_short_names_unique() {
        let names: HashSet<&str> = codecs().iter().map(|c| c.short_name()).collect();
        assert_eq!(names.len(), codecs().len());
    }

    #[test]
    fn test_find_codec() {
        assert_eq!(find_codec("ssdb").unwrap().display_name(), "Seed Spaced");
        assert_eq!(
            find_codec("rot13").err(),
            Some(CodecError::UnknownCodec("rot13".to_string()))
        );
    }

    #[test]
    fn test_schemas_are_consistent() {
        for codec in codecs() {
            let schema = codec.params();
            for param in schema.for_encode().chain(schema.for_decode()) {
                assert!(!param.help.is_empty(), "{}.{}", codec.short_name(), param.name);
                if param.required {
                    assert_eq!(param.default, ParamDefault::None);
                }
                if param.range.is_some() {
                    assert_eq!(param.kind, ParamType::Int);
                }
            }
            assert!(!codec.accepted_modes().is_empty());
        }
    }
}
