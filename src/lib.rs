//! # pixhide - hide bytes in the pixels of an image
//!
//! pixhide embeds an arbitrary byte message into the sample data of a raster
//! image and extracts it again losslessly. The work is done by a family of
//! interchangeable codecs sharing the [`Codec`] contract:
//!
//! | Codec    | Placement                                                     |
//! |----------|---------------------------------------------------------------|
//! | `lsb`    | low (or high) `bits` of every sample, in order                |
//! | `edges`  | LSBs of pixels on edges detected in one colour channel         |
//! | `noise`  | like `lsb`, but inside a freshly generated noise image          |
//! | `not`    | the carrier hidden inside a render of the message               |
//! | `ssdb`   | LSBs of samples picked by a password-seeded generator           |
//! | `concat` | obfuscated hex written between `START` and `END` markers        |
//!
//! Every message is prefixed by its varint-encoded length, so decoders know
//! where it ends. Encoding is all-or-nothing: parameters and capacity are
//! checked before anything is written, and the caller's carrier is never
//! modified.
//!
//! Passwords only seed placement order. Nothing here encrypts.
//!
//! ## Example Usage
//!
//! ```rust
//! use pixhide::{find_codec, Carrier, CodecParams, ColorMode};
//!
//! let carrier = Carrier::filled(64, 64, ColorMode::Rgb, 0x80);
//! let codec = find_codec("lsb").unwrap();
//! let params = CodecParams::new().with("bits", 2);
//!
//! let encoded = codec.encode(&carrier, b"Hello, world!", &params).unwrap();
//! assert_eq!(codec.decode(&encoded, &params).unwrap(), b"Hello, world!");
//! ```
//!
//! Carriers must travel in a lossless container; [`Carrier::save_png`] and
//! [`Carrier::to_png_bytes`] always produce PNG.

pub mod carrier;
pub mod config;
pub mod crypto;
pub mod stego;
pub mod text;

pub use carrier::{Carrier, ColorMode};
pub use stego::{
    codecs, decode_varint, encode_varint, find_codec, required_bits, Codec, CodecError,
    CodecParam, CodecParams, ParamDefault, ParamSchema, ParamType, ParamValue,
};
