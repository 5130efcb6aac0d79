//! Error taxonomy shared by every codec.

use thiserror::Error;

/// Errors that can occur while embedding into or extracting from a carrier.
///
/// Every variant is raised before the output carrier is touched, so a failed
/// `encode` never hands back a partially written image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Message too large for carrier: need {needed} bits, capacity is {capacity} bits")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Carrier is in an unsupported color mode ({mode}), use one of: {}", .accepted.join(", "))]
    UnsupportedMode {
        mode: String,
        accepted: Vec<&'static str>,
    },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter '{name}' out of range: {value} (expected {min}..={max})")]
    ParameterOutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Wrong codec, corrupted carrier or no embedded data: {0}")]
    Corrupted(String),

    #[error("Placement exhausted after {collisions} consecutive collisions, message too large for carrier")]
    PlacementExhausted { collisions: usize },

    #[error("Carrier already holds an embedded message")]
    AlreadyEmbedded,

    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    #[error("Invalid carrier: {0}")]
    InvalidCarrier(String),

    #[error("Image error: {0}")]
    Image(String),
}

impl CodecError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
