//! Seed derivation and random generators for the codecs.
//!
//! Nothing in this module encrypts anything. Passwords only decide where
//! bits go.

mod seed;

pub use seed::{derive_seed, entropy_rng, password_digest, placement_rng, SALT_PLACEMENT};
