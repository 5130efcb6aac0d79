//! Deterministic seeds and per-call random generators.
//!
//! Passwords only seed placement order. Nothing here provides
//! confidentiality: anyone who knows the codec can brute-force the password.

use hkdf::Hkdf;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// HKDF salt for seed-spaced placement.
pub const SALT_PLACEMENT: &[u8] = b"PIXHIDE-SSDB-V1";

/// Hex-encoded SHA-256 digest of a password.
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derives a 32-byte seed using HKDF-SHA256.
pub fn derive_seed(input: &[u8], salt: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(salt), input);
    let mut output = [0u8; 32];
    hk.expand(b"seed", &mut output)
        .expect("HKDF expand should not fail");
    output
}

/// Generator driving seed-spaced placement for `password`.
///
/// The same password always yields the same sequence.
pub fn placement_rng(password: &str) -> ChaCha20Rng {
    let digest = password_digest(password);
    ChaCha20Rng::from_seed(derive_seed(digest.as_bytes(), SALT_PLACEMENT))
}

/// Fresh generator seeded from the OS, owned by a single codec call.
pub fn entropy_rng() -> ChaCha20Rng {
    ChaCha20Rng::from_entropy()
}
