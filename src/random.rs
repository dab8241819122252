//! Deterministic random sources.
//!
//! The simulation owns a single `SimRng` seeded from the config seed.
//! Streams that must not depend on frame timing (spawn schedules) get their
//! own generator derived from `Sha3_256(seed || stream || index)`.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use sha3::{Digest, Sha3_256};

pub type SimRng = Xoshiro256PlusPlus;

pub fn seeded(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Stable 64-bit hash of `(seed, stream, index)`
pub fn derive_seed(seed: u64, stream: &str, index: i64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(stream.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Independent generator for one element of a named stream
pub fn derived(seed: u64, stream: &str, index: i64) -> SimRng {
    seeded(derive_seed(seed, stream, index))
}
