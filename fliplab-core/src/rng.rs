//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each `(stream, index)`
//! pair, e.g. `("Engineer", 0)`. Sub-seeds are BLAKE3-derived and depend only
//! on the seed, stream name and index, never on request order or thread.
//!
//! The generator algorithm is pinned to ChaCha8.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator used by every stochastic component.
pub type SimRng = ChaCha8Rng;

/// Deterministic RNG hierarchy.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a named stream.
    pub fn sub_seed(&self, stream: &str, index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&index.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded generator for a named stream.
    pub fn rng_for(&self, stream: &str, index: u64) -> SimRng {
        SimRng::seed_from_u64(self.sub_seed(stream, index))
    }
}

/// Seeded generator for callers that drive a single stream directly.
pub fn seeded(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}
