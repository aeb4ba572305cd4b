//! Grid State Hashing
//!
//! Deterministic hashing of the grid model so the server (and the
//! opponent's mirrored instance) can detect a desynchronized client.

use sha2::{Digest, Sha256};

use super::coord::Coord;

/// Hash output type (256 bits / 32 bytes)
pub type GridHash = [u8; 32];

/// Deterministic hasher for grid state.
///
/// Wraps SHA-256 with helpers for the grid's integer types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for grid state.
    pub fn for_grid_state() -> Self {
        Self::new(b"GRIDLOCK_GRID_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a coordinate.
    #[inline]
    pub fn update_coord(&mut self, value: Coord) {
        self.update_i32(value.x);
        self.update_i32(value.z);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> GridHash {
        self.hasher.finalize().into()
    }
}

/// Short hex prefix of a hash, for log lines.
pub fn short_hex(hash: &GridHash) -> String {
    hex::encode(&hash[..4])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_grid_state();
            hasher.update_u32(100);
            hasher.update_coord(Coord::new(-3, 7));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let hash1 = {
            let mut h = StateHasher::new(b"DOMAIN_A");
            h.update_u64(42);
            h.finalize()
        };
        let hash2 = {
            let mut h = StateHasher::new(b"DOMAIN_B");
            h.update_u64(42);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_short_hex_length() {
        let hash = [0xABu8; 32];
        assert_eq!(short_hex(&hash), "abababab");
    }
}
