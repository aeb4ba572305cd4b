//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded per round. Both mirrored clients derive the same
//! seed from the room id and round index, so randomized rule modifiers
//! (e.g. `random_holes`) punch identical holes on both boards.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// Given the same seed, this RNG produces the exact same sequence of
/// values on any platform.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // State must never be all zeros or the sequence degenerates.
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range `[0, max)`.
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large max, but acceptable
        // for tile selection.
        (self.next_u64() % max as u64) as u32
    }

    /// Random boolean that is true with probability `permille / 1000`.
    #[inline]
    pub fn chance(&mut self, permille: u32) -> bool {
        self.next_int(1000) < permille
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a round seed shared by both mirrored clients.
///
/// The seed is a function of:
/// - the room id assigned by the matchmaking server (same for both players)
/// - the round index within the match
///
/// Neither client can influence it, and both arrive at the same value,
/// so per-round randomness stays in lockstep.
pub fn derive_round_seed(room_id: &[u8; 16], round_index: u32) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"GRIDLOCK_ROUND_SEED_V1");
    hasher.update(room_id);
    hasher.update(round_index.to_le_bytes());

    let hash = hasher.finalize();

    // Take first 8 bytes as seed
    u64::from_le_bytes(hash[0..8].try_into().unwrap())
}

// =============================================================================
// TESTS
// =============================================================================
