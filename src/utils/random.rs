//! Seeded random number generator threaded through every stochastic decision.
//!
//! The memory never touches a global RNG. One `Random` is owned by each memory
//! instance and passed by `&mut` into synapse growth and cell tie-breaking, so
//! two instances built with the same seed and fed the same inputs produce
//! bit-identical outputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// A deterministic pseudo-random number generator.
///
/// Uses ChaCha20 so the stream is identical across platforms for a given seed.
///
/// # Example
///
/// ```rust
/// use tiebreak_tm::utils::Random;
///
/// let mut a = Random::new(7);
/// let mut b = Random::new(7);
/// assert_eq!(a.get_real32(), b.get_real32());
///
/// let picked = a.sample(vec![10u32, 20, 30, 40], 2);
/// assert_eq!(picked.len(), 2);
/// ```
#[derive(Clone)]
pub struct Random {
    rng: ChaCha20Rng,
    seed: u64,
    /// Number of random values drawn so far.
    steps: u64,
}

impl Random {
    /// Creates a new generator from the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            steps: 0,
        }
    }

    /// Returns the seed used for this generator.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of random values drawn.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Generates a random usize in `[0, n)`. Returns 0 when `n == 0`.
    pub fn get_usize(&mut self, n: usize) -> usize {
        self.steps += 1;
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Generates a random f32 in `[0, 1)`.
    pub fn get_real32(&mut self) -> f32 {
        self.steps += 1;
        self.rng.gen()
    }

    /// Picks one index in `[0, n)` by scaling a single `[0, 1)` draw.
    ///
    /// Always consumes exactly one value, even for `n <= 1`, so the stream
    /// position depends only on how many choices were made.
    pub fn choose_index(&mut self, n: usize) -> usize {
        let r = self.get_real32();
        if n == 0 {
            return 0;
        }
        ((r * n as f32) as usize).min(n - 1)
    }

    /// Samples `k` unique items without replacement.
    ///
    /// If `k >= items.len()` every item is returned in its original order and
    /// no random values are consumed.
    pub fn sample<T>(&mut self, mut items: Vec<T>, k: usize) -> Vec<T> {
        let n = items.len();
        if k >= n {
            return items;
        }

        // Partial Fisher-Yates
        for i in 0..k {
            let j = self.get_usize(n - i) + i;
            items.swap(i, j);
        }

        items.truncate(k);
        items
    }
}

impl std::fmt::Debug for Random {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Random")
            .field("seed", &self.seed)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}
