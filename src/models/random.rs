use crate::models::NormalSource;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Seeded PRNG normal source. Same seed, same path.
pub struct SeededNormals {
    inner: StdRng,
    seed: Option<u64>,
}

impl SeededNormals {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Non-reproducible source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Seed used at construction, if any (for logging reproducible runs).
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl NormalSource for SeededNormals {
    #[inline]
    fn next_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
/// An empty sequence yields zeros.
#[derive(Debug, Clone)]
pub struct FixedNormals {
    draws: Vec<f64>,
    cursor: usize,
}

impl FixedNormals {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Every draw is 0: the path follows the deterministic drift.
    pub fn zeros() -> Self {
        Self::new(Vec::new())
    }
}

impl NormalSource for FixedNormals {
    #[inline]
    fn next_normal(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let z = self.draws[self.cursor];
        self.cursor = (self.cursor + 1) % self.draws.len();
        z
    }
}
