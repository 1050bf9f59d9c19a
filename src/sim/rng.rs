//! Seeded random stream for procedural decisions
//!
//! A run's stream is derived from a daily seed (shared by everyone playing
//! the same day) and a per-run salt. Same seed + salt, same draws.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Mixed into the daily seed before the salt
const SEED_MIX: u32 = 0xB055;

/// Daily seed from a calendar date (month and day are 1-based)
pub fn daily_seed(year: u32, month: u32, day: u32) -> u32 {
    year.wrapping_mul(73_856_093) ^ month.wrapping_mul(19_349_663) ^ day.wrapping_mul(83_492_791)
}

/// Combine a daily seed and a per-run salt into the stream seed
#[inline]
pub fn combine_seed(daily: u32, salt: u32) -> u32 {
    (daily ^ SEED_MIX) ^ salt
}

/// Deterministic random stream for one run
#[derive(Debug, Clone)]
pub struct RunRng {
    seed: u32,
    inner: Pcg32,
}

impl RunRng {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(u64::from(seed)),
        }
    }

    pub fn from_parts(daily: u32, salt: u32) -> Self {
        Self::new(combine_seed(daily, salt))
    }

    /// The combined seed this stream was built from
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Next draw in [0, 1)
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// True with probability `p`
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next() < p
    }

    /// Uniform index in `0..len`
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        let i = (self.next() * len as f32) as usize;
        i.min(len.saturating_sub(1))
    }

    /// Uniform lane index
    #[inline]
    pub fn lane(&mut self) -> u8 {
        self.index(3) as u8
    }
}
