// Copyright (c) 2024 Mike Tsao

//! Provides the random-number sources that drive exercise generation.

use byteorder::{BigEndian, ByteOrder};
use core::ops::Range;
use delegate::delegate;

/// A source of uniformly distributed random numbers. Everything that makes a
/// random choice takes one of these, so tests can substitute a seeded [Rng] or
/// a scripted source and get the same exercise every time.
pub trait RandomSource {
    /// Returns a value uniformly drawn from `range`. The range must not be
    /// empty.
    fn rand_range(&mut self, range: Range<u64>) -> u64;

    /// Returns a value uniformly drawn from [0.0, 1.0).
    fn rand_float(&mut self) -> f64;

    /// Picks one element of `items` uniformly. Returns [None] if `items` is
    /// empty.
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            None
        } else {
            let index = self.rand_range(0..items.len() as u64) as usize;
            items.get(index)
        }
    }
}

/// A pseudorandom number generator (PRNG) for exercise generation, which
/// doesn't require cryptographically secure random numbers.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
impl Default for Rng {
    fn default() -> Self {
        // Panics only if the OS can't supply entropy at all.
        Self::new_with_seed(Self::generate_seed().unwrap())
    }
}
#[allow(missing_docs)]
impl Rng {
    /// Pass the same number to [Rng::new_with_seed()] to get the same stream
    /// back again. Good for reproducing an exercise.
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    /// Create a sufficiently high-quality random number that's suitable for
    /// [Rng].
    pub fn generate_seed() -> anyhow::Result<u128> {
        let mut bytes = [0u8; 16];

        getrandom::getrandom(&mut bytes)?;
        Ok(BigEndian::read_u128(&bytes))
    }

    delegate! {
        to self.0 {
            pub fn rand_u64(&mut self) -> u64;
        }
    }
}
impl RandomSource for Rng {
    delegate! {
        to self.0 {
            fn rand_range(&mut self, range: Range<u64>) -> u64;
            fn rand_float(&mut self) -> f64;
        }
    }
}

/// Replays a fixed script of values, for tests that need to force a
/// particular choice. Integer requests consume from `integers` (reduced into
/// the requested range), float requests from `floats`. Both wrap around.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    integers: Vec<u64>,
    floats: Vec<f64>,
    next_integer: usize,
    next_float: usize,
}
impl ScriptedRandom {
    /// Creates a source that replays the given values.
    pub fn new_with(integers: &[u64], floats: &[f64]) -> Self {
        Self {
            integers: integers.to_vec(),
            floats: floats.to_vec(),
            ..Default::default()
        }
    }
}
impl RandomSource for ScriptedRandom {
    fn rand_range(&mut self, range: Range<u64>) -> u64 {
        let width = range.end.saturating_sub(range.start).max(1);
        let value = if self.integers.is_empty() {
            0
        } else {
            let v = self.integers[self.next_integer % self.integers.len()];
            self.next_integer += 1;
            v
        };
        range.start + value % width
    }

    fn rand_float(&mut self) -> f64 {
        if self.floats.is_empty() {
            return 0.0;
        }
        let v = self.floats[self.next_float % self.floats.len()];
        self.next_float += 1;
        v
    }
}
