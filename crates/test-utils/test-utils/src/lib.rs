//! Shared test fixtures for the rollhub workspace.

mod fixtures;

use arbitrary::{Arbitrary, Unstructured};
use rand_core::{OsRng, RngCore};

pub use crate::fixtures::*;

/// Size of the entropy buffer backing an [`ArbitraryGenerator`].
const ARB_GEN_LEN: usize = 65_536;

/// Attempts before giving up on a type that keeps running out of entropy.
const MAX_ATTEMPTS: usize = 16;

/// Produces random instances of any [`Arbitrary`] type.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    /// Creates a generator with a custom entropy buffer size, bigger types
    /// with nested collections may need more than the default.
    pub fn new_with_size(s: usize) -> Self {
        Self { buf: vec![0u8; s] }
    }

    /// Generates an instance using [`OsRng`] as the entropy source.
    pub fn generate<T>(&mut self) -> T
    where
        T: for<'a> Arbitrary<'a>,
    {
        self.generate_with_rng(&mut OsRng)
    }

    /// Generates an instance with entropy from `rng`.
    ///
    /// # Panics
    ///
    /// If every attempt fails to build a `T`.
    pub fn generate_with_rng<T, R>(&mut self, rng: &mut R) -> T
    where
        T: for<'a> Arbitrary<'a>,
        R: RngCore,
    {
        let mut last_error = None;
        for _ in 0..MAX_ATTEMPTS {
            rng.fill_bytes(&mut self.buf);
            match T::arbitrary(&mut Unstructured::new(&self.buf)) {
                Ok(value) => return value,
                Err(err) => last_error = Some(err),
            }
        }
        match last_error {
            Some(err) => panic!("failed to generate arbitrary instance: {err}"),
            None => panic!("failed to generate arbitrary instance"),
        }
    }
}
