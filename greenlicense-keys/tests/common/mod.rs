//! Shared test helpers for key tests.

#![allow(dead_code)]

use greenlicense_keys::{KeyPair, KeyParams};
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};

/// Returns a deterministic key pair from a fixed seed.
pub fn test_key_pair(name: &str) -> KeyPair {
    let mut rng = StdRng::seed_from_u64(42);
    KeyPair::generate_with_rng(&KeyParams::new(name), &mut rng).unwrap()
}

/// A randomness source that always fails.
pub struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        panic!("FailingRng only supports try_fill_bytes")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("FailingRng only supports try_fill_bytes")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("FailingRng only supports try_fill_bytes")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}
