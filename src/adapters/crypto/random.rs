// src/adapters/crypto/random.rs
use crate::ports::crypto::{CryptoError, RandomSource};
use rand_core::{OsRng, RngCore};

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    /// # Errors
    /// `CryptoError::RandomSource` if the OS generator is unavailable.
    fn fill_random(&self, out: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(out)
            .map_err(|_| CryptoError::RandomSource)
    }
}
