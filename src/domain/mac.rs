//! Per-direction MAC state: digest, secret, and sequence counter.

use crate::domain::key_exchange::DigestAlgorithm;
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Upper bound for MAC secrets.
pub const MAX_MD_SIZE: usize = 64;

/// Traffic direction of a MAC context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Snapshot of one direction's MAC context. Replaced as a whole.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MacState {
    #[zeroize(skip)]
    digest: Option<DigestAlgorithm>,
    secret: [u8; MAX_MD_SIZE],
    secret_len: usize,
    sequence: [u8; 8],
}

impl Default for MacState {
    fn default() -> Self {
        Self {
            digest: None,
            secret: [0u8; MAX_MD_SIZE],
            secret_len: 0,
            sequence: [0u8; 8],
        }
    }
}

impl fmt::Debug for MacState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacState")
            .field("digest", &self.digest)
            .field("secret_len", &self.secret_len)
            .field("sequence", &u64::from_be_bytes(self.sequence))
            .finish_non_exhaustive()
    }
}

impl MacState {
    /// Build a snapshot; `None` if `secret` exceeds `MAX_MD_SIZE`.
    #[must_use]
    pub fn new(digest: DigestAlgorithm, secret: &[u8], sequence: [u8; 8]) -> Option<Self> {
        if secret.len() > MAX_MD_SIZE {
            return None;
        }
        let mut s = Self::default();
        s.digest = Some(digest);
        s.sequence = sequence;
        s.secret[..secret.len()].copy_from_slice(secret);
        s.secret_len = secret.len();
        Some(s)
    }

    #[must_use]
    pub fn digest(&self) -> Option<DigestAlgorithm> {
        self.digest
    }

    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret[..self.secret_len]
    }

    #[must_use]
    pub fn secret_len(&self) -> usize {
        self.secret_len
    }

    #[must_use]
    pub fn sequence(&self) -> [u8; 8] {
        self.sequence
    }
}
