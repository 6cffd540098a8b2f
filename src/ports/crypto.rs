// src/ports/crypto.rs
//! Cryptographic collaborator ports.
//!
//! The handshake steps decide *when* to verify, agree, derive, or draw
//! randomness; implementations of these traits decide *how*. Each concern is
//! its own trait so a step only asks for what it uses.
//!
//! Security expectations for implementors:
//! - Never log key, secret, or signature bytes.
//! - Return secrets in `Zeroizing` buffers so callers can wipe them early.
//! - Treat every input as attacker controlled; the wire layer only checks
//!   structure, not that a point is on its curve or a prime is prime.

use crate::domain::certificate::{
    Certificate, CertificateChain, ChainVerdict, PublicKey, VerifyMode,
};
use crate::domain::connection::MasterSecret;
use crate::domain::key_exchange::{DhParams, DigestAlgorithm, EcdhParams};
use zeroize::Zeroizing;

/// Failures reported by crypto collaborators.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("random source failure")]
    RandomSource,
    #[error("key agreement failure")]
    KeyAgreement,
    #[error("key derivation failure")]
    KeyDerivation,
    #[error("internal crypto error")]
    Internal,
}

/// Certificate chain validation and leaf key extraction.
pub trait CertificateVerifier {
    /// Validate `chain` (leaf first). `mode` is informational; the caller
    /// applies the hard-fail policy to the returned verdict.
    fn verify_chain(&self, chain: &CertificateChain, mode: VerifyMode) -> ChainVerdict;

    /// Extract the subject public key; `None` if the certificate has none
    /// the implementation can represent.
    fn public_key(&self, cert: &Certificate) -> Option<PublicKey>;
}

/// Signature verification over a key exchange transcript.
pub trait SignatureVerifier {
    /// `transcript` is `client_random || server_random || params`; the
    /// implementation hashes it with `digest` before verifying.
    fn verify_signature(
        &self,
        key: &PublicKey,
        digest: DigestAlgorithm,
        transcript: &[u8],
        signature: &[u8],
    ) -> bool;
}

/// Output of an ephemeral agreement: shared secret plus our public value.
pub struct Agreement {
    pub shared_secret: Zeroizing<Vec<u8>>,
    /// DH `Yc` or an uncompressed EC point.
    pub local_public: Vec<u8>,
}

/// Ephemeral key agreement against a hop's stored parameters.
pub trait KeyAgreement {
    /// Generate a local key in the peer's group and compute the shared value.
    ///
    /// # Errors
    /// `CryptoError::KeyAgreement` if the parameters are unusable.
    fn dh_agree(&self, peer: &DhParams) -> Result<Agreement, CryptoError>;

    /// Generate a local key on the peer's curve and compute the shared value.
    ///
    /// # Errors
    /// `CryptoError::KeyAgreement` if the point is invalid.
    fn ecdh_agree(&self, peer: &EcdhParams) -> Result<Agreement, CryptoError>;
}

/// Master secret derivation from a shared value.
pub trait KeyDerivation {
    /// # Errors
    /// `CryptoError::KeyDerivation` if derivation fails.
    fn derive_master_secret(&self, shared_secret: &[u8]) -> Result<MasterSecret, CryptoError>;
}

/// Cryptographically strong random bytes.
pub trait RandomSource {
    /// Fill `out` entirely or fail.
    ///
    /// # Errors
    /// `CryptoError::RandomSource` if the source cannot deliver.
    fn fill_random(&self, out: &mut [u8]) -> Result<(), CryptoError>;
}
