// src/adapters/crypto/kdf.rs
use crate::domain::connection::{HandshakeContext, MasterSecret, RANDOM_LEN};
use crate::ports::crypto::{CryptoError, KeyDerivation};
use hkdf::Hkdf;
use sha2::Sha384;
use zeroize::Zeroizing;

/// Output size of the derived master secret.
pub const MASTER_SECRET_LEN: usize = 48;

const LABEL: &[u8] = b"spp master secret";

/// HKDF-SHA-384 master secret derivation, salted with the hello randoms.
#[derive(Clone)]
pub struct HkdfMasterSecret {
    salt: [u8; 2 * RANDOM_LEN],
}

impl core::fmt::Debug for HkdfMasterSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HkdfMasterSecret")
    }
}

impl HkdfMasterSecret {
    #[must_use]
    pub fn new(client_random: &[u8; RANDOM_LEN], server_random: &[u8; RANDOM_LEN]) -> Self {
        let mut salt = [0u8; 2 * RANDOM_LEN];
        salt[..RANDOM_LEN].copy_from_slice(client_random);
        salt[RANDOM_LEN..].copy_from_slice(server_random);
        Self { salt }
    }

    #[must_use]
    pub fn for_context(ctx: &HandshakeContext) -> Self {
        Self::new(&ctx.client_random, &ctx.server_random)
    }
}

impl KeyDerivation for HkdfMasterSecret {
    /// # Errors
    /// `CryptoError::KeyDerivation` if the expand step rejects the length.
    fn derive_master_secret(&self, shared_secret: &[u8]) -> Result<MasterSecret, CryptoError> {
        let hk = Hkdf::<Sha384>::new(Some(&self.salt), shared_secret);
        let mut okm = Zeroizing::new(vec![0u8; MASTER_SECRET_LEN]);
        hk.expand(LABEL, &mut okm)
            .map_err(|_| CryptoError::KeyDerivation)?;
        Ok(MasterSecret::new(okm.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let kdf = HkdfMasterSecret::new(&[1; 32], &[2; 32]);
        let a = kdf.derive_master_secret(b"shared").unwrap();
        let b = kdf.derive_master_secret(b"shared").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().len(), MASTER_SECRET_LEN);
    }

    #[test]
    fn randoms_and_secret_both_matter() {
        let kdf = HkdfMasterSecret::new(&[1; 32], &[2; 32]);
        let swapped = HkdfMasterSecret::new(&[2; 32], &[1; 32]);
        let base = kdf.derive_master_secret(b"shared").unwrap();
        assert_ne!(base, swapped.derive_master_secret(b"shared").unwrap());
        assert_ne!(base, kdf.derive_master_secret(b"shared!").unwrap());
    }

    #[test]
    fn built_from_context_randoms() {
        let ctx = crate::test_support::dhe_rsa_context();
        let a = HkdfMasterSecret::for_context(&ctx).derive_master_secret(b"x").unwrap();
        let b = HkdfMasterSecret::new(&[0x11; 32], &[0x22; 32])
            .derive_master_secret(b"x")
            .unwrap();
        assert_eq!(a, b);
    }
}
