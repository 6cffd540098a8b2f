//! Certificates, peer public keys, and chain verification verdicts.
//!
//! Certificates are shared between the verified chain and `Proxy::peer`
//! through `Arc`. Dropping a `CertificateChain` only releases the chain's own
//! references; a leaf still held as `peer` stays alive until that reference is
//! dropped too.

use crate::domain::alert::AlertDescription;
use crate::domain::key_exchange::{DigestAlgorithm, SignatureAlgorithm};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One DER-encoded certificate.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Vec<u8>,
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Certificate({} bytes)", self.der.len())
    }
}

impl Certificate {
    #[must_use]
    pub fn from_der(der: Vec<u8>) -> Self {
        Self { der }
    }

    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// Ordered chain of shared certificates, leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain(Vec<Arc<Certificate>>);

impl CertificateChain {
    #[must_use]
    pub fn new(certs: Vec<Arc<Certificate>>) -> Self {
        Self(certs)
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&Arc<Certificate>> {
        self.0.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Certificate>> {
        self.0.iter()
    }
}

impl FromIterator<Certificate> for CertificateChain {
    fn from_iter<I: IntoIterator<Item = Certificate>>(iter: I) -> Self {
        Self(iter.into_iter().map(Arc::new).collect())
    }
}

/// Public key algorithm of a certificate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa,
    Dsa,
    Ec,
    /// Anything the chain steps have no slot for (e.g. GOST, Ed25519).
    Other(u16),
}

/// Certificate slot a leaf is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateType {
    RsaEnc,
    DsaSign,
    Ecc,
}

impl CertificateType {
    /// Classify a key; `None` means the certificate type is unknown.
    #[must_use]
    pub fn classify(key_type: KeyType) -> Option<Self> {
        match key_type {
            KeyType::Rsa => Some(Self::RsaEnc),
            KeyType::Dsa => Some(Self::DsaSign),
            KeyType::Ec => Some(Self::Ecc),
            KeyType::Other(_) => None,
        }
    }
}

/// Public key extracted from a leaf certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub key_type: KeyType,
    /// Encoded key (SubjectPublicKeyInfo or algorithm specific).
    pub spki: Vec<u8>,
    /// Largest signature this key can produce, in bytes.
    pub max_signature_len: usize,
    /// Domain parameters are inherited from the issuer and absent here.
    pub missing_parameters: bool,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("key_type", &self.key_type)
            .field("max_signature_len", &self.max_signature_len)
            .field("missing_parameters", &self.missing_parameters)
            .finish_non_exhaustive()
    }
}

impl PublicKey {
    /// TLS 1.2 signature algorithm implied by the key type.
    #[must_use]
    pub fn signature_algorithm(&self) -> Option<SignatureAlgorithm> {
        match self.key_type {
            KeyType::Rsa => Some(SignatureAlgorithm::Rsa),
            KeyType::Dsa => Some(SignatureAlgorithm::Dsa),
            KeyType::Ec => Some(SignatureAlgorithm::Ecdsa),
            KeyType::Other(_) => None,
        }
    }

    /// Digest used before explicit signature algorithms existed.
    #[must_use]
    pub fn legacy_digest(&self) -> DigestAlgorithm {
        match self.key_type {
            KeyType::Rsa => DigestAlgorithm::Md5Sha1,
            _ => DigestAlgorithm::Sha1,
        }
    }
}

/// How chain verification results gate progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Record the verdict but continue.
    None,
    /// Abort on any untrusted verdict.
    #[default]
    Peer,
}

/// Reason a chain was not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    Expired,
    NotYetValid,
    Revoked,
    UnknownIssuer,
    BadSignature,
    UnsupportedPurpose,
    Other(i32),
}

impl VerifyFailure {
    /// Alert sent when a hard-fail verification rejects the chain.
    #[must_use]
    pub fn alert(self) -> AlertDescription {
        match self {
            Self::Expired | Self::NotYetValid => AlertDescription::CertificateExpired,
            Self::Revoked => AlertDescription::CertificateRevoked,
            Self::UnknownIssuer => AlertDescription::UnknownCa,
            Self::BadSignature => AlertDescription::BadCertificate,
            Self::UnsupportedPurpose => AlertDescription::UnsupportedCertificate,
            Self::Other(_) => AlertDescription::CertificateUnknown,
        }
    }
}

/// Outcome of `CertificateVerifier::verify_chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainVerdict {
    Trusted,
    Untrusted(VerifyFailure),
}

impl ChainVerdict {
    #[must_use]
    pub fn is_trusted(self) -> bool {
        self == Self::Trusted
    }
}
