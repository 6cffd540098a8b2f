//! Negotiated cipher-suite metadata consumed by the proxy-chain steps.
//!
//! Suite selection happens elsewhere; this module only answers the questions
//! the chain steps ask of the result, once, as typed values.

use serde::{Deserialize, Serialize};

/// Wire protocol version `{major, minor}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const TLS1_0: Self = Self { major: 3, minor: 1 };
    pub const TLS1_1: Self = Self { major: 3, minor: 2 };
    pub const TLS1_2: Self = Self { major: 3, minor: 3 };

    /// Whether explicit `{hash, signature}` identifiers precede signatures.
    #[must_use]
    pub fn has_explicit_sigalgs(self) -> bool {
        self >= Self::TLS1_2
    }
}

/// Key-exchange algorithm of the negotiated suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyExchangeAlgorithm {
    /// Ephemeral finite-field Diffie-Hellman.
    Dhe,
    /// Static DH with an RSA-signed certificate.
    DhRsa,
    /// Static DH with a DSS-signed certificate.
    DhDss,
    /// Ephemeral elliptic-curve Diffie-Hellman.
    Ecdhe,
    Rsa,
    Psk,
    Kerberos,
}

/// Authentication algorithm of the negotiated suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthAlgorithm {
    Rsa,
    Dss,
    Ecdsa,
    Anonymous,
    Psk,
    Srp,
    Kerberos,
}

/// Key-exchange parameter family carried by a key exchange message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExchangeFamily {
    Dh,
    EcDh,
    /// Static DH suites; ephemeral parameters are not supported for them.
    StaticDh,
    None,
}

/// Metadata of the suite selected for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSuite {
    pub key_exchange: KeyExchangeAlgorithm,
    pub authentication: AuthAlgorithm,
    /// Export-grade suites restrict EC groups to at most 163 bits.
    pub export: bool,
}

impl CipherSuite {
    #[must_use]
    pub fn new(key_exchange: KeyExchangeAlgorithm, authentication: AuthAlgorithm) -> Self {
        Self {
            key_exchange,
            authentication,
            export: false,
        }
    }

    #[must_use]
    pub fn family(&self) -> KeyExchangeFamily {
        match self.key_exchange {
            KeyExchangeAlgorithm::Dhe => KeyExchangeFamily::Dh,
            KeyExchangeAlgorithm::DhRsa | KeyExchangeAlgorithm::DhDss => KeyExchangeFamily::StaticDh,
            KeyExchangeAlgorithm::Ecdhe => KeyExchangeFamily::EcDh,
            KeyExchangeAlgorithm::Rsa
            | KeyExchangeAlgorithm::Psk
            | KeyExchangeAlgorithm::Kerberos => KeyExchangeFamily::None,
        }
    }

    /// Whether the key exchange parameters are signed by the peer key.
    #[must_use]
    pub fn requires_public_key(&self) -> bool {
        matches!(
            self.authentication,
            AuthAlgorithm::Rsa | AuthAlgorithm::Dss | AuthAlgorithm::Ecdsa
        )
    }

    /// Suites whose key exchange message may legitimately carry no key.
    #[must_use]
    pub fn is_keyless(&self) -> bool {
        matches!(
            self.authentication,
            AuthAlgorithm::Anonymous | AuthAlgorithm::Srp
        ) || self.key_exchange == KeyExchangeAlgorithm::Psk
    }

    /// Credential-less authentication: the certificate step may be skipped
    /// straight to the done marker.
    #[must_use]
    pub fn is_credential_less(&self) -> bool {
        self.authentication == AuthAlgorithm::Kerberos
    }
}
