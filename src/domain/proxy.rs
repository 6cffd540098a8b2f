//! One hop of the authenticated proxy chain.

use crate::domain::certificate::{
    Certificate, CertificateChain, CertificateType, ChainVerdict, PublicKey,
};
use crate::domain::key_exchange::KeyExchangeParams;
use std::sync::Arc;

/// Certificate state installed by a successful certificate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCredentials {
    pub chain: CertificateChain,
    pub peer: Arc<Certificate>,
    pub public_key: PublicKey,
    pub cert_type: CertificateType,
    pub verdict: ChainVerdict,
}

/// A chain hop. Position is its index in `Connection::proxies`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Proxy {
    done: bool,
    credentials: Option<PeerCredentials>,
    key_exchange: KeyExchangeParams,
}

impl Proxy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Leaf certificate of the verified chain.
    #[must_use]
    pub fn peer(&self) -> Option<&Arc<Certificate>> {
        self.credentials.as_ref().map(|c| &c.peer)
    }

    #[must_use]
    pub fn certificate_chain(&self) -> Option<&CertificateChain> {
        self.credentials.as_ref().map(|c| &c.chain)
    }

    #[must_use]
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.credentials.as_ref().map(|c| &c.public_key)
    }

    #[must_use]
    pub fn cert_type(&self) -> Option<CertificateType> {
        self.credentials.as_ref().map(|c| c.cert_type)
    }

    /// Verdict retained from chain verification (permissive mode may keep a failure).
    #[must_use]
    pub fn verify_result(&self) -> Option<ChainVerdict> {
        self.credentials.as_ref().map(|c| c.verdict)
    }

    #[must_use]
    pub fn key_exchange(&self) -> &KeyExchangeParams {
        &self.key_exchange
    }

    /// Monotonic: there is no way to clear it.
    pub(crate) fn mark_done(&mut self) {
        self.done = true;
    }

    /// Replace certificate state; the previous chain is released.
    pub(crate) fn install_credentials(&mut self, creds: PeerCredentials) {
        self.credentials = Some(creds);
    }

    /// Replace ephemeral parameters; the previous value is wiped on drop.
    pub(crate) fn install_key_exchange(&mut self, params: KeyExchangeParams) {
        self.key_exchange = params;
    }
}
