//! Session-scoped aggregate: proxy chain, slices, MAC contexts, and the
//! negotiated parameters every handshake step reads.

use crate::config::HandshakeConfig;
use crate::domain::mac::{Direction, MacState};
use crate::domain::proxy::Proxy;
use crate::domain::slice::{Slice, SliceId};
use crate::domain::suite::{CipherSuite, ProtocolVersion};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the client and server hello randoms.
pub const RANDOM_LEN: usize = 32;

/// Which end of the session this endpoint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Session master secret, wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret(Vec<u8>);

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret({} bytes)", self.0.len())
    }
}

impl MasterSecret {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Negotiated, read-only inputs to the chain and slice steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeContext {
    pub role: Role,
    pub suite: CipherSuite,
    pub version: ProtocolVersion,
    pub client_random: [u8; RANDOM_LEN],
    pub server_random: [u8; RANDOM_LEN],
    pub config: HandshakeConfig,
}

impl HandshakeContext {
    #[must_use]
    pub fn new(role: Role, suite: CipherSuite, version: ProtocolVersion) -> Self {
        Self {
            role,
            suite,
            version,
            client_random: [0u8; RANDOM_LEN],
            server_random: [0u8; RANDOM_LEN],
            config: HandshakeConfig::default(),
        }
    }

    #[must_use]
    pub fn with_randoms(
        mut self,
        client_random: [u8; RANDOM_LEN],
        server_random: [u8; RANDOM_LEN],
    ) -> Self {
        self.client_random = client_random;
        self.server_random = server_random;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: HandshakeConfig) -> Self {
        self.config = config;
        self
    }
}

/// A slice id was registered twice.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("slice {0} already exists")]
pub struct DuplicateSlice(pub SliceId);

/// Owned aggregate passed by reference into every handshake step.
#[derive(Debug)]
pub struct Connection {
    context: HandshakeContext,
    proxies: Vec<Proxy>,
    slices: Vec<Slice>,
    master_secret: Option<MasterSecret>,
    inbound_mac: MacState,
    outbound_mac: MacState,
}

impl Connection {
    #[must_use]
    pub fn new(context: HandshakeContext) -> Self {
        Self {
            context,
            proxies: Vec::new(),
            slices: Vec::new(),
            master_secret: None,
            inbound_mac: MacState::default(),
            outbound_mac: MacState::default(),
        }
    }

    #[must_use]
    pub fn context(&self) -> &HandshakeContext {
        &self.context
    }

    /// Append a hop at the far end of the chain.
    pub fn add_proxy(&mut self, proxy: Proxy) -> usize {
        self.proxies.push(proxy);
        self.proxies.len() - 1
    }

    /// Register a slice; ids stay in insertion order.
    ///
    /// # Errors
    /// `DuplicateSlice` if `id` is already present.
    pub fn add_slice(&mut self, id: SliceId) -> Result<(), DuplicateSlice> {
        if self.slice_by_id(id).is_some() {
            return Err(DuplicateSlice(id));
        }
        self.slices.push(Slice::new(id));
        Ok(())
    }

    #[must_use]
    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    #[must_use]
    pub fn proxy(&self, index: usize) -> Option<&Proxy> {
        self.proxies.get(index)
    }

    /// Index of the first (forward) or last (backward) hop not yet done.
    #[must_use]
    pub fn next_proxy_index(&self, forward: bool) -> Option<usize> {
        if forward {
            self.proxies.iter().position(|p| !p.is_done())
        } else {
            self.proxies.iter().rposition(|p| !p.is_done())
        }
    }

    /// Next hop to process; `None` once every hop is done.
    #[must_use]
    pub fn next_proxy(&self, forward: bool) -> Option<&Proxy> {
        self.next_proxy_index(forward).map(|i| &self.proxies[i])
    }

    /// Split borrow: read-only context plus one mutable hop.
    pub fn hop_mut(&mut self, index: usize) -> Option<(&HandshakeContext, &mut Proxy)> {
        let proxy = self.proxies.get_mut(index)?;
        Some((&self.context, proxy))
    }

    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub(crate) fn slices_mut(&mut self) -> &mut [Slice] {
        &mut self.slices
    }

    #[must_use]
    pub fn slice_by_id(&self, id: SliceId) -> Option<&Slice> {
        self.slices.iter().find(|s| s.id() == id)
    }

    pub(crate) fn slice_by_id_mut(&mut self, id: SliceId) -> Option<&mut Slice> {
        self.slices.iter_mut().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn master_secret(&self) -> Option<&MasterSecret> {
        self.master_secret.as_ref()
    }

    pub(crate) fn set_master_secret(&mut self, secret: MasterSecret) {
        self.master_secret = Some(secret);
    }

    #[must_use]
    pub fn mac_state(&self, direction: Direction) -> &MacState {
        match direction {
            Direction::Inbound => &self.inbound_mac,
            Direction::Outbound => &self.outbound_mac,
        }
    }

    /// Swap in a whole snapshot; returns the previous state.
    pub(crate) fn replace_mac_state(&mut self, direction: Direction, state: MacState) -> MacState {
        let slot = match direction {
            Direction::Inbound => &mut self.inbound_mac,
            Direction::Outbound => &mut self.outbound_mac,
        };
        core::mem::replace(slot, state)
    }
}
