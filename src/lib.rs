//! Crate root for `sliceproxy`.
//!
//! Handshake extension for sessions that pass through a chain of
//! authenticated proxies and carry several independently keyed slices.
//!
//! High-level tree:
//! * `protocol::wire` – bounds-checked codecs for the certificate, key
//!   exchange, done, and slice key material messages.
//! * `domain` – connection aggregate, proxies, slices, MAC state, and the
//!   negotiated suite metadata.
//! * `ports` – transport and crypto collaborator traits.
//! * `application` – the per-hop steps, the chain coordinator, and slice key
//!   exchange.
//! * `adapters` – OS randomness, HKDF master secret derivation, and an
//!   in-memory transport.
//! * `config` – handshake limits and verification policy.
pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod protocol;

#[cfg(test)]
pub(crate) mod test_support;

pub use application::{ErrorKind, SppError};
pub use config::HandshakeConfig;
pub use domain::{Connection, HandshakeContext, Proxy, Role, Slice, SliceId};
