//! Concrete implementations of the ports.

pub mod crypto;
pub mod transport;

pub use crypto::{HkdfMasterSecret, OsRandom};
pub use transport::MemoryTransport;
