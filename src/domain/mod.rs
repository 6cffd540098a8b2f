/*
Domain model for proxy-chain authentication and slice key negotiation.

Types and invariants only; no IO and no cryptography. The application layer
mutates these values through crate-private methods so that:
* a proxy's `done` flag is monotonic,
* a slice's access flags only become true together with its peer keys,
* a MAC direction is replaced as one value,
* ephemeral parameters hold exactly one key-exchange family.

All secret-bearing types wipe themselves on drop (`zeroize`).
*/

pub mod alert;
pub mod certificate;
pub mod connection;
pub mod key_exchange;
pub mod mac;
pub mod proxy;
pub mod slice;
pub mod suite;

pub use alert::*;
pub use certificate::*;
pub use connection::*;
pub use key_exchange::*;
pub use mac::*;
pub use proxy::*;
pub use slice::*;
pub use suite::*;
