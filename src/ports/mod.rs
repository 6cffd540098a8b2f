pub mod crypto;
pub mod transport;

pub use crypto::*;
pub use transport::*;
