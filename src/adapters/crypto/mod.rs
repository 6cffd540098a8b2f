pub mod kdf;
pub mod random;

pub use kdf::{HkdfMasterSecret, MASTER_SECRET_LEN};
pub use random::OsRandom;
