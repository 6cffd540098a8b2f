//! Handshake limits and verification policy.
//!
//! Embedders usually deserialize this from their own configuration file;
//! every field has a default so partial documents are accepted.

use crate::domain::certificate::VerifyMode;
use serde::{Deserialize, Serialize};

/// Default bound on certificate list and key exchange messages.
pub const DEFAULT_MAX_CERT_LIST: usize = 100 * 1024;
/// The done marker carries no body; anything near this size is malformed.
pub const DEFAULT_MAX_DONE_LEN: usize = 30;
/// Largest plaintext record; bounds key material messages.
pub const DEFAULT_MAX_PLAIN_LENGTH: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandshakeConfig {
    /// Upper bound for certificate and key exchange message bodies.
    pub max_cert_list: usize,
    /// Upper bound for the done marker read.
    pub max_done_len: usize,
    /// Upper bound for key material message bodies.
    pub max_plain_length: usize,
    /// Whether an untrusted chain aborts the handshake.
    pub verify_mode: VerifyMode,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            max_cert_list: DEFAULT_MAX_CERT_LIST,
            max_done_len: DEFAULT_MAX_DONE_LEN,
            max_plain_length: DEFAULT_MAX_PLAIN_LENGTH,
            verify_mode: VerifyMode::Peer,
        }
    }
}
