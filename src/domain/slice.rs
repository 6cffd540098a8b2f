//! Slices: logical sub-channels of one session, each with independent
//! read/write key material and per-peer access flags.

use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Fixed size of locally generated slice keys and upper bound for peer keys.
pub const MAX_KEY_LEN: usize = 64;

/// Slice identifier, unique within a connection.
pub type SliceId = u16;

/// Key bytes of at most `MAX_KEY_LEN`, wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SliceKey {
    bytes: [u8; MAX_KEY_LEN],
    len: usize,
}

impl Default for SliceKey {
    fn default() -> Self {
        Self {
            bytes: [0u8; MAX_KEY_LEN],
            len: 0,
        }
    }
}

impl fmt::Debug for SliceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SliceKey({} bytes)", self.len)
    }
}

impl SliceKey {
    /// Copy `b` into a key; `None` if it is longer than `MAX_KEY_LEN`.
    #[must_use]
    pub fn from_slice(b: &[u8]) -> Option<Self> {
        if b.len() > MAX_KEY_LEN {
            return None;
        }
        let mut k = Self::default();
        k.bytes[..b.len()].copy_from_slice(b);
        k.len = b.len();
        Some(k)
    }

    /// A full-length key taken from `bytes`.
    #[must_use]
    pub fn full(bytes: [u8; MAX_KEY_LEN]) -> Self {
        Self {
            bytes,
            len: MAX_KEY_LEN,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One slice of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    id: SliceId,
    pub(crate) read_key: SliceKey,
    pub(crate) write_key: SliceKey,
    pub(crate) peer_read_key: SliceKey,
    pub(crate) peer_write_key: SliceKey,
    pub(crate) read_access: bool,
    pub(crate) write_access: bool,
    /// Cipher contexts are activated in a later phase, never by this crate.
    pub(crate) initialized: bool,
}

impl Slice {
    #[must_use]
    pub fn new(id: SliceId) -> Self {
        Self {
            id,
            read_key: SliceKey::default(),
            write_key: SliceKey::default(),
            peer_read_key: SliceKey::default(),
            peer_write_key: SliceKey::default(),
            read_access: false,
            write_access: false,
            initialized: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> SliceId {
        self.id
    }

    #[must_use]
    pub fn read_key(&self) -> &SliceKey {
        &self.read_key
    }

    #[must_use]
    pub fn write_key(&self) -> &SliceKey {
        &self.write_key
    }

    #[must_use]
    pub fn peer_read_key(&self) -> &SliceKey {
        &self.peer_read_key
    }

    #[must_use]
    pub fn peer_write_key(&self) -> &SliceKey {
        &self.peer_write_key
    }

    #[must_use]
    pub fn read_access(&self) -> bool {
        self.read_access
    }

    #[must_use]
    pub fn write_access(&self) -> bool {
        self.write_access
    }

    #[must_use]
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Both peer keys present.
    #[must_use]
    pub fn has_peer_material(&self) -> bool {
        self.read_access && self.write_access
    }

    pub(crate) fn install_local(&mut self, read: SliceKey, write: SliceKey) {
        self.read_key = read;
        self.write_key = write;
    }

    /// Peer keys and both access flags change together.
    pub(crate) fn grant_peer(&mut self, read: SliceKey, write: SliceKey) {
        self.peer_read_key = read;
        self.peer_write_key = write;
        self.read_access = true;
        self.write_access = true;
    }
}
