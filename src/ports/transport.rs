//! Handshake transport port: message framing, reads, writes, and alerts.
//!
//! The transport owns record-layer framing, buffering, and retransmission.
//! Handshake steps see whole messages only. A read blocks until a complete
//! message arrives or the transport fails; no other step may touch the
//! connection while a read is pending.

use crate::domain::alert::{AlertDescription, AlertLevel};
use crate::protocol::wire::{DecodeError, MessageType};
use thiserror::Error;

/// Errors raised by the transport itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport io error")]
    Io,
    #[error("transport timed out")]
    Timeout,
    #[error("transport closed")]
    Closed,
    /// The transport refused a message larger than the step allows.
    #[error("message of {len} bytes exceeds limit {max}")]
    Oversized { len: usize, max: usize },
    /// A record did not hold exactly one well-formed handshake message.
    #[error("bad handshake framing: {0}")]
    Framing(DecodeError),
}

/// Read position within the chain or slice sub-protocol; lets the transport
/// resume a partially read message after it suspends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadState {
    ProxyCertificate,
    ProxyKeyExchange,
    ProxyDone,
    KeyMaterial,
}

/// One complete handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Raw type byte; may be a type this crate does not know.
    pub msg_type: u8,
    pub body: Vec<u8>,
}

impl HandshakeMessage {
    #[must_use]
    pub fn new(ty: MessageType, body: Vec<u8>) -> Self {
        Self {
            msg_type: ty.as_u8(),
            body,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::try_from(self.msg_type).ok()
    }
}

/// Transport collaborator used by every handshake step.
pub trait HandshakeTransport {
    /// Read the next handshake message (or the one marked for reprocessing).
    ///
    /// `expected` narrows the accepted type when the step knows it; `None`
    /// accepts any type. Bodies longer than `max_len` must be refused.
    ///
    /// # Errors
    /// Any `TransportError` aborts the handshake.
    fn read_message(
        &mut self,
        state: ReadState,
        expected: Option<MessageType>,
        max_len: usize,
    ) -> Result<HandshakeMessage, TransportError>;

    /// Frame and queue a message on the handshake record stream.
    ///
    /// # Errors
    /// Any `TransportError` aborts the handshake.
    fn queue_message(&mut self, ty: MessageType, body: &[u8]) -> Result<(), TransportError>;

    /// Hand the last read message to the next `read_message` call unchanged.
    fn mark_for_reprocessing(&mut self);

    /// Emit an alert record.
    fn send_alert(&mut self, level: AlertLevel, description: AlertDescription);
}
