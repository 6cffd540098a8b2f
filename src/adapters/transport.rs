//! In-process handshake transport.
//!
//! Messages are kept as framed records (`type || u24 length || body`) so the
//! same bytes a socket would carry pass through the frame codec. Two
//! endpoints are joined by moving outbound records with [`MemoryTransport::deliver_to`].

use std::collections::VecDeque;

use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::domain::alert::{AlertDescription, AlertLevel};
use crate::ports::transport::{HandshakeMessage, HandshakeTransport, ReadState, TransportError};
use crate::protocol::wire::{MessageType, prepend_frame, split_frame};

#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<Vec<u8>>,
    outbound: VecDeque<Vec<u8>>,
    last: Option<HandshakeMessage>,
    reprocess: bool,
    alerts: Vec<(AlertLevel, AlertDescription)>,
    closed: bool,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw record for the next read.
    pub fn push_record(&mut self, record: Vec<u8>) {
        self.inbound.push_back(record);
    }

    /// Move every queued outbound record to `peer`'s inbound queue.
    /// Returns how many records moved.
    pub fn deliver_to(&mut self, peer: &mut MemoryTransport) -> usize {
        let n = self.outbound.len();
        peer.inbound.extend(self.outbound.drain(..));
        trace!(records = n, "delivered records");
        n
    }

    /// Drain the framed records written so far.
    pub fn take_outbound(&mut self) -> Vec<Vec<u8>> {
        self.outbound.drain(..).collect()
    }

    #[must_use]
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    #[must_use]
    pub fn alerts(&self) -> &[(AlertLevel, AlertDescription)] {
        &self.alerts
    }

    /// Refuse further writes and treat an empty inbound queue as end of stream.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl HandshakeTransport for MemoryTransport {
    fn read_message(
        &mut self,
        state: ReadState,
        expected: Option<MessageType>,
        max_len: usize,
    ) -> Result<HandshakeMessage, TransportError> {
        if self.reprocess {
            self.reprocess = false;
            let m = self.last.clone().ok_or(TransportError::Closed)?;
            debug!(?state, msg_type = m.msg_type, "re-reading deferred message");
            return Ok(m);
        }

        let mut record = self.inbound.pop_front().ok_or(TransportError::Closed)?;
        let parsed = split_frame(&record).map(|(ty, body)| (ty, body.to_vec()));
        record.zeroize();
        let (msg_type, body) = parsed.map_err(TransportError::Framing)?;

        if body.len() > max_len {
            return Err(TransportError::Oversized {
                len: body.len(),
                max: max_len,
            });
        }
        trace!(?state, ?expected, msg_type, len = body.len(), "read message");
        let m = HandshakeMessage { msg_type, body };
        self.last = Some(m.clone());
        Ok(m)
    }

    fn queue_message(&mut self, ty: MessageType, body: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let record = prepend_frame(ty, body).map_err(TransportError::Framing)?;
        self.outbound.push_back(record);
        Ok(())
    }

    fn mark_for_reprocessing(&mut self) {
        self.reprocess = true;
    }

    fn send_alert(&mut self, level: AlertLevel, description: AlertDescription) {
        self.alerts.push((level, description));
    }
}
