use tracing::{debug, info};

use super::steps::{StepOutcome, get_proxy_certificate, get_proxy_done, get_proxy_key_exchange};
use crate::application::errors::SppError;
use crate::domain::connection::Connection;
use crate::ports::crypto::{CertificateVerifier, SignatureVerifier};
use crate::ports::transport::HandshakeTransport;

/// Message the current hop expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopStep {
    Certificate,
    KeyExchange,
    Done,
}

/// Coarse progress of the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Await(HopStep),
    /// Every hop is done.
    Complete,
    /// A step failed; the handshake must be torn down.
    Failed,
}

/// What a single `step` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub hop: usize,
    pub step: HopStep,
    pub outcome: StepOutcome,
}

/// Drives certificate -> key exchange -> done for each unfinished hop, in
/// traversal order, and refuses to go on after a failure.
///
/// The coordinator borrows its collaborators; the connection is passed to
/// each call so callers can inspect it between steps.
pub struct ProxyChainCoordinator<'a, T: ?Sized, C: ?Sized> {
    transport: &'a mut T,
    crypto: &'a C,
    forward: bool,
    state: ChainState,
    hop: Option<usize>,
}

impl<'a, T, C> ProxyChainCoordinator<'a, T, C>
where
    T: HandshakeTransport + ?Sized,
    C: CertificateVerifier + SignatureVerifier + ?Sized,
{
    /// `forward` walks the chain from index 0 up; otherwise from the far end.
    pub fn new(transport: &'a mut T, crypto: &'a C, forward: bool) -> Self {
        Self {
            transport,
            crypto,
            forward,
            state: ChainState::Await(HopStep::Certificate),
            hop: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Hop whose sub-protocol is in progress, if one has started.
    #[must_use]
    pub fn current_hop(&self) -> Option<usize> {
        self.hop
    }

    /// Run exactly one step. `Ok(None)` once the chain is exhausted.
    ///
    /// # Errors
    /// The failing step's error; afterwards every call returns `Aborted`.
    pub fn step(&mut self, conn: &mut Connection) -> Result<Option<StepReport>, SppError> {
        let step = match self.state {
            ChainState::Await(step) => step,
            ChainState::Complete => return Ok(None),
            ChainState::Failed => return Err(SppError::Aborted),
        };
        let Some(hop) = self.hop.or_else(|| conn.next_proxy_index(self.forward)) else {
            self.state = ChainState::Complete;
            return Ok(None);
        };

        let result = match step {
            HopStep::Certificate => {
                get_proxy_certificate(conn, hop, &mut *self.transport, self.crypto)
            }
            HopStep::KeyExchange => {
                get_proxy_key_exchange(conn, hop, &mut *self.transport, self.crypto)
            }
            HopStep::Done => get_proxy_done(conn, hop, &mut *self.transport),
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = ChainState::Failed;
                self.hop = None;
                return Err(e);
            }
        };

        let (next, current) = match step {
            HopStep::Certificate => (HopStep::KeyExchange, Some(hop)),
            HopStep::KeyExchange => (HopStep::Done, Some(hop)),
            HopStep::Done => (HopStep::Certificate, None),
        };
        debug!(hop, ?step, ?outcome, "hop step finished");
        self.state = ChainState::Await(next);
        self.hop = current;
        Ok(Some(StepReport { hop, step, outcome }))
    }

    /// Finish the current (or next) hop. Returns its index, or `None` if
    /// no hop was left.
    ///
    /// # Errors
    /// See [`Self::step`].
    pub fn run_hop(&mut self, conn: &mut Connection) -> Result<Option<usize>, SppError> {
        loop {
            match self.step(conn)? {
                None => return Ok(None),
                Some(report) if report.step == HopStep::Done => return Ok(Some(report.hop)),
                Some(_) => {}
            }
        }
    }

    /// Process every remaining hop; returns how many were completed.
    ///
    /// # Errors
    /// See [`Self::step`].
    pub fn run_chain(&mut self, conn: &mut Connection) -> Result<usize, SppError> {
        let mut hops = 0;
        while self.run_hop(conn)?.is_some() {
            hops += 1;
        }
        info!(hops, forward = self.forward, "proxy chain complete");
        Ok(hops)
    }
}
