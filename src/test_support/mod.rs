//! Builders and collaborator doubles shared by unit tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use zeroize::Zeroizing;

use crate::domain::alert::{AlertDescription, AlertLevel};
use crate::domain::certificate::{
    Certificate, CertificateChain, ChainVerdict, KeyType, PublicKey, VerifyMode,
};
use crate::domain::connection::{Connection, HandshakeContext, MasterSecret, Role};
use crate::domain::key_exchange::{DhParams, DigestAlgorithm, EcdhParams};
use crate::domain::proxy::Proxy;
use crate::domain::suite::{AuthAlgorithm, CipherSuite, KeyExchangeAlgorithm, ProtocolVersion};
use crate::ports::crypto::{
    Agreement, CertificateVerifier, CryptoError, KeyAgreement, KeyDerivation, RandomSource,
    SignatureVerifier,
};
use crate::ports::transport::{HandshakeMessage, HandshakeTransport, ReadState, TransportError};
use crate::protocol::wire::{MessageType, encode_certificate_list};

/// A DER SEQUENCE header plus `content_len` copies of `fill`.
pub fn fake_der(fill: u8, content_len: usize) -> Vec<u8> {
    let mut out = vec![0x30];
    match content_len {
        0..=0x7f => out.push(content_len as u8),
        0x80..=0xff => out.extend_from_slice(&[0x81, content_len as u8]),
        _ => out.extend_from_slice(&[0x82, (content_len >> 8) as u8, content_len as u8]),
    }
    out.resize(out.len() + content_len, fill);
    out
}

pub fn sample_dh() -> DhParams {
    DhParams {
        prime: vec![0xc7; 16],
        generator: vec![0x02],
        public_value: vec![0x5a; 16],
    }
}

/// Uncompressed secp256r1 point shape: `04 || X || Y`.
pub fn sample_p256_point() -> Vec<u8> {
    let mut p = vec![0x04];
    p.extend((0..64u8).map(|i| i.wrapping_mul(3)));
    p
}

pub fn dhe_rsa_context() -> HandshakeContext {
    HandshakeContext::new(
        Role::Client,
        CipherSuite::new(KeyExchangeAlgorithm::Dhe, AuthAlgorithm::Rsa),
        ProtocolVersion::TLS1_2,
    )
    .with_randoms([0x11; 32], [0x22; 32])
}

pub fn context_for(kx: KeyExchangeAlgorithm, auth: AuthAlgorithm) -> HandshakeContext {
    HandshakeContext {
        suite: CipherSuite::new(kx, auth),
        ..dhe_rsa_context()
    }
}

pub fn chain_of(n: usize) -> Connection {
    connection_with(dhe_rsa_context(), n)
}

pub fn connection_with(ctx: HandshakeContext, hops: usize) -> Connection {
    let mut conn = Connection::new(ctx);
    for _ in 0..hops {
        conn.add_proxy(Proxy::new());
    }
    conn
}

pub fn rsa_key() -> PublicKey {
    PublicKey {
        key_type: KeyType::Rsa,
        spki: vec![0x30, 0x00],
        max_signature_len: 256,
        missing_parameters: false,
    }
}

pub fn ec_key() -> PublicKey {
    PublicKey {
        key_type: KeyType::Ec,
        spki: vec![0x30, 0x01],
        max_signature_len: 72,
        missing_parameters: false,
    }
}

pub fn certificate_body(ders: &[Vec<u8>]) -> Vec<u8> {
    encode_certificate_list(ders).unwrap()
}

pub fn msg(ty: MessageType, body: Vec<u8>) -> HandshakeMessage {
    HandshakeMessage::new(ty, body)
}

/// Transport double fed from a queue; records everything written.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    inbox: VecDeque<HandshakeMessage>,
    last: Option<HandshakeMessage>,
    reprocess: bool,
    pub reads: Vec<ReadState>,
    pub queued: Vec<(MessageType, Vec<u8>)>,
    pub alerts: Vec<(AlertLevel, AlertDescription)>,
    pub fail_writes: bool,
}

impl ScriptedTransport {
    pub fn new(messages: impl IntoIterator<Item = HandshakeMessage>) -> Self {
        Self {
            inbox: messages.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, m: HandshakeMessage) {
        self.inbox.push_back(m);
    }

    pub fn pending(&self) -> usize {
        self.inbox.len() + usize::from(self.reprocess)
    }

    pub fn is_reprocessing(&self) -> bool {
        self.reprocess
    }
}

impl HandshakeTransport for ScriptedTransport {
    fn read_message(
        &mut self,
        state: ReadState,
        _expected: Option<MessageType>,
        max_len: usize,
    ) -> Result<HandshakeMessage, TransportError> {
        self.reads.push(state);
        let m = if self.reprocess {
            self.reprocess = false;
            self.last.clone().ok_or(TransportError::Closed)?
        } else {
            self.inbox.pop_front().ok_or(TransportError::Closed)?
        };
        if m.body.len() > max_len {
            return Err(TransportError::Oversized {
                len: m.body.len(),
                max: max_len,
            });
        }
        self.last = Some(m.clone());
        Ok(m)
    }

    fn queue_message(&mut self, ty: MessageType, body: &[u8]) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(TransportError::Io);
        }
        self.queued.push((ty, body.to_vec()));
        Ok(())
    }

    fn mark_for_reprocessing(&mut self) {
        self.reprocess = true;
    }

    fn send_alert(&mut self, level: AlertLevel, description: AlertDescription) {
        self.alerts.push((level, description));
    }
}

/// Configurable stand-in for every crypto port.
#[derive(Debug)]
pub struct StubCrypto {
    pub verdict: ChainVerdict,
    pub key: Option<PublicKey>,
    pub signature_ok: bool,
    pub agreement_fails: bool,
    /// Fail the n-th random draw (zero based).
    pub random_fail_at: Option<usize>,
    pub chain_calls: RefCell<Vec<(usize, VerifyMode)>>,
    pub signature_calls: RefCell<Vec<(DigestAlgorithm, Vec<u8>, Vec<u8>)>>,
    pub derived_from: RefCell<Vec<Vec<u8>>>,
    pub random_draws: Cell<usize>,
}

impl Default for StubCrypto {
    fn default() -> Self {
        Self {
            verdict: ChainVerdict::Trusted,
            key: Some(rsa_key()),
            signature_ok: true,
            agreement_fails: false,
            random_fail_at: None,
            chain_calls: RefCell::new(Vec::new()),
            signature_calls: RefCell::new(Vec::new()),
            derived_from: RefCell::new(Vec::new()),
            random_draws: Cell::new(0),
        }
    }
}

impl StubCrypto {
    pub fn random_draws(&self) -> usize {
        self.random_draws.get()
    }
}

impl CertificateVerifier for StubCrypto {
    fn verify_chain(&self, chain: &CertificateChain, mode: VerifyMode) -> ChainVerdict {
        self.chain_calls.borrow_mut().push((chain.len(), mode));
        self.verdict
    }

    fn public_key(&self, _cert: &Certificate) -> Option<PublicKey> {
        self.key.clone()
    }
}

impl SignatureVerifier for StubCrypto {
    fn verify_signature(
        &self,
        _key: &PublicKey,
        digest: DigestAlgorithm,
        transcript: &[u8],
        signature: &[u8],
    ) -> bool {
        self.signature_calls
            .borrow_mut()
            .push((digest, transcript.to_vec(), signature.to_vec()));
        self.signature_ok
    }
}

impl KeyAgreement for StubCrypto {
    fn dh_agree(&self, peer: &DhParams) -> Result<Agreement, CryptoError> {
        if self.agreement_fails {
            return Err(CryptoError::KeyAgreement);
        }
        Ok(Agreement {
            shared_secret: Zeroizing::new(peer.public_value.iter().map(|b| b ^ 0xff).collect()),
            local_public: vec![0x3c; peer.prime.len()],
        })
    }

    fn ecdh_agree(&self, peer: &EcdhParams) -> Result<Agreement, CryptoError> {
        if self.agreement_fails {
            return Err(CryptoError::KeyAgreement);
        }
        Ok(Agreement {
            shared_secret: Zeroizing::new(peer.point[1..33].to_vec()),
            local_public: sample_p256_point(),
        })
    }
}

impl KeyDerivation for StubCrypto {
    fn derive_master_secret(&self, shared_secret: &[u8]) -> Result<MasterSecret, CryptoError> {
        self.derived_from.borrow_mut().push(shared_secret.to_vec());
        Ok(MasterSecret::new(vec![0x4d; 48]))
    }
}

impl RandomSource for StubCrypto {
    fn fill_random(&self, out: &mut [u8]) -> Result<(), CryptoError> {
        let n = self.random_draws.get();
        self.random_draws.set(n + 1);
        if self.random_fail_at == Some(n) {
            return Err(CryptoError::RandomSource);
        }
        for (i, b) in out.iter_mut().enumerate() {
            *b = (n as u8).wrapping_mul(31).wrapping_add(i as u8);
        }
        Ok(())
    }
}
