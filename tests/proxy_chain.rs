//! Full proxy-chain traversal over the public API, with records passed
//! through the in-memory transport and a transcript-bound signature double.

use sha2::{Digest, Sha256};
use sliceproxy::adapters::{HkdfMasterSecret, MemoryTransport};
use sliceproxy::application::{
    ChainState, HopStep, ProxyChainCoordinator, SppError, StepOutcome, send_proxy_key_material,
};
use sliceproxy::domain::{
    AlertDescription, AlertLevel, AuthAlgorithm, Certificate, CertificateChain, ChainVerdict,
    CipherSuite, Connection, DhParams, DigestAlgorithm, EcdhParams, HandshakeContext,
    KeyExchangeAlgorithm, KeyExchangeParams, KeyType, MasterSecret, NamedCurve, ProtocolVersion,
    Proxy, PublicKey, Role, SignatureAlgorithm, VerifyMode,
};
use sliceproxy::ports::{
    Agreement, CertificateVerifier, CryptoError, HandshakeTransport, KeyAgreement, KeyDerivation,
    SignatureVerifier,
};
use sliceproxy::protocol::wire::{
    MessageType, encode_certificate_list, encode_dh_params, encode_digitally_signed,
    encode_ecdh_params, split_frame,
};
use zeroize::Zeroizing;

const CLIENT_RANDOM: [u8; 32] = [0xc1; 32];
const SERVER_RANDOM: [u8; 32] = [0x5e; 32];

/// Accepts any chain; a signature is valid iff it is SHA-256 of the transcript.
struct Sha256Crypto {
    key_type: KeyType,
}

impl CertificateVerifier for Sha256Crypto {
    fn verify_chain(&self, chain: &CertificateChain, _mode: VerifyMode) -> ChainVerdict {
        assert!(!chain.is_empty());
        ChainVerdict::Trusted
    }

    fn public_key(&self, _cert: &Certificate) -> Option<PublicKey> {
        Some(PublicKey {
            key_type: self.key_type,
            spki: vec![],
            max_signature_len: 128,
            missing_parameters: false,
        })
    }
}

impl SignatureVerifier for Sha256Crypto {
    fn verify_signature(
        &self,
        _key: &PublicKey,
        digest: DigestAlgorithm,
        transcript: &[u8],
        signature: &[u8],
    ) -> bool {
        digest == DigestAlgorithm::Sha256 && Sha256::digest(transcript).as_slice() == signature
    }
}

fn sign(params: &[u8]) -> Vec<u8> {
    let mut h = Sha256::new();
    h.update(CLIENT_RANDOM);
    h.update(SERVER_RANDOM);
    h.update(params);
    h.finalize().to_vec()
}

fn der(fill: u8) -> Vec<u8> {
    let mut d = vec![0x30, 6];
    d.extend_from_slice(&[fill; 6]);
    d
}

fn context(kx: KeyExchangeAlgorithm, auth: AuthAlgorithm) -> HandshakeContext {
    HandshakeContext::new(Role::Client, CipherSuite::new(kx, auth), ProtocolVersion::TLS1_2)
        .with_randoms(CLIENT_RANDOM, SERVER_RANDOM)
}

fn chain(ctx: HandshakeContext, hops: usize) -> Connection {
    let mut conn = Connection::new(ctx);
    for _ in 0..hops {
        conn.add_proxy(Proxy::new());
    }
    conn
}

fn dh(fill: u8) -> DhParams {
    DhParams {
        prime: vec![0xfb; 32],
        generator: vec![2],
        public_value: vec![fill; 32],
    }
}

/// Queue certificate, signed DH key exchange, and done for one hop.
fn send_signed_dh_hop(hop: &mut MemoryTransport, fill: u8, sig: SignatureAlgorithm) {
    let certs = encode_certificate_list(&[der(fill), der(fill ^ 0xff)]).unwrap();
    hop.queue_message(MessageType::Certificate, &certs).unwrap();

    let mut kx = encode_dh_params(&dh(fill)).unwrap();
    let trailer =
        encode_digitally_signed(Some((DigestAlgorithm::Sha256, sig)), &sign(&kx)).unwrap();
    kx.extend_from_slice(&trailer);
    hop.queue_message(MessageType::ServerKeyExchange, &kx).unwrap();

    hop.queue_message(MessageType::ServerDone, &[]).unwrap();
}

#[test]
fn forward_chain_of_two_signed_dh_hops() {
    let mut conn = chain(context(KeyExchangeAlgorithm::Dhe, AuthAlgorithm::Rsa), 2);
    let crypto = Sha256Crypto { key_type: KeyType::Rsa };
    let mut proxies = MemoryTransport::new();
    let mut client = MemoryTransport::new();
    send_signed_dh_hop(&mut proxies, 0x10, SignatureAlgorithm::Rsa);
    send_signed_dh_hop(&mut proxies, 0x20, SignatureAlgorithm::Rsa);
    assert_eq!(proxies.deliver_to(&mut client), 6);

    let mut coord = ProxyChainCoordinator::new(&mut client, &crypto, true);
    assert_eq!(coord.run_chain(&mut conn).unwrap(), 2);
    assert_eq!(coord.state(), ChainState::Complete);

    for (i, fill) in [(0usize, 0x10u8), (1, 0x20)] {
        let p = conn.proxy(i).unwrap();
        assert!(p.is_done());
        assert_eq!(p.peer().unwrap().der(), der(fill).as_slice());
        assert_eq!(p.certificate_chain().unwrap().len(), 2);
        assert_eq!(p.key_exchange(), &KeyExchangeParams::Dh(dh(fill)));
    }
    assert!(conn.next_proxy(true).is_none());
    assert_eq!(client.pending_inbound(), 0);
    assert!(client.alerts().is_empty());
}

#[test]
fn backward_chain_finishes_far_hop_first() {
    let mut conn = chain(context(KeyExchangeAlgorithm::Dhe, AuthAlgorithm::Rsa), 2);
    let crypto = Sha256Crypto { key_type: KeyType::Rsa };
    let mut proxies = MemoryTransport::new();
    let mut client = MemoryTransport::new();
    send_signed_dh_hop(&mut proxies, 0x20, SignatureAlgorithm::Rsa);
    proxies.deliver_to(&mut client);

    let mut coord = ProxyChainCoordinator::new(&mut client, &crypto, false);
    assert_eq!(coord.run_hop(&mut conn).unwrap(), Some(1));
    assert!(conn.proxy(1).unwrap().is_done());
    assert!(!conn.proxy(0).unwrap().is_done());
    assert_eq!(conn.next_proxy_index(false), Some(0));
}

#[test]
fn anonymous_hop_skips_its_certificate() {
    let mut conn = chain(context(KeyExchangeAlgorithm::Dhe, AuthAlgorithm::Anonymous), 1);
    let crypto = Sha256Crypto { key_type: KeyType::Rsa };
    let mut hop = MemoryTransport::new();
    let mut client = MemoryTransport::new();
    hop.queue_message(MessageType::ServerKeyExchange, &encode_dh_params(&dh(7)).unwrap())
        .unwrap();
    hop.queue_message(MessageType::ServerDone, &[]).unwrap();
    hop.deliver_to(&mut client);

    let mut coord = ProxyChainCoordinator::new(&mut client, &crypto, true);
    let steps: Vec<_> = std::iter::from_fn(|| coord.step(&mut conn).unwrap())
        .map(|r| (r.step, r.outcome))
        .collect();
    assert_eq!(
        steps,
        vec![
            (HopStep::Certificate, StepOutcome::Deferred),
            (HopStep::KeyExchange, StepOutcome::Processed),
            (HopStep::Done, StepOutcome::Processed),
        ]
    );
    let p = conn.proxy(0).unwrap();
    assert!(p.is_done());
    assert!(p.peer().is_none());
    assert_eq!(p.key_exchange(), &KeyExchangeParams::Dh(dh(7)));
}

#[test]
fn tampered_parameters_abort_the_chain() {
    let mut conn = chain(context(KeyExchangeAlgorithm::Dhe, AuthAlgorithm::Rsa), 1);
    let crypto = Sha256Crypto { key_type: KeyType::Rsa };
    let mut hop = MemoryTransport::new();
    send_signed_dh_hop(&mut hop, 0x30, SignatureAlgorithm::Rsa);

    // Flip one byte of the DH prime inside the key exchange record.
    let mut records = hop.take_outbound();
    records[1][8] ^= 0x01;
    let mut client = MemoryTransport::new();
    for r in records {
        client.push_record(r);
    }

    let mut coord = ProxyChainCoordinator::new(&mut client, &crypto, true);
    assert_eq!(coord.run_chain(&mut conn), Err(SppError::BadSignature));
    assert_eq!(coord.state(), ChainState::Failed);
    assert_eq!(coord.step(&mut conn), Err(SppError::Aborted));
    drop(coord);

    assert_eq!(client.alerts(), &[(AlertLevel::Fatal, AlertDescription::DecryptError)]);
    let p = conn.proxy(0).unwrap();
    assert!(!p.is_done());
    assert!(p.peer().is_some());
    assert!(p.key_exchange().is_none());
}

#[test]
fn signature_algorithm_must_match_leaf_key() {
    let mut conn = chain(context(KeyExchangeAlgorithm::Dhe, AuthAlgorithm::Rsa), 1);
    let crypto = Sha256Crypto { key_type: KeyType::Rsa };
    let mut hop = MemoryTransport::new();
    let mut client = MemoryTransport::new();
    send_signed_dh_hop(&mut hop, 0x40, SignatureAlgorithm::Ecdsa);
    hop.deliver_to(&mut client);

    let mut coord = ProxyChainCoordinator::new(&mut client, &crypto, true);
    assert_eq!(
        coord.run_chain(&mut conn),
        Err(SppError::WrongSignatureType { expected: 1, actual: 3 })
    );
    drop(coord);
    assert_eq!(client.alerts(), &[(AlertLevel::Fatal, AlertDescription::DecodeError)]);
}

/// Agreement double that XORs the peer value; derivation is the real HKDF adapter.
struct XorAgreement {
    kdf: HkdfMasterSecret,
}

impl KeyAgreement for XorAgreement {
    fn dh_agree(&self, peer: &DhParams) -> Result<Agreement, CryptoError> {
        Ok(Agreement {
            shared_secret: Zeroizing::new(peer.public_value.iter().map(|b| b ^ 0xa5).collect()),
            local_public: vec![0x44; peer.prime.len()],
        })
    }

    fn ecdh_agree(&self, peer: &EcdhParams) -> Result<Agreement, CryptoError> {
        Ok(Agreement {
            shared_secret: Zeroizing::new(peer.point[1..33].to_vec()),
            local_public: peer.point.iter().map(|b| b ^ 0x0f).collect(),
        })
    }
}

impl KeyDerivation for XorAgreement {
    fn derive_master_secret(&self, shared_secret: &[u8]) -> Result<MasterSecret, CryptoError> {
        self.kdf.derive_master_secret(shared_secret)
    }
}

#[test]
fn ecdhe_hop_then_key_material_to_that_hop() {
    let ctx = context(KeyExchangeAlgorithm::Ecdhe, AuthAlgorithm::Ecdsa);
    let kdf = HkdfMasterSecret::for_context(&ctx);
    let mut conn = chain(ctx, 1);
    let crypto = Sha256Crypto { key_type: KeyType::Ec };

    let mut point = vec![0x04];
    point.extend((0..64u8).map(|i| i.wrapping_mul(7)));
    let params = EcdhParams {
        curve: NamedCurve::Secp256r1,
        point: point.clone(),
    };

    let mut hop = MemoryTransport::new();
    let mut client = MemoryTransport::new();
    let certs = encode_certificate_list(&[der(0x55)]).unwrap();
    hop.queue_message(MessageType::Certificate, &certs).unwrap();
    let mut kx = encode_ecdh_params(&params).unwrap();
    let trailer = encode_digitally_signed(
        Some((DigestAlgorithm::Sha256, SignatureAlgorithm::Ecdsa)),
        &sign(&kx),
    )
    .unwrap();
    kx.extend_from_slice(&trailer);
    hop.queue_message(MessageType::ServerKeyExchange, &kx).unwrap();
    hop.queue_message(MessageType::ServerDone, &[]).unwrap();
    hop.deliver_to(&mut client);

    let mut coord = ProxyChainCoordinator::new(&mut client, &crypto, true);
    assert_eq!(coord.run_chain(&mut conn).unwrap(), 1);
    drop(coord);
    assert_eq!(conn.proxy(0).unwrap().key_exchange(), &KeyExchangeParams::EcDh(params));

    let agreement = XorAgreement { kdf: kdf.clone() };
    send_proxy_key_material(&mut conn, 0, &mut client, &agreement).unwrap();

    let expected = kdf.derive_master_secret(&point[1..33]).unwrap();
    assert_eq!(conn.master_secret(), Some(&expected));

    let records = client.take_outbound();
    assert_eq!(records.len(), 1);
    let (ty, body) = split_frame(&records[0]).unwrap();
    assert_eq!(MessageType::try_from(ty), Ok(MessageType::ProxyKeyMaterial));
    assert_eq!(usize::from(body[0]), point.len());
    assert_eq!(body[1], 0x04 ^ 0x0f);
}
