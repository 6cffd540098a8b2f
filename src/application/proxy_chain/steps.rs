//! The three per-hop steps: certificate, key exchange, done marker.
//!
//! Each step reads one message, validates all of it, and only then writes
//! the hop's state. A failed step leaves the hop as it was and has already
//! sent its fatal alert.

use tracing::{debug, warn};

use crate::application::errors::{SppError, abort_with_alert};
use crate::domain::certificate::{
    Certificate, CertificateChain, CertificateType, ChainVerdict, PublicKey, VerifyMode,
};
use crate::domain::connection::{Connection, HandshakeContext, RANDOM_LEN};
use crate::domain::key_exchange::{DigestAlgorithm, EXPORT_EC_MAX_BITS, KeyExchangeParams};
use crate::domain::proxy::PeerCredentials;
use crate::domain::suite::KeyExchangeFamily;
use crate::ports::crypto::{CertificateVerifier, SignatureVerifier};
use crate::ports::transport::{HandshakeTransport, ReadState};
use crate::protocol::wire::{
    DecodeError, MessageType, WireReader, decode_certificate_list, read_dh_params,
    read_digitally_signed, read_ec_point, read_named_curve,
};

/// Result of a step that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The message was consumed and the hop updated.
    Processed,
    /// The message belongs to a later step and was handed back to the transport.
    Deferred,
}

/// Read and validate a hop's certificate chain.
///
/// A key exchange message (or a done marker under credential-less
/// authentication) means the hop skipped its certificate; it is marked for
/// reprocessing and the hop is left untouched.
///
/// # Errors
/// * `UnexpectedMessage` for any other message type.
/// * `Decode` / `BadCertificate` for framing or DER faults.
/// * `CertificateVerifyFailed` when the verifier rejects the chain in `Peer` mode.
/// * `MissingPublicKeyParameters` / `UnknownCertificateType` for unusable leaves.
pub fn get_proxy_certificate<T, V>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
    verifier: &V,
) -> Result<StepOutcome, SppError>
where
    T: HandshakeTransport + ?Sized,
    V: CertificateVerifier + ?Sized,
{
    read_certificate(conn, hop, transport, verifier).map_err(|e| abort_with_alert(transport, e))
}

fn read_certificate<T, V>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
    verifier: &V,
) -> Result<StepOutcome, SppError>
where
    T: HandshakeTransport + ?Sized,
    V: CertificateVerifier + ?Sized,
{
    let (ctx, proxy) = conn.hop_mut(hop).ok_or(SppError::UnknownProxy(hop))?;
    let max = ctx.config.max_cert_list;
    let msg = transport.read_message(ReadState::ProxyCertificate, None, max)?;
    check_len(msg.body.len(), max)?;

    match msg.kind() {
        Some(MessageType::ServerKeyExchange) => return Ok(defer(transport, hop, msg.msg_type)),
        Some(MessageType::ServerDone) if ctx.suite.is_credential_less() => {
            return Ok(defer(transport, hop, msg.msg_type));
        }
        Some(MessageType::Certificate) => {}
        _ => return Err(SppError::UnexpectedMessage(msg.msg_type)),
    }

    let chain: CertificateChain = decode_certificate_list(&msg.body)?
        .into_iter()
        .map(Certificate::from_der)
        .collect();

    let mode = ctx.config.verify_mode;
    let verdict = verifier.verify_chain(&chain, mode);
    if let ChainVerdict::Untrusted(reason) = verdict {
        if mode == VerifyMode::Peer {
            return Err(SppError::CertificateVerifyFailed(reason));
        }
        warn!(hop, ?reason, "keeping untrusted proxy chain");
    }

    let peer = chain
        .leaf()
        .cloned()
        .ok_or(SppError::MissingPublicKeyParameters)?;
    let public_key = verifier
        .public_key(&peer)
        .filter(|k| !k.missing_parameters)
        .ok_or(SppError::MissingPublicKeyParameters)?;
    let cert_type =
        CertificateType::classify(public_key.key_type).ok_or(SppError::UnknownCertificateType)?;

    debug!(hop, certs = chain.len(), ?cert_type, "proxy certificate accepted");
    proxy.install_credentials(PeerCredentials {
        chain,
        peer,
        public_key,
        cert_type,
        verdict,
    });
    Ok(StepOutcome::Processed)
}

/// Read a hop's ephemeral parameters and check the signature over them.
///
/// Any message other than a key exchange is marked for reprocessing.
///
/// # Errors
/// * `Decode` when a length runs past the message.
/// * `UnsupportedCipher`, `MissingKeyExchangeParams`, `UnknownCurve`,
///   `BadEcPoint`, `ExportRestriction` for parameter faults.
/// * `WrongSignatureType`, `UnknownDigest`, `WrongSignatureLength`,
///   `BadSignature` for signature faults; `ExtraData` for unsigned leftovers.
pub fn get_proxy_key_exchange<T, S>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
    verifier: &S,
) -> Result<StepOutcome, SppError>
where
    T: HandshakeTransport + ?Sized,
    S: SignatureVerifier + ?Sized,
{
    read_key_exchange(conn, hop, transport, verifier).map_err(|e| abort_with_alert(transport, e))
}

fn read_key_exchange<T, S>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
    verifier: &S,
) -> Result<StepOutcome, SppError>
where
    T: HandshakeTransport + ?Sized,
    S: SignatureVerifier + ?Sized,
{
    let (ctx, proxy) = conn.hop_mut(hop).ok_or(SppError::UnknownProxy(hop))?;
    let max = ctx.config.max_cert_list;
    let msg = transport.read_message(ReadState::ProxyKeyExchange, None, max)?;
    check_len(msg.body.len(), max)?;

    if msg.kind() != Some(MessageType::ServerKeyExchange) {
        return Ok(defer(transport, hop, msg.msg_type));
    }

    let mut r = WireReader::new(&msg.body);
    let params = read_params(ctx, &mut r)?;
    let signed_params = r.consumed_since(0);

    if ctx.suite.requires_public_key() {
        let key = proxy.public_key().ok_or(SppError::MissingPeerKey)?;
        check_signature(ctx, key, &mut r, signed_params, verifier)?;
    } else if !r.is_empty() {
        return Err(SppError::ExtraData(r.remaining()));
    }

    debug!(
        hop,
        param_len = signed_params.len(),
        family = ?ctx.suite.family(),
        "proxy key exchange accepted"
    );
    proxy.install_key_exchange(params);
    Ok(StepOutcome::Processed)
}

fn read_params(
    ctx: &HandshakeContext,
    r: &mut WireReader<'_>,
) -> Result<KeyExchangeParams, SppError> {
    match ctx.suite.family() {
        KeyExchangeFamily::Dh => Ok(KeyExchangeParams::Dh(read_dh_params(r)?)),
        KeyExchangeFamily::EcDh => {
            let curve = read_named_curve(r)?;
            let bits = curve.field_bits();
            if ctx.suite.export && bits > EXPORT_EC_MAX_BITS {
                return Err(SppError::ExportRestriction { bits });
            }
            Ok(KeyExchangeParams::EcDh(read_ec_point(r, curve)?))
        }
        KeyExchangeFamily::StaticDh => Err(SppError::UnsupportedCipher),
        KeyExchangeFamily::None if ctx.suite.is_keyless() => Ok(KeyExchangeParams::None),
        KeyExchangeFamily::None => Err(SppError::MissingKeyExchangeParams),
    }
}

fn check_signature<S>(
    ctx: &HandshakeContext,
    key: &PublicKey,
    r: &mut WireReader<'_>,
    params: &[u8],
    verifier: &S,
) -> Result<(), SppError>
where
    S: SignatureVerifier + ?Sized,
{
    let signed = read_digitally_signed(r, ctx.version.has_explicit_sigalgs())?;

    let digest = match signed.algorithms {
        Some((hash_id, sig_id)) => {
            let expected = key.signature_algorithm().ok_or(SppError::MissingPeerKey)?;
            if sig_id != expected.id() {
                return Err(SppError::WrongSignatureType {
                    expected: expected.id(),
                    actual: sig_id,
                });
            }
            DigestAlgorithm::from_tls12_id(hash_id).ok_or(SppError::UnknownDigest(hash_id))?
        }
        None => key.legacy_digest(),
    };

    let present = signed.signature.len();
    if signed.declared_len != present || present > key.max_signature_len || present == 0 {
        return Err(SppError::WrongSignatureLength {
            declared: signed.declared_len,
            present,
            max: key.max_signature_len,
        });
    }

    let mut transcript = Vec::with_capacity(2 * RANDOM_LEN + params.len());
    transcript.extend_from_slice(&ctx.client_random);
    transcript.extend_from_slice(&ctx.server_random);
    transcript.extend_from_slice(params);

    if !verifier.verify_signature(key, digest, &transcript, signed.signature) {
        return Err(SppError::BadSignature);
    }
    Ok(())
}

/// Read the empty done marker and mark the hop finished.
///
/// # Errors
/// * `UnexpectedMessage` if the message is not a done marker.
/// * `Decode` if it carries any body.
pub fn get_proxy_done<T>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
) -> Result<StepOutcome, SppError>
where
    T: HandshakeTransport + ?Sized,
{
    read_done(conn, hop, transport).map_err(|e| abort_with_alert(transport, e))
}

fn read_done<T>(conn: &mut Connection, hop: usize, transport: &mut T) -> Result<StepOutcome, SppError>
where
    T: HandshakeTransport + ?Sized,
{
    let (ctx, proxy) = conn.hop_mut(hop).ok_or(SppError::UnknownProxy(hop))?;
    let max = ctx.config.max_done_len;
    let msg = transport.read_message(ReadState::ProxyDone, Some(MessageType::ServerDone), max)?;
    if msg.kind() != Some(MessageType::ServerDone) {
        return Err(SppError::UnexpectedMessage(msg.msg_type));
    }
    check_len(msg.body.len(), max)?;
    if !msg.body.is_empty() {
        return Err(DecodeError::LengthMismatch {
            field: "proxy done",
            declared: 0,
            actual: msg.body.len(),
        }
        .into());
    }
    proxy.mark_done();
    debug!(hop, "proxy hop done");
    Ok(StepOutcome::Processed)
}

fn check_len(len: usize, max: usize) -> Result<(), SppError> {
    if len > max {
        return Err(SppError::MessageTooLong { len, max });
    }
    Ok(())
}

fn defer<T>(transport: &mut T, hop: usize, msg_type: u8) -> StepOutcome
where
    T: HandshakeTransport + ?Sized,
{
    debug!(hop, msg_type, "message left for the next step");
    transport.mark_for_reprocessing();
    StepOutcome::Deferred
}
