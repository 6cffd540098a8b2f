//! Slice key generation and key material exchange.
//!
//! Incoming material is staged in full and checked against the connection
//! before any slice is touched, so a rejected message changes nothing.

use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::application::errors::{SppError, abort_with_alert};
use crate::domain::connection::{Connection, Role};
use crate::domain::key_exchange::KeyExchangeParams;
use crate::domain::slice::{MAX_KEY_LEN, Slice, SliceId, SliceKey};
use crate::ports::crypto::{Agreement, KeyAgreement, KeyDerivation, RandomSource};
use crate::ports::transport::{HandshakeTransport, ReadState};
use crate::protocol::wire::{
    DecodeError, KeyMaterial, MessageType, Origin, SliceKeyEntry, decode_key_material_for,
    encode_dh_public, encode_ecdh_public, encode_key_material,
};

/// Fill every slice's local read and write keys with fresh random bytes.
///
/// Keys are drawn for all slices first and installed only if every draw
/// succeeded.
///
/// # Errors
/// `Crypto(RandomSource)` if the random source fails.
pub fn generate_slice_keys<R>(conn: &mut Connection, rng: &R) -> Result<(), SppError>
where
    R: RandomSource + ?Sized,
{
    let count = conn.slices().len();
    let mut staged = Vec::with_capacity(count);
    for _ in 0..count {
        let read = draw_key(rng)?;
        let write = draw_key(rng)?;
        staged.push((read, write));
    }
    for (slice, (read, write)) in conn.slices_mut().iter_mut().zip(staged) {
        slice.install_local(read, write);
    }
    debug!(slices = count, "slice keys generated");
    Ok(())
}

fn draw_key<R>(rng: &R) -> Result<SliceKey, SppError>
where
    R: RandomSource + ?Sized,
{
    let mut buf = Zeroizing::new([0u8; MAX_KEY_LEN]);
    rng.fill_random(&mut buf[..])?;
    Ok(SliceKey::full(*buf))
}

/// Queue our slice keys for the peer, one entry per slice in id order.
///
/// # Errors
/// * `MessageTooLong` if the body would exceed the plaintext limit.
/// * `Transport` if the message cannot be queued.
pub fn send_end_key_material<T>(conn: &Connection, transport: &mut T) -> Result<(), SppError>
where
    T: HandshakeTransport + ?Sized,
{
    let origin = match conn.context().role {
        Role::Client => Origin::Client,
        Role::Server => Origin::Server,
    };
    let mut slices: Vec<&Slice> = conn.slices().iter().collect();
    slices.sort_by_key(|s| s.id());
    let entries: Vec<SliceKeyEntry<'_>> = slices
        .iter()
        .map(|s| SliceKeyEntry {
            slice_id: s.id(),
            read_key: s.read_key().as_bytes(),
            write_key: s.write_key().as_bytes(),
        })
        .collect();

    let body = Zeroizing::new(encode_key_material(origin, &entries)?);
    let max = conn.context().config.max_plain_length;
    if body.len() > max {
        return Err(SppError::MessageTooLong {
            len: body.len(),
            max,
        });
    }
    transport.queue_message(MessageType::ProxyKeyMaterial, &body)?;
    info!(?origin, slices = entries.len(), len = body.len(), "slice key material sent");
    Ok(())
}

/// Read the peer's slice keys and grant access to every slice at once.
///
/// Each slice id is looked up as soon as it is read, so an unknown id is
/// reported even when the rest of its entry is malformed. A message that
/// names the same slice twice is rejected outright rather than letting the
/// later entry overwrite the earlier one.
///
/// # Errors
/// * `UnexpectedMessage` for any other message type.
/// * `BadOrigin`, `SliceKeyTooLong`, `Decode` for malformed bodies.
/// * `UnknownSlice`, `DuplicateSliceEntry` for entries that do not match a
///   local slice exactly once.
/// * `MissingSliceMaterial` if a local slice is left without peer keys.
pub fn get_end_key_material<T>(conn: &mut Connection, transport: &mut T) -> Result<(), SppError>
where
    T: HandshakeTransport + ?Sized,
{
    read_end_key_material(conn, transport).map_err(|e| abort_with_alert(transport, e))
}

fn read_end_key_material<T>(conn: &mut Connection, transport: &mut T) -> Result<(), SppError>
where
    T: HandshakeTransport + ?Sized,
{
    let max = conn.context().config.max_plain_length;
    let mut msg = transport.read_message(
        ReadState::KeyMaterial,
        Some(MessageType::ProxyKeyMaterial),
        max,
    )?;
    if msg.kind() != Some(MessageType::ProxyKeyMaterial) {
        return Err(SppError::UnexpectedMessage(msg.msg_type));
    }
    if msg.body.len() > max {
        return Err(SppError::MessageTooLong {
            len: msg.body.len(),
            max,
        });
    }

    let result = decode_key_material_for(&msg.body, MAX_KEY_LEN, |id| {
        conn.slice_by_id(id).is_some()
    })
        .map_err(SppError::from)
        .and_then(|material| stage(conn, &material).map(|staged| (material.origin, staged)));
    msg.body.zeroize();
    let (origin, staged) = result?;

    let count = staged.len();
    for (id, read, write) in staged {
        if let Some(slice) = conn.slice_by_id_mut(id) {
            slice.grant_peer(read, write);
        }
    }
    info!(?origin, slices = count, "peer slice key material accepted");
    Ok(())
}

type StagedEntry = (SliceId, SliceKey, SliceKey);

fn stage(conn: &Connection, material: &KeyMaterial<'_>) -> Result<Vec<StagedEntry>, SppError> {
    let mut staged: Vec<StagedEntry> = Vec::with_capacity(material.entries.len());
    for entry in &material.entries {
        let id = entry.slice_id;
        if staged.iter().any(|(seen, ..)| *seen == id) {
            return Err(SppError::DuplicateSliceEntry(id));
        }
        let read = peer_key(id, entry.read_key)?;
        let write = peer_key(id, entry.write_key)?;
        staged.push((id, read, write));
    }

    let missing = conn
        .slices()
        .iter()
        .find(|s| !s.has_peer_material() && !staged.iter().any(|(id, ..)| *id == s.id()));
    if let Some(slice) = missing {
        return Err(SppError::MissingSliceMaterial(slice.id()));
    }
    Ok(staged)
}

fn peer_key(slice_id: SliceId, bytes: &[u8]) -> Result<SliceKey, SppError> {
    SliceKey::from_slice(bytes).ok_or(SppError::SliceKeyTooLong {
        slice_id,
        len: bytes.len(),
        max: MAX_KEY_LEN,
    })
}

type PublicValueEncoder = fn(&[u8]) -> Result<Vec<u8>, DecodeError>;

/// Agree with one hop's stored ephemeral parameters, derive the master
/// secret, and send our public value to that hop.
///
/// # Errors
/// * `UnknownProxy` if `hop` is out of range.
/// * `MissingPeerParameters` if the hop has no DH or EC-DH parameters.
/// * `Crypto` if agreement or derivation fails; `Transport` if sending fails.
pub fn send_proxy_key_material<T, C>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
    crypto: &C,
) -> Result<(), SppError>
where
    T: HandshakeTransport + ?Sized,
    C: KeyAgreement + KeyDerivation + ?Sized,
{
    write_proxy_key_material(conn, hop, transport, crypto)
        .map_err(|e| abort_with_alert(transport, e))
}

fn write_proxy_key_material<T, C>(
    conn: &mut Connection,
    hop: usize,
    transport: &mut T,
    crypto: &C,
) -> Result<(), SppError>
where
    T: HandshakeTransport + ?Sized,
    C: KeyAgreement + KeyDerivation + ?Sized,
{
    let proxy = conn.proxy(hop).ok_or(SppError::UnknownProxy(hop))?;
    let (agreement, body_of): (Agreement, PublicValueEncoder) = match proxy.key_exchange() {
        KeyExchangeParams::Dh(params) => (crypto.dh_agree(params)?, encode_dh_public),
        KeyExchangeParams::EcDh(params) => (crypto.ecdh_agree(params)?, encode_ecdh_public),
        KeyExchangeParams::None => return Err(SppError::MissingPeerParameters(hop)),
    };
    let Agreement {
        shared_secret,
        local_public,
    } = agreement;

    let master = crypto.derive_master_secret(&shared_secret)?;
    drop(shared_secret);

    let body = body_of(&local_public)?;
    conn.set_master_secret(master);
    transport.queue_message(MessageType::ProxyKeyMaterial, &body)?;
    debug!(hop, len = body.len(), "proxy key material sent");
    Ok(())
}

/// Per-hop key material receive path. Not implemented; always fails so
/// callers cannot mistake it for success.
///
/// # Errors
/// `UnknownProxy` for a bad index, otherwise always `NotSupported`.
pub fn get_proxy_key_material(conn: &Connection, hop: usize) -> Result<(), SppError> {
    if conn.proxy(hop).is_none() {
        return Err(SppError::UnknownProxy(hop));
    }
    warn!(hop, "per-hop key material receive requested");
    Err(SppError::NotSupported("per-hop key material receive"))
}
