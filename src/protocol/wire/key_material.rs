//! Slice key material body:
//! `u8 origin { u16 slice_id, u16 read_key, u16 write_key }*`.

use super::cursor::{DecodeError, WireReader, WireWriter};
use crate::domain::slice::SliceId;
use thiserror::Error;

/// Which end produced a key material message.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Server = 1,
    Client = 2,
}

impl TryFrom<u8> for Origin {
    type Error = KeyMaterialError;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Server),
            2 => Ok(Self::Client),
            other => Err(KeyMaterialError::BadOrigin(other)),
        }
    }
}

/// One slice's keys as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceKeyEntry<'a> {
    pub slice_id: SliceId,
    pub read_key: &'a [u8],
    pub write_key: &'a [u8],
}

/// Decoded message; entries borrow from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial<'a> {
    pub origin: Origin,
    pub entries: Vec<SliceKeyEntry<'a>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    #[error("key material: {0}")]
    Framing(#[from] DecodeError),
    #[error("bad origin tag {0}")]
    BadOrigin(u8),
    #[error("slice {slice_id} key is {len} bytes, limit {max}")]
    KeyTooLong {
        slice_id: SliceId,
        len: usize,
        max: usize,
    },
    #[error("unknown slice id {0}")]
    UnknownSlice(SliceId),
}

/// Decode every entry without touching connection state.
///
/// # Errors
/// * `BadOrigin` unless the tag is 1 or 2.
/// * `KeyTooLong` if a key exceeds `max_key_len`.
/// * `Framing` on any overrun or leftover bytes.
pub fn decode_key_material(
    body: &[u8],
    max_key_len: usize,
) -> Result<KeyMaterial<'_>, KeyMaterialError> {
    decode_key_material_for(body, max_key_len, |_| true)
}

/// Like [`decode_key_material`], but each slice id is checked with `known`
/// as soon as it is read, before its key lengths are parsed.
///
/// # Errors
/// As [`decode_key_material`], plus `UnknownSlice` for the first id `known`
/// rejects.
pub fn decode_key_material_for<F>(
    body: &[u8],
    max_key_len: usize,
    mut known: F,
) -> Result<KeyMaterial<'_>, KeyMaterialError>
where
    F: FnMut(SliceId) -> bool,
{
    let mut r = WireReader::new(body);
    let origin = Origin::try_from(r.read_u8("origin")?)?;
    let mut entries = Vec::new();
    while !r.is_empty() {
        let slice_id = r.read_u16("slice id")?;
        if !known(slice_id) {
            return Err(KeyMaterialError::UnknownSlice(slice_id));
        }
        let read_key = read_key_field(&mut r, slice_id, "peer read key", max_key_len)?;
        let write_key = read_key_field(&mut r, slice_id, "peer write key", max_key_len)?;
        entries.push(SliceKeyEntry {
            slice_id,
            read_key,
            write_key,
        });
    }
    if r.consumed() != body.len() {
        return Err(DecodeError::LengthMismatch {
            field: "key material",
            declared: body.len(),
            actual: r.consumed(),
        }
        .into());
    }
    Ok(KeyMaterial { origin, entries })
}

fn read_key_field<'a>(
    r: &mut WireReader<'a>,
    slice_id: SliceId,
    field: &'static str,
    max: usize,
) -> Result<&'a [u8], KeyMaterialError> {
    let start = r.consumed();
    let len = usize::from(r.read_u16(field)?);
    if len > max {
        return Err(KeyMaterialError::KeyTooLong { slice_id, len, max });
    }
    let key = r.read_bytes(len, field)?;
    debug_assert_eq!(r.consumed(), start + 2 + len);
    Ok(key)
}

/// Encode a key material body.
///
/// # Errors
/// `DecodeError::TooLong` if a key exceeds 65535 bytes.
pub fn encode_key_material(
    origin: Origin,
    entries: &[SliceKeyEntry<'_>],
) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::new();
    w.put_u8(origin as u8);
    for e in entries {
        w.put_u16(e.slice_id);
        w.put_vec16(e.read_key, "read key")?;
        w.put_vec16(e.write_key, "write key")?;
    }
    Ok(w.into_inner())
}
