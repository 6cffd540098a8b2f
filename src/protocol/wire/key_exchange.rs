//! Key exchange parameter blocks and the signature that follows them.
//!
//! DH:    `u16 p, u16 g, u16 Ys`
//! EC-DH: `u8 curve_type, u16 curve_id, u8 point`
//! Signed suites append `[u8 hash, u8 sig]` (TLS 1.2+) and `u16 signature`.

use super::cursor::{DecodeError, WireReader, WireWriter};
use crate::domain::key_exchange::{
    DhParams, DigestAlgorithm, EcdhParams, NAMED_CURVE_TYPE, NamedCurve, SignatureAlgorithm,
};
use thiserror::Error;

/// Faults specific to EC parameter blocks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EcParamsError {
    #[error("ec parameters: {0}")]
    Framing(#[from] DecodeError),
    /// Explicit curves or an unregistered named curve.
    #[error("unsupported curve (type {curve_type}, id {curve_id})")]
    UnknownCurve { curve_type: u8, curve_id: u16 },
    #[error("bad ec point encoding")]
    BadPoint,
}

/// Read `{prime, generator, public value}`; the cursor's consumed count is
/// the running parameter length.
///
/// # Errors
/// `DecodeError::Truncated` naming the first field whose prefix or body
/// overruns the message.
pub fn read_dh_params(r: &mut WireReader<'_>) -> Result<DhParams, DecodeError> {
    let prime = r.read_vec16("dh p")?.to_vec();
    let generator = r.read_vec16("dh g")?.to_vec();
    let public_value = r.read_vec16("dh Ys")?.to_vec();
    Ok(DhParams {
        prime,
        generator,
        public_value,
    })
}

/// Read a named-curve descriptor and the encoded point.
///
/// # Errors
/// * `Framing` if the fixed 4-byte header is short.
/// * `UnknownCurve` for non-named curve types or unregistered ids.
/// * `BadPoint` if the point overruns the message or is malformed.
pub fn read_ecdh_params(r: &mut WireReader<'_>) -> Result<EcdhParams, EcParamsError> {
    let curve = read_named_curve(r)?;
    read_ec_point(r, curve)
}

/// Read only the 3-byte curve descriptor, leaving the point unread so the
/// caller can apply curve policy first.
///
/// # Errors
/// * `Framing` if the descriptor plus point length byte is short.
/// * `UnknownCurve` for non-named curve types or unregistered ids.
pub fn read_named_curve(r: &mut WireReader<'_>) -> Result<NamedCurve, EcParamsError> {
    if r.remaining() < 4 {
        return Err(DecodeError::Truncated {
            field: "ec parameters",
            needed: 4,
            remaining: r.remaining(),
        }
        .into());
    }
    let curve_type = r.read_u8("curve type")?;
    let curve_id = r.read_u16("curve id")?;
    match (curve_type, NamedCurve::from_id(curve_id)) {
        (NAMED_CURVE_TYPE, Some(c)) => Ok(c),
        _ => Err(EcParamsError::UnknownCurve {
            curve_type,
            curve_id,
        }),
    }
}

/// Read the `u8`-prefixed point that follows a curve descriptor.
///
/// # Errors
/// `BadPoint` if the point overruns the message or is malformed.
pub fn read_ec_point(
    r: &mut WireReader<'_>,
    curve: NamedCurve,
) -> Result<EcdhParams, EcParamsError> {
    let point = r.read_vec8("ec point").map_err(|_| EcParamsError::BadPoint)?;
    if !point_is_well_formed(curve, point) {
        return Err(EcParamsError::BadPoint);
    }
    Ok(EcdhParams {
        curve,
        point: point.to_vec(),
    })
}

/// SEC1 structural check: compressed or uncompressed, correct length.
/// Whether the point lies on the curve is left to the key agreement port.
#[must_use]
pub fn point_is_well_formed(curve: NamedCurve, point: &[u8]) -> bool {
    let field_len = usize::from(curve.field_bits()).div_ceil(8);
    match point.first() {
        Some(0x04) => point.len() == 1 + 2 * field_len,
        Some(0x02 | 0x03) => point.len() == 1 + field_len,
        _ => false,
    }
}

/// Signature trailer as found on the wire, before any policy checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitallySigned<'a> {
    /// `(hash id, signature algorithm id)` when the version carries them.
    pub algorithms: Option<(u8, u8)>,
    /// Length the sender declared.
    pub declared_len: usize,
    /// Every byte left in the message after the length field.
    pub signature: &'a [u8],
}

/// Read the signature trailer. The declared length is returned rather than
/// enforced so the caller can apply its own exact-length policy.
///
/// # Errors
/// `DecodeError::Truncated` if the algorithm pair or the length field is short.
pub fn read_digitally_signed<'a>(
    r: &mut WireReader<'a>,
    explicit_algorithms: bool,
) -> Result<DigitallySigned<'a>, DecodeError> {
    let algorithms = if explicit_algorithms {
        let hash = r.read_u8("hash algorithm")?;
        let sig = r.read_u8("signature algorithm")?;
        Some((hash, sig))
    } else {
        None
    };
    let declared_len = usize::from(r.read_u16("signature length")?);
    let signature = r.read_bytes(r.remaining(), "signature")?;
    Ok(DigitallySigned {
        algorithms,
        declared_len,
        signature,
    })
}

/// # Errors
/// `DecodeError::TooLong` if a component exceeds 65535 bytes.
pub fn encode_dh_params(p: &DhParams) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::new();
    w.put_vec16(&p.prime, "dh p")?;
    w.put_vec16(&p.generator, "dh g")?;
    w.put_vec16(&p.public_value, "dh Ys")?;
    Ok(w.into_inner())
}

/// # Errors
/// `DecodeError::TooLong` if the point exceeds 255 bytes.
pub fn encode_ecdh_params(p: &EcdhParams) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::new();
    w.put_u8(NAMED_CURVE_TYPE);
    w.put_u16(p.curve.id());
    w.put_vec8(&p.point, "ec point")?;
    Ok(w.into_inner())
}

/// Signature trailer; `algorithms` is `Some` for TLS 1.2+.
///
/// # Errors
/// `DecodeError::TooLong` if the signature exceeds 65535 bytes.
pub fn encode_digitally_signed(
    algorithms: Option<(DigestAlgorithm, SignatureAlgorithm)>,
    signature: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::new();
    if let Some((hash, sig)) = algorithms {
        w.put_u8(hash.tls12_id().unwrap_or(0));
        w.put_u8(sig.id());
    }
    w.put_vec16(signature, "signature")?;
    Ok(w.into_inner())
}

/// Local DH public value as sent in key material: `u16 Yc`.
///
/// # Errors
/// `DecodeError::TooLong` if the value exceeds 65535 bytes.
pub fn encode_dh_public(public_value: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::with_capacity(2 + public_value.len());
    w.put_vec16(public_value, "dh Yc")?;
    Ok(w.into_inner())
}

/// Local EC point as sent in key material: `u8 point`.
///
/// # Errors
/// `DecodeError::TooLong` if the point exceeds 255 bytes.
pub fn encode_ecdh_public(point: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::with_capacity(1 + point.len());
    w.put_vec8(point, "ec point")?;
    Ok(w.into_inner())
}
