//! Certificate list body: `u24 total { u24 len, DER certificate }*`.
//!
//! Only the framing is checked here: each entry must hold exactly one DER
//! element whose own length covers the entry with nothing left over. Parsing
//! the certificate contents belongs to the verifier port.

use super::cursor::{DecodeError, WireReader, WireWriter};
use thiserror::Error;

/// Faults in a certificate list body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertificateListError {
    /// Outer or inner length fields disagree with the message.
    #[error("certificate list framing: {0}")]
    Framing(#[from] DecodeError),
    /// An entry is not a well-formed DER element.
    #[error("certificate {index} is not valid DER")]
    BadEncoding { index: usize },
}

/// Decode the list into DER blobs, leaf first.
///
/// # Errors
/// * `Framing` when the outer length is not `body.len() - 3`, when an entry
///   claims more than the outer length leaves, or when a DER element does not
///   fill its entry exactly.
/// * `BadEncoding` when an entry does not start with a parseable DER header.
pub fn decode_certificate_list(body: &[u8]) -> Result<Vec<Vec<u8>>, CertificateListError> {
    let mut r = WireReader::new(body);
    let total = r.read_u24("certificate list length")?;
    if total + 3 != body.len() {
        return Err(DecodeError::LengthMismatch {
            field: "certificate list",
            declared: total,
            actual: body.len().saturating_sub(3),
        }
        .into());
    }

    let mut certs = Vec::new();
    let mut nc = 0usize;
    while nc < total {
        let l = r.read_u24("certificate length")?;
        if l + nc + 3 > total {
            return Err(DecodeError::LengthMismatch {
                field: "certificate",
                declared: l,
                actual: total - nc - 3,
            }
            .into());
        }
        let der = r.read_bytes(l, "certificate")?;
        let used = der_element_len(der).ok_or(CertificateListError::BadEncoding {
            index: certs.len(),
        })?;
        if used != l {
            return Err(DecodeError::LengthMismatch {
                field: "certificate DER",
                declared: l,
                actual: used,
            }
            .into());
        }
        certs.push(der.to_vec());
        nc += l + 3;
    }
    Ok(certs)
}

/// Encode DER blobs as a certificate list body.
///
/// # Errors
/// `DecodeError::TooLong` if an entry or the whole list exceeds 24 bits.
pub fn encode_certificate_list<B: AsRef<[u8]>>(certs: &[B]) -> Result<Vec<u8>, DecodeError> {
    let mut inner = WireWriter::new();
    for c in certs {
        inner.put_vec24(c.as_ref(), "certificate")?;
    }
    let mut w = WireWriter::with_capacity(inner.len() + 3);
    w.put_vec24(&inner.into_inner(), "certificate list")?;
    Ok(w.into_inner())
}

/// Total size (header + content) of the DER element at the start of `der`,
/// or `None` if the header is malformed or the content overruns `der`.
#[must_use]
pub fn der_element_len(der: &[u8]) -> Option<usize> {
    let tag = *der.first()?;
    // high-tag-number form is not used by X.509
    if tag & 0x1f == 0x1f {
        return None;
    }
    let first = *der.get(1)?;
    let (content_len, header_len) = if first & 0x80 == 0 {
        (usize::from(first), 2)
    } else {
        let n = usize::from(first & 0x7f);
        // indefinite lengths are BER only; cap at 4 length octets
        if n == 0 || n > 4 {
            return None;
        }
        let octets = der.get(2..2 + n)?;
        if octets[0] == 0 {
            return None;
        }
        let len = octets.iter().fold(0usize, |acc, b| acc << 8 | usize::from(*b));
        if len < 0x80 {
            return None;
        }
        (len, 2 + n)
    };
    let total = header_len.checked_add(content_len)?;
    (total <= der.len()).then_some(total)
}
