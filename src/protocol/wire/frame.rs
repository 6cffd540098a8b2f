//! Handshake message type tags and the `type || u24 length || body` preamble.

use super::cursor::{DecodeError, WireReader, WireWriter};

/// Handshake message types handled by the proxy-chain and slice exchange.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Certificate = 11,
    ServerKeyExchange = 12,
    ServerDone = 14,
    ProxyKeyMaterial = 40,
}

impl MessageType {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = u8;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            11 => Ok(Self::Certificate),
            12 => Ok(Self::ServerKeyExchange),
            14 => Ok(Self::ServerDone),
            40 => Ok(Self::ProxyKeyMaterial),
            other => Err(other),
        }
    }
}

/// Length of the message preamble (1 byte type, 3 byte length).
pub const HEADER_LEN: usize = 4;

/// Prefix `body` with its type tag and 24-bit length.
///
/// # Errors
/// `DecodeError::TooLong` if the body does not fit a 24-bit length.
pub fn prepend_frame(ty: MessageType, body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut w = WireWriter::with_capacity(HEADER_LEN + body.len());
    w.put_u8(ty.as_u8());
    w.put_vec24(body, "handshake body")?;
    Ok(w.into_inner())
}

/// Split a framed message into its raw type tag and body.
///
/// # Errors
/// * `DecodeError::Truncated` if the header or the body is short.
/// * `DecodeError::TrailingBytes` if bytes follow the declared body.
pub fn split_frame(input: &[u8]) -> Result<(u8, &[u8]), DecodeError> {
    let mut r = WireReader::new(input);
    let ty = r.read_u8("handshake type")?;
    let body = r.read_vec24("handshake body")?;
    r.finish()?;
    Ok((ty, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_and_split() {
        let framed = prepend_frame(MessageType::ProxyKeyMaterial, b"xyz").unwrap();
        assert_eq!(framed, vec![40, 0, 0, 3, b'x', b'y', b'z']);
        let (ty, body) = split_frame(&framed).unwrap();
        assert_eq!(MessageType::try_from(ty), Ok(MessageType::ProxyKeyMaterial));
        assert_eq!(body, b"xyz");
    }

    #[test]
    fn split_rejects_short_body() {
        assert!(split_frame(&[11, 0, 0, 4, 1, 2]).is_err());
        assert!(split_frame(&[]).is_err());
    }

    #[test]
    fn split_rejects_trailing() {
        let err = split_frame(&[14, 0, 0, 0, 9]).unwrap_err();
        assert_eq!(err, DecodeError::TrailingBytes(1));
    }

    #[test]
    fn unknown_type_is_returned_raw() {
        assert_eq!(MessageType::try_from(0x63), Err(0x63));
    }
}
