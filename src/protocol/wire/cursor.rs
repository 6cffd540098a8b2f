//! Bounds-checked big-endian cursor over a handshake message body.
//!
//! Every length read from the wire is checked against the bytes that remain
//! before the cursor advances. A failed read leaves the cursor where it was,
//! so callers can report the offending field without partial consumption.

use thiserror::Error;

/// Largest value representable in a 24-bit length field.
pub const U24_MAX: usize = 0x00ff_ffff;

/// Framing and length faults found while decoding a message body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A field needed more bytes than the message has left.
    #[error("{field}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    /// A declared length disagrees with the enclosing structure.
    #[error("{field} length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        field: &'static str,
        declared: usize,
        actual: usize,
    },
    /// Bytes were left over after the last expected field.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
    /// A value does not fit the length prefix it would be written with.
    #[error("{field}: {len} bytes do not fit a {width}-byte length prefix")]
    TooLong {
        field: &'static str,
        len: usize,
        width: usize,
    },
}

/// Read-only cursor; `consumed()` is the running parameter length.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The slice consumed between `start` and the current position.
    #[must_use]
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.buf[start.min(self.pos)..self.pos]
    }

    /// Take exactly `n` bytes.
    ///
    /// # Errors
    /// `DecodeError::Truncated` if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::Truncated {
                field,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// # Errors
    /// `DecodeError::Truncated` on an empty cursor.
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1, field)?[0])
    }

    /// # Errors
    /// `DecodeError::Truncated` if fewer than 2 bytes remain.
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        let b = self.read_bytes(2, field)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// # Errors
    /// `DecodeError::Truncated` if fewer than 3 bytes remain.
    pub fn read_u24(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let b = self.read_bytes(3, field)?;
        Ok(usize::from(b[0]) << 16 | usize::from(b[1]) << 8 | usize::from(b[2]))
    }

    /// Read a `u8` length followed by that many bytes.
    ///
    /// # Errors
    /// `DecodeError::Truncated` if the prefix or the body overruns the message.
    pub fn read_vec8(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        self.read_prefixed(1, field)
    }

    /// Read a `u16` length followed by that many bytes.
    ///
    /// # Errors
    /// `DecodeError::Truncated` if the prefix or the body overruns the message.
    pub fn read_vec16(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        self.read_prefixed(2, field)
    }

    /// Read a `u24` length followed by that many bytes.
    ///
    /// # Errors
    /// `DecodeError::Truncated` if the prefix or the body overruns the message.
    pub fn read_vec24(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        self.read_prefixed(3, field)
    }

    fn read_prefixed(&mut self, width: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let len = match width {
            1 => usize::from(self.read_u8(field)?),
            2 => usize::from(self.read_u16(field)?),
            _ => self.read_u24(field)?,
        };
        self.read_bytes(len, field).inspect_err(|_| self.pos = start)
    }

    /// Require that the whole buffer was consumed.
    ///
    /// # Errors
    /// `DecodeError::TrailingBytes` with the leftover count.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Growable big-endian writer used to build outbound bodies.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            buf: Vec::with_capacity(n),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// # Errors
    /// `DecodeError::TooLong` if `v` exceeds 24 bits.
    pub fn put_u24(&mut self, v: usize, field: &'static str) -> Result<(), DecodeError> {
        if v > U24_MAX {
            return Err(DecodeError::TooLong {
                field,
                len: v,
                width: 3,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        self.buf
            .extend_from_slice(&[(v >> 16) as u8, (v >> 8) as u8, v as u8]);
        Ok(())
    }

    pub fn put_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    /// # Errors
    /// `DecodeError::TooLong` if `b` is longer than 255 bytes.
    pub fn put_vec8(&mut self, b: &[u8], field: &'static str) -> Result<(), DecodeError> {
        let len = u8::try_from(b.len()).map_err(|_| DecodeError::TooLong {
            field,
            len: b.len(),
            width: 1,
        })?;
        self.put_u8(len);
        self.put_bytes(b);
        Ok(())
    }

    /// # Errors
    /// `DecodeError::TooLong` if `b` is longer than 65535 bytes.
    pub fn put_vec16(&mut self, b: &[u8], field: &'static str) -> Result<(), DecodeError> {
        let len = u16::try_from(b.len()).map_err(|_| DecodeError::TooLong {
            field,
            len: b.len(),
            width: 2,
        })?;
        self.put_u16(len);
        self.put_bytes(b);
        Ok(())
    }

    /// # Errors
    /// `DecodeError::TooLong` if `b` is longer than `U24_MAX` bytes.
    pub fn put_vec24(&mut self, b: &[u8], field: &'static str) -> Result<(), DecodeError> {
        self.put_u24(b.len(), field)?;
        self.put_bytes(b);
        Ok(())
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
