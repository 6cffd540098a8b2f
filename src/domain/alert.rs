//! TLS alert levels and descriptions emitted when a handshake step aborts.

/// Alert level byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning = 1,
    Fatal = 2,
}

/// Alert description byte (RFC 5246 §7.2).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertDescription {
    UnexpectedMessage = 10,
    HandshakeFailure = 40,
    BadCertificate = 42,
    UnsupportedCertificate = 43,
    CertificateRevoked = 44,
    CertificateExpired = 45,
    CertificateUnknown = 46,
    IllegalParameter = 47,
    UnknownCa = 48,
    DecodeError = 50,
    DecryptError = 51,
    ExportRestriction = 60,
    InternalError = 80,
}

impl AlertDescription {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
