use thiserror::Error;
use tracing::warn;

use crate::domain::alert::{AlertDescription, AlertLevel};
use crate::domain::certificate::VerifyFailure;
use crate::domain::slice::SliceId;
use crate::ports::crypto::CryptoError;
use crate::ports::transport::{HandshakeTransport, TransportError};
use crate::protocol::wire::{CertificateListError, DecodeError, EcParamsError, KeyMaterialError};

/// Coarse classification of handshake failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or truncated length fields, framing mismatches.
    Decode,
    /// Well-formed input that breaks the protocol's rules.
    ProtocolViolation,
    /// Verification, signature, or random-source failure.
    CryptoFailure,
    /// Allocation or collaborator exhaustion.
    ResourceExhaustion,
    Transport,
    NotSupported,
}

/// Every way a proxy-chain or slice step can abort. All are fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SppError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("message of {len} bytes exceeds limit {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("unexpected handshake message type {0}")]
    UnexpectedMessage(u8),

    #[error("extra data in message ({0} bytes)")]
    ExtraData(usize),

    #[error("certificate {index} is not valid DER")]
    BadCertificate { index: usize },

    #[error("certificate verify failed: {0:?}")]
    CertificateVerifyFailed(VerifyFailure),

    #[error("unable to find public key parameters")]
    MissingPublicKeyParameters,

    #[error("unknown certificate type")]
    UnknownCertificateType,

    #[error("no peer public key for a signed key exchange")]
    MissingPeerKey,

    #[error("static DH suites are not supported for proxy hops")]
    UnsupportedCipher,

    #[error("key exchange parameters required but absent")]
    MissingKeyExchangeParams,

    #[error("unsupported curve (type {curve_type}, id {curve_id})")]
    UnknownCurve { curve_type: u8, curve_id: u16 },

    #[error("bad ec point")]
    BadEcPoint,

    #[error("ec group of {bits} bits too large for export cipher")]
    ExportRestriction { bits: u16 },

    #[error("wrong signature type: key implies {expected}, message has {actual}")]
    WrongSignatureType { expected: u8, actual: u8 },

    #[error("unknown digest id {0}")]
    UnknownDigest(u8),

    #[error("wrong signature length: declared {declared}, present {present}, key max {max}")]
    WrongSignatureLength {
        declared: usize,
        present: usize,
        max: usize,
    },

    #[error("bad signature")]
    BadSignature,

    #[error("bad key material origin tag {0}")]
    BadOrigin(u8),

    #[error("unknown slice id {0}")]
    UnknownSlice(SliceId),

    #[error("slice {slice_id} key of {len} bytes exceeds {max}")]
    SliceKeyTooLong {
        slice_id: SliceId,
        len: usize,
        max: usize,
    },

    #[error("duplicate key material for slice {0}")]
    DuplicateSliceEntry(SliceId),

    #[error("no key material for slice {0}")]
    MissingSliceMaterial(SliceId),

    #[error("no ephemeral parameters stored for hop {0}")]
    MissingPeerParameters(usize),

    #[error("no proxy at index {0}")]
    UnknownProxy(usize),

    #[error("chain processing already aborted")]
    Aborted,

    #[error("crypto collaborator failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("not supported: {0}")]
    NotSupported(&'static str),
}

impl SppError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_)
            | Self::MessageTooLong { .. }
            | Self::ExtraData(_)
            | Self::BadEcPoint
            | Self::WrongSignatureLength { .. }
            | Self::SliceKeyTooLong { .. } => ErrorKind::Decode,
            Self::UnexpectedMessage(_)
            | Self::BadCertificate { .. }
            | Self::MissingPublicKeyParameters
            | Self::UnknownCertificateType
            | Self::MissingPeerKey
            | Self::UnsupportedCipher
            | Self::MissingKeyExchangeParams
            | Self::UnknownCurve { .. }
            | Self::ExportRestriction { .. }
            | Self::WrongSignatureType { .. }
            | Self::UnknownDigest(_)
            | Self::BadOrigin(_)
            | Self::UnknownSlice(_)
            | Self::DuplicateSliceEntry(_)
            | Self::MissingSliceMaterial(_)
            | Self::MissingPeerParameters(_)
            | Self::UnknownProxy(_)
            | Self::Aborted => ErrorKind::ProtocolViolation,
            Self::CertificateVerifyFailed(_) | Self::BadSignature => ErrorKind::CryptoFailure,
            Self::Crypto(CryptoError::RandomSource) => ErrorKind::CryptoFailure,
            Self::Crypto(_) => ErrorKind::ResourceExhaustion,
            Self::Transport(_) => ErrorKind::Transport,
            Self::NotSupported(_) => ErrorKind::NotSupported,
        }
    }

    /// Fatal alert to send before aborting; `None` when the failure is local.
    #[must_use]
    pub fn alert(&self) -> Option<AlertDescription> {
        use AlertDescription as A;
        Some(match self {
            Self::Decode(_)
            | Self::ExtraData(_)
            | Self::BadEcPoint
            | Self::WrongSignatureType { .. }
            | Self::UnknownDigest(_)
            | Self::WrongSignatureLength { .. }
            | Self::SliceKeyTooLong { .. } => A::DecodeError,
            Self::MessageTooLong { .. } | Self::UnsupportedCipher | Self::BadOrigin(_) => {
                A::IllegalParameter
            }
            Self::UnknownSlice(_) | Self::DuplicateSliceEntry(_) => A::IllegalParameter,
            Self::UnexpectedMessage(_) | Self::MissingKeyExchangeParams => A::UnexpectedMessage,
            Self::BadCertificate { .. } => A::BadCertificate,
            Self::CertificateVerifyFailed(reason) => reason.alert(),
            Self::MissingPublicKeyParameters
            | Self::UnknownCertificateType
            | Self::MissingSliceMaterial(_)
            | Self::MissingPeerParameters(_) => A::HandshakeFailure,
            Self::UnknownCurve { .. } | Self::MissingPeerKey => A::InternalError,
            Self::ExportRestriction { .. } => A::ExportRestriction,
            Self::BadSignature => A::DecryptError,
            Self::UnknownProxy(_)
            | Self::Aborted
            | Self::Crypto(_)
            | Self::Transport(_)
            | Self::NotSupported(_) => return None,
        })
    }
}

/// Send the fatal alert `err` calls for, if any, and hand the error back.
pub(crate) fn abort_with_alert<T>(transport: &mut T, err: SppError) -> SppError
where
    T: HandshakeTransport + ?Sized,
{
    match err.alert() {
        Some(description) => {
            warn!(error = %err, alert = ?description, "handshake aborted");
            transport.send_alert(AlertLevel::Fatal, description);
        }
        None => warn!(error = %err, "handshake aborted without alert"),
    }
    err
}

impl From<CertificateListError> for SppError {
    fn from(e: CertificateListError) -> Self {
        match e {
            CertificateListError::Framing(d) => Self::Decode(d),
            CertificateListError::BadEncoding { index } => Self::BadCertificate { index },
        }
    }
}

impl From<EcParamsError> for SppError {
    fn from(e: EcParamsError) -> Self {
        match e {
            EcParamsError::Framing(d) => Self::Decode(d),
            EcParamsError::UnknownCurve {
                curve_type,
                curve_id,
            } => Self::UnknownCurve {
                curve_type,
                curve_id,
            },
            EcParamsError::BadPoint => Self::BadEcPoint,
        }
    }
}

impl From<KeyMaterialError> for SppError {
    fn from(e: KeyMaterialError) -> Self {
        match e {
            KeyMaterialError::Framing(d) => Self::Decode(d),
            KeyMaterialError::BadOrigin(o) => Self::BadOrigin(o),
            KeyMaterialError::KeyTooLong { slice_id, len, max } => {
                Self::SliceKeyTooLong { slice_id, len, max }
            }
            KeyMaterialError::UnknownSlice(id) => Self::UnknownSlice(id),
        }
    }
}
