//! Ephemeral key-exchange parameters and the signature/digest registries
//! used to authenticate them.

use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Finite-field DH parameters received from a hop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DhParams {
    pub prime: Vec<u8>,
    pub generator: Vec<u8>,
    pub public_value: Vec<u8>,
}

impl fmt::Debug for DhParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DhParams(p: {} bytes, ..)", self.prime.len())
    }
}

/// Elliptic-curve DH parameters received from a hop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EcdhParams {
    #[zeroize(skip)]
    pub curve: NamedCurve,
    /// Encoded point, as sent on the wire.
    pub point: Vec<u8>,
}

impl fmt::Debug for EcdhParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdhParams({:?}, ..)", self.curve)
    }
}

/// Ephemeral parameters stored on a proxy. At most one family is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyExchangeParams {
    Dh(DhParams),
    EcDh(EcdhParams),
    #[default]
    None,
}

impl KeyExchangeParams {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// `ECCurveType` value for named curves.
pub const NAMED_CURVE_TYPE: u8 = 3;

/// Largest EC field size permitted with export-grade suites.
pub const EXPORT_EC_MAX_BITS: u16 = 163;

macro_rules! named_curves {
    ($($name:ident = $id:literal, $bits:literal;)*) => {
        /// Named curves from the TLS `NamedCurve` registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NamedCurve {
            $($name,)*
        }

        impl NamedCurve {
            /// Look up a registry id.
            #[must_use]
            pub fn from_id(id: u16) -> Option<Self> {
                match id {
                    $($id => Some(Self::$name),)*
                    _ => None,
                }
            }

            #[must_use]
            pub fn id(self) -> u16 {
                match self {
                    $(Self::$name => $id,)*
                }
            }

            /// Field size in bits (group degree).
            #[must_use]
            pub fn field_bits(self) -> u16 {
                match self {
                    $(Self::$name => $bits,)*
                }
            }
        }
    };
}

named_curves! {
    Sect163k1 = 1, 163;
    Sect163r1 = 2, 163;
    Sect163r2 = 3, 163;
    Sect193r1 = 4, 193;
    Sect193r2 = 5, 193;
    Sect233k1 = 6, 233;
    Sect233r1 = 7, 233;
    Sect239k1 = 8, 239;
    Sect283k1 = 9, 283;
    Sect283r1 = 10, 283;
    Sect409k1 = 11, 409;
    Sect409r1 = 12, 409;
    Sect571k1 = 13, 571;
    Sect571r1 = 14, 571;
    Secp160k1 = 15, 160;
    Secp160r1 = 16, 160;
    Secp160r2 = 17, 160;
    Secp192k1 = 18, 192;
    Secp192r1 = 19, 192;
    Secp224k1 = 20, 224;
    Secp224r1 = 21, 224;
    Secp256k1 = 22, 256;
    Secp256r1 = 23, 256;
    Secp384r1 = 24, 384;
    Secp521r1 = 25, 521;
    BrainpoolP256r1 = 26, 256;
    BrainpoolP384r1 = 27, 384;
    BrainpoolP512r1 = 28, 512;
}

/// TLS 1.2 `SignatureAlgorithm` ids.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Rsa = 1,
    Dsa = 2,
    Ecdsa = 3,
}

impl SignatureAlgorithm {
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Digest applied to the signed key-exchange transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    /// MD5 || SHA-1 concatenation used with RSA before TLS 1.2.
    Md5Sha1,
}

impl DigestAlgorithm {
    /// Map a TLS 1.2 `HashAlgorithm` id; `None` for unknown or `none(0)`.
    #[must_use]
    pub fn from_tls12_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Md5),
            2 => Some(Self::Sha1),
            3 => Some(Self::Sha224),
            4 => Some(Self::Sha256),
            5 => Some(Self::Sha384),
            6 => Some(Self::Sha512),
            _ => None,
        }
    }

    #[must_use]
    pub fn tls12_id(self) -> Option<u8> {
        match self {
            Self::Md5 => Some(1),
            Self::Sha1 => Some(2),
            Self::Sha224 => Some(3),
            Self::Sha256 => Some(4),
            Self::Sha384 => Some(5),
            Self::Sha512 => Some(6),
            Self::Md5Sha1 => None,
        }
    }

    /// Output size in bytes.
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
            Self::Md5Sha1 => 36,
        }
    }
}
