//! Byte-level codecs for the proxy-chain and slice messages. Structure and
//! length checks only; no policy and no connection state.

pub mod certificate;
pub mod cursor;
pub mod frame;
pub mod key_exchange;
pub mod key_material;

pub use certificate::{
    CertificateListError, decode_certificate_list, der_element_len, encode_certificate_list,
};
pub use cursor::{DecodeError, U24_MAX, WireReader, WireWriter};
pub use frame::{HEADER_LEN, MessageType, prepend_frame, split_frame};
pub use key_exchange::{
    DigitallySigned, EcParamsError, encode_dh_params, encode_dh_public, encode_digitally_signed,
    encode_ecdh_params, encode_ecdh_public, point_is_well_formed, read_digitally_signed,
    read_dh_params, read_ec_point, read_ecdh_params, read_named_curve,
};
pub use key_material::{
    KeyMaterial, KeyMaterialError, Origin, SliceKeyEntry, decode_key_material,
    decode_key_material_for, encode_key_material,
};
