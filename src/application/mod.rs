//! Orchestration: drives wire codecs, domain state, and collaborator ports
//! through the proxy-chain and slice-key sub-protocols.

pub mod errors;
pub mod mac;
pub mod proxy_chain;
pub mod slice_keys;

pub use errors::{ErrorKind, SppError};
pub use mac::copy_mac_state;
pub use proxy_chain::{
    ChainState, HopStep, ProxyChainCoordinator, StepOutcome, StepReport, get_proxy_certificate,
    get_proxy_done, get_proxy_key_exchange,
};
pub use slice_keys::{
    generate_slice_keys, get_end_key_material, get_proxy_key_material, send_end_key_material,
    send_proxy_key_material,
};
