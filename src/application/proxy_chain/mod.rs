//! Proxy chain traversal and per-hop authentication.

pub mod coordinator;
pub mod steps;

pub use coordinator::*;
pub use steps::*;
