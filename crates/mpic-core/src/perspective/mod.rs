//! Perspective metadata and endpoint lookup.
//!
//! - [`registry`]: the read-only set of every perspective the deployment knows about, with the
//!   RIR and proximity metadata used for diversity-aware selection
//! - [`endpoint`]: per-check-type network location of each configured perspective
//!
//! Both are loaded once at startup and never mutated, so readers share them through `Arc`
//! without locking.
//!
//! Perspective codes are case-insensitive. The `config` crate lowercases table keys, so the
//! registry and the endpoint table store every code lowercased and lowercase on lookup.

pub mod endpoint;
pub mod registry;

pub use endpoint::{EndpointTable, PerspectiveEndpoint, PerspectiveEndpoints};
pub use registry::{Perspective, PerspectiveRegistry, RegistryError};

/// Canonical form of a perspective code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}
