//! Response cache
//!
//! Content-addressed store mapping a normalized-request fingerprint to
//! a prior generation, with TTL expiry, a fast in-process tier plus an
//! optional shared tier, and size-bounded oldest-first eviction.

mod fingerprint;
mod manager;

pub use fingerprint::Fingerprint;
pub use manager::{ResponseCache, ResponseCacheConfig};
