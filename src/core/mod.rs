//! Core functionality
//!
//! Routing, health monitoring, response caching, and the boundaries
//! they consume.

pub mod health;
pub mod metrics;
pub mod providers;
pub mod rate_limiter;
pub mod response_cache;
pub mod router;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
