//! Rate limiter boundary
//!
//! The limiter is the router's sole backpressure mechanism and an
//! external collaborator: its token-bucket internals live elsewhere.
//! The router only acquires permits; acquisition failures are treated
//! as retryable by the retry loop.

use crate::core::types::ProviderMethod;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Permit acquisition surface consumed by the router
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Acquire one permit for `method`
    ///
    /// With `wait` set, blocks up to `max_wait` for a permit to free
    /// up; otherwise fails fast when none is available.
    async fn acquire(&self, method: ProviderMethod, wait: bool, max_wait: Duration) -> Result<()>;
}

/// Limiter that always grants, for setups without backpressure
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRateLimiter;

#[async_trait]
impl RateLimiter for NoopRateLimiter {
    async fn acquire(
        &self,
        _method: ProviderMethod,
        _wait: bool,
        _max_wait: Duration,
    ) -> Result<()> {
        Ok(())
    }
}
