//! Per-provider retry loop
//!
//! Fixed three attempts per provider. Each attempt optionally takes a
//! rate-limit permit, then runs under a hard deadline. Rate-limited
//! failures sleep the provider-indicated delay instead of a backoff
//! step; other retryable failures back off exponentially (1s, 2s, 4s).

use crate::core::rate_limiter::RateLimiter;
use crate::core::types::common::{ProviderMethod, UsageEvent, UsageLogEntry};
use crate::storage::UsageLog;
use crate::utils::error::{Result, SwitchError};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Attempts per provider before giving up on it
pub const MAX_ATTEMPTS: u32 = 3;

/// Longest wait for a rate-limit permit
pub const PERMIT_WAIT: Duration = Duration::from_secs(30);

/// Collaborators and identity for one retry cycle
pub struct RetryContext {
    pub method: ProviderMethod,
    pub model: Option<String>,
    pub call_timeout: Duration,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub usage_log: Option<Arc<dyn UsageLog>>,
}

impl RetryContext {
    async fn log_timeout(&self, latency_ms: u64) {
        if let Some(log) = &self.usage_log {
            let entry = UsageLogEntry::new(
                self.method,
                self.model.clone(),
                UsageEvent::Timeout,
                latency_ms,
            );
            if let Err(err) = log.append(entry).await {
                warn!("usage log append failed: {err}");
            }
        }
    }
}

/// Run `op` with the full retry budget for one provider
///
/// `op` is invoked fresh per attempt. The returned error after the
/// final attempt is the last failure observed.
pub async fn run<T, F, Fut>(ctx: &RetryContext, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>> + Send,
{
    let mut last_error = SwitchError::Generation("no attempt was made".to_string());

    for attempt in 0..MAX_ATTEMPTS {
        if let Some(limiter) = &ctx.rate_limiter {
            if let Err(err) = limiter.acquire(ctx.method, true, PERMIT_WAIT).await {
                // Permit acquisition failures are retryable
                warn!(
                    "rate-limit permit for {} not acquired (attempt {}): {err}",
                    ctx.method, attempt
                );
                last_error = err;
                if attempt + 1 < MAX_ATTEMPTS {
                    backoff(attempt).await;
                }
                continue;
            }
        }

        let started = Instant::now();
        let outcome = tokio::time::timeout(ctx.call_timeout, op()).await;
        match outcome {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => {
                debug!(
                    "provider {} attempt {} failed: {err}",
                    ctx.method, attempt
                );
                if !err.is_retryable() {
                    return Err(err);
                }
                if let SwitchError::RateLimited { retry_after, .. } = &err {
                    // Provider told us when to come back; honor that
                    // instead of the backoff schedule.
                    let delay = Duration::from_secs(retry_after.unwrap_or(60));
                    last_error = err;
                    if attempt + 1 < MAX_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                    }
                    continue;
                }
                last_error = err;
            }
            Err(_) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                debug!(
                    "provider {} attempt {} timed out after {:?}",
                    ctx.method, attempt, ctx.call_timeout
                );
                ctx.log_timeout(latency_ms).await;
                last_error =
                    SwitchError::Timeout(format!("call exceeded {:?}", ctx.call_timeout));
            }
        }

        if attempt + 1 < MAX_ATTEMPTS {
            backoff(attempt).await;
        }
    }

    Err(last_error)
}

/// Exponential backoff: 2^attempt seconds
async fn backoff(attempt: u32) {
    let delay = Duration::from_secs(1 << attempt.min(5));
    tokio::time::sleep(delay).await;
}
