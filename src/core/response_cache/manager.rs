//! Response cache implementation

use super::Fingerprint;
use crate::core::types::common::GenerationResult;
use crate::storage::SharedCacheTier;
use crate::utils::error::Result;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Response cache configuration
#[derive(Debug, Clone)]
pub struct ResponseCacheConfig {
    /// Entry time-to-live
    pub ttl: Duration,
    /// In-process tier capacity; oldest entries are trimmed beyond it
    pub capacity: usize,
    /// Sweep interval for the background cleanup task
    pub cleanup_interval: Duration,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            capacity: 1000,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: GenerationResult,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// Dual-tier response cache
///
/// The in-process tier always receives writes; the shared tier is
/// best-effort on write and consulted first on read so workers behind
/// one shared tier converge.
pub struct ResponseCache {
    config: ResponseCacheConfig,
    local: Arc<DashMap<String, CacheEntry>>,
    shared: Option<Arc<dyn SharedCacheTier>>,
    cleanup: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl ResponseCache {
    pub fn new(config: ResponseCacheConfig, shared: Option<Arc<dyn SharedCacheTier>>) -> Self {
        Self {
            config,
            local: Arc::new(DashMap::new()),
            shared,
            cleanup: Mutex::new(None),
        }
    }

    fn shared_key(fingerprint: &Fingerprint) -> String {
        format!("response:{fingerprint}")
    }

    /// Look up a prior response
    ///
    /// Hits come back with `cached = true`; the flag is set on
    /// retrieval only, never stored, so the first caller can tell a
    /// fresh generation from a replay.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<GenerationResult> {
        if let Some(shared) = &self.shared {
            match shared.get(&Self::shared_key(fingerprint)).await {
                Ok(Some(value)) => match serde_json::from_value::<GenerationResult>(value) {
                    Ok(mut result) => {
                        debug!("shared-tier cache hit for {fingerprint}");
                        result.cached = true;
                        return Some(result);
                    }
                    Err(err) => warn!("undecodable shared cache entry for {fingerprint}: {err}"),
                },
                Ok(None) => {}
                Err(err) => warn!("shared cache read failed for {fingerprint}: {err}"),
            }
        }

        let key = fingerprint.as_str();
        if let Some(entry) = self.local.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.local.remove(key);
                return None;
            }
            debug!("in-process cache hit for {fingerprint}");
            let mut result = entry.value.clone();
            result.cached = true;
            return Some(result);
        }
        None
    }

    /// Store a fresh response in both tiers
    ///
    /// The in-process write always lands; a shared-tier failure is
    /// logged and does not block it. Completes before the router
    /// returns to the caller.
    pub async fn set(&self, fingerprint: &Fingerprint, result: &GenerationResult) -> Result<()> {
        let mut stored = result.clone();
        stored.cached = false;

        if let Some(shared) = &self.shared {
            match serde_json::to_value(&stored) {
                Ok(value) => {
                    if let Err(err) = shared
                        .set(&Self::shared_key(fingerprint), value, self.config.ttl)
                        .await
                    {
                        warn!("shared cache write failed for {fingerprint}: {err}");
                    }
                }
                Err(err) => warn!("unserializable response for {fingerprint}: {err}"),
            }
        }

        self.local.insert(
            fingerprint.as_str().to_string(),
            CacheEntry {
                value: stored,
                stored_at: Instant::now(),
                ttl: self.config.ttl,
            },
        );
        Ok(())
    }

    /// Number of live in-process entries
    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Drop expired entries, then trim oldest-first down to capacity
    pub fn sweep(&self) {
        let before = self.local.len();
        self.local.retain(|_, entry| !entry.is_expired());

        let over = self.local.len().saturating_sub(self.config.capacity);
        if over > 0 {
            let mut by_age: Vec<(String, Instant)> = self
                .local
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().stored_at))
                .collect();
            by_age.sort_by_key(|(_, stored_at)| *stored_at);
            for (key, _) in by_age.into_iter().take(over) {
                self.local.remove(&key);
            }
        }

        let removed = before.saturating_sub(self.local.len());
        if removed > 0 {
            info!("response cache sweep removed {removed} entries");
        }
    }

    /// Start the background cleanup task; safe to call repeatedly
    pub fn start_cleanup(self: &Arc<Self>) {
        let mut guard = self.cleanup.lock();
        if guard.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let cache = Arc::clone(self);
        let interval = self.config.cleanup_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => cache.sweep(),
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        *guard = Some((shutdown_tx, handle));
    }

    /// Stop the cleanup task and await its termination
    pub async fn stop_cleanup(&self) {
        let stopped = self.cleanup.lock().take();
        if let Some((shutdown_tx, handle)) = stopped {
            let _ = shutdown_tx.send(true);
            if let Err(err) = handle.await {
                warn!("response cache cleanup task panicked: {err}");
            }
        }
    }

    /// Drop every in-process entry
    pub fn clear(&self) {
        self.local.clear();
    }
}
