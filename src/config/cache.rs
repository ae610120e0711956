//! Tiered configuration cache and change watcher

use super::validation::validate_config;
use crate::core::types::config::RoutingConfig;
use crate::storage::{ConfigStore, SharedCacheTier};
use crate::utils::error::Result;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Callback invoked when a tenant's active configuration changes
pub type ConfigWatcher = Arc<dyn Fn(Option<&str>, &RoutingConfig) + Send + Sync>;

/// Config cache tuning
#[derive(Debug, Clone)]
pub struct ConfigCacheSettings {
    /// Fast-tier validity window
    pub local_ttl: Duration,
    /// Shared-tier entry TTL
    pub shared_ttl: Duration,
}

impl Default for ConfigCacheSettings {
    fn default() -> Self {
        Self {
            local_ttl: Duration::from_secs(300),
            shared_ttl: Duration::from_secs(300),
        }
    }
}

struct CachedConfig {
    config: RoutingConfig,
    loaded_at: Instant,
}

/// Hot-reloadable configuration cache
///
/// Reads resolve fast tier, then shared tier, then the durable store,
/// repopulating tiers on the way back up. Every tier is keyed by
/// tenant, so one cache instance can serve many tenants without
/// leaking settings across them. Saves validate first, then persist,
/// refresh tiers, and notify watchers synchronously so the router can
/// rebuild its provider set before the call returns.
pub struct ConfigCache {
    settings: ConfigCacheSettings,
    store: Arc<dyn ConfigStore>,
    shared: Option<Arc<dyn SharedCacheTier>>,
    local: DashMap<String, CachedConfig>,
    watchers: Mutex<Vec<ConfigWatcher>>,
    poller: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl ConfigCache {
    pub fn new(
        settings: ConfigCacheSettings,
        store: Arc<dyn ConfigStore>,
        shared: Option<Arc<dyn SharedCacheTier>>,
    ) -> Self {
        Self {
            settings,
            store,
            shared,
            local: DashMap::new(),
            watchers: Mutex::new(Vec::new()),
            poller: Mutex::new(None),
        }
    }

    fn tenant_key(tenant: Option<&str>) -> String {
        tenant.unwrap_or("default").to_string()
    }

    fn shared_key(tenant: Option<&str>) -> String {
        format!("routing-config:{}", tenant.unwrap_or("default"))
    }

    /// Register a change watcher
    pub fn register_watcher(&self, watcher: ConfigWatcher) {
        self.watchers.lock().push(watcher);
    }

    fn notify_watchers(&self, tenant: Option<&str>, config: &RoutingConfig) {
        let watchers = self.watchers.lock().clone();
        for watcher in watchers {
            watcher(tenant, config);
        }
    }

    fn store_local(&self, tenant: Option<&str>, config: &RoutingConfig) {
        self.local.insert(
            Self::tenant_key(tenant),
            CachedConfig {
                config: config.clone(),
                loaded_at: Instant::now(),
            },
        );
    }

    async fn store_shared(&self, tenant: Option<&str>, config: &RoutingConfig) {
        if let Some(shared) = &self.shared {
            match serde_json::to_value(config) {
                Ok(value) => {
                    if let Err(err) = shared
                        .set(&Self::shared_key(tenant), value, self.settings.shared_ttl)
                        .await
                    {
                        warn!("shared config tier write failed: {err}");
                    }
                }
                Err(err) => warn!("unserializable routing config: {err}"),
            }
        }
    }

    /// Resolve the active configuration
    ///
    /// A stored config absent from every tier falls back to
    /// [`RoutingConfig::default`].
    pub async fn get_config(&self, tenant: Option<&str>, use_cache: bool) -> RoutingConfig {
        if use_cache {
            if let Some(cached) = self.local.get(&Self::tenant_key(tenant)) {
                if cached.loaded_at.elapsed() < self.settings.local_ttl {
                    return cached.config.clone();
                }
            }
            if let Some(shared) = &self.shared {
                match shared.get(&Self::shared_key(tenant)).await {
                    Ok(Some(value)) => match serde_json::from_value::<RoutingConfig>(value) {
                        Ok(config) => {
                            debug!("routing config served from shared tier");
                            self.store_local(tenant, &config);
                            return config;
                        }
                        Err(err) => warn!("undecodable shared config entry: {err}"),
                    },
                    Ok(None) => {}
                    Err(err) => warn!("shared config tier read failed: {err}"),
                }
            }
        }

        let config = match self.store.load(tenant).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!("no stored routing config, using defaults");
                RoutingConfig::default()
            }
            Err(err) => {
                warn!("config store read failed, using defaults: {err}");
                RoutingConfig::default()
            }
        };
        self.store_local(tenant, &config);
        self.store_shared(tenant, &config).await;
        config
    }

    /// Validate, persist, refresh tiers, and notify watchers
    ///
    /// Watchers run synchronously before this returns.
    pub async fn save_config(&self, config: &RoutingConfig, tenant: Option<&str>) -> Result<()> {
        validate_config(config)?;
        self.store.save(tenant, config).await?;
        self.store_local(tenant, config);
        self.store_shared(tenant, config).await;
        self.notify_watchers(tenant, config);
        info!("routing configuration saved and active");
        Ok(())
    }

    /// Bust the tenant's tiers, reload from the store, and notify
    /// watchers
    pub async fn hot_reload(&self, tenant: Option<&str>) -> RoutingConfig {
        self.local.remove(&Self::tenant_key(tenant));
        if let Some(shared) = &self.shared {
            if let Err(err) = shared.delete(&Self::shared_key(tenant)).await {
                warn!("shared config tier bust failed: {err}");
            }
        }
        let config = self.get_config(tenant, false).await;
        self.notify_watchers(tenant, &config);
        info!("routing configuration hot-reloaded");
        config
    }

    /// Start the periodic external-change poller; safe to call twice
    ///
    /// Watchers are notified only when a freshly loaded config differs
    /// (by value) from the last-seen snapshot.
    pub fn start_watcher(self: &Arc<Self>, tenant: Option<String>, interval: Duration) {
        let mut guard = self.poller.lock();
        if guard.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let cache = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            let mut last_seen = cache.get_config(tenant.as_deref(), true).await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let fresh = cache.get_config(tenant.as_deref(), false).await;
                        if fresh != last_seen {
                            info!("routing configuration changed externally");
                            cache.notify_watchers(tenant.as_deref(), &fresh);
                            last_seen = fresh;
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        *guard = Some((shutdown_tx, handle));
    }

    /// Stop the poller and await its termination
    pub async fn stop_watcher(&self) {
        let stopped = self.poller.lock().take();
        if let Some((shutdown_tx, handle)) = stopped {
            let _ = shutdown_tx.send(true);
            if let Err(err) = handle.await {
                warn!("config watcher task panicked: {err}");
            }
        }
    }
}
