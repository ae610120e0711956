//! Health monitor implementation

use crate::core::metrics::MetricsSink;
use crate::core::providers::ModelProvider;
use crate::core::types::health::{AlertEvent, HealthRecord};
use crate::core::types::ProviderMethod;
use crate::storage::HealthStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Health monitor configuration
#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    /// Interval between check cycles
    pub check_interval: Duration,
    /// Deadline for one provider check
    pub check_timeout: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            check_timeout: Duration::from_secs(10),
        }
    }
}

/// Callback receiving health transition alerts
pub type AlertCallback = Arc<dyn Fn(&AlertEvent) + Send + Sync>;

/// Background health monitor over the router's provider set
///
/// Records are created lazily on a provider's first check and only
/// updated afterwards. All reads and writes of the status map go
/// through one lock so the tick loop and concurrent queries never
/// race.
pub struct HealthMonitor {
    config: HealthMonitorConfig,
    providers: Mutex<HashMap<ProviderMethod, Arc<dyn ModelProvider>>>,
    records: Arc<Mutex<HashMap<ProviderMethod, HealthRecord>>>,
    store: Option<Arc<dyn HealthStore>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    alert_callbacks: Mutex<Vec<AlertCallback>>,
    loop_task: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl HealthMonitor {
    pub fn new(
        config: HealthMonitorConfig,
        store: Option<Arc<dyn HealthStore>>,
        metrics: Option<Arc<dyn MetricsSink>>,
    ) -> Self {
        Self {
            config,
            providers: Mutex::new(HashMap::new()),
            records: Arc::new(Mutex::new(HashMap::new())),
            store,
            metrics,
            alert_callbacks: Mutex::new(Vec::new()),
            loop_task: Mutex::new(None),
        }
    }

    /// Replace the monitored provider set
    ///
    /// Called on (re)initialization and after a config change rebuilds
    /// the providers. Existing health records are kept.
    pub fn set_providers(&self, providers: HashMap<ProviderMethod, Arc<dyn ModelProvider>>) {
        *self.providers.lock() = providers;
    }

    /// Register an alert callback
    pub fn register_alert_callback(&self, callback: AlertCallback) {
        self.alert_callbacks.lock().push(callback);
    }

    fn emit_alert(&self, alert: &AlertEvent) {
        let callbacks = self.alert_callbacks.lock().clone();
        for callback in callbacks {
            // A broken callback must not break the health loop
            if let Err(panic) =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(alert)))
            {
                warn!("alert callback panicked: {panic:?}");
            }
        }
    }

    /// Check one provider and apply the result
    async fn check_one(&self, method: ProviderMethod, provider: Arc<dyn ModelProvider>) {
        let started = Instant::now();
        let status = match tokio::time::timeout(self.config.check_timeout, provider.health_check())
            .await
        {
            Ok(status) => status,
            Err(_) => crate::core::types::health::HealthStatus::unavailable(
                method,
                started.elapsed().as_millis() as u64,
                "health check timed out".to_string(),
            ),
        };

        let (alert, record) = {
            let mut records = self.records.lock();
            let record = records.entry(method).or_default();
            let alert = record.apply(method, &status);
            (alert, record.clone())
        };

        if let Some(alert) = alert {
            info!(
                "provider {} health transition: {:?}",
                method, alert.alert_type
            );
            self.emit_alert(&alert);
        }

        if let Some(store) = &self.store {
            if let Err(err) = store.upsert(method.as_str(), &record).await {
                warn!("persisting health record for {} failed: {err}", method);
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.observe("health_check", status.available, started.elapsed());
        }

        debug!(
            "health check for {}: available={} ({}ms)",
            method, status.available, status.latency_ms
        );
    }

    /// Run one full check cycle over every configured provider
    ///
    /// A single provider's failure never aborts the cycle for the
    /// remaining providers.
    pub async fn run_cycle(&self) {
        let providers: Vec<(ProviderMethod, Arc<dyn ModelProvider>)> = self
            .providers
            .lock()
            .iter()
            .map(|(method, provider)| (*method, Arc::clone(provider)))
            .collect();
        for (method, provider) in providers {
            self.check_one(method, provider).await;
        }
    }

    /// Synchronously re-check one provider, or all when `None`
    pub async fn force_check(&self, method: Option<ProviderMethod>) {
        match method {
            Some(method) => {
                let provider = self.providers.lock().get(&method).cloned();
                if let Some(provider) = provider {
                    self.check_one(method, provider).await;
                } else {
                    warn!("force check requested for unconfigured provider {method}");
                }
            }
            None => self.run_cycle().await,
        }
    }

    /// Start the background tick loop; safe to call repeatedly
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.loop_task.lock();
        if guard.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let monitor = Arc::clone(self);
        let interval = self.config.check_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => monitor.run_cycle().await,
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        *guard = Some((shutdown_tx, handle));
        info!("health monitor started");
    }

    /// Stop the loop and await its actual termination
    pub async fn stop(&self) {
        let stopped = self.loop_task.lock().take();
        if let Some((shutdown_tx, handle)) = stopped {
            let _ = shutdown_tx.send(true);
            if let Err(err) = handle.await {
                warn!("health monitor task panicked: {err}");
            }
            info!("health monitor stopped");
        }
    }

    /// Whether a provider's last check succeeded
    ///
    /// Providers never checked report unhealthy until their first
    /// check completes.
    pub fn is_healthy(&self, method: ProviderMethod) -> bool {
        self.records
            .lock()
            .get(&method)
            .is_some_and(HealthRecord::is_healthy)
    }

    /// Methods whose last check succeeded
    pub fn healthy_providers(&self) -> Vec<ProviderMethod> {
        let mut healthy: Vec<ProviderMethod> = self
            .records
            .lock()
            .iter()
            .filter(|(_, record)| record.is_healthy())
            .map(|(method, _)| *method)
            .collect();
        healthy.sort();
        healthy
    }

    /// Snapshot of every provider's health record
    pub fn all_status(&self) -> HashMap<ProviderMethod, HealthRecord> {
        self.records.lock().clone()
    }
}
