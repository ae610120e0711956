//! Router orchestration
//!
//! [`ModelSwitcher`] consumes the config cache, the provider factory,
//! the response cache, and the optional rate-limiter/metrics/usage-log
//! collaborators, and executes generate/stream/embed with retry,
//! failover, and usage accounting.

use super::retry::{self, RetryContext};
use crate::config::ConfigCache;
use crate::core::metrics::MetricsSink;
use crate::core::providers::{ChunkStream, ModelProvider, ProviderFactory};
use crate::core::rate_limiter::RateLimiter;
use crate::core::response_cache::{Fingerprint, ResponseCache};
use crate::core::types::common::{
    EmbeddingResult, GenerateOptions, GenerationResult, ProviderMethod, StreamChunk, UsageEvent,
    UsageLogEntry,
};
use crate::core::types::config::RoutingConfig;
use crate::core::health::HealthMonitor;
use crate::storage::UsageLog;
use crate::utils::error::{Result, SwitchError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub options: GenerateOptions,
    pub method: Option<ProviderMethod>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub tenant: Option<String>,
    pub use_cache: bool,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: GenerateOptions::default(),
            method: None,
            model: None,
            system_prompt: None,
            tenant: None,
            use_cache: true,
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_method(mut self, method: ProviderMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    fn fingerprint(&self, method: ProviderMethod) -> Fingerprint {
        Fingerprint::compute(
            &self.prompt,
            method,
            self.model.as_deref(),
            self.system_prompt.as_deref(),
            self.tenant.as_deref(),
            &self.options,
        )
    }
}

struct SwitcherState {
    initialized: bool,
    config: RoutingConfig,
    providers: HashMap<ProviderMethod, Arc<dyn ModelProvider>>,
    current: ProviderMethod,
    fallback: Option<ProviderMethod>,
}

/// Multi-provider inference request router
pub struct ModelSwitcher {
    tenant: Option<String>,
    factory: ProviderFactory,
    config_cache: Arc<ConfigCache>,
    response_cache: Arc<ResponseCache>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    usage_log: Option<Arc<dyn UsageLog>>,
    health_monitor: Option<Arc<HealthMonitor>>,
    state: Mutex<SwitcherState>,
    usage: Mutex<HashMap<ProviderMethod, u64>>,
}

impl ModelSwitcher {
    /// Create a switcher wired to its collaborators
    ///
    /// Registers a config watcher so a saved or hot-reloaded
    /// configuration for this switcher's tenant rebuilds the provider
    /// set before the save call returns.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant: Option<String>,
        factory: ProviderFactory,
        config_cache: Arc<ConfigCache>,
        response_cache: Arc<ResponseCache>,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
        metrics: Option<Arc<dyn MetricsSink>>,
        usage_log: Option<Arc<dyn UsageLog>>,
        health_monitor: Option<Arc<HealthMonitor>>,
    ) -> Arc<Self> {
        let switcher = Arc::new(Self {
            tenant,
            factory,
            config_cache: Arc::clone(&config_cache),
            response_cache,
            rate_limiter,
            metrics,
            usage_log,
            health_monitor,
            state: Mutex::new(SwitcherState {
                initialized: false,
                config: RoutingConfig::default(),
                providers: HashMap::new(),
                current: RoutingConfig::default().default_method,
                fallback: None,
            }),
            usage: Mutex::new(HashMap::new()),
        });

        let weak: Weak<ModelSwitcher> = Arc::downgrade(&switcher);
        let own_tenant = switcher.tenant.clone();
        config_cache.register_watcher(Arc::new(
            move |tenant: Option<&str>, config: &RoutingConfig| {
                // Changes to other tenants' configs are not ours
                if tenant != own_tenant.as_deref() {
                    return;
                }
                if let Some(switcher) = weak.upgrade() {
                    switcher.apply_config(config.clone());
                }
            },
        ));

        switcher
    }

    /// Load the routing config and instantiate the provider set
    ///
    /// Idempotent; subsequent calls are no-ops.
    pub async fn initialize(&self) -> Result<()> {
        if self.state.lock().initialized {
            return Ok(());
        }
        let config = self
            .config_cache
            .get_config(self.tenant.as_deref(), true)
            .await;
        self.apply_config(config);
        self.state.lock().initialized = true;
        info!("model switcher initialized");
        Ok(())
    }

    /// Rebuild the provider set wholesale from a configuration
    fn apply_config(&self, config: RoutingConfig) {
        let mut providers: HashMap<ProviderMethod, Arc<dyn ModelProvider>> = HashMap::new();
        for method in &config.enabled_methods {
            let settings = config.settings_for(*method);
            match self.factory.build(*method, &settings) {
                Ok(provider) => {
                    providers.insert(*method, provider);
                }
                Err(err) => warn!("enabled method {} not instantiated: {err}", method),
            }
        }

        if let Some(monitor) = &self.health_monitor {
            monitor.set_providers(providers.clone());
        }

        let mut state = self.state.lock();
        state.current = config.default_method;
        state.fallback = config.fallback_method;
        state.providers = providers;
        state.config = config;
        debug!(
            "provider set rebuilt: {:?}",
            state.providers.keys().collect::<Vec<_>>()
        );
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.state.lock().initialized {
            Ok(())
        } else {
            Err(SwitchError::Config(
                "switcher is not initialized".to_string(),
            ))
        }
    }

    fn provider(&self, method: ProviderMethod) -> Result<Arc<dyn ModelProvider>> {
        self.state
            .lock()
            .providers
            .get(&method)
            .cloned()
            .ok_or_else(|| {
                SwitchError::ProviderNotAvailable(format!(
                    "provider {method} is not configured"
                ))
            })
    }

    fn resolve_target(&self, explicit: Option<ProviderMethod>) -> ProviderMethod {
        explicit.unwrap_or_else(|| self.state.lock().current)
    }

    fn resolve_fallback(&self, target: ProviderMethod) -> Option<ProviderMethod> {
        self.state
            .lock()
            .fallback
            .filter(|fallback| *fallback != target)
    }

    fn call_timeout(&self, method: ProviderMethod) -> Duration {
        Duration::from_secs(self.state.lock().config.settings_for(method).timeout_secs)
    }

    fn retry_context(&self, method: ProviderMethod, model: Option<String>) -> RetryContext {
        RetryContext {
            method,
            model,
            call_timeout: self.call_timeout(method),
            rate_limiter: self.rate_limiter.clone(),
            usage_log: self.usage_log.clone(),
        }
    }

    fn record_usage(&self, method: ProviderMethod) {
        *self.usage.lock().entry(method).or_insert(0) += 1;
    }

    fn observe(&self, name: &str, success: bool, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.observe(name, success, started.elapsed());
        }
    }

    async fn log_usage(&self, method: ProviderMethod, event: UsageEvent, latency_ms: u64) {
        if let Some(log) = &self.usage_log {
            let entry = UsageLogEntry::new(method, None, event, latency_ms);
            if let Err(err) = log.append(entry).await {
                warn!("usage log append failed: {err}");
            }
        }
    }

    async fn generate_via(
        &self,
        method: ProviderMethod,
        request: &GenerateRequest,
    ) -> Result<GenerationResult> {
        let provider = self.provider(method)?;
        let ctx = self.retry_context(method, request.model.clone());
        let request = request.clone();
        retry::run(&ctx, || {
            let provider = Arc::clone(&provider);
            let request = request.clone();
            async move {
                provider
                    .generate(
                        &request.prompt,
                        &request.options,
                        request.model.as_deref(),
                        request.system_prompt.as_deref(),
                    )
                    .await
            }
        })
        .await
    }

    /// Execute one generation request
    ///
    /// Cache hit short-circuits with `cached = true` and no provider
    /// call; otherwise the target provider gets the full retry budget,
    /// then the configured fallback gets the same original request,
    /// and only double exhaustion surfaces an error.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerationResult> {
        self.ensure_initialized()?;
        let started = Instant::now();
        let target = self.resolve_target(request.method);
        let fingerprint = request.fingerprint(target);

        if request.use_cache {
            if let Some(hit) = self.response_cache.get(&fingerprint).await {
                debug!("cache hit for {} via {}", fingerprint, target);
                return Ok(hit);
            }
        }

        let primary_error = match self.generate_via(target, &request).await {
            Ok(mut result) => {
                result.latency_ms = started.elapsed().as_millis() as u64;
                self.record_usage(target);
                self.response_cache.set(&fingerprint, &result).await?;
                self.log_usage(target, UsageEvent::Success, result.latency_ms)
                    .await;
                self.observe("generate", true, started);
                return Ok(result);
            }
            Err(err) => err,
        };

        if let Some(fallback) = self.resolve_fallback(target) {
            warn!(
                "provider {} exhausted, failing over to {}: {primary_error}",
                target, fallback
            );
            match self.generate_via(fallback, &request).await {
                Ok(mut result) => {
                    result.latency_ms = started.elapsed().as_millis() as u64;
                    self.record_usage(fallback);
                    self.response_cache.set(&fingerprint, &result).await?;
                    self.log_usage(fallback, UsageEvent::Success, result.latency_ms)
                        .await;
                    self.observe("generate", true, started);
                    return Ok(result);
                }
                Err(fallback_error) => {
                    self.log_usage(target, UsageEvent::Failure, started.elapsed().as_millis() as u64)
                        .await;
                    self.observe("generate", false, started);
                    return Err(SwitchError::BothProvidersFailed {
                        primary: target,
                        primary_error: primary_error.to_string(),
                        fallback,
                        fallback_error: fallback_error.to_string(),
                        suggestions: failure_suggestions(),
                    });
                }
            }
        }

        self.log_usage(target, UsageEvent::Failure, started.elapsed().as_millis() as u64)
            .await;
        self.observe("generate", false, started);
        Err(primary_error)
    }

    async fn stream_via(
        &self,
        method: ProviderMethod,
        request: &GenerateRequest,
    ) -> Result<ChunkStream> {
        let provider = self.provider(method)?;
        let ctx = self.retry_context(method, request.model.clone());
        let request = request.clone();
        retry::run(&ctx, || {
            let provider = Arc::clone(&provider);
            let request = request.clone();
            async move {
                provider
                    .stream_generate(
                        &request.prompt,
                        &request.options,
                        request.model.as_deref(),
                        request.system_prompt.as_deref(),
                    )
                    .await
            }
        })
        .await
    }

    /// Execute one streaming generation request
    ///
    /// Retry and failover apply only to obtaining the stream; once the
    /// first chunk is yielded, the call is committed and a later
    /// failure propagates to the caller as a terminal error. The
    /// returned stream is lazy, finite, and one-shot.
    pub async fn stream_generate(&self, request: GenerateRequest) -> Result<ChunkStream> {
        self.ensure_initialized()?;
        let target = self.resolve_target(request.method);
        let fingerprint = request.fingerprint(target);

        if request.use_cache {
            if let Some(hit) = self.response_cache.get(&fingerprint).await {
                debug!("cache hit for stream {} via {}", fingerprint, target);
                let stream = async_stream::stream! {
                    yield Ok(StreamChunk {
                        delta: hit.content,
                        finish_reason: hit.finish_reason,
                    });
                };
                return Ok(Box::pin(stream) as ChunkStream);
            }
        }

        let (method, stream) = match self.stream_via(target, &request).await {
            Ok(stream) => (target, stream),
            Err(primary_error) => {
                let Some(fallback) = self.resolve_fallback(target) else {
                    return Err(primary_error);
                };
                warn!(
                    "provider {} exhausted before streaming, failing over to {}: {primary_error}",
                    target, fallback
                );
                match self.stream_via(fallback, &request).await {
                    Ok(stream) => (fallback, stream),
                    Err(fallback_error) => {
                        return Err(SwitchError::BothProvidersFailed {
                            primary: target,
                            primary_error: primary_error.to_string(),
                            fallback,
                            fallback_error: fallback_error.to_string(),
                            suggestions: failure_suggestions(),
                        });
                    }
                }
            }
        };

        self.record_usage(method);
        Ok(stream)
    }

    /// Execute one embedding request; same retry/failover shape as
    /// generate, without caching
    pub async fn embed(
        &self,
        text: &str,
        method: Option<ProviderMethod>,
        model: Option<&str>,
    ) -> Result<EmbeddingResult> {
        self.ensure_initialized()?;
        let started = Instant::now();
        let target = self.resolve_target(method);

        let embed_via = |method: ProviderMethod| async move {
            let provider = self.provider(method)?;
            let ctx = self.retry_context(method, model.map(str::to_string));
            let text = text.to_string();
            let model = model.map(str::to_string);
            retry::run(&ctx, || {
                let provider = Arc::clone(&provider);
                let text = text.clone();
                let model = model.clone();
                async move { provider.embed(&text, model.as_deref()).await }
            })
            .await
        };

        let primary_error = match embed_via(target).await {
            Ok(mut result) => {
                result.latency_ms = started.elapsed().as_millis() as u64;
                self.record_usage(target);
                self.observe("embed", true, started);
                return Ok(result);
            }
            Err(err) => err,
        };

        if let Some(fallback) = self.resolve_fallback(target) {
            warn!(
                "provider {} exhausted, embedding via {}: {primary_error}",
                target, fallback
            );
            match embed_via(fallback).await {
                Ok(mut result) => {
                    result.latency_ms = started.elapsed().as_millis() as u64;
                    self.record_usage(fallback);
                    self.observe("embed", true, started);
                    return Ok(result);
                }
                Err(fallback_error) => {
                    self.observe("embed", false, started);
                    return Err(SwitchError::BothProvidersFailed {
                        primary: target,
                        primary_error: primary_error.to_string(),
                        fallback,
                        fallback_error: fallback_error.to_string(),
                        suggestions: failure_suggestions(),
                    });
                }
            }
        }

        self.observe("embed", false, started);
        Err(primary_error)
    }

    /// Set the fallback provider
    ///
    /// The method must be enabled and instantiated. An unhealthy probe
    /// result is a warning, not an error; the fallback is always set.
    pub async fn set_fallback_provider(&self, method: ProviderMethod) -> Result<()> {
        self.ensure_initialized()?;
        let provider = self.provider(method)?;

        let status = provider.health_check().await;
        if !status.available {
            warn!(
                "fallback provider {} reports unhealthy: {}",
                method,
                status.error.as_deref().unwrap_or("unknown")
            );
        }

        self.state.lock().fallback = Some(method);
        info!("fallback provider set to {method}");
        Ok(())
    }

    /// Switch the current method unconditionally (if configured)
    pub fn switch_method(&self, method: ProviderMethod) -> Result<()> {
        self.ensure_initialized()?;
        let mut state = self.state.lock();
        if !state.providers.contains_key(&method) {
            return Err(SwitchError::ProviderNotAvailable(format!(
                "provider {method} is not configured"
            )));
        }
        state.current = method;
        info!("current method switched to {method}");
        Ok(())
    }

    /// Switch the current method after a successful health probe
    pub async fn switch_method_validated(&self, method: ProviderMethod) -> Result<()> {
        self.ensure_initialized()?;
        let provider = self.provider(method)?;
        let status = provider.health_check().await;
        if !status.available {
            return Err(SwitchError::ServiceUnavailable(format!(
                "provider {method} failed its health probe: {}",
                status.error.as_deref().unwrap_or("unknown")
            )));
        }
        self.state.lock().current = method;
        info!("current method switched to {method} (validated)");
        Ok(())
    }

    /// Snapshot of per-provider usage counts
    pub fn usage_stats(&self) -> HashMap<ProviderMethod, u64> {
        self.usage.lock().clone()
    }

    /// Configured (instantiated) methods, sorted
    pub fn list_methods(&self) -> Vec<ProviderMethod> {
        let mut methods: Vec<ProviderMethod> =
            self.state.lock().providers.keys().copied().collect();
        methods.sort();
        methods
    }

    pub fn current_method(&self) -> ProviderMethod {
        self.state.lock().current
    }

    pub fn fallback_method(&self) -> Option<ProviderMethod> {
        self.state.lock().fallback
    }
}

fn failure_suggestions() -> Vec<String> {
    vec![
        "Check provider credentials in the routing configuration".to_string(),
        "Check network connectivity to the providers".to_string(),
        "Check provider health status and recent alerts".to_string(),
    ]
}
