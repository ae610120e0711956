//! Shared test infrastructure

pub mod providers;

use modelgate::config::{ConfigCache, ConfigCacheSettings};
use modelgate::core::health::{HealthMonitor, HealthMonitorConfig};
use modelgate::core::metrics::{CountingSink, MetricsSink};
use modelgate::core::providers::{ModelProvider, ProviderFactory};
use modelgate::core::response_cache::{ResponseCache, ResponseCacheConfig};
use modelgate::core::router::ModelSwitcher;
use modelgate::core::types::config::{ProviderSettings, RoutingConfig};
use modelgate::core::types::ProviderMethod;
use modelgate::storage::{ConfigStore, HealthStore, MemoryStore, UsageLog};
use providers::MockProvider;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install the test log subscriber once per binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fully wired switcher plus the collaborators tests inspect
pub struct TestGateway {
    pub switcher: Arc<ModelSwitcher>,
    pub monitor: Arc<HealthMonitor>,
    pub config_cache: Arc<ConfigCache>,
    pub store: Arc<MemoryStore>,
    pub metrics: Arc<CountingSink>,
}

/// Routing config enabling exactly the given methods
pub fn routing_config(
    default_method: ProviderMethod,
    fallback: Option<ProviderMethod>,
    enabled: &[ProviderMethod],
) -> RoutingConfig {
    let mut config = RoutingConfig {
        default_method,
        fallback_method: fallback,
        enabled_methods: enabled.iter().copied().collect::<BTreeSet<_>>(),
        settings: Default::default(),
    };
    for method in enabled {
        if !method.is_local() {
            config.settings.insert(
                *method,
                ProviderSettings {
                    api_key: Some("sk-test".to_string()),
                    ..Default::default()
                },
            );
        }
    }
    config
}

/// Wire a gateway around mock providers and initialize it
pub async fn gateway(providers: Vec<Arc<MockProvider>>, config: RoutingConfig) -> TestGateway {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    store.save(None, &config).await.expect("config saved");

    let mut factory = ProviderFactory::new();
    for provider in providers {
        let shared = Arc::clone(&provider);
        factory.register(provider.method(), move |_settings: &ProviderSettings| {
            Arc::clone(&shared) as Arc<dyn ModelProvider>
        });
    }

    let metrics = Arc::new(CountingSink::new());
    let config_cache = Arc::new(ConfigCache::new(
        ConfigCacheSettings::default(),
        store.clone(),
        None,
    ));
    let response_cache = Arc::new(ResponseCache::new(ResponseCacheConfig::default(), None));
    let monitor = Arc::new(HealthMonitor::new(
        HealthMonitorConfig::default(),
        Some(store.clone() as Arc<dyn HealthStore>),
        Some(metrics.clone() as Arc<dyn MetricsSink>),
    ));

    let switcher = ModelSwitcher::new(
        None,
        factory,
        Arc::clone(&config_cache),
        response_cache,
        None,
        Some(metrics.clone() as Arc<dyn MetricsSink>),
        Some(store.clone() as Arc<dyn UsageLog>),
        Some(Arc::clone(&monitor)),
    );
    switcher.initialize().await.expect("switcher initialized");

    TestGateway {
        switcher,
        monitor,
        config_cache,
        store,
        metrics,
    }
}
