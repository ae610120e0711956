//! Health monitoring through the public surface

use crate::common::providers::MockProvider;
use crate::common::{gateway, routing_config};
use modelgate::core::types::health::AlertType;
use modelgate::core::types::ProviderMethod;
use std::sync::Arc;
use std::sync::Mutex;

#[tokio::test]
async fn test_outage_and_recovery_alert_exactly_once_each() {
    let provider = MockProvider::healthy(ProviderMethod::OpenAi);
    provider.push_health(true);
    provider.push_health(false);
    provider.push_health(false);
    provider.push_health(true);

    let gw = gateway(
        vec![provider],
        routing_config(ProviderMethod::OpenAi, None, &[ProviderMethod::OpenAi]),
    )
    .await;

    let alerts: Arc<Mutex<Vec<AlertType>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = alerts.clone();
    gw.monitor.register_alert_callback(Arc::new(move |alert| {
        seen.lock().unwrap().push(alert.alert_type);
    }));

    for _ in 0..4 {
        gw.monitor.force_check(Some(ProviderMethod::OpenAi)).await;
    }

    assert_eq!(
        *alerts.lock().unwrap(),
        vec![AlertType::Unhealthy, AlertType::Recovered]
    );
    let record = &gw.monitor.all_status()[&ProviderMethod::OpenAi];
    assert_eq!(record.consecutive_failures, 0);
    assert!(record.is_healthy());
}

#[tokio::test]
async fn test_health_records_are_persisted() {
    let provider = MockProvider::healthy(ProviderMethod::OpenAi);
    provider.push_health(false);
    let gw = gateway(
        vec![provider],
        routing_config(ProviderMethod::OpenAi, None, &[ProviderMethod::OpenAi]),
    )
    .await;

    gw.monitor.force_check(None).await;

    let persisted = gw.store.health_record("openai").await.unwrap();
    assert!(!persisted.is_healthy());
    assert_eq!(persisted.consecutive_failures, 1);
    assert_eq!(persisted.last_error.as_deref(), Some("mock outage"));
}

#[tokio::test]
async fn test_health_checks_feed_the_metrics_sink() {
    let provider = MockProvider::healthy(ProviderMethod::OpenAi);
    provider.push_health(false);
    provider.push_health(true);
    let gw = gateway(
        vec![provider],
        routing_config(ProviderMethod::OpenAi, None, &[ProviderMethod::OpenAi]),
    )
    .await;

    gw.monitor.force_check(None).await;
    gw.monitor.force_check(None).await;

    assert_eq!(gw.metrics.failures(), 1);
    assert_eq!(gw.metrics.successes(), 1);
}

#[tokio::test]
async fn test_healthy_provider_listing() {
    let good = MockProvider::healthy(ProviderMethod::OpenAi);
    let bad = MockProvider::healthy(ProviderMethod::Anthropic);
    bad.push_health(false);
    let gw = gateway(
        vec![good, bad],
        routing_config(
            ProviderMethod::OpenAi,
            None,
            &[ProviderMethod::OpenAi, ProviderMethod::Anthropic],
        ),
    )
    .await;

    gw.monitor.force_check(None).await;

    assert_eq!(gw.monitor.healthy_providers(), vec![ProviderMethod::OpenAi]);
    assert!(gw.monitor.is_healthy(ProviderMethod::OpenAi));
    assert!(!gw.monitor.is_healthy(ProviderMethod::Anthropic));
}
