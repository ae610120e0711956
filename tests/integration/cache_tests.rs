//! Response caching across the public surface

use crate::common::providers::MockProvider;
use crate::common::{gateway, routing_config};
use modelgate::core::router::GenerateRequest;
use modelgate::core::types::common::GenerateOptions;
use modelgate::core::types::ProviderMethod;
use tokio_stream::StreamExt;

#[tokio::test]
async fn test_streaming_and_plain_requests_share_one_entry() {
    let provider = MockProvider::healthy(ProviderMethod::OpenAi);
    let gw = gateway(
        vec![provider.clone()],
        routing_config(ProviderMethod::OpenAi, None, &[ProviderMethod::OpenAi]),
    )
    .await;

    // Plain call populates the cache
    let plain = gw
        .switcher
        .generate(GenerateRequest::new("shared"))
        .await
        .unwrap();

    // The streaming rendition of the same request replays the entry
    let streaming = GenerateRequest::new("shared").with_options(GenerateOptions {
        stream: true,
        ..Default::default()
    });
    let mut stream = gw.switcher.stream_generate(streaming).await.unwrap();
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk.unwrap().delta);
    }

    assert_eq!(text, plain.content);
    assert_eq!(provider.invocations(), 1);
}

#[tokio::test]
async fn test_tenant_isolation_in_cache_keys() {
    let provider = MockProvider::healthy(ProviderMethod::OpenAi);
    let gw = gateway(
        vec![provider.clone()],
        routing_config(ProviderMethod::OpenAi, None, &[ProviderMethod::OpenAi]),
    )
    .await;

    gw.switcher
        .generate(GenerateRequest::new("same words").with_tenant("tenant-a"))
        .await
        .unwrap();
    let other = gw
        .switcher
        .generate(GenerateRequest::new("same words").with_tenant("tenant-b"))
        .await
        .unwrap();

    assert!(!other.cached);
    assert_eq!(provider.invocations(), 2);
}

#[tokio::test]
async fn test_option_changes_invalidate_the_fingerprint() {
    let provider = MockProvider::healthy(ProviderMethod::OpenAi);
    let gw = gateway(
        vec![provider.clone()],
        routing_config(ProviderMethod::OpenAi, None, &[ProviderMethod::OpenAi]),
    )
    .await;

    gw.switcher
        .generate(GenerateRequest::new("tunable"))
        .await
        .unwrap();
    let warmer = gw
        .switcher
        .generate(
            GenerateRequest::new("tunable").with_options(GenerateOptions {
                temperature: Some(1.2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert!(!warmer.cached);
    assert_eq!(provider.invocations(), 2);
}
