//! Mock providers with scripted behavior

use async_trait::async_trait;
use modelgate::core::providers::{ChunkStream, ModelProvider};
use modelgate::core::types::common::{
    EmbeddingResult, GenerateOptions, GenerationResult, ProviderMethod, StreamChunk, TokenUsage,
};
use modelgate::core::types::health::HealthStatus;
use modelgate::utils::error::{classify, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Behavior for one mock call
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Succeed with this content
    Succeed(String),
    /// Fail with this raw error text
    Fail(String),
    /// Sleep past any reasonable deadline, then succeed
    TimeOut,
}

/// Scriptable provider for integration tests
///
/// Calls consume the script front to back; an exhausted script means
/// success. Health checks follow their own script the same way.
pub struct MockProvider {
    method: ProviderMethod,
    behaviors: Mutex<VecDeque<Behavior>>,
    health: Mutex<VecDeque<bool>>,
    invocations: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_system_prompt: Mutex<Option<Option<String>>>,
}

impl MockProvider {
    pub fn healthy(method: ProviderMethod) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            method,
            behaviors: Mutex::new(VecDeque::new()),
            health: Mutex::new(VecDeque::new()),
            invocations: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_system_prompt: Mutex::new(None),
        })
    }

    pub fn scripted(method: ProviderMethod, behaviors: Vec<Behavior>) -> std::sync::Arc<Self> {
        let provider = Self::healthy(method);
        *provider.behaviors.lock().unwrap() = behaviors.into();
        provider
    }

    /// Provider that times out on every call
    pub fn always_timing_out(method: ProviderMethod) -> std::sync::Arc<Self> {
        Self::scripted(method, vec![Behavior::TimeOut; 16])
    }

    /// Provider that fails every call with `error`
    pub fn always_failing(method: ProviderMethod, error: &str) -> std::sync::Arc<Self> {
        Self::scripted(method, vec![Behavior::Fail(error.to_string()); 16])
    }

    pub fn push_health(&self, available: bool) {
        self.health.lock().unwrap().push_back(available);
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Prompt seen by the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    /// System prompt seen by the most recent call
    pub fn last_system_prompt(&self) -> Option<Option<String>> {
        self.last_system_prompt.lock().unwrap().clone()
    }

    async fn run_behavior(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_system_prompt.lock().unwrap() = Some(system_prompt.map(str::to_string));
        let behavior = self.behaviors.lock().unwrap().pop_front();
        match behavior {
            Some(Behavior::Succeed(content)) => Ok(content),
            Some(Behavior::Fail(text)) => Err(classify(&text)),
            Some(Behavior::TimeOut) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".to_string())
            }
            None => Ok(format!("echo: {prompt}")),
        }
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn method(&self) -> ProviderMethod {
        self.method
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerateOptions,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<GenerationResult> {
        let content = self.run_behavior(prompt, system_prompt).await?;
        Ok(GenerationResult {
            content,
            usage: TokenUsage {
                prompt_tokens: 2,
                completion_tokens: 2,
                total_tokens: 4,
            },
            model: model.unwrap_or("mock-1").to_string(),
            provider: self.method,
            latency_ms: 0,
            finish_reason: Some("stop".to_string()),
            metadata: Default::default(),
            cached: false,
        })
    }

    async fn stream_generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<ChunkStream> {
        let result = self.generate(prompt, options, model, system_prompt).await?;
        let stream = async_stream::stream! {
            for part in result.content.split_inclusive(' ') {
                yield Ok(StreamChunk { delta: part.to_string(), finish_reason: None });
            }
            yield Ok(StreamChunk {
                delta: String::new(),
                finish_reason: Some("stop".to_string()),
            });
        };
        Ok(Box::pin(stream))
    }

    async fn embed(&self, text: &str, model: Option<&str>) -> Result<EmbeddingResult> {
        self.run_behavior(text, None).await?;
        Ok(EmbeddingResult {
            vector: vec![0.5; 8],
            model: model.unwrap_or("mock-embed").to_string(),
            provider: self.method,
            dimensions: 8,
            latency_ms: 0,
        })
    }

    async fn health_check(&self) -> HealthStatus {
        let available = self.health.lock().unwrap().pop_front().unwrap_or(true);
        if available {
            HealthStatus::available(self.method, 1, Some("mock-1".to_string()))
        } else {
            HealthStatus::unavailable(self.method, 1, "mock outage".to_string())
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["mock-1".to_string()])
    }
}
