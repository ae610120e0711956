//! Scripted provider doubles for unit tests

use crate::core::providers::{ChunkStream, ModelProvider};
use crate::core::types::common::{
    EmbeddingResult, GenerateOptions, GenerationResult, ProviderMethod, StreamChunk, TokenUsage,
};
use crate::core::types::health::HealthStatus;
use crate::utils::error::{classify, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted call outcome
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Succeed with this content
    Ok(String),
    /// Fail with this raw error text (classified like a real failure)
    Fail(String),
    /// Hang for this long before succeeding (trips the call deadline)
    Hang(Duration),
}

/// Provider whose generate/embed/health outcomes follow a script
///
/// When the script runs out, calls succeed with a fixed payload.
pub struct ScriptedProvider {
    method: ProviderMethod,
    script: Mutex<VecDeque<Outcome>>,
    health_script: Mutex<VecDeque<bool>>,
    invocations: AtomicUsize,
    health_checks: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(method: ProviderMethod) -> Self {
        Self {
            method,
            script: Mutex::new(VecDeque::new()),
            health_script: Mutex::new(VecDeque::new()),
            invocations: AtomicUsize::new(0),
            health_checks: AtomicUsize::new(0),
        }
    }

    pub fn with_script(method: ProviderMethod, outcomes: Vec<Outcome>) -> Self {
        let provider = Self::new(method);
        *provider.script.lock() = outcomes.into();
        provider
    }

    /// Provider that fails every call with `error`
    pub fn always_failing(method: ProviderMethod, error: &str) -> Self {
        let provider = Self::new(method);
        provider.set_default_failure(error);
        provider
    }

    pub fn set_default_failure(&self, error: &str) {
        // An empty script falls through to success, so pad generously
        let mut script = self.script.lock();
        script.clear();
        for _ in 0..64 {
            script.push_back(Outcome::Fail(error.to_string()));
        }
    }

    pub fn push_health(&self, available: bool) {
        self.health_script.lock().push_back(available);
    }

    /// Number of generate/embed calls received
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    async fn next_outcome(&self) -> Result<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let outcome = self.script.lock().pop_front();
        match outcome {
            Some(Outcome::Ok(content)) => Ok(content),
            Some(Outcome::Fail(text)) => Err(classify(&text)),
            Some(Outcome::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok("late".to_string())
            }
            None => Ok("scripted response".to_string()),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn method(&self) -> ProviderMethod {
        self.method
    }

    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerateOptions,
        model: Option<&str>,
        _system_prompt: Option<&str>,
    ) -> Result<GenerationResult> {
        let content = self.next_outcome().await?;
        Ok(GenerationResult {
            content,
            usage: TokenUsage::default(),
            model: model.unwrap_or("scripted-1").to_string(),
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
            yield Ok(StreamChunk { delta: result.content, finish_reason: None });
            yield Ok(StreamChunk {
                delta: String::new(),
                finish_reason: Some("stop".to_string()),
            });
        };
        Ok(Box::pin(stream))
    }

    async fn embed(&self, _text: &str, model: Option<&str>) -> Result<EmbeddingResult> {
        self.next_outcome().await?;
        Ok(EmbeddingResult {
            vector: vec![0.0; 4],
            model: model.unwrap_or("scripted-embed").to_string(),
            provider: self.method,
            dimensions: 4,
            latency_ms: 0,
        })
    }

    async fn health_check(&self) -> HealthStatus {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        let available = self.health_script.lock().pop_front().unwrap_or(true);
        if available {
            HealthStatus::available(self.method, 1, None)
        } else {
            HealthStatus::unavailable(self.method, 1, "scripted failure".to_string())
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["scripted-1".to_string()])
    }
}
