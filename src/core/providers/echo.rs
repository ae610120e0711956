//! Deterministic local provider
//!
//! Backs the `ollama` method out of the box and doubles as the dev/test
//! backend: it returns the prompt back, computes a fixed-size embedding
//! from byte sums, and is always healthy.

use super::{ChunkStream, ModelProvider};
use crate::core::types::common::{
    EmbeddingResult, GenerateOptions, GenerationResult, ProviderMethod, StreamChunk, TokenUsage,
};
use crate::core::types::health::HealthStatus;
use crate::utils::error::Result;
use async_trait::async_trait;

const DEFAULT_MODEL: &str = "echo-1";
const EMBEDDING_DIMENSIONS: usize = 32;

/// Provider that echoes its input
#[derive(Debug, Clone)]
pub struct EchoProvider {
    method: ProviderMethod,
    model: String,
}

impl EchoProvider {
    pub fn new(method: ProviderMethod, model: Option<String>) -> Self {
        Self {
            method,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn resolve_model(&self, model: Option<&str>) -> String {
        model.map(str::to_string).unwrap_or_else(|| self.model.clone())
    }
}

#[async_trait]
impl ModelProvider for EchoProvider {
    fn method(&self) -> ProviderMethod {
        self.method
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<GenerationResult> {
        let mut content = prompt.to_string();
        if let Some(limit) = options.max_tokens {
            let mut end = (limit as usize).min(content.len());
            while !content.is_char_boundary(end) {
                end -= 1;
            }
            content.truncate(end);
        }
        let prompt_tokens =
            (prompt.len() + system_prompt.map_or(0, str::len)) as u32 / 4;
        let completion_tokens = content.len() as u32 / 4;
        Ok(GenerationResult {
            content,
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            model: self.resolve_model(model),
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
        let words: Vec<String> = result
            .content
            .split_inclusive(' ')
            .map(str::to_string)
            .collect();
        let stream = async_stream::stream! {
            for word in words {
                yield Ok(StreamChunk { delta: word, finish_reason: None });
            }
            yield Ok(StreamChunk {
                delta: String::new(),
                finish_reason: Some("stop".to_string()),
            });
        };
        Ok(Box::pin(stream))
    }

    async fn embed(&self, text: &str, model: Option<&str>) -> Result<EmbeddingResult> {
        let mut vector = vec![0.0f32; EMBEDDING_DIMENSIONS];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % EMBEDDING_DIMENSIONS] += f32::from(byte) / 255.0;
        }
        Ok(EmbeddingResult {
            vector,
            model: self.resolve_model(model),
            provider: self.method,
            dimensions: EMBEDDING_DIMENSIONS,
            latency_ms: 0,
        })
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::available(self.method, 0, Some(self.model.clone()))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec![self.model.clone()])
    }
}
