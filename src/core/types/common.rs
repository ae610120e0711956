//! Request, response, and usage types shared across the router

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier for a backend provider variant
///
/// Stable and comparable; used as a map key in routing configuration,
/// usage counters, and health status maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMethod {
    /// Locally hosted models (no API key required)
    Ollama,
    OpenAi,
    Anthropic,
    Deepseek,
    Qwen,
    Zhipu,
    Moonshot,
}

impl ProviderMethod {
    /// All known provider methods
    pub const ALL: [ProviderMethod; 7] = [
        ProviderMethod::Ollama,
        ProviderMethod::OpenAi,
        ProviderMethod::Anthropic,
        ProviderMethod::Deepseek,
        ProviderMethod::Qwen,
        ProviderMethod::Zhipu,
        ProviderMethod::Moonshot,
    ];

    /// Stable string form, used for logging and persistence keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMethod::Ollama => "ollama",
            ProviderMethod::OpenAi => "openai",
            ProviderMethod::Anthropic => "anthropic",
            ProviderMethod::Deepseek => "deepseek",
            ProviderMethod::Qwen => "qwen",
            ProviderMethod::Zhipu => "zhipu",
            ProviderMethod::Moonshot => "moonshot",
        }
    }

    /// Whether this method talks to a locally hosted runtime
    ///
    /// Local methods need no API key during configuration validation.
    pub fn is_local(&self) -> bool {
        matches!(self, ProviderMethod::Ollama)
    }
}

impl fmt::Display for ProviderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(ProviderMethod::Ollama),
            "openai" => Ok(ProviderMethod::OpenAi),
            "anthropic" => Ok(ProviderMethod::Anthropic),
            "deepseek" => Ok(ProviderMethod::Deepseek),
            "qwen" => Ok(ProviderMethod::Qwen),
            "zhipu" => Ok(ProviderMethod::Zhipu),
            "moonshot" => Ok(ProviderMethod::Moonshot),
            other => Err(format!("unknown provider method: {other}")),
        }
    }
}

/// Generation parameters for a single call
///
/// Immutable per call. The `stream` flag selects delivery only and is
/// excluded from the cache fingerprint, so streaming and non-streaming
/// renditions of the same request share a cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    #[serde(default)]
    pub stream: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
            presence_penalty: None,
            frequency_penalty: None,
            stream: false,
        }
    }
}

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of a generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub usage: TokenUsage,
    pub model: String,
    pub provider: ProviderMethod,
    /// Backfilled by the router just before returning
    pub latency_ms: u64,
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// True only when replayed from the response cache
    #[serde(default)]
    pub cached: bool,
}

/// Result of an embedding call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub vector: Vec<f32>,
    pub model: String,
    pub provider: ProviderMethod,
    pub dimensions: usize,
    pub latency_ms: u64,
}

/// One chunk of a streamed generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub delta: String,
    pub finish_reason: Option<String>,
}

/// Outcome kind for a usage-log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEvent {
    Success,
    Timeout,
    Failure,
}

/// Append-only usage record handed to the persistence boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLogEntry {
    pub id: Uuid,
    pub method: ProviderMethod,
    pub model: Option<String>,
    pub event: UsageEvent,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl UsageLogEntry {
    pub fn new(
        method: ProviderMethod,
        model: Option<String>,
        event: UsageEvent,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            model,
            event,
            latency_ms,
            timestamp: Utc::now(),
        }
    }
}
