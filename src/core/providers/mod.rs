//! Provider boundary
//!
//! The router never inspects wire formats; each backend sits behind the
//! [`ModelProvider`] capability interface. Concrete translators live
//! outside this crate and are supplied to the factory by the
//! application's composition root.

mod echo;
mod factory;

pub use echo::EchoProvider;
pub use factory::{ProviderBuilder, ProviderFactory};

use crate::core::types::common::{
    EmbeddingResult, GenerateOptions, GenerationResult, StreamChunk,
};
use crate::core::types::health::HealthStatus;
use crate::core::types::ProviderMethod;
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// One-shot, finite stream of generation chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Capability interface every backend implements
///
/// All I/O happens behind these methods; the router composes them with
/// retry, failover, caching, and accounting.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// The method this instance serves
    fn method(&self) -> ProviderMethod;

    /// Produce a completion for `prompt`
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<GenerationResult>;

    /// Produce a lazy chunk stream for `prompt`
    async fn stream_generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<ChunkStream>;

    /// Embed a single text
    async fn embed(&self, text: &str, model: Option<&str>) -> Result<EmbeddingResult>;

    /// Probe backend availability
    ///
    /// Returns a snapshot; implementations report failures through the
    /// `available`/`error` fields rather than an `Err`.
    async fn health_check(&self) -> HealthStatus;

    /// Models this backend currently serves
    async fn list_models(&self) -> Result<Vec<String>>;
}
