//! Core data types for the router

pub mod common;
pub mod config;
pub mod health;

pub use common::{
    EmbeddingResult, GenerateOptions, GenerationResult, ProviderMethod, StreamChunk, TokenUsage,
    UsageEvent, UsageLogEntry,
};
pub use config::{ProviderSettings, RoutingConfig};
pub use health::{AlertEvent, AlertType, HealthRecord, HealthState, HealthStatus};
