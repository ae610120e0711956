//! Persistence boundaries
//!
//! The router treats all persistence as best-effort collaborators:
//! failures here are logged by the callers, never surfaced to request
//! handling. Durable backends implement these traits; [`MemoryStore`]
//! is the in-process implementation used for composition and tests.

mod memory;

pub use memory::MemoryStore;

use crate::core::types::common::UsageLogEntry;
use crate::core::types::config::RoutingConfig;
use crate::core::types::health::HealthRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Durable store for routing configuration, keyed by tenant
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the config for a tenant; `None` when none was ever saved
    async fn load(&self, tenant: Option<&str>) -> Result<Option<RoutingConfig>>;

    /// Persist the config for a tenant
    async fn save(&self, tenant: Option<&str>, config: &RoutingConfig) -> Result<()>;
}

/// Durable store for provider health records
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn upsert(&self, provider_id: &str, record: &HealthRecord) -> Result<()>;
}

/// Append-only usage log
#[async_trait]
pub trait UsageLog: Send + Sync {
    async fn append(&self, entry: UsageLogEntry) -> Result<()>;
}

/// Shared cache tier (redis-shaped), exchanged as JSON values
#[async_trait]
pub trait SharedCacheTier: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
