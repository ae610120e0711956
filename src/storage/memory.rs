//! In-memory persistence
//!
//! Implements every storage boundary over tokio-guarded maps. Used as
//! the default backend in composition and throughout the test suites.

use super::{ConfigStore, HealthStore, SharedCacheTier, UsageLog};
use crate::core::types::common::UsageLogEntry;
use crate::core::types::config::RoutingConfig;
use crate::core::types::health::HealthRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const DEFAULT_TENANT: &str = "default";

#[derive(Debug)]
struct SharedEntry {
    value: serde_json::Value,
    stored_at: Instant,
    ttl: Duration,
}

/// In-memory implementation of all persistence boundaries
#[derive(Debug, Default)]
pub struct MemoryStore {
    configs: RwLock<HashMap<String, RoutingConfig>>,
    health: RwLock<HashMap<String, HealthRecord>>,
    usage: RwLock<Vec<UsageLogEntry>>,
    shared: RwLock<HashMap<String, SharedEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant_key(tenant: Option<&str>) -> String {
        tenant.unwrap_or(DEFAULT_TENANT).to_string()
    }

    /// All usage entries appended so far (test/inspection surface)
    pub async fn usage_entries(&self) -> Vec<UsageLogEntry> {
        self.usage.read().await.clone()
    }

    /// Persisted health record for a provider (test/inspection surface)
    pub async fn health_record(&self, provider_id: &str) -> Option<HealthRecord> {
        self.health.read().await.get(provider_id).cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self, tenant: Option<&str>) -> Result<Option<RoutingConfig>> {
        Ok(self
            .configs
            .read()
            .await
            .get(&Self::tenant_key(tenant))
            .cloned())
    }

    async fn save(&self, tenant: Option<&str>, config: &RoutingConfig) -> Result<()> {
        self.configs
            .write()
            .await
            .insert(Self::tenant_key(tenant), config.clone());
        Ok(())
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn upsert(&self, provider_id: &str, record: &HealthRecord) -> Result<()> {
        self.health
            .write()
            .await
            .insert(provider_id.to_string(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl UsageLog for MemoryStore {
    async fn append(&self, entry: UsageLogEntry) -> Result<()> {
        self.usage.write().await.push(entry);
        Ok(())
    }
}

#[async_trait]
impl SharedCacheTier for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let mut shared = self.shared.write().await;
        if let Some(entry) = shared.get(key) {
            if entry.stored_at.elapsed() >= entry.ttl {
                shared.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) -> Result<()> {
        self.shared.write().await.insert(
            key.to_string(),
            SharedEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.shared.write().await.remove(key);
        Ok(())
    }
}
