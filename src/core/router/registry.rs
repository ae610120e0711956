//! Tenant-keyed switcher registry
//!
//! An explicit registry object owned by the application's composition
//! root; no ambient global state. The composition root supplies the
//! construction closure so the registry stays ignorant of wiring.

use super::ModelSwitcher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_TENANT: &str = "default";

/// Builds a switcher for one tenant
pub type SwitcherBuilder = Arc<dyn Fn(Option<&str>) -> Arc<ModelSwitcher> + Send + Sync>;

/// Registry of per-tenant switcher instances
pub struct SwitcherRegistry {
    builder: SwitcherBuilder,
    entries: Mutex<HashMap<String, Arc<ModelSwitcher>>>,
}

impl SwitcherRegistry {
    pub fn new(builder: SwitcherBuilder) -> Self {
        Self {
            builder,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(tenant: Option<&str>) -> String {
        tenant.unwrap_or(DEFAULT_TENANT).to_string()
    }

    /// The tenant's switcher, created on first use
    pub fn get_or_create(&self, tenant: Option<&str>) -> Arc<ModelSwitcher> {
        let key = Self::key(tenant);
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return Arc::clone(existing);
        }
        debug!("creating switcher for tenant {key}");
        let switcher = (self.builder)(tenant);
        entries.insert(key, Arc::clone(&switcher));
        switcher
    }

    /// Drop one tenant's switcher
    pub fn remove(&self, tenant: Option<&str>) -> Option<Arc<ModelSwitcher>> {
        self.entries.lock().remove(&Self::key(tenant))
    }

    /// Drop every switcher
    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
