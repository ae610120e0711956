//! Routing configuration types

use super::common::ProviderMethod;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Credential for cloud providers; local methods leave it empty
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Active routing configuration
///
/// Value equality drives the config watcher's change detection, so the
/// collections are ordered maps rather than hash maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub default_method: ProviderMethod,
    pub fallback_method: Option<ProviderMethod>,
    pub enabled_methods: BTreeSet<ProviderMethod>,
    #[serde(default)]
    pub settings: BTreeMap<ProviderMethod, ProviderSettings>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let mut enabled = BTreeSet::new();
        enabled.insert(ProviderMethod::Ollama);
        Self {
            default_method: ProviderMethod::Ollama,
            fallback_method: None,
            enabled_methods: enabled,
            settings: BTreeMap::new(),
        }
    }
}

impl RoutingConfig {
    /// Settings for a method, defaulted when absent
    pub fn settings_for(&self, method: ProviderMethod) -> ProviderSettings {
        self.settings.get(&method).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, method: ProviderMethod) -> bool {
        self.enabled_methods.contains(&method)
    }
}
