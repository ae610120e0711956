//! Provider factory
//!
//! Maps each [`ProviderMethod`] onto its concrete constructor once, at
//! router initialization, never per call. Concrete wire-format
//! translators register themselves through [`ProviderFactory::register`];
//! the local `ollama` method is backed by [`EchoProvider`] by default so
//! a bare factory still routes.

use super::{EchoProvider, ModelProvider};
use crate::core::types::config::ProviderSettings;
use crate::core::types::ProviderMethod;
use crate::utils::error::{Result, SwitchError};
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor supplied by the composition root for one method
pub type ProviderBuilder =
    Arc<dyn Fn(&ProviderSettings) -> Arc<dyn ModelProvider> + Send + Sync>;

/// Registration table from method to constructor
#[derive(Clone, Default)]
pub struct ProviderFactory {
    builders: HashMap<ProviderMethod, ProviderBuilder>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for a method
    pub fn register<F>(&mut self, method: ProviderMethod, builder: F)
    where
        F: Fn(&ProviderSettings) -> Arc<dyn ModelProvider> + Send + Sync + 'static,
    {
        self.builders.insert(method, Arc::new(builder));
    }

    /// Build a provider instance for `method`
    pub fn build(
        &self,
        method: ProviderMethod,
        settings: &ProviderSettings,
    ) -> Result<Arc<dyn ModelProvider>> {
        if let Some(builder) = self.builders.get(&method) {
            return Ok(builder(settings));
        }
        if method.is_local() {
            return Ok(Arc::new(EchoProvider::new(
                method,
                settings.default_model.clone(),
            )));
        }
        Err(SwitchError::ProviderNotAvailable(format!(
            "no provider implementation registered for {method}"
        )))
    }

    /// Whether `method` can be built
    pub fn supports(&self, method: ProviderMethod) -> bool {
        self.builders.contains_key(&method) || method.is_local()
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("methods", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}
