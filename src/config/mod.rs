//! Routing configuration cache
//!
//! Serves the active [`RoutingConfig`] from a fast in-process tier,
//! an optional shared tier, and the durable store, with validated
//! saves, synchronous watcher notification, and hot reload.

mod cache;
mod validation;

pub use cache::{ConfigCache, ConfigCacheSettings, ConfigWatcher};
pub use validation::validate_config;

pub use crate::core::types::config::{ProviderSettings, RoutingConfig};
