//! # modelgate
//!
//! Multi-provider inference request router: accepts generation and
//! embedding requests, selects a backend provider, enforces timeouts,
//! retries with exponential backoff, fails over to a secondary
//! provider, deduplicates identical requests through a dual-tier
//! response cache, tracks per-provider usage, and continuously monitors
//! provider health in the background.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use modelgate::config::{ConfigCache, ConfigCacheSettings};
//! use modelgate::core::providers::ProviderFactory;
//! use modelgate::core::response_cache::{ResponseCache, ResponseCacheConfig};
//! use modelgate::core::router::{GenerateRequest, ModelSwitcher};
//! use modelgate::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let config_cache = Arc::new(ConfigCache::new(
//!         ConfigCacheSettings::default(),
//!         store.clone(),
//!         None,
//!     ));
//!     let response_cache = Arc::new(ResponseCache::new(
//!         ResponseCacheConfig::default(),
//!         None,
//!     ));
//!
//!     let switcher = ModelSwitcher::new(
//!         None,
//!         ProviderFactory::new(),
//!         config_cache,
//!         response_cache,
//!         None,
//!         None,
//!         None,
//!         None,
//!     );
//!     switcher.initialize().await?;
//!
//!     let result = switcher
//!         .generate(GenerateRequest::new("Hello there"))
//!         .await?;
//!     println!("{} (cached: {})", result.content, result.cached);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

pub use crate::core::router::{GenerateRequest, ModelSwitcher, SwitcherRegistry};
pub use crate::core::types::{
    EmbeddingResult, GenerateOptions, GenerationResult, ProviderMethod, RoutingConfig,
};
pub use crate::utils::error::{Result, SwitchError};
