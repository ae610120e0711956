//! Routing configuration validation
//!
//! Validation errors block a save; soft findings are logged as
//! warnings only.

use crate::core::types::config::RoutingConfig;
use crate::utils::error::{Result, SwitchError};
use tracing::warn;

/// Per-call timeouts below this are suspicious but allowed
const SHORT_TIMEOUT_SECS: u64 = 5;

/// Validate a routing configuration before it is persisted
///
/// Errors: default method not enabled; an enabled cloud method without
/// an API key. Warnings only: very short timeouts, an empty enabled
/// set.
pub fn validate_config(config: &RoutingConfig) -> Result<()> {
    if !config.enabled_methods.contains(&config.default_method) {
        return Err(SwitchError::Validation(format!(
            "default method {} is not among the enabled methods",
            config.default_method
        )));
    }

    if let Some(fallback) = config.fallback_method {
        if !config.enabled_methods.contains(&fallback) {
            return Err(SwitchError::Validation(format!(
                "fallback method {fallback} is not among the enabled methods"
            )));
        }
    }

    for method in &config.enabled_methods {
        let settings = config.settings_for(*method);
        if !method.is_local() && settings.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(SwitchError::Validation(format!(
                "enabled method {method} has no API key configured"
            )));
        }
        if settings.timeout_secs < SHORT_TIMEOUT_SECS {
            warn!(
                "method {} has a very short timeout ({}s)",
                method, settings.timeout_secs
            );
        }
    }

    if config.enabled_methods.is_empty() {
        warn!("routing configuration enables no methods");
    }

    Ok(())
}
