//! Health status types
//!
//! [`HealthStatus`] is a point-in-time snapshot returned by a single
//! provider check; [`HealthRecord`] is the accumulated state the
//! monitor keeps per provider.

use super::common::ProviderMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot result of one provider health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub method: ProviderMethod,
    pub available: bool,
    pub latency_ms: u64,
    pub model: Option<String>,
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn available(method: ProviderMethod, latency_ms: u64, model: Option<String>) -> Self {
        Self {
            method,
            available: true,
            latency_ms,
            model,
            error: None,
        }
    }

    pub fn unavailable(method: ProviderMethod, latency_ms: u64, error: String) -> Self {
        Self {
            method,
            available: false,
            latency_ms,
            model: None,
            error: Some(error),
        }
    }
}

/// Health state machine per provider
///
/// `Unknown` exists only before the first check completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Unknown,
    Healthy,
    Unhealthy,
}

/// Accumulated health state for one provider
///
/// Created lazily on the first check and only ever updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub state: HealthState,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_check_at: Option<DateTime<Utc>>,
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self {
            state: HealthState::Unknown,
            consecutive_failures: 0,
            last_error: None,
            last_check_at: None,
        }
    }
}

impl HealthRecord {
    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }

    /// Apply one check result, returning the alert to emit if the
    /// Healthy/Unhealthy edge was crossed
    pub fn apply(
        &mut self,
        method: ProviderMethod,
        status: &HealthStatus,
    ) -> Option<AlertEvent> {
        let prior = self.state;
        self.last_check_at = Some(Utc::now());

        if status.available {
            self.state = HealthState::Healthy;
            self.consecutive_failures = 0;
            self.last_error = None;
            if prior == HealthState::Unhealthy {
                return Some(AlertEvent::new(
                    method,
                    AlertType::Recovered,
                    format!("provider {method} recovered"),
                ));
            }
        } else {
            let error = status
                .error
                .clone()
                .unwrap_or_else(|| "health check failed".to_string());
            self.state = HealthState::Unhealthy;
            self.consecutive_failures += 1;
            self.last_error = Some(error.clone());
            if prior == HealthState::Healthy {
                return Some(AlertEvent::new(method, AlertType::Unhealthy, error));
            }
        }
        None
    }
}

/// Kind of health alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Unhealthy,
    Recovered,
}

/// Alert delivered to registered callbacks on a health transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub provider_id: String,
    pub method: ProviderMethod,
    pub alert_type: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(method: ProviderMethod, alert_type: AlertType, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider_id: method.as_str().to_string(),
            method,
            alert_type,
            message,
            timestamp: Utc::now(),
        }
    }
}
