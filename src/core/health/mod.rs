//! Health monitoring system
//!
//! Background loop polling every configured provider, maintaining
//! per-provider health records, persisting status, and emitting alerts
//! on Healthy/Unhealthy transitions.

mod monitor;

pub use monitor::{AlertCallback, HealthMonitor, HealthMonitorConfig};
