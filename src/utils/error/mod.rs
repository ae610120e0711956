//! Error handling for the router
//!
//! Defines the error taxonomy used throughout the crate, the
//! retryability rules the retry loop branches on, and the text-based
//! classifier used when an upstream failure carries no structured code.

mod classify;
mod error;

pub use classify::{classify, parse_retry_after};
pub use error::{ErrorPayload, Result, SwitchError};
