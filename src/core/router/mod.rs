//! Request routing
//!
//! The switcher resolves each request to a provider, wraps the call in
//! the retry loop, fails over to the configured secondary after the
//! primary's budget is exhausted, and keeps per-provider usage counts.

mod registry;
mod retry;
mod switcher;

pub use registry::{SwitcherBuilder, SwitcherRegistry};
pub use retry::{MAX_ATTEMPTS, PERMIT_WAIT};
pub use switcher::{GenerateRequest, ModelSwitcher};
