//! Failure-text classification
//!
//! Upstream provider errors frequently arrive as plain text without a
//! structured code. The classifier maps known markers onto the
//! [`SwitchError`] taxonomy; retry-after extraction is a string
//! heuristic retained only because many providers put the delay
//! nowhere else.

use super::error::SwitchError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Default retry delay when a rate-limit marker is found but no
/// number can be parsed out of the message.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

static RETRY_AFTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)retry[- ]after[:\s]+(\d+)").expect("valid regex"),
        Regex::new(r"(?i)retry after (\d+) seconds?").expect("valid regex"),
        Regex::new(r"(?i)(\d+)\s*seconds?").expect("valid regex"),
    ]
});

/// Classify a raw provider failure into the error taxonomy
///
/// Matching is case-insensitive and ordered: rate-limit markers win
/// over generic network markers so that a "429 connection reset"
/// message still carries its retry-after. Unmatched text defaults to
/// [`SwitchError::Generation`].
pub fn classify(text: &str) -> SwitchError {
    let lower = text.to_lowercase();

    if lower.contains("rate limit")
        || lower.contains("ratelimit")
        || lower.contains("429")
        || lower.contains("quota")
        || lower.contains("too many requests")
    {
        return SwitchError::RateLimited {
            message: text.to_string(),
            retry_after: parse_retry_after(text),
        };
    }
    if lower.contains("timeout") || lower.contains("timed out") || lower.contains("deadline") {
        return SwitchError::Timeout(text.to_string());
    }
    if lower.contains("401")
        || lower.contains("unauthorized")
        || lower.contains("invalid api key")
        || lower.contains("credential")
        || lower.contains("authentication")
    {
        return SwitchError::InvalidCredentials(text.to_string());
    }
    if lower.contains("model not found")
        || lower.contains("no such model")
        || lower.contains("unknown model")
    {
        return SwitchError::ModelNotFound(text.to_string());
    }
    if lower.contains("503")
        || lower.contains("unavailable")
        || lower.contains("overloaded")
        || lower.contains("maintenance")
    {
        return SwitchError::ServiceUnavailable(text.to_string());
    }
    if lower.contains("connection")
        || lower.contains("network")
        || lower.contains("dns")
        || lower.contains("refused")
        || lower.contains("reset")
    {
        return SwitchError::Network(text.to_string());
    }

    SwitchError::Generation(text.to_string())
}

/// Extract a retry-after delay (seconds) from rate-limit error text
///
/// Falls back to 60 seconds when the message is recognizably a
/// rate-limit response but no number is present. The fallback is a
/// heuristic that can mask provider guidance, so it is logged.
pub fn parse_retry_after(text: &str) -> Option<u64> {
    for pattern in RETRY_AFTER_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                if let Ok(secs) = m.as_str().parse::<u64>() {
                    return Some(secs);
                }
            }
        }
    }
    warn!(
        "rate-limit response carried no parseable retry-after, defaulting to {}s: {}",
        DEFAULT_RETRY_AFTER_SECS, text
    );
    Some(DEFAULT_RETRY_AFTER_SECS)
}
