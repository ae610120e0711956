//! Request fingerprinting
//!
//! The fingerprint hashes exactly the request fields that affect a
//! provider's output. Delivery-only fields (the `stream` flag) are
//! excluded so streaming and non-streaming renditions of the same
//! request share one cache entry.

use crate::core::types::common::{GenerateOptions, ProviderMethod};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable cache key for one normalized request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash the cache-relevant fields of a request
    ///
    /// Fields are fed to the digest directly, length-prefixed and
    /// presence-tagged, so every input (including non-finite floats)
    /// hashes to a distinct, stable key.
    pub fn compute(
        prompt: &str,
        method: ProviderMethod,
        model: Option<&str>,
        system_prompt: Option<&str>,
        tenant: Option<&str>,
        options: &GenerateOptions,
    ) -> Self {
        let mut hasher = Sha256::new();
        hash_str(&mut hasher, prompt);
        hash_str(&mut hasher, method.as_str());
        hash_opt_str(&mut hasher, model);
        hash_opt_str(&mut hasher, system_prompt);
        hash_opt_str(&mut hasher, tenant);
        hash_opt_u64(&mut hasher, options.max_tokens.map(u64::from));
        hash_opt_u64(&mut hasher, options.temperature.map(f64::to_bits));
        hash_opt_u64(&mut hasher, options.top_p.map(f64::to_bits));
        hash_opt_u64(&mut hasher, options.top_k.map(u64::from));
        hasher.update((options.stop_sequences.len() as u64).to_le_bytes());
        for stop in &options.stop_sequences {
            hash_str(&mut hasher, stop);
        }
        hash_opt_u64(&mut hasher, options.presence_penalty.map(f64::to_bits));
        hash_opt_u64(&mut hasher, options.frequency_penalty.map(f64::to_bits));
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_opt_str(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            hash_str(hasher, value);
        }
        None => hasher.update([0u8]),
    }
}

fn hash_opt_u64(hasher: &mut Sha256, value: Option<u64>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            hasher.update(value.to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
