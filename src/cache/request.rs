//! Per-request memoization
//!
//! Deduplicates identical store lookups within a single request
//! lifecycle: each distinct (function, argument-tuple) pair is computed
//! at most once, and concurrent identical calls share one in-flight
//! computation. Keys are the function name plus the JSON-serialized
//! arguments; values are stored as serialized JSON so one map can hold
//! heterogeneous result types.

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Upper bound on distinct lookups within one request
const DEFAULT_MEMO_CAPACITY: u64 = 256;

/// Request-scoped memoization map.
///
/// Construct one per inbound request and pass it to every service call
/// made while handling that request; never share an instance across
/// requests.
pub struct RequestMemo {
    entries: Cache<String, Arc<String>>,
}

impl RequestMemo {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMO_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Return the memoized result for `(func, args)`, computing it via
    /// `compute` on first use. Concurrent callers with the same key wait
    /// for the single in-flight computation instead of re-running it.
    ///
    /// Values that fail to round-trip through serialization degrade to
    /// the type's default, consistent with the layer-wide
    /// degrade-to-empty policy.
    pub async fn get_or_compute<A, T, F, Fut>(&self, func: &'static str, args: &A, compute: F) -> T
    where
        A: Serialize + ?Sized,
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let key = match serde_json::to_string(args) {
            Ok(encoded) => format!("{}:{}", func, encoded),
            Err(err) => {
                // Unkeyable arguments: compute without memoizing
                tracing::warn!(function = func, error = %err, "memo key serialization failed");
                return compute().await;
            }
        };

        let entry = self
            .entries
            .get_with(key, async move {
                let value = compute().await;
                Arc::new(serde_json::to_string(&value).unwrap_or_default())
            })
            .await;

        match serde_json::from_str(&entry) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(function = func, error = %err, "memoized value failed to decode");
                T::default()
            }
        }
    }

    /// Number of memoized entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for RequestMemo {
    fn default() -> Self {
        Self::new()
    }
}
