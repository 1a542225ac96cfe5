//! Write queue with debounce support.
//!
//! Two write disciplines share one queue:
//! - immediate writes go straight to the store and supersede any pending
//!   debounced value for the same key
//! - debounced writes replace the pending value for their key and become due
//!   once the coalescing window has elapsed
//!
//! Failed writes are not retried. They are reported as [`StorageWarning`]s so
//! the caller can surface a non-fatal notice while in-memory state stays
//! authoritative.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::kv::KeyValueStore;
use crate::error::StorageError;

/// Default coalescing window for debounced writes.
pub const DEFAULT_DEBOUNCE_MS: i64 = 500;

/// A write that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageWarning {
    pub key: String,
    pub message: String,
    pub quota_exceeded: bool,
    pub at: DateTime<Utc>,
}

impl StorageWarning {
    pub fn from_error(key: &str, err: &StorageError, at: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            message: err.to_string(),
            quota_exceeded: matches!(err, StorageError::QuotaExceeded { .. }),
            at,
        }
    }
}

/// Pending value with its debounce deadline.
#[derive(Debug, Clone)]
struct PendingWrite {
    value: String,
    debounce_until: DateTime<Utc>,
}

/// Routes writes to a [`KeyValueStore`].
pub struct WriteQueue {
    store: Box<dyn KeyValueStore>,
    debounce: Duration,
    pending: HashMap<String, PendingWrite>,
}

impl WriteQueue {
    /// Create a queue over `store` with the default window.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_debounce(store, Duration::milliseconds(DEFAULT_DEBOUNCE_MS))
    }

    /// Create a queue with a custom coalescing window.
    pub fn with_debounce(store: Box<dyn KeyValueStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            pending: HashMap::new(),
        }
    }

    /// The backing store, for reads.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Write `value` under `key` now.
    ///
    /// Any pending debounced value for `key` is discarded, since it is older.
    ///
    /// # Errors
    /// Returns the store's error if the write fails.
    pub fn write_immediate(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.pending.remove(key);
        self.store.set(key, value)
    }

    /// Queue `value` under `key`, replacing any pending value for that key.
    pub fn write_debounced(&mut self, key: &str, value: String, now: DateTime<Utc>) {
        self.pending.insert(
            key.to_string(),
            PendingWrite {
                value,
                debounce_until: now + self.debounce,
            },
        );
    }

    /// Write every pending value whose window has elapsed.
    pub fn flush_due(&mut self, now: DateTime<Utc>) -> Vec<StorageWarning> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| p.debounce_until <= now)
            .map(|(k, _)| k.clone())
            .collect();
        self.write_out(due, now)
    }

    /// Write everything pending regardless of deadlines.
    pub fn flush_all(&mut self) -> Vec<StorageWarning> {
        let keys: Vec<String> = self.pending.keys().cloned().collect();
        self.write_out(keys, Utc::now())
    }

    /// Drop pending writes without persisting them.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    fn write_out(&mut self, keys: Vec<String>, now: DateTime<Utc>) -> Vec<StorageWarning> {
        let mut warnings = Vec::new();
        for key in keys {
            if let Some(pending) = self.pending.remove(&key) {
                if let Err(e) = self.store.set(&key, &pending.value) {
                    tracing::warn!(key = %key, error = %e, "debounced write failed");
                    warnings.push(StorageWarning::from_error(&key, &e, now));
                }
            }
        }
        warnings
    }
}

impl Drop for WriteQueue {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let warnings = self.flush_all();
        if !warnings.is_empty() {
            tracing::warn!(count = warnings.len(), "pending writes lost at teardown");
        }
    }
}
