//! Context store seam
//!
//! Plans, ranking summaries, and coordination records are persisted through
//! an external key-value store. The store is best-effort: planning
//! correctness never depends on a write landing, so callers log and swallow
//! store failures instead of propagating them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// External key-value store with optional TTL semantics
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Persist a JSON value under a key, optionally expiring after `ttl`
    async fn store(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;

    /// Fetch a previously stored value, if present and not expired
    async fn retrieve(&self, key: &str) -> Result<Option<Value>>;
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

/// In-memory [`ContextStore`] with TTL checked on read
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at.map(|t| t > now).unwrap_or(true))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    async fn store(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.and_then(|d| {
            chrono::TimeDelta::from_std(d)
                .ok()
                .map(|delta| Utc::now() + delta)
        });
        self.entries
            .write()
            .await
            .insert(key.to_string(), StoredEntry { value, expires_at });
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|entry| {
            match entry.expires_at {
                Some(expiry) if expiry <= Utc::now() => None,
                _ => Some(entry.value.clone()),
            }
        }))
    }
}

/// Store that fails every operation
///
/// Test double for proving that persistence failures never abort planning.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl ContextStore for FailingStore {
    async fn store(&self, key: &str, _value: Value, _ttl: Option<Duration>) -> Result<()> {
        Err(Error::StoreError(format!("store unavailable for '{key}'")))
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Value>> {
        Err(Error::StoreError(format!("store unavailable for '{key}'")))
    }
}
