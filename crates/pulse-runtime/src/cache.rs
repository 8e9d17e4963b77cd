//! Short-lived report cache.
//!
//! One entry per report scope. An entry is served while it is younger than
//! the TTL and was built from the same state fingerprint. Age is bounded by
//! the TTL alone.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::report::Report;

/// Scope key used for reports over all groups.
const GLOBAL_SCOPE: &str = "*";

/// Fingerprint of the state a report is built from: how many messages were
/// ingested and the newest event time.
pub fn state_fingerprint(ingested: u64, last_event_at: Option<i64>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ingested.to_le_bytes());
    hasher.update(last_event_at.unwrap_or(-1).to_le_bytes());
    hex::encode(hasher.finalize())
}

struct CacheEntry {
    fingerprint: String,
    report: Arc<Report>,
    inserted_at: i64,
}

/// Thread-safe report cache keyed by scope.
pub struct ReportCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    order: Vec<String>,
    max_size: usize,
    ttl_ms: i64,
}

impl ReportCache {
    pub fn new(max_size: usize, ttl_ms: i64) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: Vec::new(),
                max_size: max_size.max(1),
                ttl_ms,
            }),
        }
    }

    fn scope_key(scope: Option<&str>) -> String {
        scope.unwrap_or(GLOBAL_SCOPE).to_string()
    }

    /// Cached report for `scope`, if fresh and built from `fingerprint`.
    pub fn get(&self, scope: Option<&str>, fingerprint: &str, now: i64) -> Option<Arc<Report>> {
        let key = Self::scope_key(scope);
        let mut inner = self.inner.lock();

        let fresh = inner
            .entries
            .get(&key)
            .map(|e| e.fingerprint == fingerprint && now.saturating_sub(e.inserted_at) < inner.ttl_ms);

        match fresh {
            Some(true) => inner.entries.get(&key).map(|e| Arc::clone(&e.report)),
            Some(false) => {
                inner.entries.remove(&key);
                inner.order.retain(|k| k != &key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, scope: Option<&str>, fingerprint: String, report: Arc<Report>, now: i64) {
        let key = Self::scope_key(scope);
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else {
            while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
                let oldest = inner.order.remove(0);
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                fingerprint,
                report,
                inserted_at: now,
            },
        );
    }

    /// Number of scopes currently cached.
    pub fn scopes(&self) -> usize {
        self.inner.lock().entries.len()
    }
}
