//! Two-tier cache for extracted content.
//!
//! A process-local map sits in front of a persistent [`CacheBackend`].
//!
//! - **get**: local first. Only a key never looked at before reaches the
//!   backend, and whatever the backend answers, a miss included, is memoized
//!   locally until the next `set` or `unset` for that key.
//! - **set**: write-through to both tiers.
//! - **unset**: removes from both tiers; the next `get` probes the backend again.
//!
//! Backend failures never escape: reads degrade to a miss and writes are
//! logged as warnings.
//!
//! ## Example
//!
//! ```rust
//! use embed_core::cache::{CacheKey, ContentCache, MemoryBackend, TwoTierCache};
//! use std::collections::{BTreeMap, BTreeSet};
//! use std::sync::Arc;
//!
//! let cache = TwoTierCache::new(Arc::new(MemoryBackend::new()));
//! let key = CacheKey::for_content("http://x.test", "/p", &BTreeMap::new(), ".title");
//!
//! assert_eq!(cache.get(&key), None);
//! cache.set(&key, "Hello", &BTreeSet::from(["site:x.test".to_string()]));
//! assert_eq!(cache.get(&key).as_deref(), Some("Hello"));
//!
//! cache.unset(&key);
//! assert_eq!(cache.get(&key), None);
//! ```

mod backend;
mod file;
mod key;

pub use backend::{CacheBackend, CacheEntry, MemoryBackend};
pub use file::FileBackend;
pub use key::{CONTENT_NAMESPACE, CacheKey};

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Cache operations the content service depends on.
pub trait ContentCache: Send + Sync {
    /// Cached value for `key`, if any.
    fn get(&self, key: &CacheKey) -> Option<String>;

    /// Store `value` under `key` with bulk-eviction `tags`.
    fn set(&self, key: &CacheKey, value: &str, tags: &BTreeSet<String>);

    /// Forget `key` in every tier.
    fn unset(&self, key: &CacheKey);

    /// Evict every entry carrying `tag`. Returns the number evicted.
    fn flush_by_tag(&self, tag: &str) -> crate::Result<usize>;

    /// Evict everything.
    fn flush(&self) -> crate::Result<()>;
}

/// Outcome of a local-tier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalProbe {
    /// The backend was asked before and had this value (or it was set locally).
    Hit(String),
    /// The backend was asked before and had nothing.
    Miss,
    /// The backend has not been asked about this key in this process.
    NotYetChecked,
}

/// Process-local tier. `None` values are memoized misses.
#[derive(Debug, Default)]
pub struct LocalLayer {
    slots: Mutex<HashMap<CacheKey, Option<String>>>,
}

impl LocalLayer {
    /// Create an empty local tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key` without touching the backend.
    pub fn probe(&self, key: &CacheKey) -> LocalProbe {
        match self.lock().get(key) {
            Some(Some(value)) => LocalProbe::Hit(value.clone()),
            Some(None) => LocalProbe::Miss,
            None => LocalProbe::NotYetChecked,
        }
    }

    /// Remember a value, or a miss when `value` is `None`.
    pub fn remember(&self, key: &CacheKey, value: Option<String>) {
        self.lock().insert(key.clone(), value);
    }

    /// Drop whatever is known about `key`.
    pub fn forget(&self, key: &CacheKey) {
        self.lock().remove(key);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of remembered slots (hits and misses).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Option<String>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`ContentCache`] combining a [`LocalLayer`] with a persistent backend.
pub struct TwoTierCache {
    local: LocalLayer,
    backend: Arc<dyn CacheBackend>,
}

impl TwoTierCache {
    /// Put a fresh local tier in front of `backend`.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            local: LocalLayer::new(),
            backend,
        }
    }

    /// The local tier, for inspection.
    pub const fn local(&self) -> &LocalLayer {
        &self.local
    }
}

impl ContentCache for TwoTierCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        match self.local.probe(key) {
            LocalProbe::Hit(value) => Some(value),
            LocalProbe::Miss => None,
            LocalProbe::NotYetChecked => {
                let value = match self.backend.get(key) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(category = e.category(), "Cache read for {} failed: {}", key, e);
                        None
                    },
                };
                self.local.remember(key, value.clone());
                value
            },
        }
    }

    fn set(&self, key: &CacheKey, value: &str, tags: &BTreeSet<String>) {
        self.local.remember(key, Some(value.to_string()));
        if let Err(e) = self.backend.set(key, value, tags) {
            warn!(category = e.category(), "Cache write for {} failed: {}", key, e);
        }
    }

    fn unset(&self, key: &CacheKey) {
        self.local.forget(key);
        if let Err(e) = self.backend.remove(key) {
            warn!(category = e.category(), "Cache removal for {} failed: {}", key, e);
        }
    }

    fn flush_by_tag(&self, tag: &str) -> crate::Result<usize> {
        // Local slots carry no tags, so drop them all rather than risk stale hits.
        self.local.clear();
        self.backend.flush_by_tag(tag)
    }

    fn flush(&self) -> crate::Result<()> {
        self.local.clear();
        self.backend.flush()
    }
}
