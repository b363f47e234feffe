//! Persistent cache tier: the [`CacheBackend`] contract and an in-memory store.

use crate::Result;
use crate::cache::CacheKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

/// A stored value and the tags used for bulk eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Key the entry is stored under
    pub key: CacheKey,
    /// Cached content
    pub value: String,
    /// Tags for bulk eviction
    pub tags: BTreeSet<String>,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(key: CacheKey, value: String, tags: BTreeSet<String>) -> Self {
        Self {
            key,
            value,
            tags,
            stored_at: Utc::now(),
        }
    }
}

/// Persistent, tag-addressable key/value store.
///
/// Implementations must make each single-key operation atomic; nothing
/// spanning several keys is expected to be transactional.
pub trait CacheBackend: Send + Sync {
    /// Load the value stored under `key`.
    fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous entry and its tags.
    fn set(&self, key: &CacheKey, value: &str, tags: &BTreeSet<String>) -> Result<()>;

    /// Remove the entry for `key`. Removing a missing key is not an error.
    fn remove(&self, key: &CacheKey) -> Result<()>;

    /// Remove every entry tagged with `tag`, returning how many were removed.
    fn flush_by_tag(&self, tag: &str) -> Result<usize>;

    /// Remove every entry.
    fn flush(&self) -> Result<()>;
}

/// In-memory backend. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        Ok(self.lock().get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &CacheKey, value: &str, tags: &BTreeSet<String>) -> Result<()> {
        let entry = CacheEntry::new(key.clone(), value.to_string(), tags.clone());
        self.lock().insert(key.clone(), entry);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn flush_by_tag(&self, tag: &str) -> Result<usize> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.contains(tag));
        Ok(before - entries.len())
    }

    fn flush(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_set_get_remove() {
        let backend = MemoryBackend::new();
        let key = CacheKey::derive("t", "a");

        assert_eq!(backend.get(&key).unwrap(), None);
        backend.set(&key, "value", &tags(&[])).unwrap();
        assert_eq!(backend.get(&key).unwrap().as_deref(), Some("value"));

        backend.remove(&key).unwrap();
        assert_eq!(backend.get(&key).unwrap(), None);
        backend.remove(&key).unwrap();
    }

    #[test]
    fn test_flush_by_tag_only_removes_tagged() {
        let backend = MemoryBackend::new();
        let a = CacheKey::derive("t", "a");
        let b = CacheKey::derive("t", "b");
        backend.set(&a, "a", &tags(&["site:one.test"])).unwrap();
        backend.set(&b, "b", &tags(&["site:two.test"])).unwrap();

        assert_eq!(backend.flush_by_tag("site:one.test").unwrap(), 1);
        assert_eq!(backend.get(&a).unwrap(), None);
        assert_eq!(backend.get(&b).unwrap().as_deref(), Some("b"));
        assert_eq!(backend.flush_by_tag("site:one.test").unwrap(), 0);
    }

    #[test]
    fn test_set_replaces_tags() {
        let backend = MemoryBackend::new();
        let key = CacheKey::derive("t", "a");
        backend.set(&key, "old", &tags(&["x"])).unwrap();
        backend.set(&key, "new", &tags(&["y"])).unwrap();

        assert_eq!(backend.flush_by_tag("x").unwrap(), 0);
        assert_eq!(backend.flush_by_tag("y").unwrap(), 1);
    }

    #[test]
    fn test_flush() {
        let backend = MemoryBackend::new();
        backend.set(&CacheKey::derive("t", "a"), "a", &tags(&[])).unwrap();
        backend.set(&CacheKey::derive("t", "b"), "b", &tags(&[])).unwrap();
        assert_eq!(backend.len(), 2);

        backend.flush().unwrap();
        assert!(backend.is_empty());
    }
}
