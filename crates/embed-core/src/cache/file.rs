//! Filesystem backend for the persistent cache tier.
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//!   entries/
//!     3f1a…e9.json      # one CacheEntry per key (64 hex chars)
//!     9b0c…41.json
//! ```
//!
//! Writes are atomic (temp file + rename) so a crash never leaves a torn
//! entry behind. Tags live inside each entry; [`FileBackend::flush_by_tag`]
//! scans the directory.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::{CacheBackend, CacheEntry, CacheKey};
use crate::{Error, Result};

/// Persistent cache backend storing one JSON file per key.
///
/// ## Thread Safety
///
/// Each operation touches a single file and commits by rename, so concurrent
/// writers to the same key race and the last rename wins.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open (and create if needed) a backend rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let backend = Self {
            root: root.as_ref().to_path_buf(),
        };
        fs::create_dir_all(backend.entries_dir())
            .map_err(|e| Error::Storage(format!("Failed to create cache directory: {e}")))?;
        Ok(backend)
    }

    /// Root directory of this backend.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join("entries")
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.entries_dir().join(format!("{}.json", key.as_str()))
    }

    /// Load the full entry (value and tags) for `key`.
    pub fn load_entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Storage(format!("Failed to read entry {key}: {e}")));
            },
        };
        let entry: CacheEntry = serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse entry {key}: {e}")))?;
        Ok(Some(entry))
    }

    /// All stored entries. Unreadable files are skipped with a warning.
    pub fn list_entries(&self) -> Result<Vec<CacheEntry>> {
        let dir = self.entries_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let listing = fs::read_dir(&dir)
            .map_err(|e| Error::Storage(format!("Failed to read cache directory: {e}")))?;

        for item in listing {
            let item =
                item.map_err(|e| Error::Storage(format!("Failed to read directory entry: {e}")))?;
            let path = item.path();

            // Skip temp files and anything foreign
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    serde_json::from_str::<CacheEntry>(&json).map_err(|e| e.to_string())
                }) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable cache entry {}: {}", path.display(), e),
            }
        }

        Ok(entries)
    }
}

impl CacheBackend for FileBackend {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        Ok(self.load_entry(key)?.map(|entry| entry.value))
    }

    fn set(&self, key: &CacheKey, value: &str, tags: &BTreeSet<String>) -> Result<()> {
        let dir = self.entries_dir();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create cache directory: {e}")))?;

        let entry = CacheEntry::new(key.clone(), value.to_string(), tags.clone());
        let path = self.entry_path(key);
        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| Error::Storage(format!("Failed to serialize entry: {e}")))?;

        // Atomic write: temp file + rename
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| Error::Storage(format!("Failed to write temp entry file: {e}")))?;

        // Handle Windows: remove target before rename
        #[cfg(target_os = "windows")]
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| Error::Storage(format!("Failed to remove existing entry: {e}")))?;
        }

        fs::rename(&tmp_path, &path)
            .map_err(|e| Error::Storage(format!("Failed to commit entry file: {e}")))?;

        debug!("Stored cache entry {}", key);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => {
                debug!("Removed cache entry {}", key);
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("Failed to remove entry {key}: {e}"))),
        }
    }

    fn flush_by_tag(&self, tag: &str) -> Result<usize> {
        let mut removed = 0;
        for entry in self.list_entries()? {
            if entry.tags.contains(tag) {
                self.remove(&entry.key)?;
                removed += 1;
            }
        }
        debug!("Flushed {} cache entries tagged {}", removed, tag);
        Ok(removed)
    }

    fn flush(&self) -> Result<()> {
        let dir = self.entries_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|e| Error::Storage(format!("Failed to clear cache: {e}")))?;
        }
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create cache directory: {e}")))?;
        Ok(())
    }
}
