//! Cache key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Namespace mixed into every content key.
pub const CONTENT_NAMESPACE: &str = "embed_core::service::ContentService";

/// Fixed-length cache key: lowercase hex SHA-256 (64 chars).
///
/// Derived from `"<namespace>__" + lowercase(identifier)`, so identifiers that
/// differ only by letter case map to the same key. The hex alphabet keeps the
/// key safe as a file name or store key.
///
/// ```rust
/// use embed_core::cache::CacheKey;
///
/// let a = CacheKey::derive("ns", "HTTP://X.TEST/P|.Title");
/// let b = CacheKey::derive("ns", "http://x.test/p|.title");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive a key for `identifier` within `namespace`.
    #[must_use]
    pub fn derive(namespace: &str, identifier: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b"__");
        hasher.update(identifier.to_lowercase().as_bytes());
        let digest = hasher.finalize();
        let hex = digest.iter().fold(String::with_capacity(64), |mut acc, b| {
            // write! to String is infallible
            let _ = write!(acc, "{b:02x}");
            acc
        });
        Self(hex)
    }

    /// Key for a content request: base URL, path, caller parameters and selector.
    ///
    /// The parts are encoded as a JSON array so no value can run into its
    /// neighbour: `|` in a selector or `&` in a parameter value stays inside
    /// its own string.
    #[must_use]
    pub fn for_content(
        base_url: &str,
        path: &str,
        parameters: &BTreeMap<String, String>,
        selector: &str,
    ) -> Self {
        let identifier = serde_json::json!([base_url, path, parameters, selector]);
        Self::derive(CONTENT_NAMESPACE, &identifier.to_string())
    }

    /// Rebuild a key from its stored representation.
    ///
    /// Returns `None` unless `raw` is 64 lowercase hex characters.
    #[must_use]
    pub fn from_hex(raw: &str) -> Option<Self> {
        let valid = raw.len() == 64
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(raw.to_string()))
    }

    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
