//! Core data types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One logical content request.
///
/// Built per call and never persisted. `base_url` may be empty, in which case
/// the configured base URL applies. `action_path` is either a configured
/// action name or a literal path starting with `/`.
///
/// ```rust
/// use embed_core::RequestSpec;
///
/// let spec = RequestSpec::new("", "page", ".title").with_parameter("lang", "de");
/// assert_eq!(spec.selector(), ".title");
/// assert_eq!(spec.parameters().get("lang").map(String::as_str), Some("de"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    base_url: String,
    action_path: String,
    selector: String,
    parameters: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Create a request without extra query parameters.
    pub fn new(
        base_url: impl Into<String>,
        action_path: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            action_path: action_path.into(),
            selector: selector.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add one caller query parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace the caller query parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: BTreeMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Base URL override (possibly empty).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Action name or literal path.
    pub fn action_path(&self) -> &str {
        &self.action_path
    }

    /// CSS selector applied to the fetched document.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Caller-supplied query parameters.
    pub const fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// The literal target as a user typed it (`base_url` + `action_path`).
    pub fn target(&self) -> String {
        format!("{}{}", self.base_url, self.action_path)
    }
}

/// Something that went wrong upstream but did not stop the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The request could not complete (DNS, connect, timeout, TLS).
    Transport {
        /// Transport error message
        message: String,
    },
    /// A response arrived with a status other than 200.
    UpstreamStatus {
        /// HTTP status code
        status: u16,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "request failed: {message}"),
            Self::UpstreamStatus { status } => write!(f, "upstream answered with status {status}"),
        }
    }
}

/// Result of a content request: the value plus anything worth knowing about it.
///
/// `warnings` is empty for cache hits and clean fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Extracted, formatted text.
    pub value: String,
    /// Whether the value came from the cache.
    pub cached: bool,
    /// Upstream problems recorded while producing the value.
    pub warnings: Vec<Warning>,
}

impl Content {
    /// A value served from cache.
    #[must_use]
    pub const fn from_cache(value: String) -> Self {
        Self {
            value,
            cached: true,
            warnings: Vec::new(),
        }
    }

    /// Whether the value was produced without upstream trouble.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
