//! Error types and handling for embed-core operations.
//!
//! Only a small part of the pipeline is allowed to fail loudly. Upstream
//! trouble (transport failures, non-200 responses) and selector problems are
//! absorbed by the service and degrade to empty content; they never surface
//! as an [`Error`]. What does surface:
//!
//! - **Configuration Errors**: unknown actions, missing base URL, unreadable config
//! - **Invalid URLs**: a base URL or path that cannot form an absolute URI
//! - **I/O / Storage Errors**: persistent cache operations (reported by the
//!   backends; the two-tier cache itself logs and swallows them)
//! - **Network Errors**: building the HTTP client
//!
//! ```rust
//! use embed_core::Error;
//!
//! let err = Error::Config("unknown action 'news'".to_string());
//! assert_eq!(err.category(), "config");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for embed-core operations.
///
/// `Display` provides user-friendly messages; the underlying source error is
/// preserved through `source()` for the `Io` and `Network` variants.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Only produced while constructing the HTTP client. Request-time network
    /// failures are recorded as warnings instead.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration is invalid, incomplete or inaccessible.
    ///
    /// ## Common Causes
    ///
    /// - Requested action is not configured
    /// - Neither the request nor the configuration provide a base URL
    /// - Invalid TOML syntax in the config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Persistent cache storage operation failed.
    ///
    /// ## Common Causes
    ///
    /// - Cache directory not writable
    /// - Corrupt entry file
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for timeouts, connection failures and temporary I/O
    /// issues; `false` for configuration and data problems.
    ///
    /// ```rust
    /// use embed_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout")).is_recoverable());
    /// assert!(!Error::Config("missing base_url".to_string()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful as a structured field when logging:
    ///
    /// ```rust
    /// use embed_core::Error;
    ///
    /// let err = Error::Storage("disk full".to_string());
    /// tracing::warn!(category = err.category(), "{err}");
    /// ```
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }

    /// Whether this error stems from configuration (the only class the
    /// content service lets escape).
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidUrl(_))
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
