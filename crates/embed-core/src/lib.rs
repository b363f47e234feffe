//! # embed-core
//!
//! Fetch a remote HTML document, pull a fragment of text out of it with a CSS
//! selector, and cache the result so repeated requests skip the network.
//!
//! ## Architecture
//!
//! - **Configuration**: base URL, actions, fixed parameters, credentials, timeout
//! - **Fetcher**: single GET with connect timeout and optional Basic auth
//! - **Extractor**: tolerant HTML5 parsing and selector matching
//! - **Cache**: process-local tier in front of a persistent, taggable store
//! - **Service**: the orchestrator gluing the above together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use embed_core::{Config, ContentService};
//!
//! # async fn run() -> embed_core::Result<()> {
//! let config = Config::load(None)?;
//! let service = ContentService::from_config(config)?;
//!
//! let title = service.get_content("", "page", ".title").await?;
//! println!("{title}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Upstream failures are absorbed: the service logs them, records a
//! [`Warning`] and returns whatever text it could extract (possibly none).
//! Only configuration problems come back as [`Error`].

/// Two-tier content cache
pub mod cache;
/// Configuration loading and request settings
pub mod config;
/// Error types and result aliases
pub mod error;
/// Selector based text extraction
pub mod extract;
/// HTTP fetching and request URI construction
pub mod fetcher;
/// Request failure logging
pub mod log;
/// The content request orchestrator
pub mod service;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use cache::{CacheBackend, CacheKey, ContentCache, FileBackend, MemoryBackend, TwoTierCache};
pub use config::Config;
pub use error::{Error, Result};
pub use extract::{Extract, HtmlExtractor};
pub use fetcher::{Fetch, FetchError, HttpFetcher, HttpResponse};
pub use log::{RequestLogger, Severity, TracingLogger};
pub use service::{ContentService, ContentServiceBuilder};
pub use types::*;
