//! Configuration management for the embed service.
//!
//! Configuration is stored in TOML format. It names the upstream site, the
//! actions (path templates) that can be requested from it, fixed query
//! parameters, an optional credential pair and the connect timeout.
//!
//! ## Location
//!
//! 1. An explicit path (`--config` on the CLI)
//! 2. The `EMBED_CONFIG` environment variable
//! 3. The platform config directory (`<config_dir>/embed/config.toml`)
//!
//! A missing file yields [`Config::default`]; a malformed one is an error.
//!
//! ## Example
//!
//! ```rust
//! use embed_core::Config;
//!
//! let config: Config = toml::from_str(r#"
//!     base_url = "https://intranet.example.com"
//!     timeout = 5
//!
//!     [actions]
//!     page = "/p"
//!
//!     [parameters]
//!     lang = "en"
//! "#)?;
//!
//! assert_eq!(config.resolve_action("page")?, "/p");
//! assert_eq!(config.resolve_action("/raw/path")?, "/raw/path");
//! assert!(config.resolve_action("unknown").is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV: &str = "EMBED_CONFIG";

/// Environment variable overriding the persistent cache directory.
pub const DATA_DIR_ENV: &str = "EMBED_DATA_DIR";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one upstream site.
///
/// ## Example Configuration File
///
/// ```toml
/// base_url = "https://intranet.example.com"
/// username = "reader"
/// password = "secret"
/// timeout = 10
/// verify_tls = false
///
/// [actions]
/// events = "/api/events"
///
/// [parameters]
/// format = "html"
///
/// [cache]
/// dir = "/var/cache/embed"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL every action path is appended to.
    ///
    /// May be left empty when every request supplies its own base URL.
    pub base_url: String,

    /// Action name to path template.
    pub actions: BTreeMap<String, String>,

    /// Fixed query parameters added to every request.
    ///
    /// Caller-supplied parameters win on key collision.
    pub parameters: BTreeMap<String, String>,

    /// Username for HTTP Basic authentication.
    pub username: Option<String>,

    /// Password for HTTP Basic authentication.
    pub password: Option<String>,

    /// Connect timeout in seconds. `0` leaves the client default in place.
    pub timeout: u64,

    /// Whether TLS certificates and host names are verified.
    ///
    /// Disable only for internal endpoints with self-signed certificates.
    pub verify_tls: bool,

    /// Separator placed between matched text nodes when formatting content.
    pub separator: String,

    /// Persistent cache settings.
    pub cache: CacheConfig,
}

/// Persistent cache settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding cache entries. Defaults to the platform data dir.
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            actions: BTreeMap::new(),
            parameters: BTreeMap::new(),
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
            separator: " ".to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, `EMBED_CONFIG`, or the default location.
    ///
    /// An explicitly requested file (argument or environment) must exist; the
    /// default location may be absent, in which case defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Self::from_file(Path::new(trimmed));
            }
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
    }

    /// Platform default location of the configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "embed", "embed")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolve an action name (or literal path) to the path appended to the base URL.
    ///
    /// Configured action names take precedence. Anything starting with `/` is
    /// used verbatim; any other unknown name is a configuration error.
    pub fn resolve_action<'a>(&'a self, action: &'a str) -> Result<&'a str> {
        if let Some(template) = self.actions.get(action) {
            return Ok(template.as_str());
        }
        if action.starts_with('/') {
            return Ok(action);
        }
        Err(Error::Config(format!(
            "Unknown action '{action}'. Configure it under [actions] or pass a path starting with '/'"
        )))
    }

    /// The effective base URL: the override when non-empty, else the configured one.
    pub fn effective_base_url<'a>(&'a self, override_url: &'a str) -> Result<&'a str> {
        let candidate = if override_url.trim().is_empty() {
            self.base_url.trim()
        } else {
            override_url.trim()
        };
        if candidate.is_empty() {
            return Err(Error::Config(
                "No base URL given and none configured (base_url)".to_string(),
            ));
        }
        Ok(candidate)
    }

    /// Basic-auth credentials, only when both username and password are non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Connect timeout as a [`Duration`].
    ///
    /// `timeout = 0` means no explicit connect timeout; the HTTP client's own
    /// default applies.
    #[must_use]
    pub const fn connect_timeout(&self) -> Option<Duration> {
        if self.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout))
        }
    }

    /// Directory for the persistent cache.
    ///
    /// Honors `EMBED_DATA_DIR`, then `[cache].dir`, then the platform data dir.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        if let Some(dir) = &self.cache.dir {
            return Ok(dir.clone());
        }

        directories::ProjectDirs::from("dev", "embed", "embed")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or_else(|| Error::Config("Failed to determine cache directory".into()))
    }
}
