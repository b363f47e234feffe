//! Content request orchestration.
//!
//! [`ContentService`] ties the pipeline together:
//!
//! ```text
//! request ──► key ──► cache ──hit──────────────────────────────► value
//!                       │
//!                      miss ──► fetch ──► extract ──► format ──► store ──► value
//! ```
//!
//! Upstream failures never abort a request. A transport failure continues
//! with an empty body, a non-200 response continues with whatever body came
//! back, and both are recorded as [`Warning`]s on the returned [`Content`].
//! Only configuration problems surface as errors.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};
use url::Url;

use crate::cache::{CacheKey, ContentCache, FileBackend, TwoTierCache};
use crate::extract::{Extract, HtmlExtractor, format_content};
use crate::fetcher::{Fetch, FetchError, HttpFetcher, build_request_uri};
use crate::log::{RequestLogger, TracingLogger};
use crate::{Config, Content, Error, RequestSpec, Result, Warning};

/// Fetches, extracts and caches fragments of remote documents.
///
/// All collaborators are injected; see [`ContentService::builder`] or
/// [`ContentService::from_config`] for the production wiring.
pub struct ContentService {
    config: Config,
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<dyn Extract>,
    cache: Arc<dyn ContentCache>,
}

impl ContentService {
    /// Start building a service around `config`.
    pub fn builder(config: Config) -> ContentServiceBuilder {
        ContentServiceBuilder {
            config,
            fetcher: None,
            extractor: None,
            cache: None,
            logger: None,
        }
    }

    /// Production wiring: HTTP fetcher, `scraper` extractor, file-backed
    /// two-tier cache in [`Config::cache_dir`], `tracing` logger.
    pub fn from_config(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    /// The configuration this service was built with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The cache in use.
    pub fn cache(&self) -> &Arc<dyn ContentCache> {
        &self.cache
    }

    /// Text matching `selector` at `base_url` + `path`.
    ///
    /// `base_url` may be empty to use the configured one; `path` is an action
    /// name or a literal path. Always yields a string unless the request
    /// cannot be built from configuration.
    pub async fn get_content(&self, base_url: &str, path: &str, selector: &str) -> Result<String> {
        let request = RequestSpec::new(base_url, path, selector);
        Ok(self.fetch_content(&request).await?.value)
    }

    /// Like [`get_content`](Self::get_content) but reports cache status and
    /// upstream warnings.
    #[instrument(skip(self, request), fields(request_target = %request.target(), selector = request.selector()))]
    pub async fn fetch_content(&self, request: &RequestSpec) -> Result<Content> {
        let uri = build_request_uri(&self.config, request)?;
        let key = self.cache_key(request)?;

        if let Some(value) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(Content::from_cache(value));
        }

        let mut warnings = Vec::new();
        let body = match self.fetcher.fetch(&uri).await {
            Ok(response) => {
                if !response.is_ok() {
                    warnings.push(Warning::UpstreamStatus {
                        status: response.status,
                    });
                }
                response.body
            },
            Err(FetchError::Transport { message, .. }) => {
                warnings.push(Warning::Transport { message });
                String::new()
            },
        };

        let pieces = self.extractor.extract(&body, request.selector());
        let value = format_content(&pieces, &self.config.separator);

        self.cache.set(&key, &value, &Self::tags_for(&uri));
        debug!("Cached {} bytes under {}", value.len(), key);

        Ok(Content {
            value,
            cached: false,
            warnings,
        })
    }

    /// Drop the cached value for one request.
    pub fn forget(&self, base_url: &str, path: &str, selector: &str) -> Result<()> {
        let key = self.cache_key(&RequestSpec::new(base_url, path, selector))?;
        self.cache.unset(&key);
        Ok(())
    }

    /// Evict every cached value carrying `tag` (e.g. `site:example.com`).
    pub fn flush_tag(&self, tag: &str) -> Result<usize> {
        self.cache.flush_by_tag(tag)
    }

    /// Evict all cached values.
    pub fn flush(&self) -> Result<()> {
        self.cache.flush()
    }

    /// Key for `request`: effective base URL, path, caller parameters and selector.
    ///
    /// Caller query parameters are part of the key so differently
    /// parameterized requests do not share an entry.
    pub fn cache_key(&self, request: &RequestSpec) -> Result<CacheKey> {
        let base = self.config.effective_base_url(request.base_url())?;
        Ok(CacheKey::for_content(
            base,
            request.action_path(),
            request.parameters(),
            request.selector(),
        ))
    }

    /// Tags attached to a stored value.
    pub fn tags_for(uri: &Url) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        if let Some(host) = uri.host_str() {
            tags.insert(site_tag(host));
        }
        tags.insert(format!("action:{}", uri.path()));
        tags
    }
}

/// Tag shared by every entry fetched from `host`.
///
/// ```rust
/// assert_eq!(embed_core::service::site_tag("Example.COM"), "site:example.com");
/// ```
#[must_use]
pub fn site_tag(host: &str) -> String {
    format!("site:{}", host.to_lowercase())
}

/// Builder for [`ContentService`]. Unset collaborators get production defaults.
pub struct ContentServiceBuilder {
    config: Config,
    fetcher: Option<Arc<dyn Fetch>>,
    extractor: Option<Arc<dyn Extract>>,
    cache: Option<Arc<dyn ContentCache>>,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl ContentServiceBuilder {
    /// Use a custom fetcher.
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a custom extractor.
    #[must_use]
    pub fn extractor(mut self, extractor: Arc<dyn Extract>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Use a custom cache.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ContentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Logger handed to the default HTTP fetcher.
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Assemble the service.
    pub fn build(self) -> Result<ContentService> {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger) as Arc<dyn RequestLogger>);

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.config, logger)?) as Arc<dyn Fetch>,
        };

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(HtmlExtractor::new()) as Arc<dyn Extract>);

        let cache = match self.cache {
            Some(cache) => cache,
            None => {
                let dir = self.config.cache_dir()?;
                let backend = FileBackend::open(&dir).map_err(|e| {
                    Error::Config(format!("Cache directory {} unusable: {e}", dir.display()))
                })?;
                Arc::new(TwoTierCache::new(Arc::new(backend))) as Arc<dyn ContentCache>
            },
        };

        Ok(ContentService {
            config: self.config,
            fetcher,
            extractor,
            cache,
        })
    }
}
