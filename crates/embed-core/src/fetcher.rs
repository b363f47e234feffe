//! HTTP fetching and request URI construction.
//!
//! [`build_request_uri`] turns a [`RequestSpec`] into an absolute URI;
//! [`HttpFetcher`] performs the single GET behind the [`Fetch`] seam.

use crate::log::{RequestLogger, Severity, TRANSPORT_FAILURE_CODE, UPSTREAM_STATUS_CODE};
use crate::{Config, Error, RequestSpec, Result};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
pub use url::Url;

/// A completed HTTP exchange. Non-200 responses are kept so callers can
/// decide what to do with the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is exactly 200.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The request never produced a response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect, TLS, timeout or body read failure.
    #[error("transport failure for {url}: {message}")]
    Transport {
        /// Requested URI
        url: String,
        /// Underlying error message
        message: String,
    },
}

/// Performs a single GET for a fully built request URI.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch `uri`, returning the response (any status) or a transport failure.
    async fn fetch(&self, uri: &Url) -> std::result::Result<HttpResponse, FetchError>;
}

/// Build the absolute request URI for `request`.
///
/// The path of the effective base URL is concatenated with the resolved
/// action path; the query is the configured parameters overlaid with the
/// caller's (caller wins). No `?` is emitted when there are no parameters.
pub fn build_request_uri(config: &Config, request: &RequestSpec) -> Result<Url> {
    let base = config.effective_base_url(request.base_url())?;
    let action = config.resolve_action(request.action_path())?;

    let mut uri = Url::parse(base)
        .map_err(|e| Error::InvalidUrl(format!("Invalid base URL '{base}': {e}")))?;
    if uri.cannot_be_a_base() {
        return Err(Error::InvalidUrl(format!(
            "Base URL '{base}' cannot carry a path"
        )));
    }

    let base_path = uri.path().trim_end_matches('/');
    let path = if action.is_empty() || action.starts_with('/') {
        format!("{base_path}{action}")
    } else {
        format!("{base_path}/{action}")
    };
    uri.set_path(&path);

    let mut parameters = config.parameters.clone();
    parameters.extend(
        request
            .parameters()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    uri.set_query(None);
    if !parameters.is_empty() {
        uri.query_pairs_mut().extend_pairs(parameters.iter());
    }

    Ok(uri)
}

/// HTTP client that fetches upstream documents.
///
/// Applies the configured connect timeout, TLS verification policy and
/// optional Basic authentication. Each failure is reported to the injected
/// [`RequestLogger`] exactly once; successes are only traced at debug level.
pub struct HttpFetcher {
    client: Client,
    logger: Arc<dyn RequestLogger>,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration.
    pub fn new(config: &Config, logger: Arc<dyn RequestLogger>) -> Result<Self> {
        Self::with_timeout(config, config.connect_timeout(), logger)
    }

    /// Creates a fetcher with an explicit connect timeout (primarily for tests).
    ///
    /// `None` keeps reqwest's default connect behaviour.
    pub fn with_timeout(
        config: &Config,
        connect_timeout: Option<Duration>,
        logger: Arc<dyn RequestLogger>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some((username, password)) = config.credentials() {
            headers.insert(AUTHORIZATION, basic_auth_header(username, password)?);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .user_agent(concat!("embed/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client, logger })
    }

    fn transport_failure(&self, uri: &Url, err: &reqwest::Error) -> FetchError {
        self.logger.log(
            &format!("Get request to {uri} failed with exception \"{err}\""),
            Severity::Error,
            TRANSPORT_FAILURE_CODE,
        );
        FetchError::Transport {
            url: uri.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, uri: &Url) -> std::result::Result<HttpResponse, FetchError> {
        debug!("GET {}", uri);

        let response = match self.client.get(uri.clone()).send().await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_failure(uri, &err)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Err(self.transport_failure(uri, &err)),
        };

        if status == StatusCode::OK {
            debug!("Fetched {} bytes from {}", body.len(), uri);
        } else {
            self.logger.log(
                &format!("Get request to {uri} failed with code \"{status}\""),
                Severity::Error,
                UPSTREAM_STATUS_CODE,
            );
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| Error::Config(format!("Invalid credentials: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;
    use std::collections::BTreeMap;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn config_for(base_url: &str) -> Config {
        let mut actions = BTreeMap::new();
        actions.insert("page".to_string(), "/p".to_string());
        Config {
            base_url: base_url.to_string(),
            actions,
            timeout: 5,
            ..Config::default()
        }
    }

    #[test]
    fn test_build_uri_concatenates_base_path_and_action() {
        let config = config_for("http://x.test/api/");
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1")).unwrap();
        assert_eq!(uri.as_str(), "http://x.test/api/p");
    }

    #[test]
    fn test_build_uri_without_parameters_has_no_query() {
        let config = config_for("http://x.test");
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1")).unwrap();
        assert_eq!(uri.as_str(), "http://x.test/p");
        assert!(uri.query().is_none());
    }

    #[test]
    fn test_build_uri_caller_parameters_win() {
        let mut config = config_for("http://x.test");
        config.parameters.insert("lang".into(), "en".into());
        config.parameters.insert("format".into(), "html".into());

        let request = RequestSpec::new("", "page", "h1").with_parameter("lang", "de");
        let uri = build_request_uri(&config, &request).unwrap();

        let pairs: BTreeMap<String, String> = uri.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("lang").map(String::as_str), Some("de"));
        assert_eq!(pairs.get("format").map(String::as_str), Some("html"));
    }

    #[test]
    fn test_build_uri_base_override_and_literal_path() {
        let config = config_for("http://x.test");
        let request = RequestSpec::new("https://other.test", "/docs/intro", "h1");
        let uri = build_request_uri(&config, &request).unwrap();
        assert_eq!(uri.as_str(), "https://other.test/docs/intro");
    }

    #[test]
    fn test_build_uri_rejects_unknown_action_and_missing_base() {
        let config = config_for("http://x.test");
        let err = build_request_uri(&config, &RequestSpec::new("", "nope", "h1")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = config_for("");
        let err = build_request_uri(&config, &RequestSpec::new("", "page", "h1")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = config_for("not a url");
        let err = build_request_uri(&config, &RequestSpec::new("", "page", "h1")).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_basic_auth_header_value() {
        let value = basic_auth_header("user", "pass").unwrap();
        assert_eq!(value.to_str().unwrap(), "Basic dXNlcjpwYXNz");
        assert!(value.is_sensitive());
    }

    #[tokio::test]
    async fn test_fetch_success_logs_nothing() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Hi</h1>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let logger = Arc::new(MemoryLogger::new());
        let config = config_for(&mock_server.uri());
        let fetcher = HttpFetcher::new(&config, logger.clone())?;
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1"))?;

        let response = fetcher.fetch(&uri).await?;
        assert!(response.is_ok());
        assert_eq!(response.body, "<h1>Hi</h1>");
        assert!(logger.events().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_non_200_returns_response_and_logs_once() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&mock_server)
            .await;

        let logger = Arc::new(MemoryLogger::new());
        let config = config_for(&mock_server.uri());
        let fetcher = HttpFetcher::new(&config, logger.clone())?;
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1"))?;

        let response = fetcher.fetch(&uri).await?;
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "oops");

        let events = logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code, UPSTREAM_STATUS_CODE);
        assert_eq!(events[0].severity, Severity::Error);
        assert!(events[0].message.contains("500"));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_transport_failure_logs_once() -> anyhow::Result<()> {
        // Bind and drop a server so the port is very likely closed.
        let closed_uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let logger = Arc::new(MemoryLogger::new());
        let config = config_for(&closed_uri);
        let fetcher = HttpFetcher::with_timeout(
            &config,
            Some(Duration::from_millis(500)),
            logger.clone(),
        )?;
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1"))?;

        let result = fetcher.fetch(&uri).await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
        assert_eq!(logger.with_code(TRANSPORT_FAILURE_CODE).len(), 1);
        assert_eq!(logger.events().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_timeout_still_connects() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Hi</h1>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let logger = Arc::new(MemoryLogger::new());
        let mut config = config_for(&mock_server.uri());
        config.timeout = 0;
        let fetcher = HttpFetcher::new(&config, logger.clone())?;
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1"))?;

        let response = fetcher.fetch(&uri).await?;
        assert!(response.is_ok());
        assert!(logger.events().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_sends_basic_auth_when_configured() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .and(header("Authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = config_for(&mock_server.uri());
        config.username = Some("user".into());
        config.password = Some("pass".into());
        let fetcher = HttpFetcher::new(&config, Arc::new(MemoryLogger::new()))?;
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1"))?;

        let response = fetcher.fetch(&uri).await?;
        assert_eq!(response.status, 200);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_omits_auth_when_credentials_empty() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let mut config = config_for(&mock_server.uri());
        config.username = Some("user".into());
        config.password = Some(String::new());
        let fetcher = HttpFetcher::new(&config, Arc::new(MemoryLogger::new()))?;
        let uri = build_request_uri(&config, &RequestSpec::new("", "page", "h1"))?;
        fetcher.fetch(&uri).await?;

        let requests = mock_server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_sends_merged_query() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .and(query_param("lang", "de"))
            .and(query_param("format", "html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = config_for(&mock_server.uri());
        config.parameters.insert("format".into(), "html".into());
        config.parameters.insert("lang".into(), "en".into());
        let fetcher = HttpFetcher::new(&config, Arc::new(MemoryLogger::new()))?;
        let request = RequestSpec::new("", "page", "h1").with_parameter("lang", "de");
        let uri = build_request_uri(&config, &request)?;

        let response = fetcher.fetch(&uri).await?;
        assert_eq!(response.body, "ok");
        Ok(())
    }
}
