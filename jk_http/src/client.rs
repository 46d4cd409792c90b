use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use reqwest::ClientBuilder;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderValue;
use tracing::debug;

use crate::errors::ClientError;
use crate::transport::RawResponse;
use crate::transport::Transport;
use crate::transport::TransportError;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("jikan-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP client.
///
/// `request_timeout` is a hard cap on the connection. The per-attempt timeout
/// that drives retries lives in [`RetryConfig`](crate::RetryConfig) and should
/// be shorter.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host (default: 4)
    pub pool_max_idle_per_host: usize,

    /// Idle timeout for connections (default: 90s)
    pub pool_idle_timeout: Duration,

    /// Connection establishment timeout (default: 5s)
    pub connect_timeout: Duration,

    /// Total request timeout (default: 30s)
    pub request_timeout: Duration,

    /// TCP keepalive interval (default: 60s)
    pub tcp_keepalive: Duration,

    /// Enable TCP_NODELAY (default: true)
    pub tcp_nodelay: bool,

    /// Enable Hickory DNS for async resolution (default: true)
    pub hickory_dns: bool,

    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 4,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
            hickory_dns: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    /// Short timeouts for user-facing lookups.
    pub fn interactive() -> Self {
        Self {
            pool_max_idle_per_host: 2,
            pool_idle_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(15),
            tcp_keepalive: Duration::from_secs(30),
            ..Default::default()
        }
    }

    /// Longer-lived pool for paginated crawls.
    pub fn batch() -> Self {
        Self { pool_max_idle_per_host: 8, pool_idle_timeout: Duration::from_secs(120), ..Default::default() }
    }
}

/// reqwest-backed [`Transport`]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, ClientError> {
        let mut builder = ClientBuilder::new()
            // Connection pooling
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            // TCP optimization
            .tcp_nodelay(config.tcp_nodelay)
            .tcp_keepalive(Some(config.tcp_keepalive))
            // Timeouts
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            // TLS with rustls
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            // Compression
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone());

        // Hickory DNS for async resolution
        if config.hickory_dns {
            builder = builder.hickory_dns(true);
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Issue a GET and read the whole body
    pub async fn fetch(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url).header(ACCEPT, HeaderValue::from_static("application/json")).send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(url, status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, headers, body })
    }
}

impl Transport for HttpClient {
    fn get<'a>(&'a self, url: &'a str) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>> {
        Box::pin(self.fetch(url))
    }
}
