use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, ClientBuilder,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::errors::RemoteCallError;

const MAX_ERROR_BODY_CHARS: usize = 256;

/// Configuration for the shared perspective HTTP client.
///
/// `max_concurrent_requests` bounds the number of simultaneously open calls across every
/// request in the process; `pool_idle_timeout_seconds` is the keep-alive of pooled
/// connections. A call that finds every permit taken queues for one within its own timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent outbound calls (default: 256)
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Keep-alive for idle pooled connections, in seconds (default: 30)
    #[serde(default = "default_pool_idle_timeout_seconds")]
    pub pool_idle_timeout_seconds: u64,

    /// Idle connections kept per perspective host (default: 32)
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// TCP/TLS connect timeout, in milliseconds (default: 2000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_max_concurrent_requests() -> usize {
    256
}

fn default_pool_idle_timeout_seconds() -> u64 {
    30
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            pool_idle_timeout_seconds: default_pool_idle_timeout_seconds(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Pooled HTTP client with semaphore-based concurrency control.
///
/// One instance is built at startup and shared by every coordination. Calls are never
/// retried here.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
}

/// RAII guard ensuring semaphore permits are always released.
///
/// Uses [`OwnedSemaphorePermit`] which owns an `Arc` to the semaphore,
/// making it safe to hold across async boundaries.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl PermitGuard {
    fn new(permit: OwnedSemaphorePermit, semaphore: Arc<Semaphore>) -> Self {
        Self { _permit: permit, semaphore }
    }

    fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, RemoteCallError> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Creates a client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: &HttpClientConfig) -> Result<Self, RemoteCallError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_seconds))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("mpic-coordinator/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(config.pool_idle_timeout_seconds))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                RemoteCallError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        let concurrent_limit = Arc::new(Semaphore::new(config.max_concurrent_requests));
        Ok(Self { client, concurrent_limit })
    }

    /// Sanitizes network errors so perspective URLs don't leak into responses.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_redirect() {
            "unexpected redirect".to_string()
        } else {
            "network error".to_string()
        }
    }

    fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, RemoteCallError> {
        let mut map = HeaderMap::with_capacity(headers.len() + 1);
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                RemoteCallError::InvalidRequest(format!("invalid header name: {name}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                RemoteCallError::InvalidRequest(format!("invalid value for header {name}"))
            })?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Sends a JSON POST and returns the raw success body.
    ///
    /// `timeout` covers the whole call: time spent queued for a permit is deducted from the
    /// time the request itself may take.
    ///
    /// # Errors
    ///
    /// - [`RemoteCallError::Shutdown`] once [`Self::shutdown`] has been called
    /// - [`RemoteCallError::ConcurrencyLimit`] if no permit frees up within `timeout`
    /// - [`RemoteCallError::Timeout`] if the call exceeds `timeout`
    /// - [`RemoteCallError::HttpError`] for non-success HTTP status codes
    /// - [`RemoteCallError::ConnectionFailed`] for other network failures
    pub async fn post_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, RemoteCallError> {
        let header_map = Self::build_headers(headers)?;
        let started = Instant::now();

        let acquire = Arc::clone(&self.concurrent_limit).acquire_owned();
        let permit = tokio::time::timeout(timeout, acquire)
            .await
            .map_err(|_| {
                tracing::warn!(
                    available_permits = self.concurrent_limit.available_permits(),
                    "http client permit acquisition timeout"
                );
                RemoteCallError::ConcurrencyLimit("no connection permit available".to_string())
            })?
            .map_err(|_| RemoteCallError::Shutdown)?;

        let permit_guard = PermitGuard::new(permit, Arc::clone(&self.concurrent_limit));

        let remaining = timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(RemoteCallError::Timeout);
        }

        tracing::trace!(
            available_permits = permit_guard.available_permits(),
            waited_ms = started.elapsed().as_millis(),
            "http request started"
        );

        let response = self
            .client
            .post(url)
            .headers(header_map)
            .body(body)
            .timeout(remaining)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteCallError::Timeout
                } else {
                    RemoteCallError::ConnectionFailed(Self::sanitize_network_error(&e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw_text = response.text().await.unwrap_or_default();
            let truncated: String = raw_text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::trace!(
                status = status.as_u16(),
                available_permits = permit_guard.available_permits(),
                "http request failed"
            );
            return Err(RemoteCallError::HttpError(status.as_u16(), truncated));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RemoteCallError::Timeout
            } else {
                RemoteCallError::ConnectionFailed(Self::sanitize_network_error(&e))
            }
        })?;

        tracing::trace!(
            available_permits = permit_guard.available_permits(),
            "http request completed"
        );
        Ok(bytes)
    }

    /// Stops handing out connection permits. In-flight calls finish; new calls fail with
    /// [`RemoteCallError::Shutdown`].
    pub fn shutdown(&self) {
        self.concurrent_limit.close();
        tracing::debug!("http client shut down");
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.concurrent_limit.is_closed()
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
