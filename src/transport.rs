//! HTTP transport with host failover.
//!
//! A logical request walks the ranked host list: network failures,
//! timeouts and 5xx answers move on to the next host, 4xx answers are
//! returned to the caller untouched.

use crate::cache::{NullCache, ResponseCache};
use crate::config::{ClientConfig, HostConfig};
use crate::error::{AlgoliaError, Result};
use crate::host::{CallType, HostRanker, Outcome, StatefulHost};
use crate::request::ApiRequest;
use crate::tracker::{StatsSnapshot, StatsTracker};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Maximum number of body characters kept in error messages.
const MAX_ERROR_BODY: usize = 500;

/// Failure of a single attempt against one host.
enum AttemptError {
    /// Try the next host.
    Retryable { outcome: Outcome, message: String },
    /// Stop and return to the caller.
    Fatal(AlgoliaError),
}

/// Shared HTTP transport for one API.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    config: Arc<ClientConfig>,
    hosts: Arc<HostRanker>,
    cache: Arc<dyn ResponseCache>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
    stats: Arc<StatsTracker>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("app_id", &self.config.app_id)
            .field("hosts", &self.hosts)
            .field("cache", &self.cache)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Create a transport over `hosts`.
    pub fn new(config: Arc<ClientConfig>, hosts: Vec<HostConfig>) -> Result<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert("x-algolia-application-id", header_value(&config.app_id)?);
        headers.insert("x-algolia-api-key", header_value(&config.api_key)?);

        for (name, value) in &config.default_headers {
            let name = header::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                AlgoliaError::InvalidConfig(format!("invalid header name '{name}': {e}"))
            })?;
            headers.insert(name, header_value(value)?);
        }

        let client = Client::builder()
            .connect_timeout(config.timeouts.connect)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent(format!("Algolia for Rust ({})", crate::VERSION))
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(AlgoliaError::HttpRequest)?;

        let rate_limiter = config
            .rate_limit_nonzero()
            .map(|rate| Quota::per_second(rate).allow_burst(nonzero!(1u32)))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            hosts: Arc::new(HostRanker::new(hosts, config.host_cooldown)?),
            config,
            cache: Arc::new(NullCache),
            rate_limiter,
            stats: Arc::new(StatsTracker::new()),
        })
    }

    /// Use `cache` for read requests.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Host ranker of this transport.
    pub fn hosts(&self) -> &HostRanker {
        &self.hosts
    }

    /// Current request statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Send a request and decode the response body.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let value = self.execute_value(request).await?;
        serde_json::from_value(value).map_err(AlgoliaError::Json)
    }

    /// Send a request and return the raw JSON body.
    pub async fn execute_value(&self, request: ApiRequest) -> Result<Value> {
        let cache_key = (request.call_type == CallType::Read).then(|| request.cache_key());
        if let Some(key) = &cache_key {
            if let Some(hit) = self.cache.get(key) {
                trace!(path = %request.path, "Cache hit");
                self.stats.record_cache_hit();
                return Ok(hit);
            }
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let base_timeout = request.timeout.unwrap_or(match request.call_type {
            CallType::Read => self.config.timeouts.read,
            CallType::Write => self.config.timeouts.write,
        });
        let total_timeout = self.config.timeouts.total;
        let start = Instant::now();
        let mut attempts = 0;
        let mut errors = Vec::new();

        for host in self.hosts.tryable_hosts(request.call_type) {
            let mut timeout = host.timeout_for(base_timeout);
            if let Some(total) = total_timeout {
                let remaining = total.saturating_sub(start.elapsed());
                if remaining.is_zero() {
                    break;
                }
                timeout = timeout.min(remaining);
            }

            attempts += 1;
            let attempt_start = Instant::now();

            match self.send_once(&request, &host, timeout).await {
                Ok(body) => {
                    self.hosts
                        .decide(&host, Outcome::Success, attempt_start.elapsed());
                    self.stats.record_success(request.call_type, start.elapsed());
                    if let Some(key) = &cache_key {
                        self.cache.set(key, &body);
                    }
                    return Ok(body);
                }
                Err(AttemptError::Retryable { outcome, message }) => {
                    warn!(host = host.name(), error = %message, "Host failed");
                    self.hosts.decide(&host, outcome, attempt_start.elapsed());
                    self.stats.record_failover(outcome);
                    debug!(
                        attempt = attempts,
                        path = %request.path,
                        "Retrying on next host"
                    );
                    errors.push(format!("{}: {}", host.name(), message));
                }
                Err(AttemptError::Fatal(error)) => {
                    self.stats.record_failure(request.call_type);
                    return Err(error);
                }
            }
        }

        self.stats.record_failure(request.call_type);

        if total_timeout.is_some_and(|total| start.elapsed() >= total) {
            return Err(AlgoliaError::Timeout { attempts });
        }

        Err(AlgoliaError::RetryExhausted { attempts, errors })
    }

    /// Send a single request to one host.
    async fn send_once(
        &self,
        request: &ApiRequest,
        host: &StatefulHost,
        timeout: Duration,
    ) -> std::result::Result<Value, AttemptError> {
        let url = format!("{}{}", host.base_url(), request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        trace!(host = host.name(), method = %request.method, path = %request.path, "Sending request");

        let response = builder.send().await.map_err(|e| classify(e, timeout))?;
        let status = response.status();

        if status.is_success() {
            // A body cut short is a transport failure; only a complete body that
            // is not JSON is the caller's problem.
            let bytes = response.bytes().await.map_err(|e| classify(e, timeout))?;
            return serde_json::from_slice(&bytes).map_err(|e| {
                AttemptError::Fatal(AlgoliaError::InvalidResponse {
                    message: format!("failed to parse response: {e}"),
                })
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(
                    host = host.name(),
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read error body"
                );
                String::new()
            }
        };
        let message = error_message(&body);

        if status.is_client_error() {
            warn!(
                host = host.name(),
                status = status.as_u16(),
                "Non-retryable error"
            );
            return Err(AttemptError::Fatal(AlgoliaError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        Err(AttemptError::Retryable {
            outcome: Outcome::Retryable,
            message: format!("HTTP {}: {}", status.as_u16(), message),
        })
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Retryable {
            outcome: Outcome::Timeout,
            message: format!("timed out after {}ms", timeout.as_millis()),
        }
    } else if error.is_builder() {
        AttemptError::Fatal(AlgoliaError::HttpRequest(error))
    } else {
        AttemptError::Retryable {
            outcome: Outcome::Retryable,
            message: format!("request failed: {error}"),
        }
    }
}

fn header_value(value: &str) -> Result<header::HeaderValue> {
    header::HeaderValue::from_str(value)
        .map_err(|e| AlgoliaError::InvalidConfig(format!("invalid header value: {e}")))
}

/// Pull `message` out of an Algolia error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            if body.chars().count() > MAX_ERROR_BODY {
                let truncated: String = body.chars().take(MAX_ERROR_BODY).collect();
                format!("{truncated}...")
            } else {
                body.to_string()
            }
        })
}
