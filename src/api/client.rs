//! Close REST API client
//!
//! Every request goes through the same pipeline: basic auth, a bounded
//! 429 sleep-and-replay loop, the quota-header pause, and exponential
//! backoff for transport failures and 5xx responses.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use super::auth::Credentials;
use super::endpoints::{self, paths, ListParams};
use super::metrics::HttpRequestTimer;
use super::rate_limiter::RateLimiter;
use super::retry::RetryPolicy;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::ListResponse;

/// Close API client
#[derive(Clone)]
pub struct CloseClient {
    /// HTTP client
    http: reqwest::Client,
    /// API root (e.g., "https://app.close.io/api/v1")
    base_url: String,
    credentials: Credentials,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
}

impl CloseClient {
    /// Create a new client from connector config
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            credentials: Credentials::from_config(config),
            rate_limiter: RateLimiter::new(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and parse the JSON body, retrying per the policy.
    ///
    /// `stream` only labels the timing metric.
    pub async fn get<T, Q>(&self, stream: &str, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut attempt = 1;

        loop {
            match self.request_with_handling(stream, &url, query).await {
                Ok(body) => return Ok(body),
                Err(e) if self.retry.should_retry(&e, attempt) => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}): {}. Backing off {:.1}s",
                        url,
                        attempt,
                        self.retry.max_attempts,
                        e,
                        delay.as_secs_f64()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One logical request: replays on 429 (not counted as a failed attempt)
    /// and pauses when the quota header reads zero.
    async fn request_with_handling<T, Q>(&self, stream: &str, url: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut waits = 0;

        loop {
            let timer = HttpRequestTimer::start(stream);
            let sent = self
                .credentials
                .apply(self.http.get(url).query(query))
                .send()
                .await;

            let response = match sent {
                Ok(response) => {
                    timer.finish(Some(response.status().as_u16()));
                    response
                }
                Err(e) => {
                    timer.finish(None);
                    return Err(e.into());
                }
            };

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;

            if status == StatusCode::TOO_MANY_REQUESTS {
                if waits >= self.retry.max_rate_limit_waits {
                    return Err(ApiError::RateLimited {
                        url: url.to_string(),
                        waits,
                    });
                }
                let reset = self.rate_limiter.reset_after_429(&headers, &body);
                self.rate_limiter
                    .wait(reset, &format!("Rate limited on {}", url))
                    .await;
                waits += 1;
                continue;
            }

            if status.is_client_error() {
                return Err(ApiError::Client {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            if !status.is_success() {
                return Err(ApiError::Server {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            if let Some(reset) = self.rate_limiter.quota_wait(&headers) {
                self.rate_limiter
                    .wait(reset, "Rate limit quota exhausted")
                    .await;
            }

            return serde_json::from_str(&body).map_err(|e| {
                tracing::error!(
                    "JSON parse error for {}: {}. Body: {}",
                    url,
                    e,
                    truncate_for_log(&body, 1000)
                );
                ApiError::InvalidResponse {
                    url: url.to_string(),
                    message: format!("Failed to parse response: {}", e),
                }
            });
        }
    }

    // ==================== API Methods ====================

    /// Fetch one page of a list endpoint
    pub async fn get_list(
        &self,
        stream: &str,
        path: &str,
        params: &ListParams,
    ) -> ApiResult<ListResponse> {
        self.get(stream, path, params).await
    }

    /// Fetch a fully populated contact
    pub async fn get_contact(&self, stream: &str, contact_id: &str) -> ApiResult<Value> {
        self.get(stream, &endpoints::contact_by_id(contact_id), &())
            .await
    }

    /// Single small request used to verify the API key and connectivity
    pub async fn check_connection(&self) -> ApiResult<()> {
        let params = ListParams::new().limit(10);
        let _: ListResponse = self.get("leads", paths::LEADS, &params).await?;
        Ok(())
    }
}

/// First `max_chars` characters of `body`, cut on a char boundary
fn truncate_for_log(body: &str, max_chars: usize) -> &str {
    body.char_indices()
        .nth(max_chars)
        .map_or(body, |(end, _)| &body[..end])
}
