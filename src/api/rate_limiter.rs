//! Close rate-limit handling
//!
//! Close reports the remaining quota and the seconds until it resets on
//! every response. A 429 body additionally carries `rate_reset`.

use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::time::sleep;

pub const REMAINING_HEADER: &str = "X-Rate-Limit-Remaining";
pub const RESET_HEADER: &str = "X-Rate-Limit-Reset";

/// Reads rate-limit signals off responses and sleeps them out
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Wait used when a 429 carries no reset interval at all
    pub default_reset: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            default_reset: Duration::from_secs(1),
        }
    }

    /// Wait required when the quota header reads zero
    pub fn quota_wait(&self, headers: &HeaderMap) -> Option<Duration> {
        let remaining = header_str(headers, REMAINING_HEADER)?;
        if remaining.trim() != "0" {
            return None;
        }
        Some(header_str(headers, RESET_HEADER).and_then(parse_seconds).unwrap_or(self.default_reset))
    }

    /// Wait before replaying a request that came back 429
    pub fn reset_after_429(&self, headers: &HeaderMap, body: &str) -> Duration {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| json.get("rate_reset").and_then(seconds_from_json))
            .or_else(|| header_str(headers, RESET_HEADER).and_then(parse_seconds))
            .unwrap_or(self.default_reset)
    }

    pub async fn wait(&self, duration: Duration, reason: &str) {
        tracing::warn!(
            "{}, sleeping {:.1} seconds",
            reason,
            duration.as_secs_f64()
        );
        if !duration.is_zero() {
            sleep(duration).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs.max(0.0)).ok())
}

fn seconds_from_json(value: &serde_json::Value) -> Option<Duration> {
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs.max(0.0)).ok()),
        serde_json::Value::String(s) => parse_seconds(s),
        _ => None,
    }
}
