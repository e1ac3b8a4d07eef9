//! Per-stream HTTP timing metric

use std::time::Instant;

/// Times one HTTP exchange and reports it on the `metrics` target
pub struct HttpRequestTimer<'a> {
    stream: &'a str,
    started: Instant,
}

impl<'a> HttpRequestTimer<'a> {
    pub fn start(stream: &'a str) -> Self {
        Self {
            stream,
            started: Instant::now(),
        }
    }

    /// Emit the metric; `status` is `None` when no response came back
    pub fn finish(self, status: Option<u16>) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        tracing::info!(
            target: "metrics",
            metric = "http_request_duration",
            stream = self.stream,
            http_status_code = status,
            duration_ms,
        );
    }
}
