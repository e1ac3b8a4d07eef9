//! Close CRM extractor - Rust Library
//!
//! Incrementally syncs Close leads and activities into a newline-delimited
//! JSON message stream with per-page bookmarks.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod schema;
pub mod sync;

pub use error::{AppError, ApiError, Result};

/// Initialize logging on stderr; stdout carries the message stream.
///
/// `RUST_LOG`, when set, replaces the verbosity-derived default.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(verbose))
        .init();
}

fn log_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_follows_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(log_filter(false).max_level_hint(), Some(tracing::Level::INFO.into()));
        assert_eq!(log_filter(true).max_level_hint(), Some(tracing::Level::DEBUG.into()));
    }
}
