//! API client module

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod metrics;
pub mod paginator;
pub mod rate_limiter;
pub mod retry;

pub use auth::Credentials;
pub use client::CloseClient;
pub use paginator::Paginator;
pub use rate_limiter::RateLimiter;
pub use retry::RetryPolicy;
