//! Config file model

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};

/// Default Close REST API root
pub const DEFAULT_BASE_URL: &str = "https://app.close.io/api/v1";

/// Connector configuration, read from the `--config` JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Close API key, sent as the basic-auth username
    pub api_key: String,
    /// Optional User-Agent header for every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Watermark floor for streams with no saved state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// API root override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            user_agent: None,
            start_date: None,
            base_url: None,
        }
    }

    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Could not read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config("api_key must not be empty".into()));
        }
        if let Some(start_date) = &self.start_date {
            if crate::normalize::parse_timestamp(start_date).is_none() {
                return Err(AppError::Config(format!(
                    "start_date is not a recognizable timestamp: {}",
                    start_date
                )));
            }
        }
        Ok(())
    }

    /// API root without a trailing slash
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}
