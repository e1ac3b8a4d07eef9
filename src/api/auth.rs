//! Request authentication for the Close API
//!
//! Close uses HTTP basic auth with the API key as the username and an
//! empty password.

use reqwest::header::USER_AGENT;
use reqwest::RequestBuilder;

use crate::config::Config;

/// Credentials applied to every outgoing request
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    user_agent: Option<String>,
}

impl Credentials {
    pub fn new(api_key: &str, user_agent: Option<&str>) -> Self {
        Self {
            api_key: api_key.to_string(),
            user_agent: user_agent.map(str::to_string),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_key, config.user_agent.as_deref())
    }

    /// Attach basic auth and, if configured, the User-Agent header
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.basic_auth(&self.api_key, Some(""));
        match &self.user_agent {
            Some(agent) => request.header(USER_AGENT, agent),
            None => request,
        }
    }
}

// Keep the key out of debug logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let creds = Credentials::new("secret-key", Some("agent/1.0"));
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("agent/1.0"));
    }
}
