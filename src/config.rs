//! Wiki endpoint configuration.

use std::time::Duration;

use reqwest::Url;

use crate::error::{Error, Result};

/// Default Minecraft Wiki API endpoint.
pub const DEFAULT_API_URL: &str = "https://minecraft.wiki/api.php";

/// Default timeout for one API request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every API request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "minecraft-wiki-mcp/",
    env!("CARGO_PKG_VERSION"),
    " (MCP server)"
);

/// Settings for talking to a MediaWiki-compatible API.
#[derive(Debug, Clone)]
pub struct WikiConfig {
    /// `api.php` endpoint.
    pub api_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl WikiConfig {
    /// Create a configuration for the given endpoint with default settings.
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| Error::Config(format!("invalid API URL '{}': {}", api_url, e)))?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API URL must use http or https, got '{}'",
                api_url.scheme()
            )));
        }

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Set the per-request timeout. Zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WikiConfig::new(DEFAULT_API_URL).unwrap();
        assert_eq!(config.api_url.as_str(), "https://minecraft.wiki/api.php");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("minecraft-wiki-mcp/"));
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(WikiConfig::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(
            WikiConfig::new("ftp://minecraft.wiki/api.php"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_timeout_and_user_agent() {
        let config = WikiConfig::new("http://localhost:8080/api.php")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .unwrap()
            .with_user_agent("test-agent");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");

        assert!(WikiConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_timeout(Duration::ZERO)
            .is_err());
    }
}
