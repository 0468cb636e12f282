//! Configuration structures for Linode API clients.
//!
//! Configuration is an explicit value handed to the client at construction.
//! Nothing here is process-wide state.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default API root.
pub const DEFAULT_API_URL: &str = "https://api.linode.com";

/// Default versioned path prefix.
pub const DEFAULT_API_VERSION: &str = "v4";

/// Configuration for a Linode API client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LinodeClientConfig {
    /// API root URL, without the version prefix
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Versioned path prefix (e.g. `v4`)
    #[validate(length(min = 1))]
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Personal access token sent as a bearer credential
    #[serde(skip)]
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional User-Agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl LinodeClientConfig {
    /// Create a configuration for the given API root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is blank or fails validation.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };

        config.check()?;
        Ok(config)
    }

    /// Validate the configuration, mapping failures to [`Error::Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API root is unset or any field is out of range.
    pub fn check(&self) -> Result<(), Error> {
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("API root URL is not set".to_string()));
        }

        self.validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the versioned path prefix.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Override the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the API root URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unset or cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("API root URL is not set".to_string()));
        }
        Url::parse(&self.api_url).map_err(|e| Error::Config(format!("Invalid API URL: {e}")))
    }
}

impl Default for LinodeClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_version: default_api_version(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_new() {
        let config = LinodeClientConfig::new("https://api.example.com").unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.api_version, "v4");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_config_invalid_url() {
        assert!(matches!(
            LinodeClientConfig::new("not-a-url"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_config_blank_url() {
        let err = LinodeClientConfig::new("  ").unwrap_err();
        assert_eq!(err, Error::Config("API root URL is not set".to_string()));

        let config = LinodeClientConfig {
            api_url: String::new(),
            ..LinodeClientConfig::default()
        };
        assert!(matches!(config.parse_api_url(), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = LinodeClientConfig::new("https://api.example.com")
            .unwrap()
            .with_token("secret-token")
            .with_api_version("v4beta")
            .with_timeout(60)
            .with_user_agent("csi-driver/1.0");

        assert_eq!(
            config.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("secret-token".to_string())
        );
        assert_eq!(config.api_version, "v4beta");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.user_agent.as_deref(), Some("csi-driver/1.0"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = LinodeClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.check().is_err());

        config.request_timeout_secs = 301;
        assert!(config.check().is_err());

        config.request_timeout_secs = 30;
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_token_is_not_serialized() {
        let config = LinodeClientConfig::default().with_token("secret-token");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(!json.contains("token"));

        let back: LinodeClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_url, DEFAULT_API_URL);
        assert!(back.token.is_none());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: LinodeClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
