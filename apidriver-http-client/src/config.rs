//! HTTP client configuration.

use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Transport settings shared by every request of a client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Default request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Headers sent with every request unless the request sets the same name.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: Vec::new(),
            user_agent: format!("apidriver/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Default headers as a map, one value per name. Later entries win and
    /// invalid entries are skipped.
    pub fn default_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping invalid default header"),
            }
        }
        headers
    }
}

/// Builder for HTTP client configuration.
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Add a default header, replacing an earlier one with the same name.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.config
            .default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.config.default_headers.push((name, value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_replaces_same_name() {
        let config = HttpClientConfig::builder()
            .default_header("X-Env", "staging")
            .default_header("x-env", "prod")
            .default_header("Accept", "application/json")
            .build();

        assert_eq!(config.default_headers.len(), 2);
        let map = config.default_header_map();
        assert_eq!(map.get("x-env").unwrap(), "prod");
        assert_eq!(map.get("accept").unwrap(), "application/json");
    }

    #[test]
    fn test_invalid_default_header_is_skipped() {
        let config = HttpClientConfig {
            default_headers: vec![
                ("bad header".to_string(), "x".to_string()),
                ("X-Ok".to_string(), "1".to_string()),
            ],
            ..HttpClientConfig::default()
        };

        let map = config.default_header_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("x-ok").unwrap(), "1");
    }
}
