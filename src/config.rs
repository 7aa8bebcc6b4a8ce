use std::{env, net::SocketAddr};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_NEWS_BASE_URL: &str = "https://techcrunch.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub telemetry_connection_string: Option<String>,
    pub managed_identity_client_id: Option<String>,
    pub news_base_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("NEWS_BASE_URL must be an http or https URL")]
    InvalidNewsBaseUrl,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

/// What the server knows about its hosting environment, without secret values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnvironment {
    pub bind_addr: String,
    pub port: u16,
    pub telemetry_configured: bool,
    pub managed_identity_configured: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let port = non_empty("PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        let news_base_url = non_empty("NEWS_BASE_URL")
            .unwrap_or_else(|| DEFAULT_NEWS_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !(news_base_url.starts_with("http://") || news_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidNewsBaseUrl);
        }

        let config = Self {
            bind_addr,
            port,
            telemetry_connection_string: non_empty("APPLICATIONINSIGHTS_CONNECTION_STRING"),
            managed_identity_client_id: non_empty("AZURE_CLIENT_ID"),
            news_base_url,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    pub fn environment(&self) -> ServerEnvironment {
        ServerEnvironment {
            bind_addr: self.bind_addr.clone(),
            port: self.port,
            telemetry_configured: self.telemetry_connection_string.is_some(),
            managed_identity_configured: self.managed_identity_client_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = parse(&[]).expect("config should parse");
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.news_base_url, "https://techcrunch.com");
        assert_eq!(config.telemetry_connection_string, None);
        assert_eq!(config.managed_identity_client_id, None);
    }

    #[test]
    fn invalid_port_fails() {
        let err = parse(&[("PORT", "eighty")]).expect_err("expected invalid port");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let err = parse(&[("BIND_ADDR", "not an address")]).expect_err("expected bad socket");
        assert!(matches!(err, ConfigError::InvalidSocket));
    }

    #[test]
    fn blank_optional_values_are_unset() {
        let config = parse(&[
            ("APPLICATIONINSIGHTS_CONNECTION_STRING", "   "),
            ("AZURE_CLIENT_ID", ""),
        ])
        .expect("config should parse");

        let environment = config.environment();
        assert!(!environment.telemetry_configured);
        assert!(!environment.managed_identity_configured);
    }

    #[test]
    fn environment_reports_configured_collaborators() {
        let config = parse(&[
            ("PORT", "8080"),
            ("APPLICATIONINSIGHTS_CONNECTION_STRING", "InstrumentationKey=abc"),
            ("AZURE_CLIENT_ID", "00000000-0000-0000-0000-000000000000"),
        ])
        .expect("config should parse");

        assert_eq!(
            config.environment(),
            ServerEnvironment {
                bind_addr: "0.0.0.0".to_string(),
                port: 8080,
                telemetry_configured: true,
                managed_identity_configured: true,
            }
        );
    }

    #[test]
    fn news_base_url_must_be_http() {
        let err = parse(&[("NEWS_BASE_URL", "ftp://example.com")]).expect_err("expected bad url");
        assert!(matches!(err, ConfigError::InvalidNewsBaseUrl));

        let config =
            parse(&[("NEWS_BASE_URL", "http://localhost:9000/")]).expect("config should parse");
        assert_eq!(config.news_base_url, "http://localhost:9000");
    }
}
