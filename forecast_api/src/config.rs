//! Server configuration read from the environment

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Listen on every interface unless `HOST` says otherwise
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Port used unless `PORT` says otherwise
pub const DEFAULT_PORT: u16 = 5000;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `HOST` is not an IP address
    #[error("HOST must be an IP address, got '{0}'")]
    InvalidHost(String),

    /// `PORT` is not a valid port number
    #[error("PORT must be a number between 0 and 65535, got '{0}'")]
    InvalidPort(String),
}

/// Address the server binds to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `HOST` and `PORT`, falling back to `0.0.0.0:5000`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(env::var("HOST").ok(), env::var("PORT").ok())
    }

    /// Build a configuration from optional raw values
    pub fn from_values(host: Option<String>, port: Option<String>) -> Result<Self, ConfigError> {
        let host = match host {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(raw))?,
            None => DEFAULT_HOST,
        };
        let port = match port {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_values(None, None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config =
            ServerConfig::from_values(Some("127.0.0.1".into()), Some(" 8080 ".into())).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            ServerConfig::from_values(Some("localhost".into()), None),
            Err(ConfigError::InvalidHost("localhost".into()))
        );
        assert_eq!(
            ServerConfig::from_values(None, Some("70000".into())),
            Err(ConfigError::InvalidPort("70000".into()))
        );
    }
}
