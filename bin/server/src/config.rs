//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the gateway,
//! loaded via the `config` crate from environment variables.
//!
//! See [`AccessConfig`](terrace_access::AccessConfig) for the access-control
//! configuration.

use serde::Deserialize;
use terrace_access::AccessConfig;

/// Gateway configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Connection URL for the hosted database. When absent, the gateway
    /// falls back to an in-memory role store.
    pub database_url: Option<String>,

    /// Access-control configuration.
    pub access: AccessConfig,

    /// Hosted identity provider configuration.
    pub identity: IdentityProviderConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Connection settings for the hosted identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProviderConfig {
    /// Base URL of the provider's REST API.
    pub url: String,

    /// Public API key sent with every request.
    pub api_key: String,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cleanup_interval_seconds, 300);
        assert!(config.secure_cookies);
    }

    #[test]
    fn default_listen_addr_is_local() {
        assert_eq!(default_listen_addr(), "127.0.0.1:3000");
    }
}
