//! Configuration for the access pipeline.
//!
//! Fields with defaults can be omitted when loading from environment
//! variables.

use crate::retry::RetryPolicy;
use crate::session::EmailDomain;
use crate::timeout::SafetyTimeout;
use chrono::Duration;
use serde::Deserialize;

/// Access-control configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// The trusted organizational email domain granting automatic admin
    /// access (e.g. "terrace.example").
    pub trusted_domain: EmailDomain,

    /// How long a resolved role stays cached, in minutes.
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: i64,

    /// Upper bound on a pending permission check, in seconds.
    #[serde(default = "default_safety_timeout_seconds")]
    pub safety_timeout_seconds: u64,

    /// Retry behavior for role lookups.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry settings for role lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff unit in seconds.
    #[serde(default = "default_backoff_unit_seconds")]
    pub backoff_unit_seconds: u64,
}

fn default_cache_ttl_minutes() -> i64 {
    30
}

fn default_safety_timeout_seconds() -> u64 {
    45
}

fn default_max_attempts() -> u32 {
    RetryPolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_unit_seconds() -> u64 {
    1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit_seconds: default_backoff_unit_seconds(),
        }
    }
}

impl RetryConfig {
    /// Builds the retry policy described by this configuration.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            std::time::Duration::from_secs(self.backoff_unit_seconds),
        )
    }
}

impl AccessConfig {
    /// Returns the cache TTL as a chrono duration.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::minutes(self.cache_ttl_minutes)
    }

    /// Builds the safety timeout described by this configuration.
    #[must_use]
    pub fn safety_timeout(&self) -> SafetyTimeout {
        SafetyTimeout::new(std::time::Duration::from_secs(self.safety_timeout_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_with_defaults() {
        let json = r#"{ "trusted_domain": "terrace.example" }"#;
        let config: AccessConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.trusted_domain.as_str(), "terrace.example");
        assert_eq!(config.cache_ttl_minutes, 30);
        assert_eq!(config.safety_timeout_seconds, 45);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_unit_seconds, 1);
    }

    #[test]
    fn trusted_domain_normalizes_on_deserialize() {
        let json = r#"{ "trusted_domain": "@Terrace.Example" }"#;
        let config: AccessConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.trusted_domain.as_str(), "terrace.example");
    }

    #[test]
    fn retry_config_builds_policy() {
        let config = RetryConfig {
            max_attempts: 2,
            backoff_unit_seconds: 5,
        };
        let policy = config.policy();
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delay_after(1), std::time::Duration::from_secs(5));
    }

    #[test]
    fn access_config_builds_components() {
        let json = r#"{
            "trusted_domain": "terrace.example",
            "cache_ttl_minutes": 5,
            "safety_timeout_seconds": 10
        }"#;
        let config: AccessConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.cache_ttl(), Duration::minutes(5));
        assert_eq!(
            config.safety_timeout().limit(),
            std::time::Duration::from_secs(10)
        );
    }
}
