//! Development fallback policy.
//!
//! A deliberately permissive escape hatch for local development against an
//! empty or unseeded role store: resolution failures, timeouts, and missing
//! role assignments resolve to granted instead of denied.
//!
//! The whole module only exists under the `dev-fallback` cargo feature, which
//! is off by default. Production builds cannot reach this policy.

use std::env;

/// Environment variable that activates the fallback at runtime.
pub const ENV_VAR: &str = "TERRACE_DEV_FALLBACK";

/// Permissive access policy for local development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevelopmentFallback {
    active: bool,
}

impl DevelopmentFallback {
    /// Creates an unconditionally active fallback.
    #[must_use]
    pub fn enabled() -> Self {
        Self { active: true }
    }

    /// Derives activation from the runtime environment: a debug build, a
    /// truthy `TERRACE_DEV_FALLBACK`, or a hostname containing `localhost`.
    #[must_use]
    pub fn from_environment() -> Self {
        let env_flag = env::var(ENV_VAR)
            .is_ok_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));
        let localhost = env::var("HOSTNAME").is_ok_and(|h| h.contains("localhost"));
        Self {
            active: cfg!(debug_assertions) || env_flag || localhost,
        }
    }

    /// Returns true when the fallback should grant access.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_is_active() {
        assert!(DevelopmentFallback::enabled().is_active());
    }
}
