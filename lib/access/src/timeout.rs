//! Safety timeout bounding how long a permission check may stay pending.
//!
//! If the role store never answers, the gate must still reach a terminal
//! decision. The timeout races the resolution future; when it elapses first,
//! the pending work is dropped (cancelled, not merely ignored) and a forced
//! decision applies.

use crate::gate::{AccessDecision, DenyReason};
use std::future::Future;
use std::time::Duration;

/// Upper bound on a pending permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyTimeout {
    limit: Duration,
}

impl SafetyTimeout {
    /// Default bound on a pending check.
    pub const DEFAULT_LIMIT: Duration = Duration::from_secs(45);

    /// Creates a timeout with a custom bound.
    #[must_use]
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// Returns the configured bound.
    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Runs `fut` under the bound. Returns `None` when the bound elapses
    /// first; the future is dropped, cancelling any in-flight retries.
    pub async fn bound<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::time::timeout(self.limit, fut).await.ok()
    }

    /// The decision forced when the bound elapses.
    ///
    /// The development fallback grants; a trusted-domain email asking for
    /// admin access grants; everything else is denied as timed out.
    #[must_use]
    pub fn forced_decision(
        &self,
        dev_fallback_active: bool,
        trusted_admin_escape: bool,
    ) -> AccessDecision {
        if dev_fallback_active || trusted_admin_escape {
            AccessDecision::Granted
        } else {
            AccessDecision::Denied(DenyReason::Timeout)
        }
    }
}

impl Default for SafetyTimeout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quick_future_completes_within_bound() {
        let timeout = SafetyTimeout::new(Duration::from_secs(1));
        let result = timeout.bound(async { 42 }).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn stalled_future_is_cancelled_at_bound() {
        let timeout = SafetyTimeout::new(Duration::from_millis(10));
        let result = timeout.bound(std::future::pending::<()>()).await;
        assert_eq!(result, None);
    }

    #[test]
    fn forced_decision_denies_by_default() {
        let timeout = SafetyTimeout::default();
        assert_eq!(
            timeout.forced_decision(false, false),
            AccessDecision::Denied(DenyReason::Timeout)
        );
    }

    #[test]
    fn forced_decision_grants_for_trusted_admin_escape() {
        let timeout = SafetyTimeout::default();
        assert_eq!(
            timeout.forced_decision(false, true),
            AccessDecision::Granted
        );
    }

    #[test]
    fn forced_decision_grants_under_dev_fallback() {
        let timeout = SafetyTimeout::default();
        assert_eq!(timeout.forced_decision(true, false), AccessDecision::Granted);
    }

    #[test]
    fn default_limit_is_45_seconds() {
        assert_eq!(SafetyTimeout::default().limit(), Duration::from_secs(45));
    }
}
