//! Role resolution against the hosted role store.
//!
//! One resolver, called from one place. Resolution is strictly a read: no
//! call site provisions default role rows as a side effect. Override
//! precedence, first match wins:
//!
//! 1. email in the trusted organizational domain → admin
//! 2. provider-membership row → provider
//! 3. generic role row → that role; no row or any failure → no role
//!
//! The resolver never errors out toward callers. Store failures are retried
//! under the injected [`RetryPolicy`] and then degrade to an unresolved role
//! with a logged diagnostic. User IDs are acceptable in logs; full email
//! addresses are not.

use crate::retry::RetryPolicy;
use crate::role::Role;
use crate::session::EmailDomain;
use std::sync::Arc;
use terrace_core::UserId;
use terrace_directory::{DirectoryError, RoleStore};
use tracing::{debug, instrument, warn};

/// Resolves a user's role from the identity claims and the role store.
pub struct RoleResolver {
    store: Arc<dyn RoleStore>,
    trusted_domain: EmailDomain,
    retry: RetryPolicy,
}

impl RoleResolver {
    /// Creates a resolver with the default retry policy.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>, trusted_domain: EmailDomain) -> Self {
        Self {
            store,
            trusted_domain,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the trusted organizational domain.
    #[must_use]
    pub fn trusted_domain(&self) -> &EmailDomain {
        &self.trusted_domain
    }

    /// Resolves the role for a user.
    #[instrument(skip(self, email), fields(user_id = %user_id))]
    pub async fn resolve(&self, user_id: UserId, email: Option<&str>) -> Option<Role> {
        if email.is_some_and(|email| self.trusted_domain.matches(email)) {
            debug!("trusted domain override, resolving as admin");
            return Some(Role::Admin);
        }

        match self.lookup_with_retry(user_id).await {
            Ok(role) => role,
            Err(e) => {
                warn!(error = %e, "role lookup failed after retries, treating as unresolved");
                None
            }
        }
    }

    /// Single pass over the store relations.
    async fn lookup(&self, user_id: UserId) -> Result<Option<Role>, DirectoryError> {
        if self.store.is_provider(user_id).await? {
            debug!("provider membership found");
            return Ok(Some(Role::Provider));
        }

        let Some(value) = self.store.role_of(user_id).await? else {
            return Ok(None);
        };

        match value.parse::<Role>() {
            Ok(role) => Ok(Some(role)),
            Err(_) => {
                warn!(role = %value, "unknown value in role relation, treating as unresolved");
                Ok(None)
            }
        }
    }

    async fn lookup_with_retry(&self, user_id: UserId) -> Result<Option<Role>, DirectoryError> {
        let mut attempt = 1;
        loop {
            match self.lookup(user_id).await {
                Ok(role) => return Ok(role),
                Err(e) if attempt < self.retry.max_attempts() => {
                    warn!(attempt, error = %e, "role lookup failed, backing off");
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
                // The last attempt's result is binding.
                Err(e) => return Err(e),
            }
        }
    }
}
