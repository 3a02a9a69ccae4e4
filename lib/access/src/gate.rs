//! The permission gate: decides whether protected content may be shown.
//!
//! The gate runs a small state machine per (session user, requirement)
//! tuple: idle until a check starts, checking while the role resolves, then
//! granted or denied. A terminal decision is replayed for the same tuple
//! until one of the inputs changes, so render-loop callers never re-trigger
//! the resolver's retry schedule.
//!
//! A required email domain is checked before any role lookup and denies
//! immediately on mismatch. Role checks consult the cache first, then the
//! resolver under the safety timeout. Every path lands on a terminal
//! decision; nothing here propagates an error to the host.

use crate::cache::RoleCache;
use crate::notify::{Notification, Notifier};
use crate::resolver::RoleResolver;
use crate::role::Role;
use crate::session::{EmailDomain, Session};
use crate::timeout::SafetyTimeout;
use std::fmt;
use std::sync::{Arc, RwLock};
use terrace_core::UserId;
use tracing::{debug, instrument};

#[cfg(feature = "dev-fallback")]
use crate::dev::DevelopmentFallback;

/// What a guarded surface requires of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    required_role: Option<Role>,
    required_domain: Option<EmailDomain>,
}

impl AccessRequirement {
    /// Requires only an authenticated session.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires the given role.
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            required_domain: None,
        }
    }

    /// Requires an email in the given domain.
    #[must_use]
    pub fn domain(domain: EmailDomain) -> Self {
        Self {
            required_role: None,
            required_domain: Some(domain),
        }
    }

    /// Adds a domain requirement.
    #[must_use]
    pub fn with_domain(mut self, domain: EmailDomain) -> Self {
        self.required_domain = Some(domain);
        self
    }

    /// Returns the required role, if any.
    #[must_use]
    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    /// Returns the required email domain, if any.
    #[must_use]
    pub fn required_domain(&self) -> Option<&EmailDomain> {
        self.required_domain.as_ref()
    }
}

/// Why access was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No session exists.
    Unauthenticated,
    /// The session's email is outside the required domain.
    DomainMismatch,
    /// The resolved role does not satisfy the required role.
    RoleMismatch { held: Role, required: Role },
    /// No role could be resolved for the user.
    NoRoleAssigned,
    /// The safety timeout elapsed before a decision was reached.
    Timeout,
}

impl DenyReason {
    /// Short machine-readable cause, used in deduplication keys.
    #[must_use]
    pub fn cause(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::DomainMismatch => "domain-mismatch",
            Self::RoleMismatch { .. } => "role-mismatch",
            Self::NoRoleAssigned => "no-role",
            Self::Timeout => "timeout",
        }
    }

    /// User-facing message for the denial notification.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Unauthenticated => "Sign in to continue.".to_string(),
            Self::DomainMismatch => {
                "Your account's email domain does not grant access to this area.".to_string()
            }
            Self::RoleMismatch { held, required } => {
                format!("Your role '{held}' does not grant '{required}' access.")
            }
            Self::NoRoleAssigned => "No role is assigned to your account.".to_string(),
            Self::Timeout => "The permission check timed out.".to_string(),
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Tri-state outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// A check for this input tuple is still in flight.
    Pending,
    /// Access granted; render the protected content.
    Granted,
    /// Access denied; redirect the user.
    Denied(DenyReason),
}

impl AccessDecision {
    /// Returns true if access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns true once a terminal decision has been reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Where to send the user, if anywhere.
    #[must_use]
    pub fn redirect_target(&self) -> Option<RedirectTarget> {
        match self {
            Self::Denied(DenyReason::Unauthenticated) => Some(RedirectTarget::Login),
            Self::Denied(_) => Some(RedirectTarget::AccessDenied),
            Self::Granted | Self::Pending => None,
        }
    }
}

/// Navigation target for a redirect side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The sign-in page.
    Login,
    /// The access-denied page.
    AccessDenied,
    /// The role-specific landing page.
    Landing(Role),
}

impl RedirectTarget {
    /// Returns the path for this target.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::AccessDenied => "/access-denied",
            Self::Landing(role) => role.landing_path(),
        }
    }
}

/// The inputs a decision was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DecisionKey {
    user: Option<UserId>,
    requirement: AccessRequirement,
}

/// Decides whether to render protected content for the current session.
pub struct PermissionGate {
    resolver: RoleResolver,
    cache: Arc<dyn RoleCache>,
    notifier: Arc<dyn Notifier>,
    timeout: SafetyTimeout,
    #[cfg(feature = "dev-fallback")]
    dev_fallback: Option<DevelopmentFallback>,
    decided: RwLock<Option<(DecisionKey, AccessDecision)>>,
}

impl PermissionGate {
    /// Creates a gate with the default safety timeout.
    #[must_use]
    pub fn new(
        resolver: RoleResolver,
        cache: Arc<dyn RoleCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver,
            cache,
            notifier,
            timeout: SafetyTimeout::default(),
            #[cfg(feature = "dev-fallback")]
            dev_fallback: None,
            decided: RwLock::new(None),
        }
    }

    /// Replaces the safety timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: SafetyTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Installs the development fallback policy.
    #[cfg(feature = "dev-fallback")]
    #[must_use]
    pub fn with_development_fallback(mut self, fallback: DevelopmentFallback) -> Self {
        self.dev_fallback = Some(fallback);
        self
    }

    #[cfg(feature = "dev-fallback")]
    fn dev_fallback_active(&self) -> bool {
        self.dev_fallback.is_some_and(|f| f.is_active())
    }

    #[cfg(not(feature = "dev-fallback"))]
    fn dev_fallback_active(&self) -> bool {
        false
    }

    /// Checks whether the session may access content behind `requirement`.
    ///
    /// A terminal decision for the current input tuple is replayed without
    /// re-resolving. A concurrent check for the same tuple observes
    /// [`AccessDecision::Pending`].
    #[instrument(skip_all, fields(user_id = session.map(Session::user_id).map(tracing::field::display)))]
    pub async fn check(
        &self,
        session: Option<&Session>,
        requirement: &AccessRequirement,
    ) -> AccessDecision {
        let key = DecisionKey {
            user: session.map(Session::user_id),
            requirement: requirement.clone(),
        };

        {
            let mut decided = self.decided.write().unwrap();
            match decided.as_ref() {
                Some((stored, decision)) if *stored == key => return decision.clone(),
                _ => *decided = Some((key.clone(), AccessDecision::Pending)),
            }
        }

        let decision = self.evaluate(session, requirement).await;

        {
            let mut decided = self.decided.write().unwrap();
            // The inputs may have changed while resolving; only record the
            // decision if this check's tuple is still the current one.
            if decided.as_ref().is_some_and(|(stored, _)| *stored == key) {
                *decided = Some((key, decision.clone()));
            }
        }

        decision
    }

    /// Returns the landing page for the session's resolved role.
    ///
    /// Falls back to the standard home page when no role resolves.
    pub async fn landing(&self, session: &Session) -> RedirectTarget {
        let role = match self.cache.get() {
            Some(role) => Some(role),
            None => {
                let resolved = self
                    .timeout
                    .bound(self.resolver.resolve(session.user_id(), session.email()))
                    .await
                    .flatten();
                if resolved.is_some() {
                    self.cache.put(resolved);
                }
                resolved
            }
        };
        RedirectTarget::Landing(role.unwrap_or(Role::User))
    }

    async fn evaluate(
        &self,
        session: Option<&Session>,
        requirement: &AccessRequirement,
    ) -> AccessDecision {
        let Some(session) = session else {
            debug!("no session, denying");
            return AccessDecision::Denied(DenyReason::Unauthenticated);
        };

        // Domain requirements deny before any role lookup happens.
        if let Some(domain) = requirement.required_domain() {
            if !session.email_matches(domain) {
                return self.deny(session, DenyReason::DomainMismatch);
            }
        }

        let Some(required) = requirement.required_role() else {
            return AccessDecision::Granted;
        };

        let resolved = match self.cache.get() {
            Some(role) => {
                debug!(role = %role, "using cached role");
                Some(role)
            }
            None => {
                let resolution = self.resolver.resolve(session.user_id(), session.email());
                match self.timeout.bound(resolution).await {
                    Some(resolved) => {
                        self.cache.put(resolved);
                        resolved
                    }
                    None => return self.timed_out(session, required),
                }
            }
        };

        match resolved {
            Some(held) if held.satisfies(required) => AccessDecision::Granted,
            Some(held) => self.deny(session, DenyReason::RoleMismatch { held, required }),
            None if self.dev_fallback_active() => {
                self.notifier.notify(Notification::warning(
                    format!("dev-fallback:{}", session.user_id()),
                    "No role resolved; development fallback granted access.",
                ));
                AccessDecision::Granted
            }
            None => self.deny(session, DenyReason::NoRoleAssigned),
        }
    }

    fn timed_out(&self, session: &Session, required: Role) -> AccessDecision {
        let trusted_admin = required.is_admin()
            && session.email().is_some_and(|e| self.resolver.trusted_domain().matches(e));
        let decision = self
            .timeout
            .forced_decision(self.dev_fallback_active(), trusted_admin);
        match &decision {
            AccessDecision::Granted => self.notifier.notify(Notification::warning(
                format!("timeout:{}", session.user_id()),
                "Permission check timed out; defaulting to granted.",
            )),
            AccessDecision::Denied(reason) => self.notify_denied(session, reason),
            AccessDecision::Pending => {}
        }
        decision
    }

    fn deny(&self, session: &Session, reason: DenyReason) -> AccessDecision {
        self.notify_denied(session, &reason);
        AccessDecision::Denied(reason)
    }

    fn notify_denied(&self, session: &Session, reason: &DenyReason) {
        self.notifier.notify(Notification::error(
            format!("access-denied:{}:{}", reason.cause(), session.user_id()),
            reason.message(),
        ));
    }
}
