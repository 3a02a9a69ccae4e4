//! Session model for authenticated users.
//!
//! A session represents an authenticated principal. The hosted identity
//! provider owns the session lifecycle; the platform holds a read-only,
//! refreshable copy created at sign-in, refreshed on token renewal, and
//! destroyed at sign-out.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use terrace_core::UserId;
use ulid::Ulid;

/// Unique identifier for a session.
///
/// Session IDs are opaque strings generated at session creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from a string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh random session ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("sess_{}", Ulid::new()))
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An email domain suffix, such as `trusted.example`.
///
/// Used both for the trusted organizational domain that grants automatic
/// admin access and for per-route domain requirements. A leading `@` in the
/// configured value is accepted and stripped; matching is case-insensitive
/// against the domain part of the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EmailDomain(String);

impl EmailDomain {
    /// Creates a domain from a configured value, normalizing case and any
    /// leading `@`.
    #[must_use]
    pub fn new(domain: impl AsRef<str>) -> Self {
        let domain = domain.as_ref().trim();
        let domain = domain.strip_prefix('@').unwrap_or(domain);
        Self(domain.to_ascii_lowercase())
    }

    /// Returns true if the email address belongs to this domain.
    #[must_use]
    pub fn matches(&self, email: &str) -> bool {
        email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.eq_ignore_ascii_case(&self.0))
    }

    /// Returns the normalized domain.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EmailDomain {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<EmailDomain> for String {
    fn from(domain: EmailDomain) -> Self {
        domain.0
    }
}

impl std::fmt::Display for EmailDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents an active authenticated session.
///
/// Contains the user's identity, the email claim (which may be absent), and
/// validity bounds. Sessions can be refreshed when the provider renews the
/// tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,
    /// The authenticated user's ID.
    user_id: UserId,
    /// Email claim from the identity provider, if present.
    email: Option<String>,
    /// When the session was issued.
    issued_at: DateTime<Utc>,
    /// When the session expires.
    expires_at: DateTime<Utc>,
    /// Access token issued by the identity provider.
    access_token: Option<String>,
    /// Refresh token for token renewal.
    refresh_token: Option<String>,
}

impl Session {
    /// Creates a new session valid for the given duration.
    #[must_use]
    pub fn new(id: SessionId, user_id: UserId, email: Option<String>, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            email,
            issued_at: now,
            expires_at: now + duration,
            access_token: None,
            refresh_token: None,
        }
    }

    /// Creates a session carrying provider tokens.
    #[must_use]
    pub fn with_tokens(
        id: SessionId,
        user_id: UserId,
        email: Option<String>,
        duration: Duration,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Self {
        let mut session = Self::new(id, user_id, email, duration);
        session.access_token = Some(access_token);
        session.refresh_token = refresh_token;
        session
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the email claim, if present.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns true if the session's email belongs to the given domain.
    ///
    /// A session without an email claim never matches.
    #[must_use]
    pub fn email_matches(&self, domain: &EmailDomain) -> bool {
        self.email().is_some_and(|email| domain.matches(email))
    }

    /// Returns when the session was issued.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns when the session expires.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the provider access token, if present.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the provider refresh token, if present.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns true if the session is still valid (not expired).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    /// Updates the session tokens and extends expiration.
    pub fn refresh(
        &mut self,
        access_token: String,
        refresh_token: Option<String>,
        duration: Duration,
    ) {
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
        self.expires_at = Utc::now() + duration;
    }
}
