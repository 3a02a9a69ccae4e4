//! Interface to the hosted identity provider.
//!
//! The provider owns credential verification and session issuance; this
//! module consumes it through a trait seam: fetch the current session, sign
//! in with credentials, sign out, and subscribe to session-change events.
//!
//! [`watch_sessions`] keeps the role cache honest: the cache is keyed per
//! client instance, so it must be cleared on sign-out and whenever the
//! session's user changes.

use crate::cache::RoleCache;
use crate::error::IdentityError;
use crate::session::{Session, SessionId};
use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};
use terrace_core::UserId;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Sign-in credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Credentials must never reach logs.
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session-change notifications from the identity provider.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user signed in.
    SignedIn(Session),
    /// The current user signed out.
    SignedOut,
    /// The provider renewed the session tokens.
    TokenRefreshed(Session),
    /// The provider initiated a password-recovery flow.
    PasswordRecovery,
}

/// The hosted identity provider, consumed as an opaque service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session, if one exists.
    async fn current_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Signs in with credentials, establishing a new session.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError>;

    /// Signs out, destroying the current session.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Subscribes to session-change events.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Clears the role cache in response to session events.
///
/// Runs until the event channel closes. A lagged receiver clears the cache
/// as well, since the missed events may have included a sign-out.
pub async fn watch_sessions(
    mut events: broadcast::Receiver<SessionEvent>,
    cache: Arc<dyn RoleCache>,
) {
    let mut last_user: Option<UserId> = None;
    loop {
        match events.recv().await {
            Ok(SessionEvent::SignedOut) => {
                debug!("sign-out, clearing role cache");
                cache.clear();
                last_user = None;
            }
            Ok(SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session)) => {
                if last_user.is_some_and(|user| user != session.user_id()) {
                    debug!("session user changed, clearing role cache");
                    cache.clear();
                }
                last_user = Some(session.user_id());
            }
            Ok(SessionEvent::PasswordRecovery) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "missed session events, clearing role cache");
                cache.clear();
                last_user = None;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// In-process identity provider for tests and local runs.
///
/// Holds at most one session. Sign-in succeeds when the supplied email
/// matches the configured session's email claim.
pub struct StaticIdentityProvider {
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl StaticIdentityProvider {
    /// Creates a provider with no session.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            session: RwLock::new(None),
            events,
        }
    }

    /// Creates a provider with an already-established session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        let provider = Self::new();
        *provider.session.write().unwrap() = Some(session);
        provider
    }
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        Ok(self.session.read().unwrap().clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        let session = self.session.read().unwrap().clone();
        match session {
            Some(session) if session.email() == Some(credentials.email.as_str()) => {
                let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
                Ok(session)
            }
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        *self.session.write().unwrap() = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Token response from the provider's password and refresh grants.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: UserPayload,
}

/// User object embedded in token responses.
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Result<Session, IdentityError> {
        let user_id: UserId =
            self.user
                .id
                .parse()
                .map_err(|e| IdentityError::InvalidResponse {
                    reason: format!("bad user id: {e}"),
                })?;
        Ok(Session::with_tokens(
            SessionId::generate(),
            user_id,
            self.user.email,
            Duration::seconds(self.expires_in),
            self.access_token,
            self.refresh_token,
        ))
    }
}

/// Identity provider backed by the hosted service's REST API.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl HttpIdentityProvider {
    /// Creates a provider for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            current: RwLock::new(None),
            events,
        }
    }

    /// Renews the current session using its refresh token.
    ///
    /// Emits a [`SessionEvent::TokenRefreshed`] on success.
    pub async fn refresh(&self) -> Result<Session, IdentityError> {
        let refresh_token = self
            .current
            .read()
            .unwrap()
            .as_ref()
            .and_then(|s| s.refresh_token().map(str::to_string))
            .ok_or(IdentityError::NoActiveSession)?;

        let response = self
            .http
            .post(format!("{}/token?grant_type=refresh_token", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| IdentityError::ProviderUnavailable {
                reason: e.to_string(),
            })?;

        let session = Self::session_from_response(response).await?;
        *self.current.write().unwrap() = Some(session.clone());
        let _ = self
            .events
            .send(SessionEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    async fn session_from_response(response: reqwest::Response) -> Result<Session, IdentityError> {
        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(IdentityError::ProviderUnavailable {
                reason: format!("unexpected status {status}"),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| IdentityError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        token.into_session()
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        Ok(self.current.read().unwrap().clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", &self.api_key)
            .json(credentials)
            .send()
            .await
            .map_err(|e| IdentityError::ProviderUnavailable {
                reason: e.to_string(),
            })?;

        let session = Self::session_from_response(response).await?;
        *self.current.write().unwrap() = Some(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let access_token = self
            .current
            .read()
            .unwrap()
            .as_ref()
            .and_then(|s| s.access_token().map(str::to_string));

        // Revocation is best effort; the local session is destroyed regardless.
        if let Some(token) = access_token {
            let revoke = self
                .http
                .post(format!("{}/logout", self.base_url))
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await;
            if let Err(e) = revoke {
                warn!(error = %e, "session revocation failed");
            }
        }

        *self.current.write().unwrap() = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryRoleCache, RoleCache};
    use crate::role::Role;
    use std::time::Duration as StdDuration;

    fn test_session(email: &str) -> Session {
        Session::new(
            SessionId::generate(),
            UserId::new(),
            Some(email.to_string()),
            Duration::hours(1),
        )
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = Credentials {
            email: "alice@terrace.example".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("alice@terrace.example"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn token_response_builds_session() {
        let user_id = UserId::new();
        let json = format!(
            r#"{{
                "access_token": "at_123",
                "refresh_token": "rt_456",
                "expires_in": 3600,
                "user": {{ "id": "{user_id}", "email": "alice@terrace.example" }}
            }}"#
        );

        let token: TokenResponse = serde_json::from_str(&json).expect("deserialize");
        let session = token.into_session().expect("session");

        assert_eq!(session.user_id(), user_id);
        assert_eq!(session.email(), Some("alice@terrace.example"));
        assert_eq!(session.access_token(), Some("at_123"));
        assert_eq!(session.refresh_token(), Some("rt_456"));
        assert!(session.is_valid());
    }

    #[test]
    fn token_response_with_bad_user_id_is_rejected() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": null,
            "expires_in": 60,
            "user": { "id": "not-an-id", "email": null }
        }"#;

        let token: TokenResponse = serde_json::from_str(json).expect("deserialize");
        let err = token.into_session().unwrap_err();
        assert!(matches!(err, IdentityError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn static_provider_signs_in_matching_email() {
        let provider = StaticIdentityProvider::with_session(test_session("alice@terrace.example"));
        let mut events = provider.subscribe();

        let session = provider
            .sign_in(&Credentials {
                email: "alice@terrace.example".to_string(),
                password: "pw".to_string(),
            })
            .await
            .expect("sign in");
        assert_eq!(session.email(), Some("alice@terrace.example"));

        let event = events.recv().await.expect("event");
        assert!(matches!(event, SessionEvent::SignedIn(_)));
    }

    #[tokio::test]
    async fn static_provider_rejects_unknown_email() {
        let provider = StaticIdentityProvider::with_session(test_session("alice@terrace.example"));
        let err = provider
            .sign_in(&Credentials {
                email: "mallory@other.example".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::InvalidCredentials);
    }

    #[tokio::test]
    async fn static_provider_sign_out_destroys_session() {
        let provider = StaticIdentityProvider::with_session(test_session("alice@terrace.example"));
        let mut events = provider.subscribe();

        provider.sign_out().await.expect("sign out");
        assert!(provider.current_session().await.unwrap().is_none());
        assert!(matches!(
            events.recv().await.expect("event"),
            SessionEvent::SignedOut
        ));
    }

    #[tokio::test]
    async fn watcher_clears_cache_on_sign_out() {
        let cache = Arc::new(InMemoryRoleCache::new());
        cache.put(Some(Role::Manager));

        let (tx, rx) = broadcast::channel(16);
        let watcher = tokio::spawn(watch_sessions(rx, cache.clone() as Arc<dyn RoleCache>));

        tx.send(SessionEvent::SignedOut).expect("send");
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        assert_eq!(cache.get(), None);
        drop(tx);
        watcher.await.expect("watcher exits when channel closes");
    }

    #[tokio::test]
    async fn watcher_clears_cache_on_user_change() {
        let cache = Arc::new(InMemoryRoleCache::new());

        let (tx, rx) = broadcast::channel(16);
        let watcher = tokio::spawn(watch_sessions(rx, cache.clone() as Arc<dyn RoleCache>));

        tx.send(SessionEvent::SignedIn(test_session("a@x.example")))
            .expect("send");
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        cache.put(Some(Role::Admin));

        // A different user signs in within the same client instance.
        tx.send(SessionEvent::SignedIn(test_session("b@x.example")))
            .expect("send");
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        assert_eq!(cache.get(), None);
        drop(tx);
        watcher.await.expect("watcher exits when channel closes");
    }

    #[tokio::test]
    async fn watcher_keeps_cache_for_same_user_refresh() {
        let cache = Arc::new(InMemoryRoleCache::new());
        let session = test_session("a@x.example");

        let (tx, rx) = broadcast::channel(16);
        let watcher = tokio::spawn(watch_sessions(rx, cache.clone() as Arc<dyn RoleCache>));

        tx.send(SessionEvent::SignedIn(session.clone())).expect("send");
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        cache.put(Some(Role::User));

        tx.send(SessionEvent::TokenRefreshed(session)).expect("send");
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        assert_eq!(cache.get(), Some(Role::User));
        drop(tx);
        watcher.await.expect("watcher exits when channel closes");
    }
}
