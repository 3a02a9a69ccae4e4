//! Permission-gate extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use terrace_access::{
    AccessDecision, AccessRequirement, RedirectTarget, Role, Session, SessionId,
};

use super::{AppState, SESSION_COOKIE};

/// Extractor for requiring an authenticated user.
///
/// If the user is not authenticated, they will be redirected to the login page.
pub struct RequireAuth(pub Session);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        // Get session ID from cookie
        let session_cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthRejection::NotAuthenticated)?;
        let session_id = SessionId::from(session_cookie.value());

        // Look up session in the registry
        let session = app_state
            .sessions
            .find(&session_id)
            .ok_or(AuthRejection::NotAuthenticated)?;

        // Check if session is expired
        if session.is_expired() {
            app_state.sessions.remove(&session_id);
            return Err(AuthRejection::SessionExpired);
        }

        match app_state
            .gate
            .check(Some(&session), &AccessRequirement::authenticated())
            .await
        {
            AccessDecision::Granted => Ok(RequireAuth(session)),
            AccessDecision::Pending => Err(AuthRejection::CheckPending),
            AccessDecision::Denied(_) => Err(AuthRejection::Denied(RedirectTarget::Login)),
        }
    }
}

/// Extractor for requiring an authenticated admin.
pub struct RequireAdmin(pub Session);

impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        check_role(parts, state, Role::Admin).await.map(RequireAdmin)
    }
}

/// Extractor for requiring an authenticated service provider.
pub struct RequireProvider(pub Session);

impl<S> FromRequestParts<S> for RequireProvider
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        check_role(parts, state, Role::Provider)
            .await
            .map(RequireProvider)
    }
}

/// Runs the gate for a role requirement on top of basic authentication.
async fn check_role<S>(parts: &mut Parts, state: &S, role: Role) -> Result<Session, AuthRejection>
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    let RequireAuth(session) = RequireAuth::from_request_parts(parts, state).await?;
    let app_state = Arc::<AppState>::from_ref(state);

    match app_state
        .gate
        .check(Some(&session), &AccessRequirement::role(role))
        .await
    {
        AccessDecision::Granted => Ok(session),
        AccessDecision::Pending => Err(AuthRejection::CheckPending),
        // RequireAuth already handled the unauthenticated case.
        AccessDecision::Denied(_) => Err(AuthRejection::Denied(RedirectTarget::AccessDenied)),
    }
}

/// Rejection type for the gate extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    SessionExpired,
    Denied(RedirectTarget),
    CheckPending,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated | Self::SessionExpired => {
                Redirect::to(RedirectTarget::Login.path()).into_response()
            }
            Self::Denied(target) => Redirect::to(target.path()).into_response(),
            Self::CheckPending => (
                StatusCode::SERVICE_UNAVAILABLE,
                [("retry-after", "1")],
                "Permission check in progress",
            )
                .into_response(),
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
