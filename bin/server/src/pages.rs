//! Guarded pages of the gateway.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use std::sync::Arc;

use crate::auth::{AppState, RequireAdmin, RequireAuth, RequireProvider};

/// Routes an authenticated user to the landing page for their role.
pub async fn root(
    State(state): State<Arc<AppState>>,
    RequireAuth(session): RequireAuth,
) -> Redirect {
    let landing = state.gate.landing(&session).await;
    Redirect::to(landing.path())
}

/// Home page for tenants, owners, and managers.
pub async fn home(RequireAuth(session): RequireAuth) -> Html<String> {
    let who = session.email().unwrap_or("resident");
    Html(format!("<h1>Terrace</h1><p>Signed in as {who}.</p>"))
}

/// Back office for administrators.
pub async fn admin(RequireAdmin(session): RequireAdmin) -> Html<String> {
    let who = session.email().unwrap_or("administrator");
    Html(format!(
        "<h1>Back office</h1><p>Declarations, providers, technicians, and \
         notification settings.</p><p>Signed in as {who}.</p>"
    ))
}

/// Extranet for service providers and technicians.
pub async fn extranet(RequireProvider(session): RequireProvider) -> Html<String> {
    let who = session.email().unwrap_or("provider");
    Html(format!(
        "<h1>Provider extranet</h1><p>Assigned interventions.</p>\
         <p>Signed in as {who}.</p>"
    ))
}

/// Shown when a signed-in user lacks the required role or domain.
pub async fn access_denied() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Html(
            "<h1>Access denied</h1><p>Your account does not grant access to this \
             area. <a href=\"/auth/login\">Sign in with a different account</a></p>",
        ),
    )
}
