//! Sign-in and sign-out routes.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use terrace_access::{Credentials, IdentityError, SessionId};
use time::Duration as TimeDuration;

use super::{AppState, SESSION_COOKIE};

/// Sign-in form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

/// Renders the sign-in page.
pub async fn login_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
  <head><meta charset="utf-8"/><title>Terrace - Sign in</title></head>
  <body>
    <h1>Sign in</h1>
    <form method="post" action="/auth/login">
      <label>Email <input type="email" name="email" required/></label>
      <label>Password <input type="password" name="password" required/></label>
      <button type="submit">Sign in</button>
    </form>
  </body>
</html>"#,
    )
}

/// Signs in against the identity provider and establishes a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Credentials {
        email: form.email,
        password: form.password,
    };

    let session = match state.identity.sign_in(&credentials).await {
        Ok(session) => session,
        Err(IdentityError::InvalidCredentials) => {
            return Redirect::to("/auth/login?error=invalid-credentials").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in failed");
            return (StatusCode::BAD_GATEWAY, "Identity provider unavailable").into_response();
        }
    };

    // Cookie lifetime tracks the provider-issued session expiry.
    let max_age = (session.expires_at() - Utc::now()).num_seconds().max(0);
    let cookie = Cookie::build((SESSION_COOKIE, session.id().as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(max_age));

    state.sessions.insert(session.clone());
    let landing = state.gate.landing(&session).await;

    (jar.add(cookie), Redirect::to(landing.path())).into_response()
}

/// Signs out, destroying the session on both sides.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(&SessionId::from(cookie.value()));
    }

    // Provider-side revocation is best effort.
    if let Err(e) = state.identity.sign_out().await {
        tracing::warn!(error = %e, "provider sign-out failed");
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/");
    (jar.remove(removal), Redirect::to("/auth/login"))
}
