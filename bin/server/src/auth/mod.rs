//! Authentication module for the terrace gateway.
//!
//! This module provides:
//! - Sign-in/sign-out routes against the hosted identity provider
//! - The in-process session registry backing the session cookie
//! - Permission-gate extractors for Axum routes
//!
//! # Authorization Model
//!
//! Every guarded route goes through the shared [`PermissionGate`]: the
//! session cookie identifies the session, the gate resolves the user's role
//! (trusted-domain override, provider membership, then the generic role
//! relation) and decides whether to let the request through or redirect.

pub mod middleware;
pub mod routes;

pub use middleware::{RequireAdmin, RequireAuth, RequireProvider};
pub use routes::{login, login_page, logout};

use crate::config::SessionConfig;
use crate::sessions::SessionRegistry;
use std::sync::Arc;
use terrace_access::{IdentityProvider, PermissionGate};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Shared application state.
pub struct AppState {
    /// The shared permission gate.
    pub gate: PermissionGate,
    /// The hosted identity provider.
    pub identity: Arc<dyn IdentityProvider>,
    /// Active sessions keyed by cookie value.
    pub sessions: SessionRegistry,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        gate: PermissionGate,
        identity: Arc<dyn IdentityProvider>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            gate,
            identity,
            sessions: SessionRegistry::new(),
            session_config,
        }
    }
}
