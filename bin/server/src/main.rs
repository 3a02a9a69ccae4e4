mod auth;
mod config;
mod pages;
mod sessions;

use auth::AppState;
use axum::{Router, routing::get};
use config::ServerConfig;
use std::sync::Arc;
use terrace_access::{
    HttpIdentityProvider, IdentityProvider, InMemoryRoleCache, PermissionGate, RoleCache,
    RoleResolver, TracingNotifier, watch_sessions,
};
use terrace_core::Result;
use terrace_directory::{DirectoryError, InMemoryRoleStore, PgRoleStore, RoleStore};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let store = role_store(&config).await.expect("failed to set up role store");

    // Assemble the access pipeline
    let cache: Arc<dyn RoleCache> = Arc::new(InMemoryRoleCache::with_ttl(config.access.cache_ttl()));
    let resolver = RoleResolver::new(store, config.access.trusted_domain.clone())
        .with_retry(config.access.retry.policy());
    let gate = PermissionGate::new(resolver, Arc::clone(&cache), Arc::new(TracingNotifier::new()))
        .with_timeout(config.access.safety_timeout());

    let identity: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::new(
        config.identity.url.clone(),
        config.identity.api_key.clone(),
    ));

    // Clear the role cache on sign-out and on session user changes
    tokio::spawn(watch_sessions(identity.subscribe(), Arc::clone(&cache)));

    let app_state = Arc::new(AppState::new(gate, identity, config.session.clone()));

    // Spawn periodic session cleanup task
    let cleanup_state = Arc::clone(&app_state);
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let purged = cleanup_state.sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged_sessions = purged, "Periodic session cleanup");
            }
        }
    });

    let app = Router::new()
        .route("/", get(pages::root))
        .route("/home", get(pages::home))
        .route("/admin", get(pages::admin))
        .route("/extranet", get(pages::extranet))
        .route("/access-denied", get(pages::access_denied))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// Chooses the role store from configuration.
async fn role_store(config: &ServerConfig) -> Result<Arc<dyn RoleStore>, DirectoryError> {
    match &config.database_url {
        Some(url) => {
            let store = PgRoleStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no database configured, using an in-memory role store");
            Ok(Arc::new(InMemoryRoleStore::new()))
        }
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
