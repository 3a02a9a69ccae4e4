//! sqlx-backed role store against the hosted Postgres database.

use crate::error::DirectoryError;
use crate::store::RoleStore;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use terrace_core::UserId;
use tracing::instrument;

/// Row type for role queries.
#[derive(FromRow)]
struct RoleRow {
    role: String,
}

/// Role store backed by the hosted Postgres database.
///
/// Reads the `user_roles` and `provider_members` relations. Row-level
/// security and schema ownership stay with the hosted database; this client
/// only ever reads.
#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    /// Creates a new store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` and returns a store over a fresh pool.
    pub async fn connect(url: &str) -> Result<Self, DirectoryError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DirectoryError::ConnectionFailed {
                details: e.to_string(),
            })?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn role_of(&self, user_id: UserId) -> Result<Option<String>, DirectoryError> {
        // The relation allows multiple rows per user; the earliest assignment wins.
        let row: Option<RoleRow> = sqlx::query_as(
            r#"
            SELECT role
            FROM user_roles
            WHERE user_id = $1
            ORDER BY assigned_at
            LIMIT 1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::QueryFailed {
            relation: "user_roles",
            details: e.to_string(),
        })?;

        Ok(row.map(|r| r.role))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn is_provider(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        let exists: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1
            FROM provider_members
            WHERE user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::QueryFailed {
            relation: "provider_members",
            details: e.to_string(),
        })?;

        Ok(exists.is_some())
    }
}
