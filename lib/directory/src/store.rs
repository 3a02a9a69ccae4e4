//! The role-store trait seam and its in-memory implementation.

use crate::error::DirectoryError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use terrace_core::UserId;

/// Read-only client for the hosted role relations.
///
/// Both lookups return zero-or-one logical results; where the underlying
/// relation allows multiple rows per user, the implementation collapses them
/// to the first match.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns the raw role text assigned to the user, if any.
    async fn role_of(&self, user_id: UserId) -> Result<Option<String>, DirectoryError>;

    /// Returns true if the user has a row in the provider-membership relation.
    async fn is_provider(&self, user_id: UserId) -> Result<bool, DirectoryError>;
}

/// In-process role store for tests and local runs.
///
/// Cloning yields a handle to the same underlying state.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    roles: Arc<RwLock<HashMap<UserId, String>>>,
    providers: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryRoleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a role to a user, replacing any existing assignment.
    pub fn assign_role(&self, user_id: UserId, role: impl Into<String>) {
        self.roles.write().unwrap().insert(user_id, role.into());
    }

    /// Removes a user's role assignment.
    pub fn remove_role(&self, user_id: UserId) {
        self.roles.write().unwrap().remove(&user_id);
    }

    /// Records a provider membership for the user.
    pub fn add_provider(&self, user_id: UserId) {
        self.providers.write().unwrap().insert(user_id);
    }
}

impl Clone for InMemoryRoleStore {
    fn clone(&self) -> Self {
        Self {
            roles: Arc::clone(&self.roles),
            providers: Arc::clone(&self.providers),
        }
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn role_of(&self, user_id: UserId) -> Result<Option<String>, DirectoryError> {
        Ok(self.roles.read().unwrap().get(&user_id).cloned())
    }

    async fn is_provider(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        Ok(self.providers.read().unwrap().contains(&user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_has_no_role() {
        let store = InMemoryRoleStore::new();
        let role = store.role_of(UserId::new()).await.unwrap();
        assert!(role.is_none());
    }

    #[tokio::test]
    async fn assigned_role_is_returned() {
        let store = InMemoryRoleStore::new();
        let user = UserId::new();
        store.assign_role(user, "manager");

        assert_eq!(store.role_of(user).await.unwrap().as_deref(), Some("manager"));
    }

    #[tokio::test]
    async fn reassignment_replaces_previous_role() {
        let store = InMemoryRoleStore::new();
        let user = UserId::new();
        store.assign_role(user, "user");
        store.assign_role(user, "manager");

        assert_eq!(store.role_of(user).await.unwrap().as_deref(), Some("manager"));
    }

    #[tokio::test]
    async fn provider_membership_is_per_user() {
        let store = InMemoryRoleStore::new();
        let provider = UserId::new();
        let other = UserId::new();
        store.add_provider(provider);

        assert!(store.is_provider(provider).await.unwrap());
        assert!(!store.is_provider(other).await.unwrap());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = InMemoryRoleStore::new();
        let handle = store.clone();
        let user = UserId::new();
        store.assign_role(user, "user");

        assert_eq!(handle.role_of(user).await.unwrap().as_deref(), Some("user"));
    }
}
