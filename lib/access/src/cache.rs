//! Time-boxed cache for the last resolved role.
//!
//! Avoids redundant round-trips to the role store within a session. The
//! cache is keyed per client instance, not per user; callers must clear it
//! on sign-out and whenever the session's user changes (see
//! [`watch_sessions`](crate::identity::watch_sessions)).

use crate::role::Role;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};

/// Injected cache dependency for resolved roles.
///
/// Implementations must treat an expired entry as absent and must never
/// cache a negative result: `put(None)` clears instead of storing.
pub trait RoleCache: Send + Sync {
    /// Returns the cached role if present and not expired.
    fn get(&self) -> Option<Role>;

    /// Stores a freshly resolved role, or clears the entry when `None`.
    fn put(&self, role: Option<Role>);

    /// Removes the entry unconditionally.
    fn clear(&self);
}

/// A cached role with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    role: Role,
    expires_at: DateTime<Utc>,
}

/// In-memory role cache with a fixed time-to-live.
///
/// Cloning yields a handle to the same underlying entry.
#[derive(Debug)]
pub struct InMemoryRoleCache {
    ttl: Duration,
    entry: Arc<RwLock<Option<CacheEntry>>>,
}

impl InMemoryRoleCache {
    /// Default time-to-live for cached roles.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Creates a cache with the default 30-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(Self::DEFAULT_TTL_MINUTES))
    }

    /// Creates a cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for InMemoryRoleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryRoleCache {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entry: Arc::clone(&self.entry),
        }
    }
}

impl RoleCache for InMemoryRoleCache {
    fn get(&self) -> Option<Role> {
        let mut entry = self.entry.write().unwrap();
        match entry.as_ref() {
            Some(cached) if Utc::now() < cached.expires_at => Some(cached.role),
            Some(_) => {
                // Expired entries are purged, not just ignored.
                *entry = None;
                None
            }
            None => None,
        }
    }

    fn put(&self, role: Option<Role>) {
        let mut entry = self.entry.write().unwrap();
        *entry = role.map(|role| CacheEntry {
            role,
            expires_at: Utc::now() + self.ttl,
        });
    }

    fn clear(&self) {
        *self.entry.write().unwrap() = None;
    }
}
