//! In-memory session registry for the gateway.
//!
//! Maps session cookies to the sessions issued by the identity provider.
//! Sessions live only as long as the gateway process; restarting it simply
//! forces a new sign-in.

use std::collections::HashMap;
use std::sync::RwLock;
use terrace_access::{Session, SessionId};

/// Registry of active sessions keyed by session ID.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session under its own ID.
    pub fn insert(&self, session: Session) {
        self.sessions
            .write()
            .unwrap()
            .insert(session.id().clone(), session);
    }

    /// Looks up a session by ID.
    #[must_use]
    pub fn find(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    /// Removes a session by ID.
    pub fn remove(&self, id: &SessionId) {
        self.sessions.write().unwrap().remove(id);
    }

    /// Removes every expired session and returns how many were purged.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, session| session.is_valid());
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use terrace_core::UserId;

    fn session(duration: Duration) -> Session {
        Session::new(SessionId::generate(), UserId::new(), None, duration)
    }

    #[test]
    fn insert_and_find_roundtrip() {
        let registry = SessionRegistry::new();
        let session = session(Duration::hours(1));
        registry.insert(session.clone());

        assert_eq!(registry.find(session.id()), Some(session));
    }

    #[test]
    fn find_unknown_session_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.find(&SessionId::generate()).is_none());
    }

    #[test]
    fn remove_deletes_session() {
        let registry = SessionRegistry::new();
        let session = session(Duration::hours(1));
        registry.insert(session.clone());
        registry.remove(session.id());

        assert!(registry.find(session.id()).is_none());
    }

    #[test]
    fn purge_removes_only_expired_sessions() {
        let registry = SessionRegistry::new();
        let live = session(Duration::hours(1));
        let expired = session(Duration::seconds(-1));
        registry.insert(live.clone());
        registry.insert(expired.clone());

        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.find(live.id()).is_some());
        assert!(registry.find(expired.id()).is_none());
    }
}
