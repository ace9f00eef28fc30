// Session registry
//
// Maps generated session ids to their state. Each session sits behind its own
// async mutex: a chat turn holds it across the backend call, so one session
// handles one interaction at a time while other sessions proceed freely.
//
// Sessions that go untouched for the configured idle timeout are swept out.
// A handler already holding a session's Arc keeps working on it; the next
// lookup by id answers 404.

use super::SessionState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// State of one session, locked for the duration of an interaction
pub type SharedSession = Arc<tokio::sync::Mutex<SessionState>>;

/// Opaque session identifier (random v4 UUID)
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct Entry {
    state: SharedSession,
    last_seen: Instant,
}

/// Registry of live sessions
#[derive(Default)]
pub struct SessionManager {
    sessions: HashMap<SessionId, Entry>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with default state
    pub fn start(&mut self) -> (SessionId, SharedSession) {
        let mut id = SessionId::generate();
        while self.sessions.contains_key(&id) {
            id = SessionId::generate();
        }

        let state: SharedSession = Arc::new(tokio::sync::Mutex::new(SessionState::new()));
        self.sessions.insert(
            id.clone(),
            Entry {
                state: state.clone(),
                last_seen: Instant::now(),
            },
        );

        tracing::debug!(session_id = %id, active = self.sessions.len(), "Session started");
        (id, state)
    }

    /// Look up a session and mark it as used
    pub fn get(&mut self, id: &SessionId) -> Option<SharedSession> {
        let entry = self.sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.state.clone())
    }

    /// Drop a session. Returns false if it didn't exist.
    pub fn end(&mut self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!(session_id = %id, active = self.sessions.len(), "Session ended");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions not used for `idle_timeout`. Returns how many went.
    pub fn evict_idle(&mut self, idle_timeout: Duration) -> usize {
        self.evict_idle_at(Instant::now(), idle_timeout)
    }

    fn evict_idle_at(&mut self, now: Instant, idle_timeout: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| now.saturating_duration_since(entry.last_seen) < idle_timeout);
        before - self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Language;

    #[tokio::test]
    async fn test_start_get_end() {
        let mut manager = SessionManager::new();
        let (id, state) = manager.start();
        assert_eq!(manager.len(), 1);

        state.lock().await.set_language(Language::French);

        let fetched = manager.get(&id).expect("session should exist");
        assert_eq!(fetched.lock().await.language(), Language::French);

        assert!(manager.end(&id));
        assert!(!manager.end(&id));
        assert!(manager.get(&id).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut manager = SessionManager::new();
        let (a, _) = manager.start();
        let (b, _) = manager.start();
        assert_ne!(a, b);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_generated_id_is_uuid_v4() {
        let id = SessionId::generate();
        let parsed = Uuid::parse_str(&id.0).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(SessionId::generate(), id);
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let mut manager = SessionManager::new();
        let (idle, _) = manager.start();
        let (active, _) = manager.start();

        let later = Instant::now() + Duration::from_secs(120);
        manager.sessions.get_mut(&active).unwrap().last_seen = later;

        assert_eq!(manager.evict_idle_at(later, Duration::from_secs(60)), 1);
        assert!(manager.get(&idle).is_none());
        assert!(manager.get(&active).is_some());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_lookup_keeps_session_alive() {
        let mut manager = SessionManager::new();
        let (id, _) = manager.start();

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)), 0);
        assert!(manager.get(&id).is_some());
        assert_eq!(manager.evict_idle(Duration::ZERO), 1);
        assert!(manager.is_empty());
    }
}
