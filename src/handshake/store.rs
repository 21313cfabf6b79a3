//! # Session Store
//!
//! Room-id → DH session map shared between the receive loop and the send
//! path. An explicit handle rather than a process-wide global: tests and
//! embedders create as many independent stores as they need.
//!
//! Locking is two-level: a `RwLock` over the map for lookups and inserts,
//! and a `Mutex` around each session so per-room handshake steps serialize
//! without blocking unrelated rooms.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::handshake::session::DhSession;

/// Shared, thread-safe map of active key-exchange sessions
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, Arc<Mutex<DhSession>>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session for a room
    pub fn get(&self, room_id: &str) -> Option<Arc<Mutex<DhSession>>> {
        self.inner.read().get(room_id).cloned()
    }

    /// Fetch the room's session, generating and inserting one if absent
    pub fn get_or_create(&self, room_id: &str) -> Arc<Mutex<DhSession>> {
        if let Some(session) = self.get(room_id) {
            return session;
        }
        let mut map = self.inner.write();
        // Re-check under the write lock; another thread may have raced us
        map.entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(DhSession::generate())))
            .clone()
    }

    /// Replace the room's session with a freshly generated one
    pub fn replace(&self, room_id: &str) -> Arc<Mutex<DhSession>> {
        let session = Arc::new(Mutex::new(DhSession::generate()));
        self.inner
            .write()
            .insert(room_id.to_string(), Arc::clone(&session));
        session
    }

    /// Drop the room's session (room deleted or peer left)
    pub fn evict(&self, room_id: &str) -> bool {
        self.inner.write().remove(room_id).is_some()
    }

    /// Whether the room has a session with a computed shared secret
    pub fn is_established(&self, room_id: &str) -> bool {
        match self.get(room_id) {
            Some(session) => session.lock().is_established(),
            None => false,
        }
    }

    /// Number of tracked sessions
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_stable() {
        let store = SessionStore::new();
        let a = store.get_or_create("room-1");
        let b = store.get_or_create("room-1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rooms_are_independent() {
        let store = SessionStore::new();
        let a = store.get_or_create("room-1");
        let b = store.get_or_create("room-2");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(
            a.lock().public_value_decimal(),
            b.lock().public_value_decimal()
        );
    }

    #[test]
    fn test_replace_generates_new_keypair() {
        let store = SessionStore::new();
        let before = store.get_or_create("room-1").lock().public_value_decimal();
        store.replace("room-1");
        let after = store.get_or_create("room-1").lock().public_value_decimal();
        assert_ne!(before, after);
    }

    #[test]
    fn test_evict() {
        let store = SessionStore::new();
        store.get_or_create("room-1");
        assert!(store.evict("room-1"));
        assert!(!store.evict("room-1"));
        assert!(store.get("room-1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_established_tracks_secret() {
        let store = SessionStore::new();
        let session = store.get_or_create("room-1");
        assert!(!store.is_established("room-1"));

        let peer = DhSession::generate();
        session.lock().receive_peer_value(peer.public_value());
        assert!(store.is_established("room-1"));
        assert!(!store.is_established("room-2"));
    }
}
