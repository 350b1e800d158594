//! # Backend Trait and the In-Memory Backend
//!
//! One record per player keyed by normalized username, plus an append-only
//! event record for coarse telemetry (login/logout). Credentials live next
//! to the blobs so the auth-adjacent intents have somewhere to check.

use std::collections::HashMap;

use aeon_core::PlayerState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{normalize_username, StoreResult};

/// One telemetry event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event type, e.g. `login` or `logout`.
    pub kind: String,
    /// Free-form payload.
    pub payload: serde_json::Value,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl EventRecord {
    /// Creates an event record.
    #[must_use]
    pub fn new(kind: &str, payload: serde_json::Value, timestamp_ms: u64) -> Self {
        Self { kind: kind.to_string(), payload, timestamp_ms }
    }
}

/// Pluggable key-value persistence for player blobs and events.
///
/// Implementations must be safe to call from the background writer thread
/// and from session setup concurrently.
pub trait Backend: Send + Sync {
    /// Loads a player blob, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::StoreError`] on storage or codec failure.
    fn load_player(&self, username: &str) -> StoreResult<Option<PlayerState>>;

    /// Stores a player blob, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::StoreError`] on storage or codec failure.
    fn store_player(&self, player: &PlayerState) -> StoreResult<()>;

    /// Appends one event to the log.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::StoreError`] on storage failure.
    fn append_event(&self, event: &EventRecord) -> StoreResult<()>;

    /// Registers credentials. Returns `false` when the username is taken.
    fn register(&self, username: &str, password: &str) -> bool;

    /// Verifies credentials.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Volatile backend for tests and single-process runs.
#[derive(Default)]
pub struct MemoryBackend {
    players: Mutex<HashMap<String, String>>,
    events: Mutex<Vec<EventRecord>>,
    credentials: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events, for tests.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Backend for MemoryBackend {
    fn load_player(&self, username: &str) -> StoreResult<Option<PlayerState>> {
        let players = self.players.lock();
        match players.get(&normalize_username(username)) {
            Some(blob) => Ok(Some(serde_json::from_str(blob)?)),
            None => Ok(None),
        }
    }

    fn store_player(&self, player: &PlayerState) -> StoreResult<()> {
        let blob = serde_json::to_string(player)?;
        self.players.lock().insert(normalize_username(&player.name), blob);
        Ok(())
    }

    fn append_event(&self, event: &EventRecord) -> StoreResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn register(&self, username: &str, password: &str) -> bool {
        let mut creds = self.credentials.lock();
        let key = normalize_username(username);
        if creds.contains_key(&key) {
            return false;
        }
        creds.insert(key, password.to_string());
        true
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        self.credentials.lock().get(&normalize_username(username)).is_some_and(|p| p == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeon_core::XpTable;

    #[test]
    fn test_roundtrip_player() {
        let backend = MemoryBackend::new();
        let table = XpTable::default();
        let player = PlayerState::new("Tess", false, &table);
        backend.store_player(&player).unwrap();
        let loaded = backend.load_player("tess").unwrap().unwrap();
        assert_eq!(loaded, player);
    }

    #[test]
    fn test_missing_player_is_none() {
        let backend = MemoryBackend::new();
        assert!(backend.load_player("nobody").unwrap().is_none());
    }

    #[test]
    fn test_credentials() {
        let backend = MemoryBackend::new();
        assert!(backend.register("Tess", "hunter2"));
        assert!(!backend.register("tess", "other"), "normalized names collide");
        assert!(backend.verify("TESS", "hunter2"));
        assert!(!backend.verify("tess", "wrong"));
    }

    #[test]
    fn test_events_append() {
        let backend = MemoryBackend::new();
        backend.append_event(&EventRecord::new("login", serde_json::json!({"user": "tess"}), 1)).unwrap();
        backend.append_event(&EventRecord::new("logout", serde_json::json!({"user": "tess"}), 2)).unwrap();
        assert_eq!(backend.event_count(), 2);
    }
}
