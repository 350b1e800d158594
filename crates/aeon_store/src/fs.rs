//! # Filesystem Backend
//!
//! One JSON file per normalized username under `players/`, an append-only
//! `events.jsonl`, and a flat `accounts.json` credential map. Good enough
//! for a single host; anything heavier plugs in behind [`Backend`].

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use aeon_core::PlayerState;
use parking_lot::Mutex;

use crate::backend::{Backend, EventRecord};
use crate::{normalize_username, StoreResult};

/// JSON-file backend rooted at a data directory.
pub struct FsBackend {
    root: PathBuf,
    credentials: Mutex<HashMap<String, String>>,
}

impl FsBackend {
    /// Opens (creating if needed) a backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::StoreError`] when the directory tree cannot be
    /// created or an existing credential file cannot be parsed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("players"))?;
        let credentials = match fs::read_to_string(root.join("accounts.json")) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { root, credentials: Mutex::new(credentials) })
    }

    fn player_path(&self, username: &str) -> PathBuf {
        self.root.join("players").join(format!("{}.json", normalize_username(username)))
    }

    fn persist_credentials(&self, creds: &HashMap<String, String>) {
        match serde_json::to_string_pretty(creds) {
            Ok(raw) => {
                if let Err(err) = fs::write(self.root.join("accounts.json"), raw) {
                    tracing::warn!(error = %err, "failed to persist credentials");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to encode credentials"),
        }
    }
}

impl Backend for FsBackend {
    fn load_player(&self, username: &str) -> StoreResult<Option<PlayerState>> {
        match fs::read_to_string(self.player_path(username)) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store_player(&self, player: &PlayerState) -> StoreResult<()> {
        let raw = serde_json::to_string(player)?;
        fs::write(self.player_path(&player.name), raw)?;
        Ok(())
    }

    fn append_event(&self, event: &EventRecord) -> StoreResult<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join("events.jsonl"))?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn register(&self, username: &str, password: &str) -> bool {
        let mut creds = self.credentials.lock();
        let key = normalize_username(username);
        if creds.contains_key(&key) {
            return false;
        }
        creds.insert(key, password.to_string());
        self.persist_credentials(&creds);
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

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aeon-store-test-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_roundtrip_on_disk() {
        let root = temp_root("roundtrip");
        let backend = FsBackend::open(&root).unwrap();
        let player = PlayerState::new("Tess", false, &XpTable::default());
        backend.store_player(&player).unwrap();
        let loaded = backend.load_player("Tess").unwrap().unwrap();
        assert_eq!(loaded, player);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_events_are_appended_lines() {
        let root = temp_root("events");
        let backend = FsBackend::open(&root).unwrap();
        backend.append_event(&EventRecord::new("login", serde_json::json!({}), 1)).unwrap();
        backend.append_event(&EventRecord::new("logout", serde_json::json!({}), 2)).unwrap();
        let raw = fs::read_to_string(root.join("events.jsonl")).unwrap();
        assert_eq!(raw.lines().count(), 2);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_credentials_survive_reopen() {
        let root = temp_root("creds");
        {
            let backend = FsBackend::open(&root).unwrap();
            assert!(backend.register("Tess", "hunter2"));
        }
        let backend = FsBackend::open(&root).unwrap();
        assert!(backend.verify("tess", "hunter2"));
        let _ = fs::remove_dir_all(&root);
    }
}
