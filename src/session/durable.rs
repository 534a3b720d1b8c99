//! File-backed session store that survives restarts.
//!
//! Mirrors browser local storage: two fixed keys (`token`, `user`) where
//! `user` holds the serialized identity. Both keys live in one file that is
//! replaced via temp-file + rename, so a reader never sees one key without
//! the other.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{CredentialToken, Session, SessionError, SessionStore};
use crate::config::{TOKEN_KEY, USER_KEY};
use crate::models::Identity;

/// File name inside the storage directory.
const SESSION_FILE: &str = "session.json";

pub struct DurableSessionStore {
    dir: PathBuf,
    /// Serializes writers within this process.
    write_lock: Mutex<()>,
}

impl DurableSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn write_entries(&self, entries: &BTreeMap<&str, String>) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(entries)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path()).map_err(|e| SessionError::Io(e.error))?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<Option<BTreeMap<String, String>>, SessionError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl SessionStore for DurableSessionStore {
    fn set(&self, identity: Identity, token: CredentialToken) -> Result<(), SessionError> {
        let user = serde_json::to_string(&identity)?;
        let mut entries = BTreeMap::new();
        entries.insert(TOKEN_KEY, token.expose().to_string());
        entries.insert(USER_KEY, user);

        let _guard = self.write_lock.lock().map_err(|_| SessionError::LockPoisoned)?;
        self.write_entries(&entries)?;
        tracing::debug!(user_id = %identity.id, "Session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().map_err(|_| SessionError::LockPoisoned)?;
        match std::fs::remove_file(self.path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!("Session cleared");
        Ok(())
    }

    fn read(&self) -> Option<Session> {
        let entries = match load_entries(&self.path()) {
            Ok(Some(entries)) => entries,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Stored session unreadable, treating as logged out");
                return None;
            }
        };

        let (Some(token), Some(user)) = (entries.get(TOKEN_KEY), entries.get(USER_KEY)) else {
            tracing::warn!("Stored session incomplete, treating as logged out");
            return None;
        };

        match serde_json::from_str::<Identity>(user) {
            Ok(identity) => Some(Session::new(identity, CredentialToken::new(token.clone()))),
            Err(e) => {
                tracing::warn!(error = %e, "Stored identity corrupted, treating as logged out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::test_identity;
    use crate::models::Role;

    fn test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn missing_file_reads_absent() {
        let dir = test_dir();
        let store = DurableSessionStore::new(dir.path());
        assert!(store.read().is_none());
    }

    #[test]
    fn session_survives_new_store_instance() {
        let dir = test_dir();
        DurableSessionStore::new(dir.path())
            .set(test_identity(Role::Doctor), CredentialToken::new("tok-9"))
            .unwrap();

        // Simulates a full page reload
        let reopened = DurableSessionStore::new(dir.path());
        let session = reopened.read().unwrap();
        assert_eq!(session.identity().role, Role::Doctor);
        assert_eq!(session.token().expose(), "tok-9");
    }

    #[test]
    fn both_keys_written_under_fixed_names() {
        let dir = test_dir();
        let store = DurableSessionStore::new(dir.path());
        store
            .set(test_identity(Role::Patient), CredentialToken::new("tok"))
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["token"], "tok");
        let user: Identity = serde_json::from_str(&map["user"]).unwrap();
        assert_eq!(user.email, "jane@example.org");
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let dir = test_dir();
        let store = DurableSessionStore::new(dir.path());
        store
            .set(test_identity(Role::Patient), CredentialToken::new("tok"))
            .unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.read().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn token_without_user_reads_absent() {
        let dir = test_dir();
        let store = DurableSessionStore::new(dir.path());
        std::fs::write(store.path(), r#"{"token":"orphan"}"#).unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn user_without_token_reads_absent() {
        let dir = test_dir();
        let store = DurableSessionStore::new(dir.path());
        let user = serde_json::to_string(&test_identity(Role::Patient)).unwrap();
        let body = serde_json::json!({ "user": user }).to_string();
        std::fs::write(store.path(), body).unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn corrupted_file_reads_absent() {
        let dir = test_dir();
        let store = DurableSessionStore::new(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn creates_missing_storage_dir() {
        let dir = test_dir();
        let nested = dir.path().join("a").join("b");
        let store = DurableSessionStore::new(&nested);
        store
            .set(test_identity(Role::Patient), CredentialToken::new("tok"))
            .unwrap();
        assert!(store.read().is_some());
    }
}
