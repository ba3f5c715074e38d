//! JSON session catalog
//!
//! Sessions are loaded from a JSON document shaped like
//! `{ "sessions": [ { "identifier": "...", ... } ] }` and kept in memory.
//! Position writes only touch memory; `persist` flushes them to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SessionStore, StoreError};
use crate::models::{Position, Session};

/// On-disk catalog document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    sessions: Vec<Session>,
}

/// In-memory session store backed by an optional JSON file
#[derive(Debug, Default)]
pub struct CatalogStore {
    path: Option<PathBuf>,
    sessions: RwLock<BTreeMap<String, Session>>,
}

impl CatalogStore {
    /// Build a store from sessions without any backing file
    pub fn from_sessions(sessions: impl IntoIterator<Item = Session>) -> Self {
        Self {
            path: None,
            sessions: RwLock::new(index(sessions)),
        }
    }

    /// Load a catalog file; a missing file yields an empty catalog bound to that path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<CatalogFile>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CatalogFile::default(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), sessions = file.sessions.len(), "Catalog loaded");

        Ok(Self {
            path: Some(path),
            sessions: RwLock::new(index(file.sessions)),
        })
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All sessions ordered by identifier
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.read().values().cloned().collect()
    }

    /// Add or replace a session record
    pub fn insert(&self, session: Session) {
        self.sessions
            .write()
            .insert(session.identifier.clone(), session);
    }

    /// Write the catalog back to its file. No-op for in-memory stores.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = CatalogFile {
            sessions: self.sessions(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;

        debug!(path = %path.display(), "Catalog persisted");
        Ok(())
    }
}

impl SessionStore for CatalogStore {
    fn find_session(&self, identifier: &str) -> Option<Session> {
        self.sessions.read().get(identifier).cloned()
    }

    fn stored_position(&self, identifier: &str) -> Option<Position> {
        self.sessions.read().get(identifier).map(|s| s.position)
    }

    fn set_stored_position(&self, identifier: &str, position: Position) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(identifier)
            .ok_or_else(|| StoreError::UnknownSession(identifier.to_string()))?;
        session.position = position;
        Ok(())
    }
}

fn index(sessions: impl IntoIterator<Item = Session>) -> BTreeMap<String, Session> {
    sessions
        .into_iter()
        .map(|s| (s.identifier.clone(), s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, AssetType};

    #[test]
    fn test_find_and_update_position() {
        let store = CatalogStore::from_sessions([Session::new("S1")]);
        assert!(store.find_session("S1").is_some());
        assert!(store.find_session("S2").is_none());

        store
            .set_stored_position("S1", Position::new(30.0, 120.0))
            .unwrap();
        assert_eq!(
            store.stored_position("S1"),
            Some(Position::new(30.0, 120.0))
        );
    }

    #[test]
    fn test_set_position_unknown_session() {
        let store = CatalogStore::default();
        let err = store
            .set_stored_position("missing", Position::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownSession(id) if id == "missing"));
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("catalog.json")).unwrap();
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_persist_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");

        let mut session = Session::new("S1");
        session
            .assets
            .push(Asset::new(AssetType::StreamingVideo, "https://cdn/s1.mp4"));

        let store = CatalogStore::open(&path).unwrap();
        store.insert(session);
        store
            .set_stored_position("S1", Position::new(42.0, 600.0))
            .unwrap();
        store.persist().unwrap();

        let reopened = CatalogStore::open(&path).unwrap();
        let loaded = reopened.find_session("S1").unwrap();
        assert_eq!(loaded.position, Position::new(42.0, 600.0));
        assert_eq!(loaded.assets.len(), 1);
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            CatalogStore::open(&path),
            Err(StoreError::Format(_))
        ));
    }
}
