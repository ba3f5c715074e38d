//! Storage collaborators
//!
//! - Catalog: session records and their persisted playback position
//! - Downloads: lookup of previously downloaded media files
//!
//! The playback core only talks to the traits defined here.

pub mod catalog;
pub mod downloads;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{Position, Session};

pub use catalog::CatalogStore;
pub use downloads::DownloadDirectory;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No session with identifier {0}")]
    UnknownSession(String),
    #[error("Catalog I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Read/write access to session records
pub trait SessionStore: Send + Sync {
    /// Look up a session by identifier
    fn find_session(&self, identifier: &str) -> Option<Session>;

    /// Stored position, `None` for unknown sessions
    fn stored_position(&self, identifier: &str) -> Option<Position>;

    /// Overwrite the two position fields of a session
    fn set_stored_position(&self, identifier: &str, position: Position) -> Result<(), StoreError>;
}

/// Answers "is there already a local file for this session?"
pub trait DownloadCache: Send + Sync {
    fn local_cached_file(&self, session: &Session) -> Option<PathBuf>;
}

/// Cache that never has anything downloaded
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDownloads;

impl DownloadCache for NoDownloads {
    fn local_cached_file(&self, _session: &Session) -> Option<PathBuf> {
        None
    }
}
