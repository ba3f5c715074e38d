//! Downloaded media lookup
//!
//! A session counts as downloaded when the downloads directory holds a file
//! named after the last path segment of its streaming video locator.

use std::path::{Path, PathBuf};

use tracing::trace;

use super::DownloadCache;
use crate::models::{AssetType, Session};

/// Download cache rooted at a directory
#[derive(Debug, Clone)]
pub struct DownloadDirectory {
    root: PathBuf,
}

impl DownloadDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the download for a session would live, whether or not it exists
    pub fn local_path(&self, session: &Session) -> Option<PathBuf> {
        let url = session.asset(AssetType::StreamingVideo)?.parsed_url()?;
        let filename = url
            .path_segments()?
            .rfind(|segment| !segment.is_empty())?
            .to_string();
        Some(self.root.join(filename))
    }
}

impl DownloadCache for DownloadDirectory {
    fn local_cached_file(&self, session: &Session) -> Option<PathBuf> {
        let path = self.local_path(session)?;
        let found = path.is_file();
        trace!(session = %session.identifier, path = %path.display(), found, "Download lookup");
        found.then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asset;

    fn session_with(locator: &str) -> Session {
        let mut session = Session::new("S1");
        session
            .assets
            .push(Asset::new(AssetType::StreamingVideo, locator));
        session
    }

    #[test]
    fn test_local_path_uses_last_segment() {
        let downloads = DownloadDirectory::new("/tmp/downloads");
        let path = downloads
            .local_path(&session_with("https://cdn/videos/2024/s1_hd.mp4"))
            .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/downloads/s1_hd.mp4"));
    }

    #[test]
    fn test_no_path_without_valid_asset() {
        let downloads = DownloadDirectory::new("/tmp/downloads");
        assert!(downloads.local_path(&Session::new("S1")).is_none());
        assert!(downloads.local_path(&session_with("garbage")).is_none());
    }

    #[test]
    fn test_cached_file_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = DownloadDirectory::new(dir.path());
        let session = session_with("https://cdn/s1.mp4");

        assert!(downloads.local_cached_file(&session).is_none());

        std::fs::write(dir.path().join("s1.mp4"), b"video").unwrap();
        assert_eq!(
            downloads.local_cached_file(&session),
            Some(dir.path().join("s1.mp4"))
        );
    }
}
