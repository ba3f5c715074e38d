//! Source resolution
//!
//! Picks the one URL a session should play from, in priority order:
//!
//! 1. a live stream, when an instance is live and a usable live asset exists
//! 2. a downloaded copy of the streaming video
//! 3. the remote streaming video
//!
//! A live flag without a usable live asset is not an error; the session is
//! treated as recorded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{AssetType, ResolvedSource, Session};
use crate::storage::{DownloadCache, SessionStore};
use crate::stream::PlayerError;

/// Reason given when no step produced a URL
pub const NO_VALID_SOURCE: &str = "no valid source";

/// Errors that abort playback start
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Unable to find session with identifier {0}")]
    SessionNotFound(String),
    #[error("Unable to find asset for session {0}")]
    AssetNotFound(String),
    #[error("Invalid stream: {0}")]
    InvalidAsset(String),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("Progress tracking needs a running tokio runtime")]
    NoRuntime,
}

/// Resolver settings
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Play this local file instead of whatever was resolved (debug builds of the catalog only)
    pub forced_test_media_path: Option<PathBuf>,
}

/// Resolves session identifiers to playback sources
pub struct SourceResolver {
    store: Arc<dyn SessionStore>,
    downloads: Arc<dyn DownloadCache>,
    options: ResolverOptions,
}

impl SourceResolver {
    pub fn new(store: Arc<dyn SessionStore>, downloads: Arc<dyn DownloadCache>) -> Self {
        Self {
            store,
            downloads,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Store the resolver reads sessions from
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Look up a session and resolve its playback source
    pub fn resolve(&self, identifier: &str) -> Result<ResolvedSource, PlaybackError> {
        let session = self.find(identifier)?;
        self.resolve_session(&session)
    }

    /// Look up a session or fail with `SessionNotFound`
    pub fn find(&self, identifier: &str) -> Result<Session, PlaybackError> {
        self.store
            .find_session(identifier)
            .ok_or_else(|| PlaybackError::SessionNotFound(identifier.to_string()))
    }

    /// Resolve the playback source of an already loaded session
    pub fn resolve_session(&self, session: &Session) -> Result<ResolvedSource, PlaybackError> {
        let mut stream_url: Option<Url> = None;
        let mut remote_url: Option<Url> = None;
        let mut is_live = false;

        if session.is_currently_live() {
            let live_url = session
                .assets
                .iter()
                .filter(|a| a.asset_type() == AssetType::LiveStreamVideo)
                .find_map(|a| a.parsed_url());

            match live_url {
                Some(url) => {
                    stream_url = Some(url.clone());
                    remote_url = Some(url);
                    is_live = true;
                }
                None => {
                    debug!(
                        session = %session.identifier,
                        "Session is flagged live but has no usable live asset, treating as recorded"
                    );
                }
            }
        }

        if !is_live {
            let asset = session
                .asset(AssetType::StreamingVideo)
                .ok_or_else(|| PlaybackError::AssetNotFound(session.identifier.clone()))?;

            let remote = asset
                .parsed_url()
                .ok_or_else(|| PlaybackError::InvalidAsset(asset.remote_url.clone()))?;

            stream_url = match self.downloads.local_cached_file(session) {
                Some(path) => Some(file_url(&path)?),
                None => Some(remote.clone()),
            };
            remote_url = Some(remote);
        }

        let (Some(mut url), Some(remote_url)) = (stream_url, remote_url) else {
            return Err(PlaybackError::InvalidAsset(NO_VALID_SOURCE.to_string()));
        };

        if let Some(path) = &self.options.forced_test_media_path {
            warn!(path = %path.display(), "Using forced test media instead of resolved source");
            url = file_url(path)?;
        }

        let source = ResolvedSource {
            url,
            remote_url,
            is_live,
        };

        info!(
            session = %session.identifier,
            url = %source.url,
            is_live = source.is_live,
            local = source.is_local(),
            "Resolved playback source"
        );

        Ok(source)
    }
}

/// Convert a local path into a `file://` URL, anchoring relative paths at the working directory
fn file_url(path: &Path) -> Result<Url, PlaybackError> {
    let invalid = || PlaybackError::InvalidAsset(path.display().to_string());

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_err(|_| invalid())?.join(path)
    };

    Url::from_file_path(&absolute).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, Instance};
    use crate::storage::{CatalogStore, NoDownloads};

    fn resolver(sessions: Vec<Session>) -> SourceResolver {
        SourceResolver::new(
            Arc::new(CatalogStore::from_sessions(sessions)),
            Arc::new(NoDownloads),
        )
    }

    fn live_instance() -> Instance {
        Instance {
            identifier: "i1".to_string(),
            is_currently_live: true,
        }
    }

    #[test]
    fn test_missing_session() {
        let err = resolver(vec![]).resolve("nope").unwrap_err();
        assert!(matches!(err, PlaybackError::SessionNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PlaybackError::SessionNotFound("S1".into()).to_string(),
            "Unable to find session with identifier S1"
        );
        assert_eq!(
            PlaybackError::AssetNotFound("S1".into()).to_string(),
            "Unable to find asset for session S1"
        );
        assert_eq!(
            PlaybackError::InvalidAsset("::".into()).to_string(),
            "Invalid stream: ::"
        );
    }

    #[test]
    fn test_live_skips_invalid_live_assets() {
        let mut session = Session::new("S2");
        session.instances.push(live_instance());
        session.assets = vec![
            Asset::new(AssetType::LiveStreamVideo, "%%broken"),
            Asset::new(AssetType::LiveStreamVideo, "https://live/s2.m3u8"),
        ];

        let source = resolver(vec![session]).resolve("S2").unwrap();
        assert!(source.is_live);
        assert_eq!(source.url.as_str(), "https://live/s2.m3u8");
        assert_eq!(source.remote_url, source.url);
    }

    #[test]
    fn test_forced_test_media_overrides() {
        let mut session = Session::new("S1");
        session
            .assets
            .push(Asset::new(AssetType::StreamingVideo, "https://cdn/s1.mp4"));

        let forced = std::env::temp_dir().join("test.m4v");
        let source = resolver(vec![session])
            .with_options(ResolverOptions {
                forced_test_media_path: Some(forced.clone()),
            })
            .resolve("S1")
            .unwrap();

        assert_eq!(source.url, Url::from_file_path(&forced).unwrap());
        assert_eq!(source.remote_url.as_str(), "https://cdn/s1.mp4");
    }

    #[test]
    fn test_forced_test_media_does_not_mask_errors() {
        let resolver = resolver(vec![Session::new("S1")]).with_options(ResolverOptions {
            forced_test_media_path: Some(std::env::temp_dir().join("test.m4v")),
        });
        assert!(matches!(
            resolver.resolve("S1"),
            Err(PlaybackError::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_file_url_relative_path() {
        let url = file_url(Path::new("downloads/s1.mp4")).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/downloads/s1.mp4"));
    }
}
