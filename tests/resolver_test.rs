//! Source Resolver Tests
//!
//! Precedence between live streams, downloads and remote videos, and the
//! error kind produced for each kind of broken catalog entry.

use std::path::PathBuf;
use std::sync::Arc;

use confplay::models::{Asset, AssetType, Instance, Session};
use confplay::playback::{PlaybackError, SourceResolver};
use confplay::storage::{CatalogStore, DownloadCache, DownloadDirectory, NoDownloads};
use url::Url;

// =============================================================================
// Fixtures
// =============================================================================

/// Download cache that claims every session is downloaded to one path
struct FixedDownload(PathBuf);

impl DownloadCache for FixedDownload {
    fn local_cached_file(&self, _session: &Session) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

fn session(id: &str, live: bool, assets: Vec<Asset>) -> Session {
    let mut session = Session::new(id);
    session.instances.push(Instance {
        identifier: format!("{}-instance", id),
        is_currently_live: live,
    });
    session.assets = assets;
    session
}

fn streaming(url: &str) -> Asset {
    Asset::new(AssetType::StreamingVideo, url)
}

fn live(url: &str) -> Asset {
    Asset::new(AssetType::LiveStreamVideo, url)
}

fn resolver(sessions: Vec<Session>) -> SourceResolver {
    SourceResolver::new(
        Arc::new(CatalogStore::from_sessions(sessions)),
        Arc::new(NoDownloads),
    )
}

fn resolver_with_download(sessions: Vec<Session>, path: PathBuf) -> SourceResolver {
    SourceResolver::new(
        Arc::new(CatalogStore::from_sessions(sessions)),
        Arc::new(FixedDownload(path)),
    )
}

// =============================================================================
// Live Precedence
// =============================================================================

/// A valid live asset wins no matter what the recorded asset looks like
#[test]
fn test_live_asset_takes_precedence() {
    let recorded_variants = vec![
        vec![streaming("https://cdn/s2.mp4")],
        vec![streaming("not a url")],
        vec![],
    ];

    for recorded in recorded_variants {
        let mut assets = recorded;
        assets.push(live("https://live/s2.m3u8"));
        let resolver = resolver(vec![session("S2", true, assets)]);

        let source = resolver.resolve("S2").unwrap();
        assert!(source.is_live);
        assert_eq!(source.url.as_str(), "https://live/s2.m3u8");
    }
}

/// Live precedence also beats a downloaded copy
#[test]
fn test_live_asset_ignores_download() {
    let resolver = resolver_with_download(
        vec![session(
            "S2",
            true,
            vec![streaming("https://cdn/s2.mp4"), live("https://live/s2.m3u8")],
        )],
        std::env::temp_dir().join("s2.mp4"),
    );

    let source = resolver.resolve("S2").unwrap();
    assert!(source.is_live);
    assert!(!source.is_local());
}

/// Live assets are ignored when no instance is live
#[test]
fn test_live_asset_needs_live_instance() {
    let resolver = resolver(vec![session(
        "S3",
        false,
        vec![live("https://live/s3.m3u8"), streaming("https://cdn/s3.mp4")],
    )]);

    let source = resolver.resolve("S3").unwrap();
    assert!(!source.is_live);
    assert_eq!(source.url.as_str(), "https://cdn/s3.mp4");
}

/// Marked live without a usable live asset behaves exactly like not live
#[test]
fn test_stale_live_flag_falls_through() {
    let asset_sets = vec![
        vec![streaming("https://cdn/s4.mp4")],
        vec![streaming("https://cdn/s4.mp4"), live("::broken::")],
        vec![],
        vec![live("::broken::")],
        vec![streaming("garbage")],
    ];

    for assets in asset_sets {
        let marked_live = resolver(vec![session("S4", true, assets.clone())]).resolve("S4");
        let not_live = resolver(vec![session("S4", false, assets)]).resolve("S4");

        match (marked_live, not_live) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(PlaybackError::AssetNotFound(a)), Err(PlaybackError::AssetNotFound(b))) => {
                assert_eq!(a, b)
            }
            (Err(PlaybackError::InvalidAsset(a)), Err(PlaybackError::InvalidAsset(b))) => {
                assert_eq!(a, b)
            }
            (a, b) => panic!("Diverged: {:?} vs {:?}", a, b),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_session() {
    let err = resolver(vec![]).resolve("missing").unwrap_err();
    assert!(matches!(err, PlaybackError::SessionNotFound(ref id) if id == "missing"));
    assert_eq!(
        err.to_string(),
        "Unable to find session with identifier missing"
    );
}

/// No streaming video always means AssetNotFound, whatever else is attached
#[test]
fn test_missing_streaming_asset() {
    let asset_sets = vec![
        vec![],
        vec![Asset::new(AssetType::Image, "https://cdn/thumb.jpg")],
        vec![live("https://live/s5.m3u8")],
    ];

    for assets in asset_sets {
        let err = resolver(vec![session("S5", false, assets)])
            .resolve("S5")
            .unwrap_err();
        assert!(matches!(err, PlaybackError::AssetNotFound(ref id) if id == "S5"));
    }
}

#[test]
fn test_malformed_streaming_locator() {
    for locator in ["not a url", "", "//cdn/relative.mp4", "http://[::1"] {
        let err = resolver(vec![session("S6", false, vec![streaming(locator)])])
            .resolve("S6")
            .unwrap_err();
        assert!(
            matches!(err, PlaybackError::InvalidAsset(ref l) if l == locator),
            "locator {:?} gave {:?}",
            locator,
            err
        );
    }
}

/// A malformed locator is reported even when a download exists
#[test]
fn test_malformed_locator_beats_download() {
    let resolver = resolver_with_download(
        vec![session("S7", false, vec![streaming("not a url")])],
        std::env::temp_dir().join("s7.mp4"),
    );
    assert!(matches!(
        resolver.resolve("S7"),
        Err(PlaybackError::InvalidAsset(_))
    ));
}

// =============================================================================
// Local Cache
// =============================================================================

/// Downloaded copy is played, remote URL is remembered
#[test]
fn test_local_download_overrides_playback_url() {
    let local = std::env::temp_dir().join("s1.mp4");
    let resolver = resolver_with_download(
        vec![session("S1", false, vec![streaming("https://cdn/s1.mp4")])],
        local.clone(),
    );

    let source = resolver.resolve("S1").unwrap();
    assert!(source.is_local());
    assert_eq!(source.url, Url::from_file_path(&local).unwrap());
    assert_eq!(source.remote_url.as_str(), "https://cdn/s1.mp4");
    assert!(!source.is_live);
}

#[test]
fn test_download_directory_integration() {
    let dir = tempfile::tempdir().unwrap();
    let sessions = vec![
        session("S1", false, vec![streaming("https://cdn/videos/s1.mp4")]),
        session("S2", false, vec![streaming("https://cdn/videos/s2.mp4")]),
    ];
    std::fs::write(dir.path().join("s1.mp4"), b"downloaded").unwrap();

    let resolver = SourceResolver::new(
        Arc::new(CatalogStore::from_sessions(sessions)),
        Arc::new(DownloadDirectory::new(dir.path())),
    );

    let downloaded = resolver.resolve("S1").unwrap();
    assert!(downloaded.is_local());
    assert_eq!(downloaded.remote_url.as_str(), "https://cdn/videos/s1.mp4");

    let streamed = resolver.resolve("S2").unwrap();
    assert!(!streamed.is_local());
    assert_eq!(streamed.url, streamed.remote_url);
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_resolve_is_idempotent() {
    let resolver = resolver(vec![
        session("S1", false, vec![streaming("https://cdn/s1.mp4")]),
        session("S2", true, vec![live("https://live/s2.m3u8")]),
    ]);

    for id in ["S1", "S2"] {
        let first = resolver.resolve(id).unwrap();
        let second = resolver.resolve(id).unwrap();
        assert_eq!(first, second);
    }
}

/// Resolution never touches the stored position
#[test]
fn test_resolve_is_read_only() {
    let mut s1 = session("S1", false, vec![streaming("https://cdn/s1.mp4")]);
    s1.position = confplay::Position::new(10.0, 100.0);
    let store = Arc::new(CatalogStore::from_sessions([s1.clone()]));
    let resolver = SourceResolver::new(store.clone(), Arc::new(NoDownloads));

    resolver.resolve("S1").unwrap();
    let _ = resolver.resolve("missing");

    assert_eq!(store.sessions(), vec![s1]);
}
