//! confplay - playback core for conference session videos
//!
//! Decides which URL a session plays from (live stream, downloaded copy or
//! remote video) and keeps its playback position and "now playing" state up
//! to date while it plays.
//!
//! # Modules
//!
//! - `models` - Sessions, assets, positions, resolved sources, snapshots
//! - `storage` - Session store and download cache seams
//! - `stream` - Player seam and player implementations
//! - `playback` - Source resolver, progress tracker, playback session
//! - `config` - Config file handling
//! - `logging` - Tracing subscriber setup

pub mod config;
pub mod logging;
pub mod models;
pub mod playback;
pub mod storage;
pub mod stream;

// Re-export commonly used types
pub use models::{
    Asset, AssetType, Event, Instance, PlaybackSnapshot, Position, ResolvedSource, Session,
};

pub use playback::{
    NowPlaying, PlaybackError, PlaybackSession, ProgressTracker, ResolverOptions, SourceResolver,
    TickOutcome, TrackerState,
};
pub use storage::{CatalogStore, DownloadCache, DownloadDirectory, SessionStore};
pub use stream::{MediaPlayer, PlayerFactory};
