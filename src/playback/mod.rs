//! Playback core
//!
//! - Resolver: picks the one source URL a session plays from
//! - Tracker: samples progress and writes it back to storage
//! - Now playing: latest-value snapshot publication
//! - Session: ties the three together for one playback

pub mod now_playing;
pub mod resolver;
pub mod session;
pub mod tracker;

pub use now_playing::NowPlaying;
pub use resolver::{PlaybackError, ResolverOptions, SourceResolver};
pub use session::PlaybackSession;
pub use tracker::{
    register_periodic, PeriodicObserver, ProgressTracker, TickOutcome, TrackerState,
    DEFAULT_SAMPLE_INTERVAL,
};
