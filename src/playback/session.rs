//! Playback session
//!
//! Owns everything that lives exactly as long as one playback: the resolved
//! source, the player, the "now playing" publisher and the progress tracker.
//! Ending the session (or dropping it) tears the tracker down before the
//! player is released.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::info;

use super::now_playing::NowPlaying;
use super::resolver::{PlaybackError, SourceResolver};
use super::tracker::{ProgressTracker, TickOutcome, TrackerState};
use crate::models::{PlaybackSnapshot, ResolvedSource, Session};
use crate::stream::{MediaPlayer, PlayerFactory};

/// One active playback of a session
pub struct PlaybackSession {
    session: Session,
    source: ResolvedSource,
    now_playing: NowPlaying,
    tracker: ProgressTracker,
    player: Option<Arc<dyn MediaPlayer>>,
}

impl PlaybackSession {
    /// Resolve `identifier`, construct a player for it and start tracking.
    ///
    /// Fails before anything is written if resolution or player
    /// construction fails. Recorded sessions are sampled on a tokio task, so
    /// starting one outside a runtime fails with [`PlaybackError::NoRuntime`].
    pub fn start(
        identifier: &str,
        resolver: &SourceResolver,
        factory: &dyn PlayerFactory,
        sample_interval: Duration,
    ) -> Result<Self, PlaybackError> {
        let session = resolver.find(identifier)?;
        let source = resolver.resolve_session(&session)?;
        if !source.is_live && Handle::try_current().is_err() {
            return Err(PlaybackError::NoRuntime);
        }
        let player = factory.construct(&source.url)?;

        let now_playing = NowPlaying::new();
        now_playing.publish(PlaybackSnapshot::for_session(&session, source.is_live));

        let tracker = ProgressTracker::start(
            Arc::clone(&player),
            source.is_live,
            session.identifier.clone(),
            Arc::clone(resolver.store()),
            now_playing.clone(),
            sample_interval,
        );

        info!(
            session = %session.identifier,
            is_live = source.is_live,
            tracker = %tracker.state(),
            "Playback started"
        );

        Ok(Self {
            session,
            source,
            now_playing,
            tracker,
            player: Some(player),
        })
    }

    /// Session record as it was when playback started
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn source(&self) -> &ResolvedSource {
        &self.source
    }

    pub fn is_live(&self) -> bool {
        self.source.is_live
    }

    /// Player handle, `None` once the session has ended
    pub fn player(&self) -> Option<&Arc<dyn MediaPlayer>> {
        self.player.as_ref()
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    /// Latest "now playing" snapshot
    pub fn current_snapshot(&self) -> Option<PlaybackSnapshot> {
        self.now_playing.current()
    }

    /// Subscribe to snapshot updates; the receiver starts at the latest value
    pub fn subscribe(&self) -> watch::Receiver<Option<PlaybackSnapshot>> {
        self.now_playing.subscribe()
    }

    /// Sample progress immediately
    pub fn sample_now(&self) -> TickOutcome {
        self.tracker.sample_now()
    }

    /// Stop tracking and release the player. Safe to call more than once.
    pub fn end(&mut self) {
        self.tracker.teardown();
        if self.player.take().is_some() {
            info!(session = %self.session.identifier, "Playback ended");
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.end();
    }
}
