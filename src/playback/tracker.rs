//! Progress tracking
//!
//! While a recorded session plays, the tracker samples the player on a fixed
//! interval, writes `(elapsed, duration)` back to the store and republishes
//! the "now playing" progress. Live sessions are never tracked.
//!
//! State lives behind one mutex per playback session. A tick holds it for its
//! whole run and teardown takes it before cancelling, so once `teardown`
//! returns no tick can write again.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::now_playing::NowPlaying;
use crate::models::Position;
use crate::storage::SessionStore;
use crate::stream::MediaPlayer;

/// Default time between progress samples
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle of a [`ProgressTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Not tracking; terminal for live sessions
    Inactive,
    /// Resumed and scheduled, no sample recorded yet
    Armed,
    /// At least one sample recorded
    Sampling,
    /// Stopped for good
    TornDown,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Inactive => write!(f, "inactive"),
            TrackerState::Armed => write!(f, "armed"),
            TrackerState::Sampling => write!(f, "sampling"),
            TrackerState::TornDown => write!(f, "torn down"),
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Tracker inactive or torn down; nothing read or written
    Cancelled,
    /// Player could not report a usable position yet
    Skipped,
    /// Position stored and snapshot republished
    Recorded {
        position: Position,
        progress: Option<f64>,
    },
}

/// Handle to a recurring callback; dropping it does not stop the callback, `unregister` does
pub struct PeriodicObserver {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PeriodicObserver {
    /// Stop future callbacks
    pub fn unregister(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Run `callback` every `interval` until `cancel` fires.
///
/// The first call happens one full interval after registration. Must be
/// called from within a tokio runtime.
pub fn register_periodic<F>(
    interval: Duration,
    cancel: CancellationToken,
    mut callback: F,
) -> PeriodicObserver
where
    F: FnMut() + Send + 'static,
{
    let interval = interval.max(MIN_INTERVAL);
    let token = cancel.clone();
    let first = Instant::now() + interval;
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(first, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if token.is_cancelled() {
                        break;
                    }
                    callback();
                }
            }
        }
    });

    PeriodicObserver { cancel, task }
}

struct SamplerInner {
    state: TrackerState,
    player: Option<Arc<dyn MediaPlayer>>,
}

struct Sampler {
    session_id: String,
    store: Arc<dyn SessionStore>,
    now_playing: NowPlaying,
    cancel: CancellationToken,
    inner: Mutex<SamplerInner>,
}

impl Sampler {
    fn tick(&self) -> TickOutcome {
        let mut inner = self.inner.lock();

        if self.cancel.is_cancelled()
            || matches!(inner.state, TrackerState::Inactive | TrackerState::TornDown)
        {
            return TickOutcome::Cancelled;
        }

        let Some(player) = inner.player.as_ref() else {
            return TickOutcome::Cancelled;
        };

        let duration = player
            .current_duration()
            .filter(|d| d.is_finite() && *d >= 0.0);
        let elapsed = player.current_elapsed().filter(|e| e.is_finite());

        let (Some(elapsed), Some(duration)) = (elapsed, duration) else {
            trace!(session = %self.session_id, "Duration not known yet, skipping tick");
            return TickOutcome::Skipped;
        };

        let position = Position::new(elapsed, duration);
        if let Err(e) = self.store.set_stored_position(&self.session_id, position) {
            warn!(session = %self.session_id, error = %e, "Failed to store playback position");
        }

        let progress = (duration != 0.0).then(|| (elapsed / duration).clamp(0.0, 1.0));
        self.now_playing.update_progress(progress);

        inner.state = TrackerState::Sampling;
        trace!(session = %self.session_id, elapsed, duration, "Recorded playback position");

        TickOutcome::Recorded { position, progress }
    }
}

/// Samples playback progress for one playback session
pub struct ProgressTracker {
    sampler: Arc<Sampler>,
    observer: Option<PeriodicObserver>,
}

impl ProgressTracker {
    /// Start tracking `player`.
    ///
    /// Live sessions stay [`TrackerState::Inactive`]. Recorded sessions are
    /// resumed at the stored position and sampled every `interval`, which
    /// requires a tokio runtime.
    pub fn start(
        player: Arc<dyn MediaPlayer>,
        is_live: bool,
        session_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
        now_playing: NowPlaying,
        interval: Duration,
    ) -> Self {
        let session_id = session_id.into();

        let state = if is_live {
            TrackerState::Inactive
        } else {
            let resume_at = store
                .stored_position(&session_id)
                .map(|p| p.elapsed)
                .filter(|e| e.is_finite() && *e >= 0.0)
                .unwrap_or(0.0);
            player.seek(resume_at);
            debug!(session = %session_id, resume_at, "Resumed playback");
            TrackerState::Armed
        };

        let sampler = Arc::new(Sampler {
            session_id,
            store,
            now_playing,
            cancel: CancellationToken::new(),
            inner: Mutex::new(SamplerInner {
                state,
                player: Some(player),
            }),
        });

        let observer = (state == TrackerState::Armed).then(|| {
            let tick_sampler = Arc::clone(&sampler);
            register_periodic(interval, sampler.cancel.clone(), move || {
                tick_sampler.tick();
            })
        });

        Self { sampler, observer }
    }

    pub fn state(&self) -> TrackerState {
        self.sampler.inner.lock().state
    }

    /// Take a sample right away, outside the schedule
    pub fn sample_now(&self) -> TickOutcome {
        self.sampler.tick()
    }

    /// Stop sampling and release the player. Safe to call more than once.
    pub fn teardown(&mut self) {
        let mut inner = self.sampler.inner.lock();

        self.sampler.cancel.cancel();
        if let Some(observer) = self.observer.take() {
            observer.unregister();
        }

        if inner.player.take().is_none() {
            return;
        }

        if inner.state != TrackerState::Inactive {
            inner.state = TrackerState::TornDown;
        }
        debug!(session = %self.sampler.session_id, state = %inner.state, "Progress tracker torn down");
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}
