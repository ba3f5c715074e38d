//! Clock-driven player
//!
//! Plays nothing; advances elapsed time with the tokio clock. Duration is
//! withheld until `duration_known_after` has passed, the way a real engine
//! only learns it once the stream header is loaded.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use url::Url;

use super::player::{MediaPlayer, PlayerError, PlayerFactory};

#[derive(Debug)]
struct Clock {
    origin: Instant,
    offset: f64,
}

/// Player whose position is wall-clock time since start (or last seek)
#[derive(Debug)]
pub struct ClockPlayer {
    url: Url,
    duration: f64,
    duration_known_at: Instant,
    clock: Mutex<Clock>,
}

impl ClockPlayer {
    pub fn new(url: Url, duration: f64, duration_known_after: Duration) -> Self {
        let now = Instant::now();
        Self {
            url,
            duration,
            duration_known_at: now + duration_known_after,
            clock: Mutex::new(Clock {
                origin: now,
                offset: 0.0,
            }),
        }
    }
}

impl MediaPlayer for ClockPlayer {
    fn url(&self) -> &Url {
        &self.url
    }

    fn seek(&self, seconds: f64) {
        let mut clock = self.clock.lock();
        clock.origin = Instant::now();
        clock.offset = seconds.clamp(0.0, self.duration.max(0.0));
    }

    fn current_elapsed(&self) -> Option<f64> {
        let clock = self.clock.lock();
        let elapsed = clock.offset + clock.origin.elapsed().as_secs_f64();
        Some(elapsed.min(self.duration.max(0.0)))
    }

    fn current_duration(&self) -> Option<f64> {
        (Instant::now() >= self.duration_known_at).then_some(self.duration)
    }
}

/// Factory producing [`ClockPlayer`]s of a fixed length
#[derive(Debug, Clone)]
pub struct ClockPlayerFactory {
    pub duration: f64,
    pub duration_known_after: Duration,
}

impl ClockPlayerFactory {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            duration_known_after: Duration::ZERO,
        }
    }

    pub fn with_duration_delay(mut self, delay: Duration) -> Self {
        self.duration_known_after = delay;
        self
    }
}

impl PlayerFactory for ClockPlayerFactory {
    fn construct(&self, url: &Url) -> Result<Arc<dyn MediaPlayer>, PlayerError> {
        Ok(Arc::new(ClockPlayer::new(
            url.clone(),
            self.duration,
            self.duration_known_after,
        )))
    }
}
