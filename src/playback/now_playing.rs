//! "Now playing" publication
//!
//! A single-value channel: subscribers always see the latest snapshot, late
//! subscribers get it immediately, and no history is kept.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::PlaybackSnapshot;

/// Publisher of the current [`PlaybackSnapshot`]
#[derive(Debug, Clone)]
pub struct NowPlaying {
    tx: Arc<watch::Sender<Option<PlaybackSnapshot>>>,
}

impl NowPlaying {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the snapshot
    pub fn publish(&self, snapshot: PlaybackSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    /// Republish the current snapshot with new progress.
    ///
    /// `None` clears it (duration zero or unknown).
    pub fn update_progress(&self, progress: Option<f64>) {
        self.tx.send_modify(|current| {
            if let Some(snapshot) = current.as_mut() {
                snapshot.progress = progress;
            }
        });
    }

    /// Latest snapshot, if any was published
    pub fn current(&self) -> Option<PlaybackSnapshot> {
        self.tx.borrow().clone()
    }

    /// Receiver that starts at the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<Option<PlaybackSnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PlaybackSnapshot {
        PlaybackSnapshot {
            title: "Keynote".to_string(),
            artist: "WWDC24".to_string(),
            progress: None,
            is_live: false,
            image_url: None,
        }
    }

    #[test]
    fn test_current_starts_empty() {
        assert!(NowPlaying::new().current().is_none());
    }

    #[test]
    fn test_late_subscriber_sees_latest() {
        let now_playing = NowPlaying::new();
        now_playing.publish(snapshot());
        now_playing.update_progress(Some(0.25));
        now_playing.update_progress(Some(0.5));

        let rx = now_playing.subscribe();
        assert_eq!(rx.borrow().as_ref().unwrap().progress, Some(0.5));
    }

    #[test]
    fn test_update_without_progress_clears_previous() {
        let now_playing = NowPlaying::new();
        now_playing.publish(snapshot());
        now_playing.update_progress(Some(0.25));
        now_playing.update_progress(None);
        assert_eq!(now_playing.current().unwrap().progress, None);
    }

    #[test]
    fn test_update_before_publish_is_noop() {
        let now_playing = NowPlaying::new();
        now_playing.update_progress(Some(0.5));
        assert!(now_playing.current().is_none());
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_update() {
        let now_playing = NowPlaying::new();
        let mut rx = now_playing.subscribe();
        now_playing.publish(snapshot());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().title, "Keynote");
    }
}
