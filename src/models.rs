//! Data structures and types for confplay
//!
//! Contains all shared models used across the crate organized by domain:
//! - **Catalog**: sessions, events, instances and their media assets
//! - **Position**: persisted elapsed/duration pair
//! - **Playback**: resolved sources and "now playing" snapshots

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Title shown when a session has none
pub const FALLBACK_TITLE: &str = "Conference Session";

/// Source name shown when a session has no parent event
pub const FALLBACK_EVENT_NAME: &str = "Conference";

// =============================================================================
// Catalog Models
// =============================================================================

/// Kind of media artifact attached to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    StreamingVideo,
    LiveStreamVideo,
    Image,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::StreamingVideo => write!(f, "streaming video"),
            AssetType::LiveStreamVideo => write!(f, "live stream"),
            AssetType::Image => write!(f, "image"),
        }
    }
}

/// One media artifact (video stream or thumbnail) attached to a session.
///
/// The type is fixed at construction; there is no setter for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "type")]
    asset_type: AssetType,
    /// Remote locator as stored, not guaranteed to be a valid URL
    pub remote_url: String,
}

impl Asset {
    pub fn new(asset_type: AssetType, remote_url: impl Into<String>) -> Self {
        Self {
            asset_type,
            remote_url: remote_url.into(),
        }
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// Parse the remote locator, `None` if malformed
    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.remote_url).ok()
    }
}

/// Scheduled occurrence of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub identifier: String,
    #[serde(default)]
    pub is_currently_live: bool,
}

/// Parent event (e.g. a yearly conference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub identifier: String,
    pub name: String,
    /// Base URL for session artwork
    #[serde(default)]
    pub images_path: Option<String>,
}

/// Persisted playback position in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub elapsed: f64,
    pub duration: f64,
}

impl Position {
    pub fn new(elapsed: f64, duration: f64) -> Self {
        Self { elapsed, duration }
    }

    /// Fraction watched, `None` while the duration is zero or unusable
    pub fn progress(&self) -> Option<f64> {
        if self.duration.is_finite() && self.duration > 0.0 && self.elapsed.is_finite() {
            Some((self.elapsed / self.duration).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// Format as "MM:SS / MM:SS"
    pub fn format(&self) -> String {
        format!(
            "{} / {}",
            format_seconds(self.elapsed),
            format_seconds(self.duration)
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.progress() {
            Some(p) => write!(f, "{} ({:.0}%)", self.format(), p * 100.0),
            None => write!(f, "{}", self.format()),
        }
    }
}

/// One recorded or live conference talk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identifier: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Identifier used to build artwork paths
    #[serde(default)]
    pub static_content_id: Option<String>,
    #[serde(default)]
    pub event: Option<Event>,
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub position: Position,
}

impl Session {
    /// Create an empty session with only an identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            static_content_id: None,
            event: None,
            instances: Vec::new(),
            assets: Vec::new(),
            position: Position::default(),
        }
    }

    /// True when any instance is flagged as broadcasting right now
    pub fn is_currently_live(&self) -> bool {
        self.instances.iter().any(|i| i.is_currently_live)
    }

    /// Find the asset of the given type.
    ///
    /// Images are never stored; they are derived from the event's images path.
    pub fn asset(&self, asset_type: AssetType) -> Option<Asset> {
        if asset_type == AssetType::Image {
            return self.image_asset();
        }
        self.assets
            .iter()
            .find(|a| a.asset_type() == asset_type)
            .cloned()
    }

    /// Build the wide artwork asset from the event images path
    pub fn image_asset(&self) -> Option<Asset> {
        let path = self.event.as_ref()?.images_path.as_deref()?;
        let content_id = self.static_content_id.as_deref()?;

        let mut base = Url::parse(path).ok()?;
        let filename = format!("{}_wide_900x506_1x.jpg", content_id);
        base.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(content_id)
            .push(&filename);

        Some(Asset::new(AssetType::Image, base.to_string()))
    }

    /// Title for display, with fallback
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(FALLBACK_TITLE)
    }

    /// Parent event name for display, with fallback
    pub fn event_name(&self) -> &str {
        self.event
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or(FALLBACK_EVENT_NAME)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = if self.is_currently_live() { " [LIVE]" } else { "" };
        write!(
            f,
            "{} - {} ({}){}",
            self.identifier,
            self.display_title(),
            self.event_name(),
            live
        )
    }
}

// =============================================================================
// Playback Models
// =============================================================================

/// Outcome of source resolution, recomputed at every playback start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSource {
    /// URL handed to the player (may be a local file)
    pub url: Url,
    /// Remote locator kept for display and sharing
    pub remote_url: Url,
    pub is_live: bool,
}

impl ResolvedSource {
    /// True when playback reads from disk instead of the network
    pub fn is_local(&self) -> bool {
        self.url.scheme() == "file"
    }
}

impl fmt::Display for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_live {
            write!(f, "LIVE {}", self.url)
        } else if self.url != self.remote_url {
            write!(f, "{} (remote: {})", self.url, self.remote_url)
        } else {
            write!(f, "{}", self.url)
        }
    }
}

/// Latest playback summary for "now playing" consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub title: String,
    /// Source event name, shown where an artist would be
    pub artist: String,
    /// Fraction in [0, 1]; omitted until a non-zero duration is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Url>,
}

impl PlaybackSnapshot {
    /// Initial snapshot for a session about to play
    pub fn for_session(session: &Session, is_live: bool) -> Self {
        Self {
            title: session.display_title().to_string(),
            artist: session.event_name().to_string(),
            progress: if is_live { None } else { session.position.progress() },
            is_live,
            image_url: session.image_asset().and_then(|a| a.parsed_url()),
        }
    }
}

impl fmt::Display for PlaybackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_live {
            return write!(f, "● LIVE {} - {}", self.title, self.artist);
        }
        match self.progress {
            Some(p) => write!(f, "{} - {} {:.0}%", self.title, self.artist, p * 100.0),
            None => write!(f, "{} - {}", self.title, self.artist),
        }
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Format seconds as HH:MM:SS or MM:SS
pub fn format_seconds(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "--:--".to_string();
    }
    let total_secs = secs as u64;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
