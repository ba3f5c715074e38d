//! Player seam and local player launcher
//!
//! The playback core drives an opaque [`MediaPlayer`]: it hands it a URL,
//! seeks it, and polls elapsed/duration. [`LocalPlayer`] opens a resolved
//! source in VLC or mpv for people who just want to watch.

use std::process::Stdio;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::{Child, Command};
use url::Url;

/// Errors from player construction and launch
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Cannot play {0}")]
    Unsupported(String),
}

/// An already-playing media engine
pub trait MediaPlayer: Send + Sync {
    /// URL the player was constructed with
    fn url(&self) -> &Url;

    /// Jump to an absolute offset in seconds
    fn seek(&self, seconds: f64);

    /// Seconds played so far, `None` before playback starts
    fn current_elapsed(&self) -> Option<f64>;

    /// Total length in seconds; `None` while it is not known yet
    fn current_duration(&self) -> Option<f64>;
}

/// Builds players for resolved URLs
pub trait PlayerFactory: Send + Sync {
    fn construct(&self, url: &Url) -> Result<Arc<dyn MediaPlayer>, PlayerError>;
}

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// VLC media player (default)
    #[default]
    Vlc,
    /// mpv media player
    Mpv,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Arguments to open `url` starting at `start_at` seconds
    pub fn args(&self, url: &Url, start_at: Option<f64>) -> Vec<String> {
        let mut args = vec![url.to_string()];
        let start = start_at.filter(|s| s.is_finite() && *s > 0.0);
        match self {
            PlayerType::Vlc => {
                if let Some(secs) = start {
                    args.push(format!("--start-time={:.0}", secs));
                }
                args.push("--no-video-title-show".to_string());
            }
            PlayerType::Mpv => {
                if let Some(secs) = start {
                    args.push(format!("--start={:.0}", secs));
                }
                args.push("--force-window=immediate".to_string());
            }
        }
        args
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Launches an external desktop player
pub struct LocalPlayer {
    player_type: PlayerType,
}

impl LocalPlayer {
    pub fn new(player_type: PlayerType) -> Self {
        Self { player_type }
    }

    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();

        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Open `url`, resuming at `start_at` seconds when given
    pub fn launch(&self, url: &Url, start_at: Option<f64>) -> Result<Child, PlayerError> {
        if !matches!(url.scheme(), "http" | "https" | "file") {
            return Err(PlayerError::Unsupported(url.to_string()));
        }

        let mut cmd = Command::new(self.player_type.command());
        cmd.args(self.player_type.args(url, start_at))
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }
}
