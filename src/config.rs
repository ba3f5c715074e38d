//! Configuration management for confplay
//!
//! Handles config file loading/saving and the debug media override.
//! Config is stored at ~/.config/confplay/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::playback::{ResolverOptions, DEFAULT_SAMPLE_INTERVAL};

/// Debug-only switches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Play `test_media_path` instead of any resolved source
    #[serde(default)]
    pub use_test_media: bool,
    #[serde(default)]
    pub test_media_path: Option<PathBuf>,
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Session catalog (JSON)
    pub catalog_path: Option<PathBuf>,
    /// Directory holding downloaded session videos
    pub downloads_dir: Option<PathBuf>,
    /// Seconds between progress samples
    pub sample_interval_secs: Option<u64>,
    /// Default log filter (overridden by RUST_LOG)
    pub log_level: Option<String>,
    /// Preferred desktop player (vlc or mpv)
    pub preferred_player: Option<String>,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Config {
    /// Get config file path (~/.config/confplay/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("confplay").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load config from a specific file, or return default if unreadable
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Catalog path with fallback to ~/.local/share/confplay/catalog.json
    pub fn catalog_path(&self) -> PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| data_dir().join("catalog.json"))
    }

    /// Downloads dir with fallback to ~/.local/share/confplay/downloads
    pub fn downloads_dir(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("downloads"))
    }

    /// Sampling interval, 5 seconds unless configured
    pub fn sample_interval(&self) -> Duration {
        self.sample_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SAMPLE_INTERVAL)
    }

    /// Log filter with fallback to "warn"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }

    /// Resolver options; the test media path only applies when explicitly enabled
    pub fn resolver_options(&self) -> ResolverOptions {
        let forced_test_media_path = if self.debug.use_test_media {
            self.debug.test_media_path.clone()
        } else {
            None
        };
        ResolverOptions {
            forced_test_media_path,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("confplay")
}
