//! CLI - Command Line Interface for confplay
//!
//! Every command prints JSON when `--json` is set or stdout is not a TTY.
//!
//! # Examples
//!
//! ```bash
//! # Which URL would session 101 play from?
//! confplay resolve 101
//!
//! # Play it headless for a minute, recording progress
//! confplay play 101 --for 60 --duration 1800
//!
//! # Open it in mpv at the stored position
//! confplay open 101 --player mpv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use confplay::stream::PlayerType;
use confplay::PlaybackError;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// No session with that identifier
    SessionNotFound = 3,
    /// Session has no playable asset
    AssetNotFound = 4,
    /// Asset locator is not a valid URL
    InvalidAsset = 5,
    /// Player could not be started
    PlayerFailed = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<&PlaybackError> for ExitCode {
    fn from(err: &PlaybackError) -> ExitCode {
        match err {
            PlaybackError::SessionNotFound(_) => ExitCode::SessionNotFound,
            PlaybackError::AssetNotFound(_) => ExitCode::AssetNotFound,
            PlaybackError::InvalidAsset(_) => ExitCode::InvalidAsset,
            PlaybackError::Player(_) => ExitCode::PlayerFailed,
            PlaybackError::NoRuntime => ExitCode::Error,
        }
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// confplay - playback source resolution and progress tracking
#[derive(Parser, Debug)]
#[command(
    name = "confplay",
    version,
    about = "Resolve and track playback of conference session videos",
    after_help = "EXAMPLES:\n\
                  confplay list                        List catalog sessions\n\
                  confplay resolve 101                 Show the playback source\n\
                  confplay play 101 --for 60           Play headless for a minute\n\
                  confplay open 101 -p mpv             Open in mpv at last position"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Session catalog (overrides config)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Downloads directory (overrides config)
    #[arg(long, global = true)]
    pub downloads: Option<PathBuf>,

    /// Play this local file instead of the resolved source
    #[arg(long, global = true, hide = true)]
    pub test_media: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List sessions in the catalog
    #[command(visible_alias = "ls")]
    List(ListCmd),

    /// Show which URL a session would play from
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// Show the stored playback position
    #[command(visible_alias = "pos")]
    Position(PositionCmd),

    /// Play a session headless, tracking progress
    Play(PlayCmd),

    /// Open a session in a desktop player
    Open(OpenCmd),
}

/// List sessions
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Only sessions that are live right now
    #[arg(long)]
    pub live: bool,
}

/// Resolve a session's playback source
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Session identifier
    #[arg(required = true)]
    pub session_id: String,
}

/// Show stored position
#[derive(Args, Debug)]
pub struct PositionCmd {
    /// Session identifier
    #[arg(required = true)]
    pub session_id: String,
}

/// Headless playback
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Session identifier
    #[arg(required = true)]
    pub session_id: String,

    /// How long to play, in seconds
    #[arg(long = "for", short = 'f', default_value = "30")]
    pub play_for: u64,

    /// Length of the simulated media, in seconds
    #[arg(long, short = 'D', default_value = "3600")]
    pub duration: f64,

    /// Seconds between progress samples (overrides config)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

/// Open in a desktop player
#[derive(Args, Debug)]
pub struct OpenCmd {
    /// Session identifier
    #[arg(required = true)]
    pub session_id: String,

    /// Player to use (defaults to config, then vlc)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerChoice>,

    /// Start from the beginning instead of the stored position
    #[arg(long)]
    pub restart: bool,
}

/// Player selection for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerChoice {
    /// VLC media player
    #[default]
    Vlc,
    /// mpv media player
    Mpv,
}

impl PlayerChoice {
    /// Parse a configured player name
    pub fn from_config(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "vlc" => Some(PlayerChoice::Vlc),
            "mpv" => Some(PlayerChoice::Mpv),
            _ => None,
        }
    }
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> PlayerType {
        match choice {
            PlayerChoice::Vlc => PlayerType::Vlc,
            PlayerChoice::Mpv => PlayerType::Mpv,
        }
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// One row of `list`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub identifier: String,
    pub title: String,
    pub event: String,
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Output of `position`
#[derive(Debug, Serialize, Deserialize)]
pub struct PositionResponse {
    pub identifier: String,
    pub elapsed: f64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Final report of `play`
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayReport {
    pub identifier: String,
    pub url: String,
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Output of `open`
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenResponse {
    pub status: &'static str,
    pub player: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<f64>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data as JSON, or `human` for terminals
    pub fn print<T: Serialize>(
        &self,
        data: T,
        human: impl std::fmt::Display,
    ) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", human);
        }
        Ok(())
    }

    /// Print one JSON line (streaming output)
    pub fn print_line<T: Serialize>(
        &self,
        data: &T,
        human: impl std::fmt::Display,
    ) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(data)?);
        } else if !self.quiet {
            println!("{}", human);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print a playback error with its semantic exit code
    pub fn playback_error(&self, err: &PlaybackError) -> ExitCode {
        self.error(err.to_string(), ExitCode::from(err))
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
