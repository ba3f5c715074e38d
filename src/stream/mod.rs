//! Player infrastructure
//!
//! - Player: the `MediaPlayer` seam plus a VLC/mpv launcher
//! - Clock: a clock-driven player for headless playback sessions

pub mod clock;
pub mod player;

pub use clock::{ClockPlayer, ClockPlayerFactory};
pub use player::{LocalPlayer, MediaPlayer, PlayerError, PlayerFactory, PlayerType};
