//! CLI Command Handlers
//!
//! Implements all CLI commands on top of the playback core.
//! Each handler takes CLI args, a [`Context`] and Output, returns ExitCode.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing::warn;

use confplay::config::Config;
use confplay::models::format_seconds;
use confplay::playback::{PlaybackError, PlaybackSession, ResolverOptions, SourceResolver};
use confplay::storage::{CatalogStore, DownloadDirectory, SessionStore};
use confplay::stream::{ClockPlayerFactory, LocalPlayer, PlayerType};

use crate::cli::{
    Cli, ExitCode, ListCmd, OpenCmd, OpenResponse, Output, PlayCmd, PlayReport, PlayerChoice,
    PositionCmd, PositionResponse, ResolveCmd, SessionSummary,
};

// =============================================================================
// Context
// =============================================================================

/// Everything a command needs, built from config plus CLI overrides
pub struct Context {
    pub config: Config,
    pub store: Arc<CatalogStore>,
    pub resolver: SourceResolver,
}

impl Context {
    pub fn load(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let catalog_path = cli.catalog.clone().unwrap_or_else(|| config.catalog_path());
        let downloads_dir = cli
            .downloads
            .clone()
            .unwrap_or_else(|| config.downloads_dir());

        let store = Arc::new(
            CatalogStore::open(&catalog_path)
                .with_context(|| format!("Failed to open catalog {}", catalog_path.display()))?,
        );

        let options = match &cli.test_media {
            Some(path) => ResolverOptions {
                forced_test_media_path: Some(path.clone()),
            },
            None => config.resolver_options(),
        };

        let resolver = SourceResolver::new(
            store.clone(),
            Arc::new(DownloadDirectory::new(downloads_dir)),
        )
        .with_options(options);

        Ok(Self {
            config,
            store,
            resolver,
        })
    }
}

// =============================================================================
// List Command
// =============================================================================

pub fn list_cmd(cmd: ListCmd, ctx: &Context, output: &Output) -> ExitCode {
    let sessions: Vec<SessionSummary> = ctx
        .store
        .sessions()
        .into_iter()
        .filter(|s| !cmd.live || s.is_currently_live())
        .map(|s| SessionSummary {
            title: s.display_title().to_string(),
            event: s.event_name().to_string(),
            is_live: s.is_currently_live(),
            progress: s.position.progress(),
            identifier: s.identifier,
        })
        .collect();

    if sessions.is_empty() {
        output.info("No sessions in catalog");
    }

    let human = sessions
        .iter()
        .map(|s| {
            let live = if s.is_live { " [LIVE]" } else { "" };
            let progress = s
                .progress
                .map(|p| format!(" {:.0}%", p * 100.0))
                .unwrap_or_default();
            format!("{:<12} {} ({}){}{}", s.identifier, s.title, s.event, live, progress)
        })
        .collect::<Vec<_>>()
        .join("\n");

    match output.print(&sessions, human) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(e.to_string(), ExitCode::Error),
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

pub fn resolve_cmd(cmd: ResolveCmd, ctx: &Context, output: &Output) -> ExitCode {
    match ctx.resolver.resolve(&cmd.session_id) {
        Ok(source) => match output.print(&source, &source) {
            Ok(()) => ExitCode::Success,
            Err(e) => output.error(e.to_string(), ExitCode::Error),
        },
        Err(e) => output.playback_error(&e),
    }
}

// =============================================================================
// Position Command
// =============================================================================

pub fn position_cmd(cmd: PositionCmd, ctx: &Context, output: &Output) -> ExitCode {
    let Some(position) = ctx.store.stored_position(&cmd.session_id) else {
        return output.playback_error(&PlaybackError::SessionNotFound(cmd.session_id));
    };

    let response = PositionResponse {
        identifier: cmd.session_id,
        elapsed: position.elapsed,
        duration: position.duration,
        progress: position.progress(),
    };

    match output.print(&response, position) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(e.to_string(), ExitCode::Error),
    }
}

// =============================================================================
// Play Command
// =============================================================================

/// Play a session with a clock-driven player, printing every snapshot update
pub async fn play_cmd(cmd: PlayCmd, ctx: &Context, output: &Output) -> ExitCode {
    if !cmd.duration.is_finite() || cmd.duration <= 0.0 {
        return output.error("Duration must be a positive number", ExitCode::InvalidArgs);
    }

    let interval = match cmd.interval {
        Some(0) => return output.error("Interval must be at least 1 second", ExitCode::InvalidArgs),
        Some(secs) => Duration::from_secs(secs),
        None => ctx.config.sample_interval(),
    };

    let factory = ClockPlayerFactory::new(cmd.duration);
    let mut session =
        match PlaybackSession::start(&cmd.session_id, &ctx.resolver, &factory, interval) {
            Ok(session) => session,
            Err(e) => return output.playback_error(&e),
        };

    output.info(format!("Playing {}", session.source()));

    let mut updates = session.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(cmd.play_for));
    tokio::pin!(deadline);

    loop {
        let snapshot = updates.borrow_and_update().clone();
        if let Some(snapshot) = snapshot {
            if let Err(e) = output.print_line(&snapshot, &snapshot) {
                warn!(error = %e, "Failed to print snapshot");
            }
        }

        tokio::select! {
            _ = &mut deadline => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    session.sample_now();
    session.end();

    if let Err(e) = ctx.store.persist() {
        return output.error(format!("Failed to save catalog: {}", e), ExitCode::Error);
    }

    let position = ctx
        .store
        .stored_position(&cmd.session_id)
        .filter(|_| !session.is_live());

    let report = PlayReport {
        identifier: cmd.session_id.clone(),
        url: session.source().url.to_string(),
        is_live: session.is_live(),
        elapsed: position.map(|p| p.elapsed),
        duration: position.map(|p| p.duration),
        progress: position.and_then(|p| p.progress()),
    };

    let human = match position {
        Some(p) => format!("Stopped at {}", p),
        None => "Stopped live playback".to_string(),
    };

    match output.print(&report, human) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(e.to_string(), ExitCode::Error),
    }
}

// =============================================================================
// Open Command
// =============================================================================

/// Open the resolved source in VLC or mpv, resuming at the stored position
pub async fn open_cmd(cmd: OpenCmd, ctx: &Context, output: &Output) -> ExitCode {
    let session = match ctx.resolver.find(&cmd.session_id) {
        Ok(session) => session,
        Err(e) => return output.playback_error(&e),
    };
    let source = match ctx.resolver.resolve_session(&session) {
        Ok(source) => source,
        Err(e) => return output.playback_error(&e),
    };

    let choice = cmd
        .player
        .or_else(|| {
            ctx.config
                .preferred_player
                .as_deref()
                .and_then(PlayerChoice::from_config)
        })
        .unwrap_or_default();
    let player = LocalPlayer::new(PlayerType::from(choice));

    if !player.is_available().await {
        return output.error(
            format!("{} not found. Install it first.", player.player_type()),
            ExitCode::PlayerFailed,
        );
    }

    let start_at = (!cmd.restart && !source.is_live)
        .then_some(session.position.elapsed)
        .filter(|secs| *secs > 0.0);

    if let Some(secs) = start_at {
        output.info(format!("Resuming at {}", format_seconds(secs)));
    }

    if let Err(e) = player.launch(&source.url, start_at) {
        return output.error(e.to_string(), ExitCode::PlayerFailed);
    }

    let response = OpenResponse {
        status: "ok",
        player: player.player_type().to_string(),
        url: source.url.to_string(),
        start_at,
    };
    let human = format!("Opened {} in {}", source, player.player_type());

    match output.print(&response, human) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(e.to_string(), ExitCode::Error),
    }
}
