//! confplay - playback core for conference session videos
//!
//! # Usage
//!
//! ```bash
//! confplay list
//! confplay resolve 101 --json
//! confplay play 101 --for 60
//! confplay open 101 --player mpv
//! ```

mod cli;
mod commands;

use clap::Parser;

use confplay::config::Config;
use confplay::logging;

use crate::cli::{Cli, Command, ExitCode, Output};
use crate::commands::Context;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    logging::init_tracing(&logging::filter_for(cli.verbose, config.log_level()));

    let ctx = match Context::load(&cli, config) {
        Ok(ctx) => ctx,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::Error),
    };

    match cli.command {
        Command::List(cmd) => commands::list_cmd(cmd, &ctx, &output),
        Command::Resolve(cmd) => commands::resolve_cmd(cmd, &ctx, &output),
        Command::Position(cmd) => commands::position_cmd(cmd, &ctx, &output),
        Command::Play(cmd) => commands::play_cmd(cmd, &ctx, &output).await,
        Command::Open(cmd) => commands::open_cmd(cmd, &ctx, &output).await,
    }
}
