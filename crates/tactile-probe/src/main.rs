mod cli;
mod logging;
mod runner;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tactile_profile::{load_profile, ProfileError};

use crate::cli::{Cli, Command};
use crate::runner::{FrameEvent, Replay};

fn run(path: &Path) -> Result<(), ProfileError> {
    let profile = load_profile(path)?;
    let mut replay = Replay::new(&profile)?;
    log::info!("replaying {} frame(s) from {}", replay.frame_count(), path.display());

    let mut total = 0usize;
    for frame in 0..replay.frame_count() {
        for event in replay.step(frame)? {
            match event {
                FrameEvent::Change(change) => {
                    total += 1;
                    log::info!("frame {frame}: {change}");
                }
                FrameEvent::Health(health) => {
                    log::warn!("frame {frame}: {health}");
                }
            }
        }
    }
    log::info!("done, {total} change(s)");
    Ok(())
}

fn inspect(path: &Path) -> Result<(), ProfileError> {
    let profile = load_profile(path)?;
    let replay = Replay::new(&profile)?;
    for line in replay.describe() {
        log::info!("{line}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);

    let result = match &cli.command {
        Command::Run { profile } => run(profile),
        Command::Inspect { profile } => inspect(profile),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
