use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Replay a profile's frames and print every button change.
    Run {
        /// The profile to replay
        profile: PathBuf,
    },
    /// List the devices a profile creates.
    Inspect {
        /// The profile to inspect
        profile: PathBuf,
    },
}

/// Drive virtual input devices from a YAML profile and watch what they report.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
