use std::path::PathBuf;

use basalt_daemon::bootstrap::{run_daemon, DaemonOptions};
use clap::Parser;

/// Keeps every display's wallpaper in line with today's pick.
#[derive(Debug, Parser)]
#[command(name = "basalt", version, about)]
struct Cli {
    /// Path to basalt.toml (defaults to the platform data directory).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not read control commands from stdin.
    #[arg(long)]
    no_control: bool,
}

impl From<Cli> for DaemonOptions {
    fn from(cli: Cli) -> Self {
        DaemonOptions {
            config_path: cli.config,
            control: !cli.no_control,
        }
    }
}

fn main() -> anyhow::Result<()> {
    run_daemon(Cli::parse().into())
}
