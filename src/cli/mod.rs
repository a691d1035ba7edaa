//! Command-line interface for sb.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;

pub use commands::Commands;
pub use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sb", version, about = "Browse a skill catalog by archetype and prerequisite graph")]
pub struct Cli {
    /// Machine-readable JSON output on stdout
    #[arg(long, global = true, env = "SB_ROBOT")]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the global and project ones
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Default `EnvFilter` directives for a `-v` count. Every event in the
/// crate uses an `sb::` target.
#[must_use]
pub const fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,sb=info",
        1 => "info,sb=debug",
        2 => "debug,sb=trace",
        _ => "trace",
    }
}

impl Cli {
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}
