use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::plan::DeleteMode;
use crate::repeat::{RepeatOption, RepeatType};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cadence",
    version,
    about = "Cadence: repeating-event expansion for the calendar client"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// TOML settings file; overrides CADENCE_CONFIG and the default locations.
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Last date an open-ended series may reach (YYYY-MM-DD).
    #[arg(long = "ceiling", global = true)]
    pub ceiling: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the readings a user must choose between for an anchor date.
    Options {
        #[arg(
            long = "type",
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<RepeatType>())
        )]
        kind: RepeatType,

        #[arg(long)]
        date: String,
    },

    /// Print the date one repeat step after DATE.
    Next {
        #[arg(long)]
        date: String,

        #[arg(
            long = "type",
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<RepeatType>())
        )]
        kind: RepeatType,

        #[arg(long, default_value_t = 1)]
        interval: u32,

        #[arg(
            long,
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<RepeatOption>())
        )]
        option: Option<RepeatOption>,
    },

    /// Expand an event JSON document into one event per occurrence.
    Expand {
        /// Input file; `-` or nothing reads stdin.
        input: Option<PathBuf>,
    },

    /// Show the backend request a save would issue.
    PlanSave {
        input: Option<PathBuf>,

        #[arg(long)]
        editing: bool,
    },

    /// Show the backend request a delete would issue.
    PlanDelete {
        #[arg(long)]
        id: String,

        #[arg(
            long,
            default_value = "single",
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<DeleteMode>())
        )]
        mode: DeleteMode,

        /// `{ "events": [...] }` document of the loaded events.
        input: Option<PathBuf>,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
