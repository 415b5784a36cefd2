pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod event;
pub mod expand;
pub mod options;
pub mod plan;
pub mod repeat;

use std::ffi::OsString;

use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting cadence CLI"
  );

  let mut settings =
    config::Settings::load(
      cli.config.as_deref()
    )?;
  if let Some(raw) =
    cli.ceiling.as_deref()
  {
    settings
      .apply_ceiling(raw, "--ceiling")?;
  }
  debug!(
    ceiling = %settings.ceiling,
    pretty = settings.pretty,
    files = settings.loaded_files.len(),
    "resolved settings"
  );

  commands::dispatch(
    &settings,
    cli.command
  )?;

  info!("done");
  Ok(())
}
