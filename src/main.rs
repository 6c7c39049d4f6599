mod api;
mod app;
mod cache;
mod config;
mod event;
mod logging;
mod mutation;
mod notify;
mod query;
mod ui;
mod validation;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "userdeck")]
#[command(about = "A terminal admin UI for user records on a remote HTTP service")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/userdeck/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the record service
  #[arg(short, long)]
  base_url: Option<String>,

  /// Log filter, e.g. "debug" or "userdeck=trace"
  #[arg(short, long)]
  log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if let Some(level) = args.log_level {
    config.log.level = level;
  }

  let _guard = logging::init(&config.log)?;

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
