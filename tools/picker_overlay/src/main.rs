use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use picker_core::PickerConfig;

mod replay;
mod stream;
mod surface;

#[derive(Parser, Debug)]
#[command(about = "Interaction picker overlay driven by a host game process", version)]
struct Args {
    /// Address the overlay listens on for the host connection (host:port).
    #[arg(long, default_value = "127.0.0.1:17410")]
    listen: String,

    /// Replay control messages from a JSON-lines file instead of listening.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    replay: Option<PathBuf>,

    /// Optional JSON file with picker settings.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Maximum number of host interactions shown (overrides --config).
    #[arg(long)]
    max_items: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config =
        PickerConfig::from_json_file(args.config.as_deref()).context("loading picker config")?;
    if let Some(max_items) = args.max_items {
        config = config.with_max_items(max_items);
        config.validate().context("applying --max-items")?;
    }

    match args.replay.as_ref() {
        Some(path) => replay::run(path, config),
        None => stream::serve(&args.listen, config),
    }
}
