use clap::Parser;
use flv_edit::StreamConfig;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod error;

use cli::{CliArgs, Mode};
use error::AppError;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        error!(error = ?e, "flvtool failed");
        // -1 as an exit status byte
        std::process::exit(255);
    }
}

fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();
    let mode = args.mode()?;

    // Setup logging, info mode dumps every tag
    let log_level = if args.verbose || matches!(mode, Mode::Info { .. }) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    let mut config = StreamConfig::builder();
    if let Some(creator) = &args.creator {
        config = config.metadata_creator(creator.as_str());
    }
    let config = config.build();
    debug!("{config}");

    commands::run(mode, config)
}
