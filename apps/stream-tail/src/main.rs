use stream_tail::cli::{Args, OutputFormat};
use stream_tail::error::StreamTailError;
use stream_tail::follow::follow;
use stream_tail::logger::{initialize as LoggerInitialize, level_for};
use stream_tail::output::{event_line, event_text};

use session_core::ConnectionManager;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StreamTailError> {
    create_dir_all(&args.log_dir).map_err(|e| StreamTailError::StreamTail {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&args.log_dir, level_for(args.verbose))?;
    info!("stream-tail starting");

    let config = args.session_config()?;
    if let Ok(endpoint) = config.endpoint() {
        info!("Following {:?} at {endpoint}", config.channels);
    }

    let format = args.format;
    let auto_reconnect = config.auto_reconnect;
    let manager = ConnectionManager::start_ws(config, move |channel, data| {
        let line = match format {
            OutputFormat::Json => event_line(channel, &data),
            OutputFormat::Text => event_text(channel, &data),
        };
        println!("{line}");
    })?;

    let outcome = follow(&manager, auto_reconnect, tokio::signal::ctrl_c()).await;

    manager.dispose().await?;
    info!("stream-tail stopped");
    outcome
}
