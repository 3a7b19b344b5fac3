//! Command-line arguments for `stream-tail`.

use session_core::config::load_dotenv;
use session_core::{CoreError, SessionConfig};

use models::Channel;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// stream-tail - follow gateway channels from the terminal
///
/// Connects to the stream gateway, subscribes to the requested channels and
/// prints every event to stdout. Logs go to stderr and to a log file.
#[derive(Parser, Debug)]
#[command(name = "stream-tail")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Gateway origin, e.g. https://stream.example.com (overrides config and env)
    #[arg(short, long)]
    pub origin: Option<String>,

    /// Channel to subscribe to; repeat for more (replaces the configured set)
    #[arg(short, long = "channel")]
    pub channels: Vec<Channel>,

    /// Directory holding session.json
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Directory for stream-tail.log
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Do not reconnect automatically after the connection drops
    #[arg(long)]
    pub no_reconnect: bool,

    /// Write the effective config back to session.json before connecting
    #[arg(long)]
    pub save_config: bool,

    /// Event output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Log at trace level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl Args {
    /// Effective config: `session.json`, then `.env` and `STREAM_*` variables,
    /// then these flags.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the file is unreadable or the result
    /// does not validate.
    pub fn session_config(&self) -> Result<SessionConfig, CoreError> {
        load_dotenv();

        let mut config = SessionConfig::load(&self.config_dir)?;
        config.apply_env_overrides()?;
        self.apply(&mut config);
        config.validate()?;

        if self.save_config {
            config.save(&self.config_dir)?;
        }

        Ok(config)
    }

    /// Apply command-line overrides on top of file and environment config.
    pub fn apply(&self, config: &mut SessionConfig) {
        if let Some(origin) = &self.origin {
            config.gateway_origin = origin.clone();
        }
        if !self.channels.is_empty() {
            config.channels = self.channels.iter().copied().collect();
        }
        if self.no_reconnect {
            config.auto_reconnect = false;
        }
    }
}
