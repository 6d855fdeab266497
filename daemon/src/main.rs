//! `civitas`: operator CLI for the DAO governance engine.
//!
//! Each invocation loads the state file, runs one operation and, if the
//! operation changed anything, writes the state back atomically. Results
//! are printed to stdout as JSON; logs go to stderr.

mod commands;
mod config;
mod workspace;

use civitas_store::FileSnapshotStore;
use civitas_types::{SystemClock, Timestamp};
use civitas_utils::LogFormat;
use clap::Parser;
use commands::Command;
use config::DaemonConfig;
use std::path::PathBuf;
use workspace::{CliClock, Workspace};

#[derive(Parser)]
#[command(name = "civitas", about = "DAO governance engine operator CLI", version)]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "CIVITAS_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot file holding governance state and token balances.
    #[arg(long, env = "CIVITAS_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CIVITAS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CIVITAS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Pin the clock to this unix time (seconds) instead of the wall clock.
    #[arg(long, env = "CIVITAS_NOW")]
    now: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// File config (or defaults) with flag and env overrides applied.
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(state_file) = &self.state_file {
            config.state_file = state_file.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }

    fn clock(&self) -> CliClock {
        match self.now {
            Some(secs) => CliClock::Fixed(Timestamp::new(secs)),
            None => CliClock::System(SystemClock),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    civitas_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let store = FileSnapshotStore::new(&config.state_file);
    let mut engine = Workspace::load(&store)?.into_engine(config.governance.clone(), cli.clock())?;

    let mutates = cli.command.mutates();
    let output = cli.command.run(&mut engine)?;

    if mutates {
        Workspace::from_engine(engine).save(&store)?;
        tracing::info!("state written to {}", config.state_file.display());
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
