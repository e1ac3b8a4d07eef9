//! CLI interface for the Close extractor

pub mod runner;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Close CRM extractor - incremental leads/activities sync
#[derive(Parser, Debug)]
#[command(name = "closeio-tap")]
#[command(author = "FrazierSystems")]
#[command(version)]
#[command(about = "Extract Close CRM leads and activities as a JSON message stream", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, env = "CLOSEIO_TAP_VERBOSE", default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the API key with a single small request
    Check(CommonArgs),

    /// Print both stream schemas as a catalog
    Discover(CommonArgs),

    /// Sync leads, then activities, writing messages to stdout
    Sync(SyncArgs),
}

/// Arguments shared by every subcommand
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Config file (JSON with api_key, optional user_agent/start_date)
    #[arg(short, long)]
    pub config: PathBuf,

    /// State file from a previous run
    #[arg(short, long)]
    pub state: Option<PathBuf>,
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Also write the latest state to this file after every page
    #[arg(long)]
    pub state_output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_args() {
        let cli = Cli::try_parse_from([
            "closeio-tap",
            "sync",
            "-c",
            "config.json",
            "--state",
            "state.json",
            "--state-output",
            "out/state.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.common.config, PathBuf::from("config.json"));
                assert_eq!(args.common.state, Some(PathBuf::from("state.json")));
                assert_eq!(args.state_output, Some(PathBuf::from("out/state.json")));
            }
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["closeio-tap", "check"]).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["closeio-tap", "check", "-c", "c.json", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
