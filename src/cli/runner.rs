//! CLI command runner

use anyhow::Context;
use serde_json::json;
use std::io::{self, Write};

use super::{Cli, Commands, CommonArgs, SyncArgs};
use crate::api::CloseClient;
use crate::config::Config;
use crate::export::MessageWriter;
use crate::models::{Stream, SyncState, DEFAULT_START_DATE};
use crate::schema::Schemas;
use crate::sync::run_sync;

/// Run the CLI application
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check(args) => run_check(args).await,
        Commands::Discover(args) => run_discover(args).await,
        Commands::Sync(args) => run_sync_command(args).await,
    }
}

fn load_config(args: &CommonArgs) -> anyhow::Result<Config> {
    Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))
}

/// Connectivity check
async fn run_check(args: CommonArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let client = CloseClient::new(&config)?;

    tracing::info!("Checking connection to {}", client.base_url());
    client
        .check_connection()
        .await
        .context("Error checking connection")?;
    tracing::info!("Connection OK");
    Ok(())
}

/// Print the resolved schemas as a catalog
async fn run_discover(args: CommonArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let client = CloseClient::new(&config)?;
    let schemas = Schemas::load(&client).await?;

    let streams: Vec<_> = Stream::ALL
        .iter()
        .map(|stream| {
            json!({
                "stream": stream.name(),
                "tap_stream_id": stream.name(),
                "key_properties": stream.key_properties(),
                "schema": schemas.get(*stream),
            })
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &json!({ "streams": streams }))?;
    writeln!(out)?;
    Ok(())
}

/// Full sync run
async fn run_sync_command(args: SyncArgs) -> anyhow::Result<()> {
    let config = load_config(&args.common)?;
    let floor = config.start_date.as_deref().unwrap_or(DEFAULT_START_DATE);
    let mut state = SyncState::load(args.common.state.as_deref(), floor).with_context(|| {
        format!(
            "Failed to load state from {}",
            args.common
                .state
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    let client = CloseClient::new(&config)?;
    let schemas = Schemas::load(&client).await?;

    let stdout = io::stdout();
    let mut writer =
        MessageWriter::new(io::BufWriter::new(stdout.lock())).with_state_file(args.state_output);

    let summaries = run_sync(&client, &schemas, &mut state, &mut writer).await?;

    for summary in &summaries {
        tracing::info!(
            "{}: {} records in {} pages",
            summary.stream,
            summary.records,
            summary.pages
        );
    }
    tracing::info!(
        "Sync complete: {} records, final state {:?}",
        writer.records_written(),
        state
    );
    Ok(())
}
