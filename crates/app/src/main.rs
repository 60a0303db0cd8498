//! `mktosync`: push an NDJSON file of leads or activities to Marketo.
//!
//! Configuration comes from `MKTO_*` environment variables (a `.env` file
//! is honoured) or from a `mktosync.{json,toml}` file. Exits with status 0
//! when every chunk was accepted, 1 otherwise.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use mktosync_domain::Config;
use mktosync_infra::{config, ApiClient, ApiCommands, BulkLoader, ChunkStatus, LoadSummary};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the variables may already be set.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Load aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn run() -> anyhow::Result<LoadSummary> {
    let Config { api, loader: loader_config } =
        config::load().context("Failed to load configuration")?;

    info!(
        base_url = %api.base_url(),
        input = %loader_config.input_path.display(),
        target = ?loader_config.target,
        chunk_size = loader_config.chunk_size,
        "Starting bulk load"
    );

    let client = ApiClient::builder().config(api).build().context("Failed to build API client")?;
    let commands = Arc::new(ApiCommands::new(Arc::new(client)));
    let loader = BulkLoader::from_config(commands, &loader_config);

    let summary = loader
        .run(&loader_config.input_path, loader_config.target)
        .await
        .with_context(|| format!("Failed to load {}", loader_config.input_path.display()))?;

    report(&summary);
    Ok(summary)
}

fn report(summary: &LoadSummary) {
    for outcome in &summary.outcomes {
        if let ChunkStatus::Failed { error, retryable } = &outcome.status {
            warn!(chunk = outcome.index, records = outcome.records, retryable, %error, "Chunk not accepted");
        }
    }

    info!(
        records = summary.records,
        chunks = summary.chunks(),
        sent = summary.sent,
        failed = summary.failed,
        "Bulk load finished"
    );
}
