//! railchat relay
//!
//! Completion relay used by the browser and terminal clients.
//!
//! Run with: cargo run --bin railchat -- [--config path] [--host h] [--port p]
//!
//! See `railchat-cli config` for the configuration file and the
//! `RAILCHAT_*` environment overrides.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use railchat::api::{serve, AppState};
use railchat::completion::AzureOpenAiClient;
use railchat::config::Config;

#[derive(Parser)]
#[command(name = "railchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Relay between the railchat clients and Azure OpenAI")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load_from(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.relay.host = host;
    }
    if let Some(port) = args.port {
        config.relay.port = port;
    }

    railchat::logging::init(&config.logging, &["tower_http=debug"]);

    tracing::info!("Starting railchat relay v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Azure OpenAI API version: {}", config.completion.api_version);
    match &config.completion.deployment {
        Some(deployment) => tracing::info!("All requests use deployment {}", deployment),
        None => tracing::info!("Deployment follows the model chosen by the client"),
    }
    tracing::info!("Allowed origins: {:?}", config.relay.cors_origins);

    let backend = Arc::new(AzureOpenAiClient::new(config.completion.clone())?);
    let state = AppState::new(backend, config.relay);

    serve(state).await?;

    Ok(())
}
