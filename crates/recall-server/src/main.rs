//! Recall HTTP Server
//!
//! JSON API for the spaced-repetition engine: question cards, interactive
//! review sessions, AI-generated reviews, and dashboard statistics.
//!
//! The server owns the SQLite storage, an in-memory registry of interactive
//! sessions, and the AI review pipeline with its background generation and
//! evaluation jobs.

mod error;
mod jobs;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use recall_core::{AiReviewPipeline, Storage};

use crate::jobs::{ExactMatchEvaluator, ExtractiveGenerator};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "recall-server", version, about = "Spaced-repetition API server")]
struct Args {
    /// Custom data directory for the SQLite database
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3920)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    info!("Recall server v{} starting...", env!("CARGO_PKG_VERSION"));

    let db_path = args.data_dir.map(|dir| dir.join("recall.db"));
    let storage = Arc::new(Storage::new(db_path).context("failed to initialize storage")?);
    info!("Storage initialized");

    let pipeline = Arc::new(AiReviewPipeline::new(
        storage.clone(),
        Arc::new(ExtractiveGenerator::new(storage.clone())),
        Arc::new(ExactMatchEvaluator),
    ));

    let state = AppState::new(storage, pipeline);
    let app = routes::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid host/port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Recall server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown handler: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
