//! Roost demo server.
//!
//! This is the application entry point. It initializes tracing, loads
//! server options from a TOML file, validates them, and starts the HTTPS
//! server with a health route, hunting for a free port if the preferred
//! one is taken.

use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roost::config::{validate, ServerOptions, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use roost::http::HttpsServer;

/// Roost: a TLS web server with port hunting
#[derive(Parser, Debug)]
#[command(name = "roost", version, about)]
struct Args {
    /// Path to options file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "roost=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate server options
    let options = ServerOptions::load(&args.config)?;
    let config = validate(&options)?;
    tracing::info!(host = config.bind_host(), "Loaded server options");

    let app = Router::new()
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http());

    let server = HttpsServer::prepare(config, app).create().await?;
    tracing::info!("Server ready at https://{}", server.addr());

    server.join().await?;
    Ok(())
}

/// Health check handler.
///
/// Returns a simple "ok" response to indicate the service is running.
async fn health() -> &'static str {
    "ok"
}
