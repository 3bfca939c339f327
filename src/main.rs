//! Resize proxy binary.
//!
//! Startup order: CLI → tracing → config (load + validate) → metrics →
//! listener → serve. Fail fast: any startup error is fatal; after startup
//! no request-path error is.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resize_proxy::config::loader::load_config;
use resize_proxy::{BoundedListener, HttpServer, ProxyConfig, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "resize-proxy", about = "CDN-facing image-resizing reverse proxy")]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults apply when
    /// omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ProxyConfig::default(),
    };

    if cli.check {
        println!("configuration OK");
        return ExitCode::SUCCESS;
    }

    // Initialize tracing subscriber
    let default_filter = format!("resize_proxy={},tower_http=warn", config.observability.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("resize-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %format!("{}://{}:{}", config.origin.protocol, config.origin.host, config.origin.port),
        cache_expires = %config.cache.expires,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => resize_proxy::observability::metrics::init_metrics(addr),
            Err(_) => {
                // Validation rejects this when loading from a file; only a
                // hand-built default could get here.
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = match BoundedListener::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build origin client");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
