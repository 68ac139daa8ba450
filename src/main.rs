//! Tenant Gateway
//!
//! Serves a route listing and rewrites tenant-prefixed paths for a
//! tenant-unaware handler tree.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id / trace / timeout / metrics
//!                          │
//!                ┌─────────┴──────────┐
//!                ▼                    ▼
//!          route listing     tenant header → strip prefix → upstream tree
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_gateway::config::{load_config, validation::validate_config, GatewayConfig};
use tenant_gateway::observability::{logging, metrics};
use tenant_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "tenant-gateway")]
#[command(about = "Multi-tenant HTTP gateway with per-tenant prefix rewriting", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        if let Err(errors) = validate_config(&config) {
            for e in &errors {
                eprintln!("invalid configuration: {e}");
            }
            return Err("invalid configuration".into());
        }
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("tenant-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix_template = %config.tenancy.prefix_template,
        tenant_header = %config.tenancy.tenant_header,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
