//! Route tree server.
//!
//! Loads configuration, refuses to start on Route type check failures, then
//! serves every path through the Route directory until SIGINT or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_tree::config::load_or_default;
use route_tree::http::{AppState, HttpServer};
use route_tree::lifecycle::{self, signals, Shutdown};
use route_tree::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "route-tree", version, about = "Serve a Route tree over HTTP")]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("route-tree v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.path.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let services = tokio::task::spawn_blocking({
        let config = config.clone();
        move || lifecycle::prepare(&config)
    })
    .await??;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, AppState::new(services));
    let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_shutdown_signal().await;
    shutdown.trigger();
    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
