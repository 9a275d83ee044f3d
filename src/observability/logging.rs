//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the level from `RUST_LOG`, falling back to config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The CLI logs to stderr so stdout stays machine-readable JSON

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("route_tree={level},tower_http={level}")))
}

/// Install the subscriber for the server binary.
pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(fmt::layer())
        .init();
}

/// Install the subscriber for the management CLI.
pub fn init_cli_logging(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
