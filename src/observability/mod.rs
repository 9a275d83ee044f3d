//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Directory mutations, request dispatch:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout / stderr (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every dispatch log line
//! - Metric updates are no-ops until a recorder is installed
//! - `RUST_LOG` always wins over the configured level

pub mod logging;
pub mod metrics;
