//! Route tree: a url namespace stored in SQLite, resolved by longest prefix.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (axum, request id, timeout, trace)
//!                        │
//!                        ▼
//!                     routing::Routes ── one IN-query ──▶ SQLite
//!                        │ longest matching Route
//!                        ▼
//!                     Route::handle ──▶ handlers (template / urlconf / view)
//!                        │                  │
//!                        │                  └─ kinds (page, redirect, section)
//!                        ▼
//!     Client Response ◀── http::response (errors → status codes)
//!
//!     Cross-cutting: config, lifecycle (startup checks, shutdown),
//!                    observability (tracing, metrics)
//! ```
//!
//! Management goes through `route-cli`, which opens the same store.

// Core subsystems
pub mod handlers;
pub mod kinds;
pub mod routing;
pub mod templates;

// Serving
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use handlers::{check_route_types, ConfigIssue, HandleError, Handler, HandlerKind};
pub use http::HttpServer;
pub use kinds::{RouteKind, RouteType, ROUTE_TYPES};
pub use lifecycle::Shutdown;
pub use routing::{Route, RouteError, RouteId, RouteResult, Routes, UrlPolicy};
