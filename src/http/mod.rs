//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route)
//!     → request.rs (request ID, canonical path)
//!     → Routes::best_match_for_path → Route::handle (blocking worker)
//!     → response.rs (errors → status codes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::DispatchError;
pub use server::{AppState, HttpServer};
