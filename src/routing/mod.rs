//! Routing subsystem: the url namespace and its persistent directory.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → paths.rs (candidate prefixes ending in "/")
//!     → directory.rs (one IN-query, longest url wins)
//!     → store.rs (joined row → Route)
//!     → route.rs (strip matched prefix, delegate to handler)
//!
//! Mutation (create / move_to / swap_with):
//!     url
//!     → validators.rs (structural rules + deployment policy)
//!     → directory.rs (transaction, set-based rewrite)
//!     → error.rs (Integrity on clash, nothing written)
//! ```
//!
//! # Design Decisions
//! - The url is the only carrier of hierarchy; there are no parent links
//! - Uniqueness is enforced by the store at all times, so swaps go through a
//!   placeholder path
//! - Validation happens before any statement is sent

pub mod directory;
pub mod error;
pub mod paths;
pub mod route;
pub mod store;
pub mod validators;

pub use directory::Routes;
pub use error::{RouteError, RouteResult};
pub use route::{Route, RouteId};
pub use validators::{UrlPolicy, ValidationError};
