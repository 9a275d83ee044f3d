//! Error taxonomy for the Route directory.

use thiserror::Error;

use crate::routing::validators::ValidationError;

/// Errors raised by [`Routes`](crate::routing::Routes) operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A url failed validation. Raised before any mutation.
    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: ValidationError,
    },

    /// `swap_with(.., move_children = true)` between a Route and its own
    /// ancestor or descendant.
    #[error("Cannot move children when swapping ancestors with descendants.")]
    AncestorSwap,

    /// The store refused a write because the url is already taken.
    #[error("A Route already occupies {url:?}")]
    Integrity { url: String },

    /// No Route matched any prefix of the path, not even `/`.
    #[error("No matching Route for URL {path:?}. (Have you made a root Route?)")]
    NoMatchingRoot { path: String },

    /// A lookup by id or url found nothing.
    #[error("Route {0} does not exist")]
    DoesNotExist(String),

    /// An operation that requires a persisted Route was given a transient one.
    #[error("{operation} requires a saved Route")]
    Unsaved { operation: &'static str },

    /// A row carried a type tag with no matching Route type.
    #[error("Unknown Route type tag {0:?}")]
    UnknownTypeTag(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl RouteError {
    /// Caller misuse rather than bad input or store state.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, RouteError::Unsaved { .. })
    }

    /// Expected lookup misses that an adapter turns into a 404 or similar.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RouteError::NoMatchingRoot { .. } | RouteError::DoesNotExist(_)
        )
    }

    /// Wrap a store error, recognising uniqueness violations on `url`.
    pub(crate) fn from_write(err: rusqlite::Error, url: &str) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => RouteError::Integrity {
                url: url.to_string(),
            },
            _ => RouteError::Store(err),
        }
    }
}

/// Result type for directory operations.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::InvalidUrl {
            url: "not-a-url".into(),
            source: ValidationError::MissingLeadingSlash,
        };
        assert!(err.to_string().contains("not-a-url"));
        assert!(err.to_string().contains("First character"));

        let err = RouteError::NoMatchingRoot { path: "/".into() };
        assert!(err.to_string().contains("root Route"));
    }

    #[test]
    fn test_classification() {
        assert!(RouteError::Unsaved { operation: "swap_with" }.is_programming_error());
        assert!(RouteError::NoMatchingRoot { path: "/".into() }.is_not_found());
        assert!(!RouteError::AncestorSwap.is_not_found());
    }
}
