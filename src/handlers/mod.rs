//! Handler dispatch.
//!
//! # Data Flow
//! ```text
//! Route::handle(request, path)
//!     → Route::handler() (built once per Route value)
//!     → remaining path = path minus the Route's url, keeping a leading "/"
//!     → Handler::handle → Response | HandleError
//!
//! At startup:
//!     every RouteType → HandlerKind::check → Vec<ConfigIssue>
//! ```
//!
//! # Design Decisions
//! - Strategy is chosen per subtype through `RouteType::handler`
//! - Handlers hold no per-request state; the Route is passed to every call
//! - Not-found is an ordinary error value, mapped to 404 by the HTTP adapter
//! - Configuration problems are collected, never raised

pub mod base;
pub mod checks;
pub mod template;
pub mod urlconf;
pub mod view;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::kinds::RouteType;
use crate::routing::Route;
use crate::templates::TemplateError;

pub use base::BaseHandler;
pub use checks::check_route_types;
pub use template::TemplateHandler;
pub use urlconf::UrlConfHandler;
pub use view::ViewHandler;

/// Requests are passed through untouched.
pub type Request = axum::http::Request<axum::body::Body>;
pub type Response = axum::response::Response;

pub type HandlerResult = Result<Response, HandleError>;

/// A view callable. Always a free function; the Route arrives in the context.
pub type View = fn(&ViewContext<'_>) -> HandlerResult;

/// Everything a view receives.
pub struct ViewContext<'a> {
    pub request: &'a Request,
    pub route: &'a Route,
    /// Unnamed captures from a routing-table match.
    pub args: Vec<String>,
    /// Named captures from a routing-table match.
    pub params: HashMap<String, String>,
}

/// Errors produced while handling a request.
#[derive(Debug, Error)]
pub enum HandleError {
    /// The handler cannot serve this remaining path.
    #[error("No page found at {path:?}")]
    NotFound { path: String },

    #[error("Subclasses of `BaseHandler` must implement `handle()`.")]
    NotImplemented,

    /// The Route's type declaration lacks what its handler needs.
    #[error("{route_type} is misconfigured: {reason}")]
    Misconfigured {
        route_type: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("View failed: {0}")]
    View(String),
}

/// The dispatch contract shared by every strategy.
pub trait Handler: Send + Sync + fmt::Debug {
    /// Serve `path`, the part of the request path below `route`.
    fn handle(&self, route: &Route, request: &Request, path: &str) -> HandlerResult;
}

/// Which strategy a Route subtype uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Base,
    Template,
    UrlConf,
    View,
}

impl HandlerKind {
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Base => "BaseHandler",
            HandlerKind::Template => "TemplateHandler",
            HandlerKind::UrlConf => "URLConfHandler",
            HandlerKind::View => "ViewHandler",
        }
    }

    /// Inspect a subtype declaration for what this strategy requires.
    pub fn check(self, route_type: &RouteType) -> Vec<ConfigIssue> {
        match self {
            HandlerKind::Base => BaseHandler::check(route_type),
            HandlerKind::Template => TemplateHandler::check(route_type),
            HandlerKind::UrlConf => UrlConfHandler::check(route_type),
            HandlerKind::View => ViewHandler::check(route_type),
        }
    }

    pub fn build(self, route_type: &'static RouteType) -> Result<Box<dyn Handler>, HandleError> {
        Ok(match self {
            HandlerKind::Base => Box::new(BaseHandler),
            HandlerKind::Template => Box::new(TemplateHandler::new(route_type)?),
            HandlerKind::UrlConf => Box::new(UrlConfHandler::new(route_type)?),
            HandlerKind::View => Box::new(ViewHandler::new(route_type)?),
        })
    }
}

/// A problem found by a startup check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub id: &'static str,
    /// Tag of the offending Route type, empty for registry-wide issues.
    pub route_type: String,
    pub message: String,
    pub hint: String,
}

impl ConfigIssue {
    pub fn new(
        id: &'static str,
        route_type: &str,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            id,
            route_type: route_type.to_string(),
            message: message.into(),
            hint: hint.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)?;
        if !self.hint.is_empty() {
            write!(f, " HINT: {}", self.hint)?;
        }
        Ok(())
    }
}
