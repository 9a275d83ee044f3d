//! The Route entity.
//!
//! A Route is one node of the url namespace. Its `url` is the only carrier of
//! hierarchy: ancestors and descendants are found by prefix, never by links.
//! The subtype-specific fields live in [`RouteKind`], whose tag also picks
//! the handler strategy.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::handlers::{HandleError, Handler, HandlerResult, Request};
use crate::kinds::{RouteKind, RouteType};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::paths;

/// Store-assigned identifier. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(pub i64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the path namespace.
///
/// Values fetched from the store are snapshots. Moving a subtree through
/// [`Routes`](crate::routing::Routes) updates the Route values passed to that
/// call, but any other in-memory copy of a moved descendant keeps its old
/// `url` until it is refreshed.
#[derive(Debug, Serialize)]
pub struct Route {
    id: Option<RouteId>,
    url: String,
    #[serde(flatten)]
    kind: RouteKind,
    /// Built on first use, dropped with this value.
    #[serde(skip)]
    handler: OnceLock<Box<dyn Handler>>,
}

impl Route {
    /// A transient Route, not yet in the store.
    pub fn new(url: impl Into<String>, kind: RouteKind) -> Self {
        Self {
            id: None,
            url: url.into(),
            kind,
            handler: OnceLock::new(),
        }
    }

    pub(crate) fn persisted(id: RouteId, url: impl Into<String>, kind: RouteKind) -> Self {
        Self {
            id: Some(id),
            ..Self::new(url, kind)
        }
    }

    pub fn id(&self) -> Option<RouteId> {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> &RouteKind {
        &self.kind
    }

    /// The static declaration of this Route's subtype.
    pub fn route_type(&self) -> &'static RouteType {
        self.kind.route_type()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Zero-indexed depth; the root Route is level 0.
    pub fn level(&self) -> usize {
        paths::level(&self.url)
    }

    pub fn absolute_url(&self) -> &str {
        &self.url
    }

    pub(crate) fn require_id(&self, operation: &'static str) -> RouteResult<RouteId> {
        self.id.ok_or(RouteError::Unsaved { operation })
    }

    pub(crate) fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub(crate) fn set_id(&mut self, id: Option<RouteId>) {
        self.id = id;
    }

    pub(crate) fn replace_with(&mut self, fresh: Route) {
        self.id = fresh.id;
        self.url = fresh.url;
        if self.kind != fresh.kind {
            self.kind = fresh.kind;
            self.handler = OnceLock::new();
        }
    }

    /// The handler for this Route, built once per Route value.
    pub fn handler(&self) -> Result<&dyn Handler, HandleError> {
        if let Some(handler) = self.handler.get() {
            return Ok(handler.as_ref());
        }
        let route_type = self.route_type();
        let built = route_type.handler.build(route_type)?;
        Ok(self.handler.get_or_init(|| built).as_ref())
    }

    /// The part of `path` below this Route, keeping its leading `/`.
    ///
    /// `/blog/` handling `/blog/2020/` leaves `/2020/`. Returns `None` when
    /// `path` is not inside this Route.
    pub fn remaining_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        let cut = self.url.len().checked_sub(1)?;
        path.starts_with(&self.url).then(|| &path[cut..])
    }

    /// Strip this Route's url off `path` and let the handler deal with the rest.
    pub fn handle(&self, request: &Request, path: &str) -> HandlerResult {
        let handler = self.handler()?;
        let remaining = self
            .remaining_path(path)
            .ok_or_else(|| HandleError::NotFound {
                path: path.to_string(),
            })?;
        handler.handle(self, request, remaining)
    }
}

impl Clone for Route {
    /// Clones share nothing, including the memoized handler.
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            url: self.url.clone(),
            kind: self.kind.clone(),
            handler: OnceLock::new(),
        }
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.url == other.url && self.kind == other.kind
    }
}

impl Eq for Route {}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.route_type().name, self.url)
    }
}
