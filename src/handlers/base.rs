//! The abstract root strategy.

use crate::handlers::{ConfigIssue, HandleError, Handler, HandlerResult, Request};
use crate::kinds::RouteType;
use crate::routing::Route;

/// Serves nothing. Used by Route types that have no handling of their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseHandler;

impl BaseHandler {
    /// Nothing to require of the subtype.
    pub fn check(_route_type: &RouteType) -> Vec<ConfigIssue> {
        Vec::new()
    }
}

impl Handler for BaseHandler {
    fn handle(&self, _route: &Route, _request: &Request, _path: &str) -> HandlerResult {
        Err(HandleError::NotImplemented)
    }
}
