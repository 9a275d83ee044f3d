//! Single-view strategy.

use std::collections::HashMap;
use std::fmt;

use crate::handlers::{
    ConfigIssue, HandleError, Handler, HandlerKind, HandlerResult, Request, View, ViewContext,
};
use crate::kinds::RouteType;
use crate::routing::Route;

/// Calls the subtype's `view` for the Route's own url.
///
/// The view is a plain function pointer taken from the static declaration,
/// so it is called with the Route as an argument and never bound to it.
#[derive(Clone, Copy)]
pub struct ViewHandler {
    view: View,
}

impl ViewHandler {
    pub fn new(route_type: &RouteType) -> Result<Self, HandleError> {
        let view = route_type.view.ok_or_else(|| HandleError::Misconfigured {
            route_type: route_type.tag,
            reason: "missing `view`".into(),
        })?;
        Ok(Self { view })
    }

    pub fn check(route_type: &RouteType) -> Vec<ConfigIssue> {
        if route_type.view.is_some() {
            return Vec::new();
        }
        vec![ConfigIssue::new(
            "routes.W004",
            route_type.tag,
            format!("{} must have a `view` attribute.", route_type.name),
            format!("This is a requirement of {}.", HandlerKind::View.name()),
        )]
    }
}

impl fmt::Debug for ViewHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandler").finish_non_exhaustive()
    }
}

impl Handler for ViewHandler {
    fn handle(&self, route: &Route, request: &Request, path: &str) -> HandlerResult {
        if path != "/" {
            return Err(HandleError::NotFound {
                path: path.to_string(),
            });
        }
        (self.view)(&ViewContext {
            request,
            route,
            args: Vec::new(),
            params: HashMap::new(),
        })
    }
}
