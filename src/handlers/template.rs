//! Template rendering strategy.

use std::sync::Arc;

use axum::response::{Html, IntoResponse};

use crate::handlers::{ConfigIssue, HandleError, Handler, HandlerKind, HandlerResult, Request};
use crate::kinds::RouteType;
use crate::routing::Route;
use crate::templates::TemplateSet;

/// Renders the subtype's `template_name` with the Route as context.
///
/// Only the Route's own url is served; anything below it is not found.
/// Templates come from the [`TemplateSet`] the server attaches to the request
/// extensions, or the built-in set when there is none.
#[derive(Debug, Clone)]
pub struct TemplateHandler {
    template_name: &'static str,
}

impl TemplateHandler {
    pub fn new(route_type: &RouteType) -> Result<Self, HandleError> {
        let template_name = route_type
            .template_name
            .ok_or_else(|| HandleError::Misconfigured {
                route_type: route_type.tag,
                reason: "missing `template_name`".into(),
            })?;
        Ok(Self { template_name })
    }

    pub fn check(route_type: &RouteType) -> Vec<ConfigIssue> {
        if route_type.template_name.is_some() {
            return Vec::new();
        }
        vec![ConfigIssue::new(
            "routes.W001",
            route_type.tag,
            format!("{} must have a `template_name` attribute.", route_type.name),
            format!("This is a requirement of {}.", HandlerKind::Template.name()),
        )]
    }

    pub fn template_name(&self) -> &'static str {
        self.template_name
    }
}

impl Handler for TemplateHandler {
    fn handle(&self, route: &Route, request: &Request, path: &str) -> HandlerResult {
        if path != "/" {
            return Err(HandleError::NotFound {
                path: path.to_string(),
            });
        }
        let body = match request.extensions().get::<Arc<TemplateSet>>() {
            Some(templates) => templates.render(self.template_name, route)?,
            None => TemplateSet::shared_builtin().render(self.template_name, route)?,
        };
        Ok(Html(body).into_response())
    }
}
