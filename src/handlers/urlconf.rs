//! Sub-path resolution through an embedded routing table.

use std::collections::HashMap;

use regex::Regex;

use crate::handlers::{
    ConfigIssue, HandleError, Handler, HandlerKind, HandlerResult, Request, View, ViewContext,
};
use crate::kinds::{RouteType, UrlPattern};
use crate::routing::Route;

#[derive(Debug)]
struct CompiledPattern {
    regex: Regex,
    pattern: &'static UrlPattern,
}

/// Resolves the remaining path against the subtype's `urlconf` and calls the
/// first matching view with the Route plus any captures.
///
/// Patterns see the remaining path without its leading `/`, so `^$` is the
/// Route itself and `^(?P<slug>[^/]+)/$` is one level below it.
#[derive(Debug)]
pub struct UrlConfHandler {
    patterns: Vec<CompiledPattern>,
}

/// A successful routing-table lookup.
#[derive(Clone)]
pub struct Resolved {
    pub name: &'static str,
    pub view: View,
    pub args: Vec<String>,
    pub params: HashMap<String, String>,
}

impl UrlConfHandler {
    pub fn new(route_type: &RouteType) -> Result<Self, HandleError> {
        let urlconf = route_type
            .urlconf
            .ok_or_else(|| HandleError::Misconfigured {
                route_type: route_type.tag,
                reason: "missing `urlconf`".into(),
            })?;
        let patterns = urlconf
            .iter()
            .map(|pattern| {
                let regex = Regex::new(pattern.regex).map_err(|e| HandleError::Misconfigured {
                    route_type: route_type.tag,
                    reason: format!("pattern {:?} does not compile: {e}", pattern.regex),
                })?;
                Ok(CompiledPattern { regex, pattern })
            })
            .collect::<Result<Vec<_>, HandleError>>()?;
        Ok(Self { patterns })
    }

    pub fn check(route_type: &RouteType) -> Vec<ConfigIssue> {
        let Some(urlconf) = route_type.urlconf else {
            return vec![ConfigIssue::new(
                "routes.W002",
                route_type.tag,
                format!("{} must have a `urlconf` attribute.", route_type.name),
                format!(
                    "The urlconf must be a routing table. This is a requirement of {}.",
                    HandlerKind::UrlConf.name()
                ),
            )];
        };
        urlconf
            .iter()
            .filter_map(|pattern| {
                let err = Regex::new(pattern.regex).err()?;
                Some(ConfigIssue::new(
                    "routes.W003",
                    route_type.tag,
                    format!(
                        "{} has an invalid urlconf pattern {:?} ({}).",
                        route_type.name, pattern.regex, pattern.name
                    ),
                    err.to_string(),
                ))
            })
            .collect()
    }

    /// Find the view for `path`. Named captures win over unnamed ones.
    pub fn resolve(&self, path: &str) -> Option<Resolved> {
        let target = path.strip_prefix('/').unwrap_or(path);
        self.patterns.iter().find_map(|compiled| {
            let captures = compiled.regex.captures(target)?;
            let params: HashMap<String, String> = compiled
                .regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect();
            let args = if params.is_empty() {
                captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect()
            } else {
                Vec::new()
            };
            Some(Resolved {
                name: compiled.pattern.name,
                view: compiled.pattern.view,
                args,
                params,
            })
        })
    }
}

impl Handler for UrlConfHandler {
    fn handle(&self, route: &Route, request: &Request, path: &str) -> HandlerResult {
        let resolved = self.resolve(path).ok_or_else(|| HandleError::NotFound {
            path: path.to_string(),
        })?;
        tracing::debug!(route = %route, pattern = resolved.name, path, "Resolved sub-path");
        (resolved.view)(&ViewContext {
            request,
            route,
            args: resolved.args,
            params: resolved.params,
        })
    }
}
