//! Startup checks over Route type declarations.

use std::collections::HashSet;

use crate::handlers::ConfigIssue;
use crate::kinds::RouteType;

/// Collect every configuration problem across `route_types`.
///
/// Meant to run once before traffic is accepted; an empty result means every
/// subtype declares what its handler strategy needs.
pub fn check_route_types(route_types: &[&RouteType]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    if route_types.is_empty() {
        issues.push(ConfigIssue::new(
            "routes.E002",
            "",
            "No Route types are available.",
            "Register at least one Route type.",
        ));
        return issues;
    }

    let mut seen = HashSet::new();
    for route_type in route_types {
        if !seen.insert(route_type.tag) {
            issues.push(ConfigIssue::new(
                "routes.E004",
                route_type.tag,
                format!("Route type tag {:?} is declared more than once.", route_type.tag),
                "Every Route type needs its own tag.",
            ));
        }
        issues.extend(route_type.handler.check(route_type));
    }
    issues
}
