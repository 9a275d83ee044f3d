//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the Route type checks and refuse to start on any issue
//! - Load templates and open the Route store
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Checks report every issue, not just the first
//! - The listener is bound by the caller only after this succeeds

use std::time::Duration;

use thiserror::Error;

use crate::config::schema::{AppConfig, TemplatesConfig};
use crate::handlers::{check_route_types, ConfigIssue};
use crate::kinds::{RouteType, ROUTE_TYPES};
use crate::routing::{RouteError, Routes};
use crate::templates::{TemplateError, TemplateSet};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{} Route type configuration issue(s)", .0.len())]
    Checks(Vec<ConfigIssue>),

    #[error(transparent)]
    Templates(#[from] TemplateError),

    #[error("Failed to open the Route store: {0}")]
    Store(#[from] RouteError),
}

/// What the server needs once startup succeeded.
#[derive(Debug)]
pub struct Services {
    pub routes: Routes,
    pub templates: TemplateSet,
}

/// Check every Route type declaration, logging each issue.
pub fn run_checks(route_types: &[&RouteType]) -> Result<(), StartupError> {
    let issues = check_route_types(route_types);
    if issues.is_empty() {
        tracing::info!(route_types = route_types.len(), "Route type checks passed");
        return Ok(());
    }
    for issue in &issues {
        tracing::error!(
            id = issue.id,
            route_type = %issue.route_type,
            hint = %issue.hint,
            "{}",
            issue.message
        );
    }
    Err(StartupError::Checks(issues))
}

pub fn load_templates(config: &TemplatesConfig) -> Result<TemplateSet, StartupError> {
    let mut templates = TemplateSet::builtin();
    if let Some(dir) = &config.directory {
        templates.load_dir(dir)?;
    }
    Ok(templates)
}

pub fn open_routes(config: &AppConfig) -> Result<Routes, StartupError> {
    let routes = if config.database.is_in_memory() {
        Routes::open_in_memory(config.urls)?
    } else {
        Routes::open(
            &config.database.path,
            Duration::from_millis(config.database.busy_timeout_ms),
            config.urls,
        )?
    };
    Ok(routes)
}

/// Checks, templates, store; in that order.
pub fn prepare(config: &AppConfig) -> Result<Services, StartupError> {
    run_checks(&ROUTE_TYPES)?;
    let templates = load_templates(&config.templates)?;
    let routes = open_routes(config)?;
    tracing::info!(
        database = %config.database.path.display(),
        templates = templates.len(),
        forbid_dot_segments = config.urls.forbid_dot_segments,
        "Startup complete"
    );
    Ok(Services { routes, templates })
}
