//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all dispatch handler
//! - Wire up middleware (request ID, timeout, tracing)
//! - Resolve each request through the Route directory
//! - Serve until the shutdown broadcast fires
//!
//! # Design Decisions
//! - Store access is synchronous, so dispatch runs on a blocking worker
//! - The directory lock is held for the lookup only, never while handling

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::request::{
    propagate_request_id_layer, request_id, request_span, set_request_id_layer,
};
use crate::http::response::DispatchError;
use crate::lifecycle::Services;
use crate::observability::metrics;
use crate::routing::paths::canonical_path;
use crate::routing::{RouteError, Routes};
use crate::templates::TemplateSet;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<Mutex<Routes>>,
    pub templates: Arc<TemplateSet>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            routes: Arc::new(Mutex::new(services.routes)),
            templates: Arc::new(services.templates),
        }
    }
}

/// HTTP front end for the Route directory.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// The fully layered router, for serving or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: longest-prefix lookup, then the Route's own handler.
async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();
    let Some(path) = canonical_path(request.uri().path()) else {
        let err = DispatchError::InvalidPath;
        tracing::debug!(request_id = %request_id, raw_path = request.uri().path(), error = %err, "Rejected request path");
        metrics::record_request(err.outcome(), start);
        return err.into_response();
    };
    request.extensions_mut().insert(state.templates.clone());

    let routes = state.routes.clone();
    let lookup_path = path.clone();
    let result = tokio::task::spawn_blocking(move || resolve(&routes, &request, &lookup_path))
        .await
        .map_err(DispatchError::from)
        .and_then(|r| r);

    match result {
        Ok(response) => {
            tracing::debug!(request_id = %request_id, path = %path, status = %response.status(), "Request served");
            metrics::record_request("ok", start);
            response
        }
        Err(err) => {
            match &err {
                DispatchError::Handle(_) if !err.status().is_server_error() => {
                    tracing::debug!(request_id = %request_id, path = %path, error = %err, "No page for path");
                }
                DispatchError::Route(RouteError::NoMatchingRoot { .. }) => {
                    tracing::error!(request_id = %request_id, path = %path, error = %err, "No root Route; deployment is incomplete");
                }
                _ => {
                    tracing::error!(request_id = %request_id, path = %path, error = %err, "Dispatch failed");
                }
            }
            metrics::record_request(err.outcome(), start);
            err.into_response()
        }
    }
}

fn resolve(routes: &Mutex<Routes>, request: &Request<Body>, path: &str) -> Result<Response, DispatchError> {
    let route = routes.lock().best_match_for_path(path)?;
    tracing::debug!(route = %route, path, "Matched Route");
    Ok(route.handle(request, path)?)
}
