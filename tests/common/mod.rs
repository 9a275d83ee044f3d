//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use route_tree::config::AppConfig;
use route_tree::http::{AppState, HttpServer};
use route_tree::lifecycle::{Services, Shutdown};
use route_tree::templates::TemplateSet;
use route_tree::{Route, RouteKind, Routes, UrlPolicy};

/// Fresh in-memory directory with the default url policy.
pub fn routes() -> Routes {
    Routes::open_in_memory(UrlPolicy::default()).unwrap()
}

/// Create one Route per url, all of the given kind.
pub fn create_all(routes: &Routes, urls: &[&str]) -> Vec<Route> {
    urls.iter()
        .map(|url| routes.create(url, RouteKind::Plain).unwrap())
        .collect()
}

pub fn urls(routes: &[Route]) -> Vec<String> {
    routes.iter().map(|r| r.url().to_string()).collect()
}

pub fn page(content: &str) -> RouteKind {
    RouteKind::Page {
        content: content.into(),
    }
}

/// Run `f` and assert it sent exactly `expected` statements to the store.
pub fn assert_num_queries<T>(routes: &Routes, expected: usize, f: impl FnOnce(&Routes) -> T) -> T {
    let before = routes.query_count();
    let value = f(routes);
    let sent = routes.query_count() - before;
    assert_eq!(sent, expected, "expected {expected} queries, {sent} were sent");
    value
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

/// Serve `routes` on 127.0.0.1 with default settings.
pub async fn start_server(routes: Routes) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = AppConfig::default();
    let state = AppState::new(Services {
        routes,
        templates: TemplateSet::builtin(),
    });
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, state);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}
