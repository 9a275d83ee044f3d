//! The Route directory: lookup and subtree mutation over the store.
//!
//! # Responsibilities
//! - Longest-prefix resolution of request paths in one round-trip
//! - Ancestor and descendant queries derived from url prefixes
//! - Validated creation, moves and swaps with all-or-nothing semantics
//!
//! # Design Decisions
//! - Candidate sets are bound as one `rarray` parameter, so lookup cost in
//!   statements does not grow with path depth
//! - Subtree moves are a single set-based `UPDATE`, never a per-row loop
//! - The in-memory `url` is only changed after the transaction commits, so a
//!   failed move leaves the caller's value as it was
//! - Only the Route values handed to a call are updated; other copies of
//!   moved descendants go stale until [`Routes::refresh`]

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Params};
use uuid::Uuid;

use crate::kinds::RouteKind;
use crate::observability::metrics;
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::paths;
use crate::routing::route::{Route, RouteId};
use crate::routing::store::{self, RouteRow, DELETE_ROUTE, DELETE_SUBTREE, INSERT_ROUTE, REWRITE_PREFIX, SELECT_ROUTE, UPDATE_URL};
use crate::routing::validators::{validate_url, UrlPolicy};

/// Owns the store connection and the url invariants.
///
/// Not `Sync`: share it behind a mutex.
#[derive(Debug)]
pub struct Routes {
    conn: Connection,
    policy: UrlPolicy,
    queries: Cell<usize>,
}

impl Routes {
    pub fn new(conn: Connection, policy: UrlPolicy) -> Self {
        Self {
            conn,
            policy,
            queries: Cell::new(0),
        }
    }

    /// Open the database at `path`, creating tables as needed.
    pub fn open(path: &Path, busy_timeout: Duration, policy: UrlPolicy) -> RouteResult<Self> {
        let conn = store::open_connection(path, busy_timeout)?;
        tracing::debug!(path = %path.display(), "Route store opened");
        Ok(Self::new(conn, policy))
    }

    pub fn open_in_memory(policy: UrlPolicy) -> RouteResult<Self> {
        Ok(Self::new(store::open_in_memory()?, policy))
    }

    pub fn policy(&self) -> UrlPolicy {
        self.policy
    }

    /// Statements sent to the store so far, excluding transaction control.
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// See [`paths::candidate_paths`].
    pub fn candidate_paths(path: &str) -> Vec<String> {
        paths::candidate_paths(path)
    }

    /// The Route with the longest url that prefixes `path`.
    ///
    /// Fails with [`RouteError::NoMatchingRoot`] only when not even `/`
    /// exists. A missing leaf is left for the handler to report.
    pub fn best_match_for_path(&self, path: &str) -> RouteResult<Route> {
        let candidates = text_array(paths::candidate_paths(path));
        let sql = format!("{SELECT_ROUTE} WHERE r.url IN rarray(?1) ORDER BY length(r.url) DESC LIMIT 1");
        self.fetch_one(&sql, params![candidates])?
            .ok_or_else(|| RouteError::NoMatchingRoot {
                path: path.to_string(),
            })
    }

    /// Stored Routes whose url is a proper prefix of `route`'s, root first.
    pub fn get_ancestors(&self, route: &Route) -> RouteResult<Vec<Route>> {
        let id = self.require_id(route, "get_ancestors")?;
        let candidates = paths::ancestor_paths(route.url());
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{SELECT_ROUTE} WHERE r.url IN rarray(?1) AND r.id <> ?2 ORDER BY length(r.url)");
        self.fetch_all(&sql, params![text_array(candidates), id.0])
    }

    /// Every Route under `route`, ordered by url.
    pub fn get_descendants(&self, route: &Route) -> RouteResult<Vec<Route>> {
        let id = self.require_id(route, "get_descendants")?;
        let sql = format!(
            "{SELECT_ROUTE} WHERE substr(r.url, 1, length(?1)) = ?1 AND r.id <> ?2 ORDER BY r.url"
        );
        self.fetch_all(&sql, params![route.url(), id.0])
    }

    /// Validate `url` and store a new Route there.
    pub fn create(&self, url: &str, kind: RouteKind) -> RouteResult<Route> {
        let result = self.validate(url).and_then(|()| self.insert(url, kind));
        match &result {
            Ok(route) => tracing::info!(route_id = ?route.id(), url, route_type = route.kind().tag(), "Route created"),
            Err(e) => tracing::warn!(url, error = %e, "Route creation failed"),
        }
        metrics::record_mutation("create", result.is_ok());
        result
    }

    /// Change `route`'s url to `new_url`, optionally carrying its subtree.
    ///
    /// With `move_children` every descendant keeps its suffix under the new
    /// prefix. A clash anywhere aborts the whole move.
    pub fn move_to(&self, route: &mut Route, new_url: &str, move_children: bool) -> RouteResult<()> {
        let old_url = route.url().to_string();
        let result = self.move_inner(route, new_url, move_children);
        match &result {
            Ok(()) => tracing::info!(
                route_id = ?route.id(),
                from = %old_url,
                to = new_url,
                move_children,
                "Route moved"
            ),
            Err(e) => tracing::warn!(from = %old_url, to = new_url, move_children, error = %e, "Route move failed"),
        }
        metrics::record_mutation("move", result.is_ok());
        result
    }

    fn move_inner(&self, route: &mut Route, new_url: &str, move_children: bool) -> RouteResult<()> {
        self.validate(new_url)?;
        let id = self.require_id(route, "move_to")?;

        let tx = self.conn.unchecked_transaction()?;
        if move_children {
            self.rewrite(id, new_url, route.url())?;
        } else {
            self.update_url(id, new_url)?;
        }
        tx.commit()?;

        route.set_url(new_url);
        Ok(())
    }

    /// Exchange the urls of `a` and `b`, optionally with their subtrees.
    ///
    /// Both Routes pass through a fresh placeholder path, so neither url is
    /// ever held twice.
    pub fn swap_with(&self, a: &mut Route, b: &mut Route, move_children: bool) -> RouteResult<()> {
        let result = self.swap_inner(a, b, move_children);
        match &result {
            Ok(()) => tracing::info!(
                first = ?a.id(),
                second = ?b.id(),
                first_url = a.url(),
                second_url = b.url(),
                move_children,
                "Routes swapped"
            ),
            Err(e) => tracing::warn!(first_url = a.url(), second_url = b.url(), move_children, error = %e, "Route swap failed"),
        }
        metrics::record_mutation("swap", result.is_ok());
        result
    }

    fn swap_inner(&self, a: &mut Route, b: &mut Route, move_children: bool) -> RouteResult<()> {
        let id_a = self.require_id(a, "swap_with")?;
        let id_b = self.require_id(b, "swap_with")?;
        let url_a = a.url().to_string();
        let url_b = b.url().to_string();
        if move_children && (url_a.starts_with(&url_b) || url_b.starts_with(&url_a)) {
            return Err(RouteError::AncestorSwap);
        }
        let placeholder = format!("/{}/", Uuid::new_v4());

        let tx = self.conn.unchecked_transaction()?;
        if move_children {
            self.rewrite(id_a, &placeholder, &url_a)?;
            self.rewrite(id_b, &url_a, &url_b)?;
            self.rewrite(id_a, &url_b, &placeholder)?;
        } else {
            self.update_url(id_a, &placeholder)?;
            self.update_url(id_b, &url_a)?;
            self.update_url(id_a, &url_b)?;
        }
        tx.commit()?;

        a.set_url(url_b);
        b.set_url(url_a);
        Ok(())
    }

    pub fn get(&self, id: RouteId) -> RouteResult<Route> {
        let sql = format!("{SELECT_ROUTE} WHERE r.id = ?1");
        self.fetch_one(&sql, params![id.0])?
            .ok_or_else(|| RouteError::DoesNotExist(id.to_string()))
    }

    pub fn get_by_url(&self, url: &str) -> RouteResult<Route> {
        let sql = format!("{SELECT_ROUTE} WHERE r.url = ?1");
        self.fetch_one(&sql, params![url])?
            .ok_or_else(|| RouteError::DoesNotExist(format!("{url:?}")))
    }

    /// Reload `route` from the store, picking up moves made elsewhere.
    pub fn refresh(&self, route: &mut Route) -> RouteResult<()> {
        let id = self.require_id(route, "refresh")?;
        let fresh = self.get(id)?;
        route.replace_with(fresh);
        Ok(())
    }

    /// Every Route, ordered by url.
    pub fn all(&self) -> RouteResult<Vec<Route>> {
        let sql = format!("{SELECT_ROUTE} ORDER BY r.url");
        self.fetch_all(&sql, params![])
    }

    /// Delete this one record. Descendants are left in place; callers decide
    /// whether to cascade or refuse.
    pub fn delete(&self, route: &mut Route) -> RouteResult<()> {
        let id = self.require_id(route, "delete")?;
        let deleted = self.execute(DELETE_ROUTE, params![id.0])?;
        if deleted == 0 {
            return Err(RouteError::DoesNotExist(id.to_string()));
        }
        route.set_id(None);
        tracing::info!(route_id = %id, url = route.url(), "Route deleted");
        metrics::record_mutation("delete", true);
        Ok(())
    }

    /// Delete `route` and everything under it in one statement. Returns the
    /// number of records removed.
    pub fn delete_subtree(&self, route: &mut Route) -> RouteResult<usize> {
        let id = self.require_id(route, "delete_subtree")?;
        let deleted = self.execute(DELETE_SUBTREE, params![route.url()])?;
        if deleted == 0 {
            return Err(RouteError::DoesNotExist(id.to_string()));
        }
        route.set_id(None);
        tracing::info!(route_id = %id, url = route.url(), deleted, "Route subtree deleted");
        metrics::record_mutation("delete", true);
        Ok(deleted)
    }

    fn validate(&self, url: &str) -> RouteResult<()> {
        validate_url(url, self.policy).map_err(|source| RouteError::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }

    fn require_id(&self, route: &Route, operation: &'static str) -> RouteResult<RouteId> {
        route.require_id(operation).inspect_err(|_| {
            tracing::error!(operation, url = route.url(), "Directory operation on an unsaved Route");
        })
    }

    fn insert(&self, url: &str, kind: RouteKind) -> RouteResult<Route> {
        let tx = self.conn.unchecked_transaction()?;
        self.execute(INSERT_ROUTE, params![url, kind.tag()])
            .map_err(|e| RouteError::from_write(e, url))?;
        let id = self.conn.last_insert_rowid();
        let sent = store::insert_extension(&self.conn, id, &kind)?;
        self.count(sent);
        tx.commit()?;
        Ok(Route::persisted(RouteId(id), url, kind))
    }

    /// Rewrite the subtree rooted at `id`. Nothing changes when `id` is no
    /// longer stored, which aborts the enclosing transaction.
    fn rewrite(&self, id: RouteId, new_prefix: &str, old_prefix: &str) -> RouteResult<()> {
        let changed = self
            .execute(REWRITE_PREFIX, params![new_prefix, old_prefix, id.0])
            .map_err(|e| RouteError::from_write(e, new_prefix))?;
        require_changed(changed, id)
    }

    fn update_url(&self, id: RouteId, url: &str) -> RouteResult<()> {
        let changed = self
            .execute(UPDATE_URL, params![url, id.0])
            .map_err(|e| RouteError::from_write(e, url))?;
        require_changed(changed, id)
    }

    fn execute<P: Params>(&self, sql: &str, params: P) -> rusqlite::Result<usize> {
        self.count(1);
        self.conn.prepare_cached(sql)?.execute(params)
    }

    fn fetch_one<P: Params>(&self, sql: &str, params: P) -> RouteResult<Option<Route>> {
        self.count(1);
        let row = self
            .conn
            .prepare_cached(sql)?
            .query_row(params, RouteRow::from_row)
            .optional()?;
        row.map(RouteRow::into_route).transpose()
    }

    fn fetch_all<P: Params>(&self, sql: &str, params: P) -> RouteResult<Vec<Route>> {
        self.count(1);
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, RouteRow::from_row)?;
        rows.map(|row| row?.into_route()).collect()
    }

    fn count(&self, statements: usize) {
        self.queries.set(self.queries.get() + statements);
    }
}

fn require_changed(changed: usize, id: RouteId) -> RouteResult<()> {
    if changed == 0 {
        return Err(RouteError::DoesNotExist(id.to_string()));
    }
    Ok(())
}

fn text_array(values: Vec<String>) -> Rc<Vec<Value>> {
    Rc::new(values.into_iter().map(Value::Text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> Routes {
        Routes::open_in_memory(UrlPolicy::default()).unwrap()
    }

    fn urls(routes: &[Route]) -> Vec<&str> {
        routes.iter().map(Route::url).collect()
    }

    fn section(title: &str) -> RouteKind {
        RouteKind::Section {
            title: title.into(),
        }
    }

    #[test]
    fn test_create_validates() {
        let routes = routes();
        let err = routes.create("no/leading/slash/", RouteKind::Plain).unwrap_err();
        assert!(matches!(err, RouteError::InvalidUrl { .. }));
        assert_eq!(routes.query_count(), 0);
        assert!(routes.all().unwrap().is_empty());
    }

    #[test]
    fn test_create_round_trips_kind() {
        let routes = routes();
        let kind = RouteKind::Redirect {
            target: "https://example.com/".into(),
            permanent: true,
        };
        let created = routes.create("/out/", kind.clone()).unwrap();
        assert!(created.is_persisted());

        let fetched = routes.get_by_url("/out/").unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.kind(), &kind);
    }

    #[test]
    fn test_duplicate_url_is_integrity_error() {
        let routes = routes();
        routes.create("/", RouteKind::Plain).unwrap();
        let err = routes.create("/", section("again")).unwrap_err();
        assert!(matches!(err, RouteError::Integrity { ref url } if url == "/"));
        assert_eq!(routes.all().unwrap().len(), 1);
    }

    #[test]
    fn test_dot_segments_follow_policy() {
        let strict = routes();
        assert!(strict.create("/a/../", RouteKind::Plain).is_err());

        let lenient = Routes::open_in_memory(UrlPolicy::STRUCTURAL).unwrap();
        assert!(lenient.create("/a/../", RouteKind::Plain).is_ok());
    }

    #[test]
    fn test_best_match_without_root() {
        let routes = routes();
        routes.create("/blog/", RouteKind::Plain).unwrap();
        let err = routes.best_match_for_path("/other/").unwrap_err();
        assert!(matches!(err, RouteError::NoMatchingRoot { ref path } if path == "/other/"));
    }

    #[test]
    fn test_prefix_match_is_exact() {
        let routes = routes();
        routes.create("/", RouteKind::Plain).unwrap();
        routes.create("/a_c/", RouteKind::Plain).unwrap();
        routes.create("/Abc/", RouteKind::Plain).unwrap();
        let parent = routes.create("/abc/", RouteKind::Plain).unwrap();

        assert!(routes.get_descendants(&parent).unwrap().is_empty());
        assert_eq!(routes.best_match_for_path("/abc/x/").unwrap().url(), "/abc/");
    }

    #[test]
    fn test_ancestors_of_root() {
        let routes = routes();
        let root = routes.create("/", RouteKind::Plain).unwrap();
        let before = routes.query_count();
        assert!(routes.get_ancestors(&root).unwrap().is_empty());
        assert_eq!(routes.query_count(), before);
    }

    #[test]
    fn test_unsaved_route_is_rejected() {
        let routes = routes();
        let mut a = Route::new("/a/", RouteKind::Plain);
        let mut b = Route::new("/b/", RouteKind::Plain);

        assert!(routes.get_descendants(&a).unwrap_err().is_programming_error());
        assert!(routes.get_ancestors(&a).unwrap_err().is_programming_error());
        assert!(routes.swap_with(&mut a, &mut b, false).unwrap_err().is_programming_error());
        assert_eq!(routes.query_count(), 0);
    }

    #[test]
    fn test_move_without_children_leaves_subtree() {
        let routes = routes();
        let mut parent = routes.create("/a/", RouteKind::Plain).unwrap();
        routes.create("/a/b/", RouteKind::Plain).unwrap();

        routes.move_to(&mut parent, "/z/", false).unwrap();
        assert_eq!(parent.url(), "/z/");
        assert_eq!(urls(&routes.all().unwrap()), vec!["/a/b/", "/z/"]);
    }

    #[test]
    fn test_failed_move_keeps_url() {
        let routes = routes();
        let mut a = routes.create("/a/", RouteKind::Plain).unwrap();
        routes.create("/b/", RouteKind::Plain).unwrap();

        let err = routes.move_to(&mut a, "/b/", false).unwrap_err();
        assert!(matches!(err, RouteError::Integrity { .. }));
        assert_eq!(a.url(), "/a/");

        let err = routes.move_to(&mut a, "/bad", false).unwrap_err();
        assert!(matches!(err, RouteError::InvalidUrl { .. }));
        assert_eq!(a.url(), "/a/");
    }

    #[test]
    fn test_move_of_deleted_route_fails() {
        let routes = routes();
        let mut a = routes.create("/a/", RouteKind::Plain).unwrap();
        let mut stale = a.clone();
        routes.delete(&mut a).unwrap();

        let err = routes.move_to(&mut stale, "/z/", false).unwrap_err();
        assert!(matches!(err, RouteError::DoesNotExist(_)));
        assert_eq!(stale.url(), "/a/");

        let err = routes.move_to(&mut stale, "/z/", true).unwrap_err();
        assert!(matches!(err, RouteError::DoesNotExist(_)));
        assert_eq!(stale.url(), "/a/");
        assert!(routes.all().unwrap().is_empty());
    }

    #[test]
    fn test_subtree_move_of_deleted_route_leaves_children() {
        let routes = routes();
        let mut a = routes.create("/a/", RouteKind::Plain).unwrap();
        routes.create("/a/b/", RouteKind::Plain).unwrap();
        let mut stale = a.clone();
        routes.delete(&mut a).unwrap();

        let err = routes.move_to(&mut stale, "/z/", true).unwrap_err();
        assert!(matches!(err, RouteError::DoesNotExist(_)));
        assert_eq!(urls(&routes.all().unwrap()), vec!["/a/b/"]);
    }

    #[test]
    fn test_swap_with_deleted_route_changes_nothing() {
        let routes = routes();
        let mut b = routes.create("/b/", RouteKind::Plain).unwrap();
        let mut c = routes.create("/c/", RouteKind::Plain).unwrap();
        let mut stale = c.clone();
        routes.delete(&mut c).unwrap();

        for move_children in [false, true] {
            let err = routes.swap_with(&mut b, &mut stale, move_children).unwrap_err();
            assert!(matches!(err, RouteError::DoesNotExist(_)), "{err}");
            assert_eq!((b.url(), stale.url()), ("/b/", "/c/"));
            assert_eq!(urls(&routes.all().unwrap()), vec!["/b/"]);
        }
    }

    #[test]
    fn test_swap_without_children() {
        let routes = routes();
        let mut a = routes.create("/a/", section("A")).unwrap();
        let mut b = routes.create("/b/", RouteKind::Plain).unwrap();
        routes.create("/a/child/", RouteKind::Plain).unwrap();

        let before = routes.query_count();
        routes.swap_with(&mut a, &mut b, false).unwrap();
        assert_eq!(routes.query_count() - before, 3);

        assert_eq!((a.url(), b.url()), ("/b/", "/a/"));
        assert_eq!(routes.get_by_url("/b/").unwrap().kind(), &section("A"));
        assert!(routes.get_by_url("/a/child/").is_ok());
    }

    #[test]
    fn test_swap_with_descendant_is_rejected() {
        let routes = routes();
        let mut parent = routes.create("/a/", RouteKind::Plain).unwrap();
        let mut child = routes.create("/a/b/", RouteKind::Plain).unwrap();

        let before = routes.query_count();
        let err = routes.swap_with(&mut parent, &mut child, true).unwrap_err();
        assert!(matches!(err, RouteError::AncestorSwap));
        assert_eq!(routes.query_count(), before);
        assert_eq!((parent.url(), child.url()), ("/a/", "/a/b/"));

        routes.swap_with(&mut parent, &mut child, false).unwrap();
        assert_eq!((parent.url(), child.url()), ("/a/b/", "/a/"));
    }

    #[test]
    fn test_refresh_after_subtree_move() {
        let routes = routes();
        let mut parent = routes.create("/a/", RouteKind::Plain).unwrap();
        let mut child = routes.create("/a/b/", RouteKind::Plain).unwrap();

        routes.move_to(&mut parent, "/z/", true).unwrap();
        assert_eq!(child.url(), "/a/b/");
        routes.refresh(&mut child).unwrap();
        assert_eq!(child.url(), "/z/b/");
    }

    #[test]
    fn test_delete() {
        let routes = routes();
        let mut route = routes.create("/gone/", RouteKind::Page { content: "x".into() }).unwrap();
        let id = route.id().unwrap();

        routes.delete(&mut route).unwrap();
        assert!(!route.is_persisted());
        assert!(routes.get(id).unwrap_err().is_not_found());
        assert!(routes.delete(&mut route).unwrap_err().is_programming_error());
    }

    #[test]
    fn test_delete_subtree() {
        let routes = routes();
        routes.create("/", RouteKind::Plain).unwrap();
        let mut parent = routes.create("/a/", section("A")).unwrap();
        routes.create("/a/b/", RouteKind::Plain).unwrap();
        routes.create("/ab/", RouteKind::Plain).unwrap();

        assert_eq!(routes.delete_subtree(&mut parent).unwrap(), 2);
        assert_eq!(urls(&routes.all().unwrap()), vec!["/", "/ab/"]);
    }

    #[test]
    fn test_routes_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Routes>();
    }
}
