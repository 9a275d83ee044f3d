//! SQLite persistence for Routes.
//!
//! # Responsibilities
//! - Open connections with the pragmas and virtual tables the directory needs
//! - Create the base and extension tables
//! - Map joined rows back into [`Route`] values
//!
//! # Design Decisions
//! - Every read joins all extension tables so one statement loads any subtype
//! - Prefix filters compare `substr(url, 1, n)` exactly; `LIKE` would be
//!   case-insensitive and treat `_` and `%` as wildcards

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, Row};

use crate::kinds::{route_type_for_tag, RouteKind};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::route::{Route, RouteId};

pub(crate) const SCHEMA: &str = include_str!("sql/schema.sql");

pub(crate) const SELECT_ROUTE: &str = "\
SELECT r.id, r.url, r.type_tag, p.content, d.target, d.permanent, s.title
  FROM route r
  LEFT JOIN route_page p ON p.route_id = r.id
  LEFT JOIN route_redirect d ON d.route_id = r.id
  LEFT JOIN route_section s ON s.route_id = r.id";

pub(crate) const INSERT_ROUTE: &str = "INSERT INTO route (url, type_tag) VALUES (?1, ?2)";

pub(crate) const UPDATE_URL: &str = "UPDATE route SET url = ?1 WHERE id = ?2";

/// Replace the `?2` prefix with `?1` on every url under `?2`, in one pass.
/// Changes nothing unless the subtree's own Route `?3` is still stored.
pub(crate) const REWRITE_PREFIX: &str = "\
UPDATE route
   SET url = ?1 || substr(url, length(?2) + 1)
 WHERE substr(url, 1, length(?2)) = ?2
   AND EXISTS (SELECT 1 FROM route WHERE id = ?3)";

pub(crate) const DELETE_ROUTE: &str = "DELETE FROM route WHERE id = ?1";

pub(crate) const DELETE_SUBTREE: &str = "DELETE FROM route WHERE substr(url, 1, length(?1)) = ?1";

/// Open (or create) a database and make sure the schema exists.
pub fn open_connection(path: &Path, busy_timeout: Duration) -> RouteResult<Connection> {
    let conn = Connection::open(path)?;
    prepare_connection(&conn, busy_timeout)?;
    Ok(conn)
}

pub fn open_in_memory() -> RouteResult<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare_connection(&conn, Duration::ZERO)?;
    Ok(conn)
}

fn prepare_connection(conn: &Connection, busy_timeout: Duration) -> RouteResult<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    rusqlite::vtab::array::load_module(conn)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// A joined row before its type tag has been interpreted.
#[derive(Debug)]
pub(crate) struct RouteRow {
    id: i64,
    url: String,
    type_tag: String,
    content: Option<String>,
    target: Option<String>,
    permanent: Option<bool>,
    title: Option<String>,
}

impl RouteRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            type_tag: row.get(2)?,
            content: row.get(3)?,
            target: row.get(4)?,
            permanent: row.get(5)?,
            title: row.get(6)?,
        })
    }

    pub(crate) fn into_route(self) -> RouteResult<Route> {
        let route_type = route_type_for_tag(&self.type_tag)
            .ok_or_else(|| RouteError::UnknownTypeTag(self.type_tag.clone()))?;
        let kind = match route_type.tag {
            "page" => RouteKind::Page {
                content: self.content.unwrap_or_default(),
            },
            "redirect" => RouteKind::Redirect {
                target: self.target.unwrap_or_default(),
                permanent: self.permanent.unwrap_or(false),
            },
            "section" => RouteKind::Section {
                title: self.title.unwrap_or_default(),
            },
            _ => RouteKind::Plain,
        };
        Ok(Route::persisted(RouteId(self.id), self.url, kind))
    }
}

/// Write the extension record for `kind`, if it has one. Returns the number
/// of statements sent.
pub(crate) fn insert_extension(conn: &Connection, id: i64, kind: &RouteKind) -> rusqlite::Result<usize> {
    match kind {
        RouteKind::Plain => return Ok(0),
        RouteKind::Page { content } => {
            conn.prepare_cached("INSERT INTO route_page (route_id, content) VALUES (?1, ?2)")?
                .execute(params![id, content])?;
        }
        RouteKind::Redirect { target, permanent } => {
            conn.prepare_cached(
                "INSERT INTO route_redirect (route_id, target, permanent) VALUES (?1, ?2, ?3)",
            )?
            .execute(params![id, target, permanent])?;
        }
        RouteKind::Section { title } => {
            conn.prepare_cached("INSERT INTO route_section (route_id, title) VALUES (?1, ?2)")?
                .execute(params![id, title])?;
        }
    }
    Ok(1)
}
