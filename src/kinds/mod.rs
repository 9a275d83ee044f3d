//! Concrete Route subtypes.
//!
//! # Data Flow
//! ```text
//! route row (type_tag) + extension row
//!     → RouteKind (subtype fields)
//!     → RouteType (static declaration: handler strategy + capabilities)
//!     → HandlerKind::build → Handler
//! ```
//!
//! # Design Decisions
//! - Subtypes form a closed sum type; each variant owns one extension table
//! - Capabilities are declared statically per subtype, never per instance
//! - Views are free functions so they never receive the subtype as a receiver

pub mod page;
pub mod redirect;
pub mod section;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handlers::{HandlerKind, View};

/// Subtype-specific data for a Route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteKind {
    /// A bare Route with no extension record.
    #[serde(rename = "route")]
    Plain,
    /// Rendered through the `page.html` template.
    Page { content: String },
    /// Sends the browser elsewhere.
    Redirect { target: String, permanent: bool },
    /// Resolves sub-paths through its routing table.
    Section { title: String },
}

impl RouteKind {
    pub fn tag(&self) -> &'static str {
        self.route_type().tag
    }

    pub fn route_type(&self) -> &'static RouteType {
        match self {
            RouteKind::Plain => &PLAIN,
            RouteKind::Page { .. } => &page::PAGE,
            RouteKind::Redirect { .. } => &redirect::REDIRECT,
            RouteKind::Section { .. } => &section::SECTION,
        }
    }
}

/// One entry of an embedded routing table.
pub struct UrlPattern {
    /// Regular expression matched against the remaining path without its
    /// leading `/`.
    pub regex: &'static str,
    pub name: &'static str,
    pub view: View,
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlPattern")
            .field("regex", &self.regex)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Static declaration of a Route subtype.
pub struct RouteType {
    /// Discriminator stored in `route.type_tag`.
    pub tag: &'static str,
    /// Human readable name used in `Display` and check messages.
    pub name: &'static str,
    pub handler: HandlerKind,
    pub template_name: Option<&'static str>,
    pub urlconf: Option<&'static [UrlPattern]>,
    pub view: Option<View>,
}

impl RouteType {
    /// A declaration with no capabilities.
    pub const fn new(tag: &'static str, name: &'static str, handler: HandlerKind) -> Self {
        Self {
            tag,
            name,
            handler,
            template_name: None,
            urlconf: None,
            view: None,
        }
    }
}

impl fmt::Debug for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteType")
            .field("tag", &self.tag)
            .field("handler", &self.handler)
            .field("template_name", &self.template_name)
            .field("urlconf", &self.urlconf)
            .field("view", &self.view.is_some())
            .finish()
    }
}

pub static PLAIN: RouteType = RouteType::new("route", "Route", HandlerKind::Base);

/// Every subtype this build knows how to load.
pub static ROUTE_TYPES: [&RouteType; 4] = [
    &PLAIN,
    &page::PAGE,
    &redirect::REDIRECT,
    &section::SECTION,
];

/// Look up a subtype declaration by its stored tag.
pub fn route_type_for_tag(tag: &str) -> Option<&'static RouteType> {
    ROUTE_TYPES.iter().copied().find(|ty| ty.tag == tag)
}
