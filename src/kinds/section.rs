//! Sections: Routes that own a small url space below themselves.

use axum::response::{Html, IntoResponse};

use crate::handlers::{HandleError, HandlerKind, HandlerResult, ViewContext};
use crate::kinds::{RouteKind, RouteType, UrlPattern};
use crate::templates::escape_html;

pub static SECTION_URLS: [UrlPattern; 2] = [
    UrlPattern {
        regex: r"^$",
        name: "section-index",
        view: section_index,
    },
    UrlPattern {
        regex: r"^(?P<slug>[a-zA-Z0-9_-]+)/$",
        name: "section-entry",
        view: section_entry,
    },
];

pub static SECTION: RouteType = RouteType {
    urlconf: Some(&SECTION_URLS),
    ..RouteType::new("section", "Section", HandlerKind::UrlConf)
};

fn title<'a>(ctx: &'a ViewContext<'_>) -> Result<&'a str, HandleError> {
    match ctx.route.kind() {
        RouteKind::Section { title } => Ok(title),
        _ => Err(HandleError::View(format!(
            "section views cannot serve {}",
            ctx.route
        ))),
    }
}

pub fn section_index(ctx: &ViewContext<'_>) -> HandlerResult {
    let title = escape_html(title(ctx)?);
    Ok(Html(format!("<h1>{title}</h1>")).into_response())
}

pub fn section_entry(ctx: &ViewContext<'_>) -> HandlerResult {
    let title = escape_html(title(ctx)?);
    let slug = ctx
        .params
        .get("slug")
        .ok_or_else(|| HandleError::View("section-entry needs a slug".into()))?;
    Ok(Html(format!("<h1>{title}</h1><h2>{}</h2>", escape_html(slug))).into_response())
}
