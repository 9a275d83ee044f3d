//! Pages: Routes rendered through a template.

use crate::handlers::HandlerKind;
use crate::kinds::RouteType;

pub const TEMPLATE_NAME: &str = "page.html";

pub static PAGE: RouteType = RouteType {
    template_name: Some(TEMPLATE_NAME),
    ..RouteType::new("page", "Page", HandlerKind::Template)
};
