//! Redirects: Routes that point browsers at another url.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::handlers::{HandleError, HandlerKind, HandlerResult, ViewContext};
use crate::kinds::{RouteKind, RouteType};

pub static REDIRECT: RouteType = RouteType {
    view: Some(redirect_view),
    ..RouteType::new("redirect", "Redirect", HandlerKind::View)
};

/// 301 for permanent redirects, 302 otherwise.
pub fn redirect_view(ctx: &ViewContext<'_>) -> HandlerResult {
    let RouteKind::Redirect { target, permanent } = ctx.route.kind() else {
        return Err(HandleError::View(format!(
            "redirect_view cannot serve {}",
            ctx.route
        )));
    };
    let location = HeaderValue::from_str(target)
        .map_err(|_| HandleError::View(format!("invalid redirect target {target:?}")))?;
    let status = if *permanent {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::FOUND
    };
    Ok((status, [(header::LOCATION, location)]).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Request;
    use crate::routing::Route;
    use axum::body::Body;
    use std::collections::HashMap;

    fn call(route: &Route) -> HandlerResult {
        let request = Request::new(Body::empty());
        redirect_view(&ViewContext {
            request: &request,
            route,
            args: Vec::new(),
            params: HashMap::new(),
        })
    }

    #[test]
    fn test_temporary_and_permanent() {
        let route = Route::new(
            "/old/",
            RouteKind::Redirect {
                target: "/new/".into(),
                permanent: false,
            },
        );
        let response = call(&route).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/new/");

        let route = Route::new(
            "/old/",
            RouteKind::Redirect {
                target: "https://example.com/".into(),
                permanent: true,
            },
        );
        assert_eq!(call(&route).unwrap().status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[test]
    fn test_wrong_kind() {
        let route = Route::new("/", RouteKind::Plain);
        assert!(matches!(call(&route), Err(HandleError::View(_))));
    }
}
