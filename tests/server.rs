//! A live server on a real socket.

use reqwest::redirect::Policy;
use reqwest::StatusCode;

use route_tree::RouteKind;

mod common;

#[tokio::test]
async fn test_serves_and_shuts_down() {
    let routes = common::routes();
    routes.create("/", common::page("home")).unwrap();
    routes.create("/blog/", RouteKind::Section { title: "Blog".into() }).unwrap();
    routes
        .create(
            "/go/",
            RouteKind::Redirect {
                target: "https://example.com/".into(),
                permanent: false,
            },
        )
        .unwrap();

    let server = common::start_server(routes).await;
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    let home = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.headers().contains_key("x-request-id"));
    assert!(home.text().await.unwrap().contains("home"));

    let entry = client.get(server.url("/blog/hello/")).send().await.unwrap();
    assert_eq!(entry.text().await.unwrap(), "<h1>Blog</h1><h2>hello</h2>");

    let go = client.get(server.url("/go/")).send().await.unwrap();
    assert_eq!(go.status(), StatusCode::FOUND);
    assert_eq!(go.headers()["location"], "https://example.com/");

    let missing = client.get(server.url("/nothing/here/")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}
