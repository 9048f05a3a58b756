//! Health, CORS and `HEAD` behaviour shared by all routes.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use zedonk_integration_tests::{TestContext, graphql_order};

#[tokio::test]
async fn test_health_is_ok() {
    let ctx = TestContext::graphql().await;

    let resp = ctx.get("/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_preflight_allows_any_origin() {
    let ctx = TestContext::graphql().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/orders?ids=1001")
        .header("Origin", "https://admin.shopify.com")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let resp = ctx.request(request).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("access-control-allow-origin"), "*");
    assert_eq!(resp.header("access-control-max-age"), "86400");
    let methods = resp.header("access-control-allow-methods");
    assert!(methods.contains("GET"));
    assert!(methods.contains("HEAD"));
}

#[tokio::test]
async fn test_csv_responses_expose_filename_header() {
    let ctx = TestContext::graphql().await;
    ctx.mock_graphql_order(1001, graphql_order("#1001")).await;
    let request = Request::builder()
        .uri("/api/order/1001")
        .header("Origin", "https://admin.shopify.com")
        .body(Body::empty())
        .unwrap();

    let resp = ctx.request(request).await;

    assert_eq!(resp.header("access-control-allow-origin"), "*");
    assert!(
        resp.header("access-control-expose-headers")
            .contains("content-disposition")
    );
}

#[tokio::test]
async fn test_head_returns_headers_without_body() {
    let ctx = TestContext::graphql().await;
    ctx.mock_graphql_order(1001, graphql_order("#1001")).await;

    let resp = ctx.send(Method::HEAD, "/api/order/1001").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), "text/csv; charset=utf-8");
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::graphql().await;

    let resp = ctx.get("/api/unknown").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
