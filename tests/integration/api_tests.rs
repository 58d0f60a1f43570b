// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    body_json, create_test_app, empty_request, json_request, test_settings, ScriptedRenderer,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::util::ServiceExt;

const SITE: &str = "https://w1.123animes.ru";

fn app() -> axum::Router {
    create_test_app(test_settings(SITE), ScriptedRenderer::default())
}

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作，并且带有跨域响应头
#[tokio::test]
async fn health_check_works() {
    let response = app().oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let response = app().oneshot(empty_request("GET", "/version")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn options_preflight_returns_cors_headers() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/scrape-episode")
        .header("origin", "https://player.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
    assert!(headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase()
        .contains("content-type"));
    assert_eq!(headers["content-type"], "application/json");

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "CORS preflight OK");
}

#[tokio::test]
async fn bare_options_request_gets_json_body() {
    let response = app()
        .oneshot(empty_request("OPTIONS", "/scrape-simple"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn unsupported_method_returns_json_405() {
    let response = app()
        .oneshot(empty_request("PUT", "/scrape-episode"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Method not allowed");
    assert!(body["extraction_time_seconds"].is_number());
}

#[tokio::test]
async fn missing_episode_url_returns_400() {
    let response = app()
        .oneshot(json_request("POST", "/scrape-episode", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "episodeUrl is required in request body");
    assert!(body["extraction_time_seconds"].is_number());
}

#[tokio::test]
async fn malformed_json_returns_json_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/scrape-by-name")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_http_episode_url_is_rejected() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/scrape-episode",
            json!({ "episodeUrl": "ftp://w1.123animes.ru/anime/naruto/episode-5" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn by_name_requires_both_fields() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/scrape-by-name",
            json!({ "animeName": "Naruto" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "animeName and episodeNumber are required in request body"
    );
}

#[tokio::test]
async fn simple_scrape_requires_a_target() {
    let response = app()
        .oneshot(empty_request("GET", "/scrape-simple"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "episodeUrl parameter required");
}

#[tokio::test]
async fn test_endpoint_echoes_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/test?foo=bar")
        .header("content-type", "application/json")
        .header("user-agent", "integration-test")
        .body(Body::from(r#"{"hello":"world"}"#))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["headers"]["user-agent"], "integration-test");
    assert_eq!(body["headers"]["content-type"], "application/json");
    assert_eq!(body["query"]["foo"], "bar");
    assert_eq!(body["body"]["hello"], "world");
    assert_eq!(body["environment"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_endpoint_without_body() {
    let response = app().oneshot(empty_request("GET", "/test")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["method"], "GET");
    assert!(body["body"].is_null());
    assert_eq!(body["headers"]["user-agent"], "unknown");
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let response = app()
        .oneshot(empty_request("GET", "/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
    assert!(body["extraction_time_seconds"].is_number());
}

#[tokio::test]
async fn metrics_disabled_returns_503() {
    let response = app().oneshot(empty_request("GET", "/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["extraction_time_seconds"].is_number());
}
