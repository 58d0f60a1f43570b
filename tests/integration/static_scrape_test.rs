// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    body_json, create_test_app, empty_request, json_request, test_settings, ScriptedRenderer,
    EPISODE_PAGE,
};
use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EPISODE_PATH: &str = "/anime/naruto/episode-5";

async fn mock_episode(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EPISODE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

/// 静态抓取成功：按名称拼接地址，提取海报、链接和页面标题
#[tokio::test]
async fn static_scrape_by_name_finds_link() {
    let server = mock_episode(200, EPISODE_PAGE).await;
    let renderer = ScriptedRenderer::default();
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(&server.uri()), renderer);

    let response = app
        .oneshot(json_request(
            "POST",
            "/scrape-simple",
            json!({ "animeName": "Naruto", "episodeNumber": 5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["extraction_time_seconds"].is_number());

    let data = &body["data"];
    assert_eq!(data["title"], "Naruto");
    assert_eq!(data["episode_number"], "5");
    assert_eq!(data["episode_url"], format!("{}{}", server.uri(), EPISODE_PATH));
    assert_eq!(data["streaming_link"], "https://streamtape.com/e/abc123xyz");
    assert_eq!(data["streaming_servers"][0]["name"], "StreamTape");
    assert_eq!(data["streaming_servers"][1]["name"], "Filemoon");
    assert!(data["image"]
        .as_str()
        .unwrap()
        .ends_with("/imgs/poster/naruto.jpg"));
    assert_eq!(data["strategy"], "static");
    assert_eq!(data["range_id"], "single-episode");
    assert_eq!(data["source"], "123animes");

    // The static path never touches the browser
    assert_eq!(counters.opens.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn static_scrape_via_query_on_episode_route() {
    let server = mock_episode(200, EPISODE_PAGE).await;
    let app = create_test_app(test_settings(&server.uri()), ScriptedRenderer::default());
    let uri = format!(
        "/scrape-episode?episodeUrl={}{}",
        server.uri(),
        EPISODE_PATH
    );

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["strategy"], "static");
}

#[tokio::test]
async fn page_without_iframes_is_404_with_debug() {
    let server = mock_episode(
        200,
        "<html><head><title>Naruto</title></head><body><p>Coming soon</p></body></html>",
    )
    .await;
    let app = create_test_app(test_settings(&server.uri()), ScriptedRenderer::default());
    let uri = format!("/scrape-simple?episodeUrl={}{}", server.uri(), EPISODE_PATH);

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["debug"]["totalIframes"], 0);
    assert_eq!(body["debug"]["pageTitle"], "Naruto");
    assert_eq!(body["debug"]["httpStatus"], 200);
    assert!(body["extraction_time_seconds"].is_number());
}

#[tokio::test]
async fn client_error_page_is_not_parsed() {
    // The body has a valid embed, but a 403 page is never inspected
    let server = mock_episode(403, EPISODE_PAGE).await;
    let app = create_test_app(test_settings(&server.uri()), ScriptedRenderer::default());
    let uri = format!("/scrape-simple?episodeUrl={}{}", server.uri(), EPISODE_PATH);

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Episode page returned HTTP 403");
    assert_eq!(body["debug"]["httpStatus"], 403);
    assert_eq!(body["debug"]["totalIframes"], 0);
}

#[tokio::test]
async fn upstream_server_error_is_500() {
    let server = mock_episode(503, "maintenance").await;
    let app = create_test_app(test_settings(&server.uri()), ScriptedRenderer::default());
    let episode_url = format!("{}{}", server.uri(), EPISODE_PATH);

    let response = app
        .oneshot(json_request(
            "POST",
            "/scrape-simple",
            json!({ "episodeUrl": episode_url }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Upstream server error: HTTP 503");
    assert_eq!(body["episode_url"], episode_url);
    // development environment includes the debug chain
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn production_hides_error_details() {
    let server = mock_episode(500, "boom").await;
    let mut settings = test_settings(&server.uri());
    settings.environment = "production".to_string();
    let app = create_test_app(settings, ScriptedRenderer::default());
    let uri = format!("/scrape-simple?episodeUrl={}{}", server.uri(), EPISODE_PATH);

    let response = app.oneshot(empty_request("GET", &uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body.get("details").is_none());
}
