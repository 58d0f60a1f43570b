// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    body_json, create_test_app, json_request, test_settings, ScriptedRenderer, EMPTY_PLAYER_PAGE,
    EPISODE_PAGE,
};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::util::ServiceExt;

const SITE: &str = "https://w1.123animes.ru";
const EPISODE_URL: &str = "https://w1.123animes.ru/anime/naruto/episode-5";

fn episode_request() -> axum::http::Request<axum::body::Body> {
    json_request(
        "POST",
        "/scrape-episode",
        json!({ "episodeUrl": EPISODE_URL }),
    )
}

/// 首次快照即可找到链接，不需要点击
#[tokio::test(start_paused = true)]
async fn rendered_scrape_finds_link_on_first_snapshot() {
    let renderer = ScriptedRenderer::with_snapshots(&[EPISODE_PAGE]);
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(SITE), renderer);

    let response = app.oneshot(episode_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["strategy"], "rendered");
    assert_eq!(data["title"], "Naruto");
    assert_eq!(data["episode_number"], "5");
    assert_eq!(data["streaming_link"], "https://streamtape.com/e/abc123xyz");
    assert_eq!(data["image"], "https://w1.123animes.ru/imgs/poster/naruto.jpg");
    assert_eq!(data["streaming_servers"].as_array().unwrap().len(), 2);

    assert_eq!(counters.clicks(), 0);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn rendered_scrape_finds_link_after_interaction() {
    let renderer = ScriptedRenderer::with_snapshots(&[EMPTY_PLAYER_PAGE, EPISODE_PAGE]);
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(SITE), renderer);

    let response = app.oneshot(episode_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["streaming_link"], "https://streamtape.com/e/abc123xyz");
    // The poster is read from the first snapshot only
    assert!(body["data"]["image"].is_null());

    assert_eq!(counters.clicks(), 1);
    assert_eq!(counters.snapshots(), 2);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn rendered_scrape_gives_up_after_max_attempts() {
    let renderer = ScriptedRenderer::with_snapshots(&[EMPTY_PLAYER_PAGE]);
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(SITE), renderer);

    let response = app.oneshot(episode_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "No valid streaming iframe found after multiple attempts"
    );
    assert_eq!(body["episode_url"], EPISODE_URL);
    assert_eq!(body["debug"]["totalIframes"], 1);
    assert_eq!(body["debug"]["hasPlayButtons"], 1);
    assert_eq!(body["debug"]["pageTitle"], "Naruto Episode 5");
    assert!(body["debug"].get("httpStatus").is_none());

    // four searches, an interaction between each pair
    assert_eq!(counters.snapshots(), 4);
    assert_eq!(counters.clicks(), 3);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_still_closes_session() {
    let renderer = ScriptedRenderer {
        fail_navigation: true,
        ..ScriptedRenderer::with_snapshots(&[EPISODE_PAGE])
    };
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(SITE), renderer);

    let response = app.oneshot(episode_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["episode_url"], EPISODE_URL);
    assert!(body["error"].as_str().unwrap().starts_with("Timeout"));

    assert_eq!(counters.snapshots(), 0);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn rendered_scrape_by_name_builds_episode_url() {
    let renderer = ScriptedRenderer::with_snapshots(&[EPISODE_PAGE]);
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(SITE), renderer);

    let response = app
        .oneshot(json_request(
            "POST",
            "/scrape-by-name",
            json!({ "animeName": "Naruto", "episodeNumber": "5" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["episode_url"], EPISODE_URL);
    assert_eq!(body["data"]["strategy"], "rendered");
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_request_still_closes_session() {
    let renderer = ScriptedRenderer::with_snapshots(&[EPISODE_PAGE]);
    let counters = renderer.counters.clone();
    let app = create_test_app(test_settings(SITE), renderer);

    // The settle delay is 3s, so the request is dropped while the page settles
    let outcome = tokio::time::timeout(Duration::from_secs(1), app.oneshot(episode_request())).await;
    assert!(outcome.is_err());
    assert_eq!(counters.opens.load(Ordering::SeqCst), 1);

    // let the background close run
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(counters.snapshots(), 0);
    assert_eq!(counters.closes(), 1);
}
