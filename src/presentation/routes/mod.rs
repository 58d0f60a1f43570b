// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::usecases::scrape_episode::ScrapeEpisodeUseCase;
use crate::config::settings::Settings;
use crate::presentation::errors::json_error;
use crate::presentation::handlers::{metrics_handler, scrape_handler, test_handler};
use crate::presentation::middleware::cors_middleware::{cors_layer, preflight_body};
use axum::{
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check).fallback(method_not_allowed))
        .route("/version", get(version).fallback(method_not_allowed))
        .route(
            "/metrics",
            get(metrics_handler::metrics).fallback(method_not_allowed),
        )
        .route(
            "/test",
            get(test_handler::echo)
                .post(test_handler::echo)
                .fallback(method_not_allowed),
        )
        .route(
            "/scrape-episode",
            post(scrape_handler::scrape_episode)
                .get(scrape_handler::scrape_simple_query)
                .fallback(method_not_allowed),
        )
        .route(
            "/scrape-by-name",
            post(scrape_handler::scrape_by_name).fallback(method_not_allowed),
        )
        .route(
            "/scrape-simple",
            get(scrape_handler::scrape_simple_query)
                .post(scrape_handler::scrape_simple_body)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
}

/// 组装完整的应用：路由、CORS、请求日志和共享依赖
pub fn app(
    use_case: Arc<ScrapeEpisodeUseCase>,
    settings: Arc<Settings>,
    metrics: Option<PrometheusHandle>,
) -> Router {
    routes()
        .layer(cors_layer())
        .layer(axum::middleware::from_fn(preflight_body))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(use_case))
        .layer(Extension(settings))
        .layer(Extension(metrics))
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回 `{"success":true,"status":"OK"}`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "success": true, "status": "OK" }))
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> Json<Value> {
    Json(json!({ "success": true, "version": env!("CARGO_PKG_VERSION") }))
}

async fn method_not_allowed() -> Response {
    json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        Instant::now(),
    )
}

async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found", Instant::now())
}
