// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

/// 跨域配置：允许任意来源
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// 预检响应体
///
/// `CorsLayer` 直接以空响应体应答 OPTIONS，这里保留它的响应头，
/// 把响应体换成 JSON。必须放在 `CorsLayer` 外层。
pub async fn preflight_body(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let response = next.run(request).await;
    if !is_preflight {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    let body = json!({ "success": true, "message": "CORS preflight OK" }).to_string();
    Response::from_parts(parts, Body::from(body))
}
