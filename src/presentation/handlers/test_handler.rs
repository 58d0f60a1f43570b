// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query},
    http::{header, HeaderMap, Method},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;

fn header_or_unknown(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// 路由自检：回显请求的方法、部分请求头、查询参数和请求体
pub async fn echo(
    method: Method,
    headers: HeaderMap,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Bytes,
) -> Json<Value> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    Json(json!({
        "success": true,
        "message": "API endpoint is working correctly!",
        "timestamp": Utc::now().to_rfc3339(),
        "method": method.as_str(),
        "headers": {
            "user-agent": header_or_unknown(&headers, header::USER_AGENT),
            "content-type": header_or_unknown(&headers, header::CONTENT_TYPE),
        },
        "query": query,
        "body": body,
        "environment": {
            "version": env!("CARGO_PKG_VERSION"),
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    }))
}
