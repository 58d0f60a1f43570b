// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::{error, warn};

use crate::domain::models::streaming_result::elapsed_seconds;
use crate::utils::errors::ScrapeError;

/// 应用错误类型
///
/// 所有失败路径最终都转换为 JSON：
/// `{ success: false, error, episode_url?, extraction_time_seconds, details? }`
#[derive(Debug)]
pub struct AppError {
    error: ScrapeError,
    episode_url: Option<String>,
    extraction_time_seconds: f64,
    /// 非生产环境附带完整的错误链
    expose_details: bool,
}

impl AppError {
    pub fn new(error: ScrapeError, started: Instant) -> Self {
        Self {
            error,
            episode_url: None,
            extraction_time_seconds: elapsed_seconds(started.elapsed()),
            expose_details: false,
        }
    }

    pub fn with_episode_url(mut self, episode_url: impl Into<String>) -> Self {
        self.episode_url = Some(episode_url.into());
        self
    }

    pub fn with_details(mut self, expose_details: bool) -> Self {
        self.expose_details = expose_details;
        self
    }

    pub fn error(&self) -> &ScrapeError {
        &self.error
    }

    /// 请求体无法解析
    pub fn from_json_rejection(rejection: JsonRejection, started: Instant) -> Self {
        Self::new(ScrapeError::InvalidInput(rejection.body_text()), started)
    }

    /// 查询参数无法解析
    pub fn from_query_rejection(rejection: QueryRejection, started: Instant) -> Self {
        Self::new(ScrapeError::InvalidInput(rejection.body_text()), started)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_message = self.error.to_string();

        if status.is_server_error() {
            error!(kind = self.error.kind(), "Scrape failed: {}", error_message);
        } else {
            warn!(kind = self.error.kind(), "Request rejected: {}", error_message);
        }

        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(error_message));
        if let Some(episode_url) = self.episode_url {
            body.insert("episode_url".to_string(), Value::String(episode_url));
        }
        body.insert(
            "extraction_time_seconds".to_string(),
            json!(self.extraction_time_seconds),
        );
        if self.expose_details {
            body.insert(
                "details".to_string(),
                Value::String(format!("{:?}", self.error)),
            );
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

/// 统一的 JSON 错误响应（没有抓取上下文的情况）
pub fn json_error(status: StatusCode, message: &str, started: Instant) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message,
            "extraction_time_seconds": elapsed_seconds(started.elapsed()),
        })),
    )
        .into_response()
}
