// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;

use crate::domain::models::streaming_result::{DebugInfo, NotFoundReport, StreamingResult};

/// 抓取成功响应
#[derive(Debug, Serialize)]
pub struct ScrapeSuccessResponseDto {
    pub success: bool,
    pub data: StreamingResult,
    pub extraction_time_seconds: f64,
}

impl ScrapeSuccessResponseDto {
    pub fn new(data: StreamingResult) -> Self {
        Self {
            success: true,
            extraction_time_seconds: data.extraction_time_seconds,
            data,
        }
    }
}

/// 未找到链接的响应
#[derive(Debug, Serialize)]
pub struct ScrapeNotFoundResponseDto {
    pub success: bool,
    pub error: String,
    pub episode_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
    pub extraction_time_seconds: f64,
}

impl ScrapeNotFoundResponseDto {
    pub fn new(report: NotFoundReport, extraction_time_seconds: f64) -> Self {
        Self {
            success: false,
            error: report.error,
            episode_url: report.episode_url,
            debug: report.debug,
            extraction_time_seconds,
        }
    }
}
