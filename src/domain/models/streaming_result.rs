// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 可播放的嵌入链接及其服务器名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingServer {
    /// 服务器展示名称
    pub name: String,
    /// 嵌入地址
    pub url: String,
}

/// 抓取结果
///
/// 每次成功抓取构造一次，直接序列化到响应中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingResult {
    pub title: String,
    pub episode_number: String,
    pub episode_url: String,
    /// 首选嵌入链接
    pub streaming_link: String,
    /// 页面上所有有效链接（去重）
    pub streaming_servers: Vec<StreamingServer>,
    /// 海报图片，可能不存在
    pub image: Option<String>,
    pub range_id: String,
    /// 获取方式：`rendered` 或 `static`
    pub strategy: String,
    pub source: String,
    pub extraction_time_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// iframe 采样
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IframeSample {
    pub src: String,
    pub id: String,
    pub class: String,
}

/// 诊断信息
///
/// 只在抓取失败时构造，用于人工排查
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub total_iframes: usize,
    pub iframe_sources: Vec<IframeSample>,
    pub page_title: String,
    pub has_play_buttons: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl DebugInfo {
    /// 页面未被解析时（非 2xx 状态）只携带状态码
    pub fn for_status(status: u16) -> Self {
        Self {
            http_status: Some(status),
            ..Self::default()
        }
    }
}

/// 抓取结果：找到链接或正常的"未找到"
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    Found(Box<StreamingResult>),
    NotFound(NotFoundReport),
}

/// 未找到链接时的报告
#[derive(Debug, Clone)]
pub struct NotFoundReport {
    pub episode_url: String,
    pub error: String,
    pub debug: Option<DebugInfo>,
}

/// 以秒为单位、保留三位小数的耗时
pub fn elapsed_seconds(elapsed: std::time::Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}
