// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;

use crate::engines::request_filter::RequestBlockPolicy;
use crate::utils::errors::ScrapeError;

/// 一个浏览器会话
///
/// 会话独占一个页面。调用方负责在所有路径上调用一次 `close`。
#[async_trait]
pub trait PageSession: Send {
    /// 打开地址，等待 DOM 就绪，超过 `timeout` 返回超时错误
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// 在页面中执行脚本，返回脚本结果（Promise 会被等待）
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, ScrapeError>;

    /// 当前 DOM 的 HTML 快照
    async fn content(&mut self) -> Result<String, ScrapeError>;

    /// 释放页面和浏览器，重复调用无副作用
    async fn close(&mut self) -> Result<(), ScrapeError>;
}

/// 无头浏览器
#[async_trait]
pub trait Renderer: Send + Sync {
    /// 打开新会话，并按 `policy` 拦截请求
    async fn open(&self, policy: &RequestBlockPolicy) -> Result<Box<dyn PageSession>, ScrapeError>;

    /// 渲染器名称
    fn name(&self) -> &'static str;
}
