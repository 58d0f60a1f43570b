// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 抓取错误类型
///
/// 只有传输层失败和意外异常才会成为错误；
/// "未找到链接"属于正常的返回值，见 `ScrapeOutcome`。
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// 请求参数缺失或格式错误
    #[error("{0}")]
    InvalidInput(String),

    /// 导航或请求超时
    #[error("Timeout: {0}")]
    Timeout(String),

    /// DNS 或连接失败
    #[error("Connection failed: {0}")]
    Connection(String),

    /// 目标站点返回 5xx
    #[error("Upstream server error: HTTP {0}")]
    UpstreamServerError(u16),

    /// 无头浏览器协议错误
    #[error("Browser error: {0}")]
    Browser(String),

    /// 其他错误
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ScrapeError {
    /// 错误对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ScrapeError::InvalidInput(_) => 400,
            ScrapeError::Timeout(_) => 408,
            ScrapeError::Connection(_) => 503,
            ScrapeError::UpstreamServerError(_) => 500,
            ScrapeError::Browser(_) => 500,
            ScrapeError::Unexpected(_) => 500,
        }
    }

    /// 指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::InvalidInput(_) => "invalid_input",
            ScrapeError::Timeout(_) => "timeout",
            ScrapeError::Connection(_) => "connection",
            ScrapeError::UpstreamServerError(_) => "upstream",
            ScrapeError::Browser(_) => "browser",
            ScrapeError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout(err.to_string())
        } else if err.is_connect() {
            ScrapeError::Connection(err.to_string())
        } else if let Some(status) = err.status().filter(|s| s.is_server_error()) {
            ScrapeError::UpstreamServerError(status.as_u16())
        } else {
            ScrapeError::Unexpected(err.into())
        }
    }
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScrapeError::Browser(err.to_string())
    }
}
