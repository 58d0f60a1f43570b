// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::redirect::Policy;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::settings::FetchSettings;
use crate::utils::errors::ScrapeError;

/// 静态抓取得到的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP状态码
    pub status: u16,
    /// 响应体
    pub body: String,
    /// 跟随重定向后的最终地址
    pub final_url: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 抓取引擎
///
/// 基于reqwest的单次 GET，不执行脚本。4xx 作为普通结果返回给调用方，
/// 5xx 视为上游错误
#[derive(Debug, Clone)]
pub struct FetchEngine {
    user_agent: String,
    timeout: Duration,
    max_redirects: usize,
}

impl FetchEngine {
    pub fn new(settings: &FetchSettings) -> Self {
        Self {
            user_agent: settings.user_agent.clone(),
            timeout: settings.timeout(),
            max_redirects: settings.max_redirects,
        }
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers
    }

    /// 执行HTTP抓取
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 2xx 到 4xx 的响应
    /// * `Err(ScrapeError)` - 传输错误或 5xx
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        // Each request gets a fresh client for cookie isolation
        let client = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .default_headers(Self::default_headers())
            .timeout(self.timeout)
            .redirect(Policy::limited(self.max_redirects))
            .cookie_store(true)
            .build()?;

        let start = Instant::now();
        debug!("Fetching {}", url);
        let response = client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        if response.status().is_server_error() {
            warn!("Upstream returned HTTP {} for {}", status, url);
            return Err(ScrapeError::UpstreamServerError(status));
        }

        let body = response.text().await?;
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            status,
            bytes = body.len(),
            response_time_ms,
            "Fetched {}",
            final_url
        );

        Ok(FetchedPage {
            status,
            body,
            final_url,
            response_time_ms,
        })
    }
}
