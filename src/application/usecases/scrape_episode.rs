// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use metrics::{counter, histogram};
use tracing::{info, info_span, Instrument};
use url::Url;
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::domain::models::extraction_target::ExtractionTarget;
use crate::domain::models::streaming_result::{
    elapsed_seconds, DebugInfo, NotFoundReport, ScrapeOutcome, StreamingResult, StreamingServer,
};
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::metadata_service::MetadataService;
use crate::engines::browser_engine::BrowserEngine;
use crate::engines::document::StaticDocument;
use crate::engines::fetch_engine::FetchEngine;
use crate::engines::traits::Renderer;
use crate::utils::errors::ScrapeError;

const RANGE_ID: &str = "single-episode";
const RENDERED_NOT_FOUND: &str = "No valid streaming iframe found after multiple attempts";
const STATIC_NOT_FOUND: &str = "No valid streaming iframe found in static page";

/// 页面获取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStrategy {
    /// 无头浏览器渲染，带交互重试
    Rendered,
    /// 单次 GET，静态解析
    Static,
}

impl AcquisitionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionStrategy::Rendered => "rendered",
            AcquisitionStrategy::Static => "static",
        }
    }
}

/// 静态页面的提取结果
struct StaticExtraction {
    image: Option<String>,
    servers: Vec<StreamingServer>,
    title: Option<String>,
    debug: Option<DebugInfo>,
}

// === Section: Use Case Definition ===

/// 剧集抓取用例
///
/// 解析目标地址、获取页面、提取图片和链接、推导元数据并组装结果
pub struct ScrapeEpisodeUseCase {
    extractor: ExtractionService,
    fetch_engine: FetchEngine,
    browser_engine: BrowserEngine,
    base_url: String,
    source: String,
}

// === Section: Implementation ===

impl ScrapeEpisodeUseCase {
    pub fn new(settings: &Settings, renderer: Arc<dyn Renderer>) -> anyhow::Result<Self> {
        let site_origin = Url::parse(&settings.site.base_url)
            .with_context(|| format!("Invalid site.base_url: {}", settings.site.base_url))?;

        Ok(Self {
            extractor: ExtractionService::new(settings.extraction.clone(), site_origin),
            fetch_engine: FetchEngine::new(&settings.fetch),
            browser_engine: BrowserEngine::new(renderer, &settings.browser),
            base_url: settings.site.base_url.clone(),
            source: settings.site.source.clone(),
        })
    }

    /// 解析为剧集页面地址
    pub fn resolve(&self, target: &ExtractionTarget) -> Result<String, ScrapeError> {
        target.resolve(&self.base_url)
    }

    /// 执行抓取
    ///
    /// 未找到链接是正常结果（`ScrapeOutcome::NotFound`），只有传输和意外错误返回 `Err`
    pub async fn execute(
        &self,
        target: &ExtractionTarget,
        episode_url: &str,
        strategy: AcquisitionStrategy,
        started: Instant,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let span = info_span!(
            "scrape",
            request_id = %Uuid::new_v4(),
            strategy = strategy.as_str(),
            episode_url = %episode_url,
        );

        let result = async {
            match strategy {
                AcquisitionStrategy::Rendered => self.scrape_rendered(episode_url, started).await,
                AcquisitionStrategy::Static => {
                    self.scrape_static(target, episode_url, started).await
                }
            }
        }
        .instrument(span)
        .await;

        record_metrics(strategy, started, &result);
        result
    }

    async fn scrape_rendered(
        &self,
        episode_url: &str,
        started: Instant,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let capture = self.browser_engine.scrape(episode_url, &self.extractor).await?;

        if capture.servers.is_empty() {
            info!(attempts = capture.attempts, "Rendered page has no valid streaming link");
            return Ok(ScrapeOutcome::NotFound(NotFoundReport {
                episode_url: episode_url.to_string(),
                error: RENDERED_NOT_FOUND.to_string(),
                debug: capture.debug,
            }));
        }

        let title = MetadataService::title_from_url(episode_url);
        Ok(self.found(
            title,
            episode_url,
            capture.servers,
            capture.image,
            AcquisitionStrategy::Rendered,
            started,
        ))
    }

    async fn scrape_static(
        &self,
        target: &ExtractionTarget,
        episode_url: &str,
        started: Instant,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let page = self.fetch_engine.fetch(episode_url).await?;

        // Non-2xx pages are never parsed
        if !page.is_success() {
            info!("Episode page returned HTTP {}", page.status);
            return Ok(ScrapeOutcome::NotFound(NotFoundReport {
                episode_url: episode_url.to_string(),
                error: format!("Episode page returned HTTP {}", page.status),
                debug: Some(DebugInfo::for_status(page.status)),
            }));
        }

        let page_url = Url::parse(&page.final_url)
            .or_else(|_| Url::parse(episode_url))
            .map_err(|e| {
                ScrapeError::InvalidInput(format!("Invalid episode URL {}: {}", episode_url, e))
            })?;
        let extracted = self.extract_static(&page.body, &page_url);

        if extracted.servers.is_empty() {
            info!("No valid streaming link in static page");
            let mut debug = extracted.debug.unwrap_or_default();
            debug.http_status = Some(page.status);
            return Ok(ScrapeOutcome::NotFound(NotFoundReport {
                episode_url: episode_url.to_string(),
                error: STATIC_NOT_FOUND.to_string(),
                debug: Some(debug),
            }));
        }

        let title = extracted
            .title
            .or_else(|| target.anime_name().map(str::to_string))
            .unwrap_or_else(|| MetadataService::title_from_url(episode_url));

        Ok(self.found(
            title,
            episode_url,
            extracted.servers,
            extracted.image,
            AcquisitionStrategy::Static,
            started,
        ))
    }

    fn extract_static(&self, body: &str, page_url: &Url) -> StaticExtraction {
        let doc = StaticDocument::parse(body);
        let servers = self.extractor.find_streaming_servers(&doc, page_url);
        let debug = servers.is_empty().then(|| self.extractor.debug_info(&doc));
        StaticExtraction {
            image: self.extractor.find_image(&doc),
            title: MetadataService::title_from_document(
                &doc,
                &self.extractor.profile().title_selectors,
            ),
            servers,
            debug,
        }
    }

    fn found(
        &self,
        title: String,
        episode_url: &str,
        servers: Vec<StreamingServer>,
        image: Option<String>,
        strategy: AcquisitionStrategy,
        started: Instant,
    ) -> ScrapeOutcome {
        let streaming_link = servers
            .first()
            .map(|server| server.url.clone())
            .unwrap_or_default();
        info!(
            servers = servers.len(),
            has_image = image.is_some(),
            "Found streaming link: {}",
            streaming_link
        );

        ScrapeOutcome::Found(Box::new(StreamingResult {
            title,
            episode_number: MetadataService::episode_number(episode_url),
            episode_url: episode_url.to_string(),
            streaming_link,
            streaming_servers: servers,
            image,
            range_id: RANGE_ID.to_string(),
            strategy: strategy.as_str().to_string(),
            source: self.source.clone(),
            extraction_time_seconds: elapsed_seconds(started.elapsed()),
            timestamp: Utc::now(),
        }))
    }
}

fn record_metrics(
    strategy: AcquisitionStrategy,
    started: Instant,
    result: &Result<ScrapeOutcome, ScrapeError>,
) {
    let outcome = match result {
        Ok(ScrapeOutcome::Found(_)) => "found",
        Ok(ScrapeOutcome::NotFound(_)) => "not_found",
        Err(e) => e.kind(),
    };
    counter!(
        "scrape_requests_total",
        "strategy" => strategy.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("scrape_duration_seconds", "strategy" => strategy.as_str())
        .record(started.elapsed().as_secs_f64());
}
