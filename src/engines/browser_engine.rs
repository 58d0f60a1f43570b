// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use metrics::counter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use url::Url;
use uuid::Uuid;

use crate::config::settings::BrowserSettings;
use crate::domain::models::streaming_result::{DebugInfo, StreamingServer};
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::link_search::{LinkSearch, SearchState};
use crate::engines::document::{
    RenderedDocument, RENDERED_BACKGROUND_ATTR, RENDERED_HEIGHT_ATTR, RENDERED_WIDTH_ATTR,
};
use crate::engines::request_filter::RequestBlockPolicy;
use crate::engines::traits::{PageSession, Renderer};
use crate::utils::errors::ScrapeError;
use crate::utils::retry_policy::RetryPolicy;

/// 等待所有图片加载完成或失败。本身没有超时，由调用方限时
const WAIT_FOR_IMAGES_SCRIPT: &str = r#"
Promise.all(Array.from(document.images).map(img => {
    if (img.complete) {
        return true;
    }
    return new Promise(resolve => {
        img.addEventListener('load', () => resolve(true), { once: true });
        img.addEventListener('error', () => resolve(false), { once: true });
    });
})).then(results => results.length)
"#;

/// 把图片渲染尺寸和计算后的背景图片写到元素属性上，快照后仍可读取
const ANNOTATE_LAYOUT_TEMPLATE: &str = r#"
(() => {
    const images = document.querySelectorAll('img');
    images.forEach(img => {
        img.setAttribute('__WIDTH_ATTR__', String(img.width));
        img.setAttribute('__HEIGHT_ATTR__', String(img.height));
    });
    let backgrounds = 0;
    document.querySelectorAll(__BG_SELECTOR__).forEach(el => {
        const bg = window.getComputedStyle(el).backgroundImage;
        if (bg && bg !== 'none' && bg.includes('url(')) {
            el.setAttribute('__BG_ATTR__', bg);
            backgrounds++;
        }
    });
    return { images: images.length, backgrounds };
})()
"#;

/// 点击第一个文本包含关键字的按钮类元素，返回是否点击
const CLICK_TEMPLATE: &str = r#"
(() => {
    const keywords = __KEYWORDS__;
    for (const el of document.querySelectorAll(__SELECTOR__)) {
        const text = (el.textContent || '').toLowerCase();
        if (keywords.some(k => text.includes(k))) {
            try {
                el.click();
                return true;
            } catch (e) {
            }
        }
    }
    return false;
})()
"#;

fn annotate_layout_script(background_selector: &str) -> String {
    ANNOTATE_LAYOUT_TEMPLATE
        .replace("__WIDTH_ATTR__", RENDERED_WIDTH_ATTR)
        .replace("__HEIGHT_ATTR__", RENDERED_HEIGHT_ATTR)
        .replace("__BG_ATTR__", RENDERED_BACKGROUND_ATTR)
        .replace(
            "__BG_SELECTOR__",
            &serde_json::Value::from(background_selector).to_string(),
        )
}

fn click_script(selector: &str, keywords: &[String]) -> String {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    CLICK_TEMPLATE
        .replace("__KEYWORDS__", &serde_json::Value::from(keywords).to_string())
        .replace("__SELECTOR__", &serde_json::Value::from(selector).to_string())
}

/// 渲染抓取的结果
#[derive(Debug, Clone)]
pub struct RenderedCapture {
    pub image: Option<String>,
    /// 找到的链接，为空表示尝试次数用尽
    pub servers: Vec<StreamingServer>,
    /// 实际查询次数
    pub attempts: u32,
    /// 未找到时的诊断信息
    pub debug: Option<DebugInfo>,
}

/// 浏览器引擎
///
/// 每次抓取独占一个会话：导航、等待、提取图片、带交互的链接查找，
/// 无论结果如何都会关闭会话且只关闭一次
pub struct BrowserEngine {
    renderer: Arc<dyn Renderer>,
    policy: RequestBlockPolicy,
    retry: RetryPolicy,
    navigation_timeout: Duration,
    settle_delay: Duration,
    image_timeout: Duration,
}

impl BrowserEngine {
    pub fn new(renderer: Arc<dyn Renderer>, settings: &BrowserSettings) -> Self {
        Self {
            renderer,
            policy: RequestBlockPolicy::default(),
            retry: settings.retry_policy(),
            navigation_timeout: settings.navigation_timeout(),
            settle_delay: settings.settle_delay(),
            image_timeout: settings.image_timeout(),
        }
    }

    /// 渲染并提取
    pub async fn scrape(
        &self,
        url: &str,
        extractor: &ExtractionService,
    ) -> Result<RenderedCapture, ScrapeError> {
        let page_url = Url::parse(url)
            .map_err(|e| ScrapeError::InvalidInput(format!("Invalid episode URL {}: {}", url, e)))?;

        let mut guard = SessionGuard::new(self.renderer.open(&self.policy).await?);
        debug!(renderer = self.renderer.name(), "Browser session opened");

        let result = match guard.session() {
            Ok(session) => self.drive(session, url, &page_url, extractor).await,
            Err(e) => Err(e),
        };

        guard.close().await;
        result
    }

    async fn drive(
        &self,
        session: &mut dyn PageSession,
        url: &str,
        page_url: &Url,
        extractor: &ExtractionService,
    ) -> Result<RenderedCapture, ScrapeError> {
        info!("Loading episode: {}", url);
        session.goto(url, self.navigation_timeout).await?;

        tokio::time::sleep(self.settle_delay).await;
        self.wait_for_images(session).await;

        let profile = extractor.profile();
        if let Err(e) = session
            .evaluate(&annotate_layout_script(&profile.background_selector))
            .await
        {
            warn!("Failed to annotate layout, size checks are skipped: {}", e);
        }

        let snapshot = session.content().await?;
        let image = image_from_snapshot(extractor, &snapshot);
        match &image {
            Some(image) => debug!("Found poster image: {}", image),
            None => debug!("No poster image found"),
        }

        let mut search = LinkSearch::new(self.retry.max_attempts);
        let mut pending = Some(snapshot);
        let mut last_snapshot = String::new();
        let mut attempts = 0;

        while !search.is_finished() {
            match search.state() {
                SearchState::Searching { attempt } => {
                    attempts = *attempt;
                    let html = match pending.take() {
                        Some(html) => html,
                        None => session.content().await?,
                    };
                    let servers = servers_from_snapshot(extractor, &html, page_url);
                    debug!(
                        attempt = attempts,
                        max_attempts = search.max_attempts(),
                        found = servers.len(),
                        "Searching for embed link"
                    );
                    last_snapshot = html;
                    search.record(servers);
                }
                SearchState::Interact { attempt } => {
                    let delay = self.retry.calculate_backoff(*attempt);
                    self.interact(session, extractor).await;
                    tokio::time::sleep(delay).await;
                    search.interacted();
                }
                SearchState::Done { .. } | SearchState::Exhausted { .. } => break,
            }
        }

        let servers = search.into_servers().unwrap_or_default();
        let debug = if servers.is_empty() {
            warn!(
                "No valid streaming link found after {} attempts: {}",
                attempts, url
            );
            Some(debug_from_snapshot(extractor, &last_snapshot))
        } else {
            info!("Found {} streaming link(s) on attempt {}", servers.len(), attempts);
            None
        };

        Ok(RenderedCapture {
            image,
            servers,
            attempts,
            debug,
        })
    }

    async fn wait_for_images(&self, session: &mut dyn PageSession) {
        match tokio::time::timeout(self.image_timeout, session.evaluate(WAIT_FOR_IMAGES_SCRIPT))
            .await
        {
            Ok(Ok(count)) => debug!("Images settled: {}", count),
            Ok(Err(e)) => warn!("Image wait failed: {}", e),
            Err(_) => debug!(
                "Image wait timed out after {}ms, continuing",
                self.image_timeout.as_millis()
            ),
        }
    }

    async fn interact(&self, session: &mut dyn PageSession, extractor: &ExtractionService) {
        let profile = extractor.profile();
        let script = click_script(&profile.interaction_selector, &profile.interaction_keywords);
        match session.evaluate(&script).await {
            Ok(serde_json::Value::Bool(true)) => debug!("Clicked a play/load control"),
            Ok(_) => debug!("No play/load control to click"),
            Err(e) => warn!("Interaction failed: {}", e),
        }
    }
}

/// 持有会话直到关闭
///
/// 正常路径调用 `close`；请求被取消时 future 被丢弃，由 `Drop` 在后台关闭会话
struct SessionGuard {
    session: Option<Box<dyn PageSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn PageSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn session(&mut self) -> Result<&mut (dyn PageSession + 'static), ScrapeError> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(ScrapeError::Browser("Browser session already closed".to_string())),
        }
    }

    async fn close(mut self) {
        if let Some(mut session) = self.session.take() {
            close_session(session.as_mut()).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Scrape cancelled, closing browser session in background");
                handle.spawn(async move {
                    close_session(session.as_mut()).await;
                });
            }
            Err(_) => warn!("No runtime available to close an abandoned browser session"),
        }
    }
}

async fn close_session(session: &mut dyn PageSession) {
    if let Err(e) = session.close().await {
        warn!("Failed to close browser session: {}", e);
    }
    counter!("browser_sessions_closed_total").increment(1);
}

// Parsed documents never live across an await point
fn image_from_snapshot(extractor: &ExtractionService, html: &str) -> Option<String> {
    extractor.find_image(&RenderedDocument::parse(html))
}

fn servers_from_snapshot(
    extractor: &ExtractionService,
    html: &str,
    page_url: &Url,
) -> Vec<StreamingServer> {
    extractor.find_streaming_servers(&RenderedDocument::parse(html), page_url)
}

fn debug_from_snapshot(extractor: &ExtractionService, html: &str) -> DebugInfo {
    extractor.debug_info(&RenderedDocument::parse(html))
}

/// 基于 chromiumoxide 的渲染器
///
/// 配置了远程调试地址时连接到已有的 Chrome，否则每个会话启动一个独立的浏览器进程
pub struct ChromiumRenderer {
    settings: BrowserSettings,
}

impl ChromiumRenderer {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    async fn start_browser(
        &self,
    ) -> Result<(Browser, chromiumoxide::Handler, bool, Option<PathBuf>), ScrapeError> {
        if let Some(url) = &self.settings.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            let (browser, handler) = Browser::connect(url).await.map_err(|e| {
                ScrapeError::Browser(format!("Failed to connect to remote Chrome: {}", e))
            })?;
            return Ok((browser, handler, false, None));
        }

        // Separate profile directory per session so concurrent launches do not collide
        let profile_dir = std::env::temp_dir().join(format!("anime-scraper-{}", Uuid::new_v4()));
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(&profile_dir)
            .request_timeout(self.settings.navigation_timeout())
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = &self.settings.executable_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScrapeError::Browser)?;
        let (browser, handler) = Browser::launch(config).await?;
        Ok((browser, handler, true, Some(profile_dir)))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self, policy: &RequestBlockPolicy) -> Result<Box<dyn PageSession>, ScrapeError> {
        let (browser, mut handler, owned, profile_dir) = self.start_browser().await?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Browser handler error: {}", e);
                }
            }
        });

        let mut session = ChromiumSession {
            browser,
            page: None,
            handler_task,
            intercept_task: None,
            owned,
            profile_dir,
            closed: false,
        };

        if let Err(e) = session.prepare(&self.settings.user_agent, policy).await {
            if let Err(close_err) = session.close().await {
                warn!("Failed to close browser after setup error: {}", close_err);
            }
            return Err(e);
        }

        Ok(Box::new(session))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// chromiumoxide 会话：一个浏览器加一个页面
struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    intercept_task: Option<JoinHandle<()>>,
    /// 本地启动的浏览器需要关闭进程，远程连接只关闭页面
    owned: bool,
    profile_dir: Option<PathBuf>,
    closed: bool,
}

impl ChromiumSession {
    async fn prepare(
        &mut self,
        user_agent: &str,
        policy: &RequestBlockPolicy,
    ) -> Result<(), ScrapeError> {
        let page = self.browser.new_page("about:blank").await?;
        self.page = Some(page.clone());

        page.set_user_agent(user_agent).await?;

        let mut paused = page.event_listener::<EventRequestPaused>().await?;
        let interceptor = page.clone();
        let policy = policy.clone();
        self.intercept_task = Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let resource_type = event.resource_type.as_ref();
                let outcome = if policy.should_block(resource_type, &event.request.url) {
                    trace!("Blocking {} request: {}", resource_type, event.request.url);
                    interceptor
                        .execute(FailRequestParams::new(
                            event.request_id.clone(),
                            ErrorReason::BlockedByClient,
                        ))
                        .await
                        .map(|_| ())
                } else {
                    interceptor
                        .execute(ContinueRequestParams::new(event.request_id.clone()))
                        .await
                        .map(|_| ())
                };
                if let Err(e) = outcome {
                    trace!("Request interception failed: {}", e);
                }
            }
        }));

        page.execute(EnableParams::default()).await?;
        Ok(())
    }

    fn page(&self) -> Result<&Page, ScrapeError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::Browser("Page is not open".to_string()))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Some(task) = self.intercept_task.take() {
            task.abort();
        }
        self.handler_task.abort();
        if let Some(dir) = self.profile_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                debug!("Failed to remove browser profile {}: {}", dir.display(), e);
            }
        }
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(ScrapeError::Timeout(format!(
                "Navigation to {} exceeded {}s",
                url,
                timeout.as_secs()
            ))),
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, ScrapeError> {
        let result = self
            .page()?
            .evaluate_expression(EvaluateParams::new(script))
            .await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        Ok(self.page()?.content().await?)
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(task) = self.intercept_task.take() {
            task.abort();
        }

        let mut first_error: Option<ScrapeError> = None;
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                first_error = Some(e.into());
            }
        }

        if self.owned {
            if let Err(e) = self.browser.close().await {
                first_error = first_error.or(Some(e.into()));
            }
            if let Err(e) = self.browser.wait().await {
                first_error = first_error.or(Some(ScrapeError::Browser(e.to_string())));
            }
        }
        self.handler_task.abort();

        if let Some(dir) = self.profile_dir.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                debug!("Failed to remove browser profile {}: {}", dir.display(), e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
