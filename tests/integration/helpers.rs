// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anime_scraper::application::usecases::scrape_episode::ScrapeEpisodeUseCase;
use anime_scraper::config::settings::Settings;
use anime_scraper::engines::request_filter::RequestBlockPolicy;
use anime_scraper::engines::traits::{PageSession, Renderer};
use anime_scraper::presentation::routes;
use anime_scraper::utils::errors::ScrapeError;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 会话调用计数
#[derive(Debug, Default)]
pub struct SessionCounters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub clicks: AtomicUsize,
    pub snapshots: AtomicUsize,
}

impl SessionCounters {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn snapshots(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

/// 按脚本返回 DOM 快照的渲染器，不启动真实浏览器
#[derive(Clone, Default)]
pub struct ScriptedRenderer {
    /// 依次返回的快照，用完后重复最后一个
    pub snapshots: Vec<String>,
    pub fail_navigation: bool,
    pub counters: Arc<SessionCounters>,
}

impl ScriptedRenderer {
    pub fn with_snapshots(snapshots: &[&str]) -> Self {
        Self {
            snapshots: snapshots.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open(&self, _policy: &RequestBlockPolicy) -> Result<Box<dyn PageSession>, ScrapeError> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            snapshots: self.snapshots.clone(),
            fail_navigation: self.fail_navigation,
            counters: self.counters.clone(),
            next: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedSession {
    snapshots: Vec<String>,
    fail_navigation: bool,
    counters: Arc<SessionCounters>,
    next: usize,
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        if self.fail_navigation {
            return Err(ScrapeError::Timeout(format!("Navigation to {} exceeded 15s", url)));
        }
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, ScrapeError> {
        if script.contains("const keywords") {
            self.counters.clicks.fetch_add(1, Ordering::SeqCst);
            return Ok(Value::Bool(true));
        }
        Ok(Value::Null)
    }

    async fn content(&mut self) -> Result<String, ScrapeError> {
        self.counters.snapshots.fetch_add(1, Ordering::SeqCst);
        let index = self.next.min(self.snapshots.len().saturating_sub(1));
        self.next += 1;
        Ok(self.snapshots.get(index).cloned().unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), ScrapeError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 默认配置，站点根地址可替换为模拟服务器
pub fn test_settings(base_url: &str) -> Settings {
    let mut settings = Settings::with_defaults().expect("default settings");
    settings.site.base_url = base_url.to_string();
    settings.fetch.timeout_secs = 5;
    settings
}

pub fn create_test_app(settings: Settings, renderer: ScriptedRenderer) -> Router {
    let use_case = ScrapeEpisodeUseCase::new(&settings, Arc::new(renderer))
        .expect("use case should build");
    routes::app(Arc::new(use_case), Arc::new(settings), None)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub const EPISODE_PAGE: &str = r#"
<html>
    <head><title>Naruto Episode 5 - 123animes</title></head>
    <body>
        <h1 class="anime-title">Naruto Episode 5</h1>
        <div class="anime-poster"><img src="/imgs/poster/naruto.jpg"></div>
        <div id="iframe_ext82377"><iframe src="https://streamtape.com/e/abc123xyz"></iframe></div>
        <ul class="servers">
            <li><a href="https://filemoon.sx/e/q1w2e3r4t5">Filemoon</a></li>
        </ul>
    </body>
</html>
"#;

pub const EMPTY_PLAYER_PAGE: &str = r#"
<html>
    <head><title>Naruto Episode 5</title></head>
    <body>
        <button class="play-btn">Play</button>
        <iframe id="gtm" src="https://googletagmanager.com/ns.html"></iframe>
    </body>
</html>
"#;
