// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::models::extraction_profile::ExtractionProfile;
use crate::utils::retry_policy::RetryPolicy;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、目标站点、浏览器、静态抓取和提取规则等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 运行环境，`production` 时错误响应不包含详细信息
    pub environment: String,
    /// 日志配置
    pub log: LogSettings,
    /// 目标站点
    pub site: SiteSettings,
    /// 无头浏览器配置
    pub browser: BrowserSettings,
    /// 静态抓取配置
    pub fetch: FetchSettings,
    /// 提取规则，未配置的字段使用内置默认值
    #[serde(default)]
    pub extraction: ExtractionProfile,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `pretty` 或 `json`
    pub format: String,
}

/// 目标站点
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    /// 站点根地址，按名称抓取时用于拼接剧集地址，也用于补全相对图片地址
    pub base_url: String,
    /// 结果中的 `source` 字段
    pub source: String,
}

/// 无头浏览器配置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 页面导航超时（秒）
    pub navigation_timeout_secs: u64,
    /// 导航完成后的固定等待（毫秒）
    pub settle_delay_ms: u64,
    /// 等待图片加载的上限（毫秒）
    pub image_timeout_ms: u64,
    /// 链接查找的最大尝试次数
    pub max_attempts: u32,
    /// 退避基础时间（毫秒）
    pub backoff_base_ms: u64,
    /// 每次尝试增加的退避时间（毫秒）
    pub backoff_step_ms: u64,
    pub user_agent: String,
    /// 远程 Chrome 调试地址，设置后不再启动本地浏览器
    pub remote_debugging_url: Option<String>,
    /// 本地 Chrome 可执行文件路径
    pub executable_path: Option<String>,
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.backoff_base_ms),
            Duration::from_millis(self.backoff_step_ms),
        )
    }
}

/// 静态抓取配置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 最多跟随的重定向次数
    pub max_redirects: usize,
    pub user_agent: String,
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 指标配置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
    /// `ANIME_SCRAPER__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("ANIME_SCRAPER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 只使用内置默认值
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("environment", "development")?
            .set_default("log.format", "pretty")?
            // Target site
            .set_default("site.base_url", "https://w1.123animes.ru")?
            .set_default("site.source", "123animes")?
            // Headless browser
            .set_default("browser.navigation_timeout_secs", 15)?
            .set_default("browser.settle_delay_ms", 3000)?
            .set_default("browser.image_timeout_ms", 3000)?
            .set_default("browser.max_attempts", 4)?
            .set_default("browser.backoff_base_ms", 3000)?
            .set_default("browser.backoff_step_ms", 1000)?
            .set_default("browser.user_agent", DEFAULT_USER_AGENT)?
            // Static fetch
            .set_default("fetch.timeout_secs", 25)?
            .set_default("fetch.max_redirects", 5)?
            .set_default("fetch.user_agent", DEFAULT_USER_AGENT)?
            .set_default("metrics.enabled", true)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
