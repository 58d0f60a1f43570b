// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 服务器名称映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderName {
    /// 主机名中需要包含的片段
    pub pattern: String,
    /// 展示名称
    pub name: String,
}

/// 提取规则集
///
/// 选择器、黑白名单和服务器名称表都放在这里，由配置注入提取引擎。
/// 目标站点的标记和广告域名变化频繁，部署时可以只覆盖其中一部分字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionProfile {
    /// 可能包含海报的选择器，按顺序尝试
    pub image_selectors: Vec<String>,
    /// 读取图片地址的属性，懒加载属性优先
    pub image_source_attributes: Vec<String>,
    /// 占位图片特征
    pub placeholder_patterns: Vec<String>,
    /// 兜底扫描时额外排除的特征（logo、图标、横幅、广告）
    pub image_deny_patterns: Vec<String>,
    /// 看起来像海报的地址特征
    pub image_markers: Vec<String>,
    /// 兜底扫描时要求的最小渲染尺寸（像素，严格大于）
    pub min_image_dimension: f64,
    /// 图片地址最小长度（严格大于）
    pub min_image_url_length: usize,
    /// 检查背景图片的元素
    pub background_selector: String,
    /// 携带图片地址的 data 属性
    pub data_image_attributes: Vec<String>,
    /// data 属性图片需要包含的扩展名
    pub data_image_extensions: Vec<String>,

    /// 优先检查的 iframe 选择器
    pub iframe_priority_selectors: Vec<String>,
    /// 读取 iframe 地址的属性
    pub iframe_source_attributes: Vec<String>,
    /// 嵌入链接黑名单（先于白名单检查）
    pub link_deny_patterns: Vec<String>,
    /// 嵌入链接白名单
    pub link_allow_patterns: Vec<String>,
    /// 嵌入链接最小长度
    pub min_link_length: usize,
    /// 额外收集链接的元素（按钮、锚点）
    pub link_candidate_selector: String,
    /// 从按钮、锚点读取链接的属性
    pub link_candidate_attributes: Vec<String>,
    /// 服务器名称表
    pub provider_names: Vec<ProviderName>,

    /// 可点击触发播放器加载的元素
    pub interaction_selector: String,
    /// 按钮文字关键词
    pub interaction_keywords: Vec<String>,
    /// 诊断信息中统计的播放按钮
    pub play_button_selector: String,

    /// 静态页面中读取标题的选择器
    pub title_selectors: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractionProfile {
    fn default() -> Self {
        Self {
            image_selectors: strings(&[
                ".anime-poster img",
                ".poster img",
                ".anime-image img",
                ".anime-cover img",
                ".show-poster img",
                ".thumbnail img",
                ".anime-info img",
                ".series-poster img",
                ".film-poster img",
                ".movie-poster img",
                "img[alt*=\"poster\"]",
                "img[alt*=\"cover\"]",
                "img[class*=\"poster\"]",
                "img[class*=\"cover\"]",
                "img[src*=\"poster\"]",
                "img[src*=\"cover\"]",
                ".anime-details img",
                ".anime-meta img",
                ".series-info img",
                ".inner img",
                ".item img",
            ]),
            image_source_attributes: strings(&["data-src", "data-original", "data-lazy", "src"]),
            placeholder_patterns: strings(&[
                "no_poster",
                "placeholder",
                "default.jpg",
                "no-image",
                "loading.",
                "lazy.",
            ]),
            image_deny_patterns: strings(&["logo", "icon", "banner", "ad"]),
            image_markers: strings(&["/poster/", ".jpg", ".png", ".jpeg"]),
            min_image_dimension: 80.0,
            min_image_url_length: 10,
            background_selector: "div, span, a, section".to_string(),
            data_image_attributes: strings(&["data-image", "data-poster", "data-thumb"]),
            data_image_extensions: strings(&[".jpg", ".png", ".jpeg"]),

            iframe_priority_selectors: strings(&[
                "#iframe_ext82377 iframe",
                "iframe[src*=\"bunnycdn\"]",
                "iframe[src*=\"embed\"]",
                "iframe[src*=\"play\"]",
                "iframe[src*=\"stream\"]",
                "iframe[src*=\"video\"]",
                "iframe[src*=\"player\"]",
                "iframe[src*=\"vid\"]",
            ]),
            iframe_source_attributes: strings(&["src", "data-src", "data-lazy", "data-original"]),
            link_deny_patterns: strings(&[
                "dtscout.com",
                "google.com",
                "googletagmanager.com",
                "doubleclick.net",
                "googlesyndication.com",
                "googleadservices.com",
                "adsystem.com",
                "recaptcha",
                "facebook.com",
                "twitter.com",
                "instagram.com",
                "tiktok.com",
                "ads",
                "ad-",
                "analytics",
                "tracking",
                "metric",
                "about:blank",
            ]),
            link_allow_patterns: strings(&[
                "bunnycdn",
                "embed",
                "play",
                "stream",
                "video",
                "player",
                "vidsrc",
                "vidplay",
                "filemoon",
                "doodstream",
                "streamtape",
                "mp4upload",
                "mixdrop",
                "upstream",
                "streamwish",
                "vid",
                "watch",
            ]),
            min_link_length: 25,
            link_candidate_selector: "a, button".to_string(),
            link_candidate_attributes: strings(&["data-url", "data-src", "href"]),
            provider_names: [
                ("streamtape", "StreamTape"),
                ("doodstream", "DoodStream"),
                ("dood", "DoodStream"),
                ("filemoon", "Filemoon"),
                ("mp4upload", "Mp4Upload"),
                ("mixdrop", "MixDrop"),
                ("streamwish", "StreamWish"),
                ("upstream", "UpStream"),
                ("vidsrc", "VidSrc"),
                ("vidplay", "VidPlay"),
                ("bunnycdn", "BunnyCDN"),
                ("b-cdn", "BunnyCDN"),
            ]
            .iter()
            .map(|(pattern, name)| ProviderName {
                pattern: pattern.to_string(),
                name: name.to_string(),
            })
            .collect(),

            interaction_selector: "button, .play-btn, .load-btn, [onclick], .btn".to_string(),
            interaction_keywords: strings(&["play", "load", "watch"]),
            play_button_selector: "button, .play-btn, .load-btn".to_string(),

            title_selectors: strings(&[
                ".anime-title",
                ".film-name",
                "h1.title",
                "h2.title",
                ".anime-info h1",
                "h1",
                "title",
            ]),
        }
    }
}
