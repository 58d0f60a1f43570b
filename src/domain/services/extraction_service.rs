// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};
use url::Url;

use crate::domain::models::extraction_profile::ExtractionProfile;
use crate::domain::models::streaming_result::{DebugInfo, IframeSample, StreamingServer};
use crate::engines::document::{Document, DocumentKind, Element};
use crate::utils::url_utils::{absolutize, clean_host};

static CSS_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("valid css url regex"));

const DEBUG_SRC_MAX_CHARS: usize = 100;

/// 提取服务
///
/// 从文档中找出海报图片和嵌入播放链接。规则全部来自 `ExtractionProfile`，
/// 静态文档和渲染文档使用同一套逻辑。
#[derive(Debug, Clone)]
pub struct ExtractionService {
    profile: ExtractionProfile,
    site_origin: Url,
}

impl ExtractionService {
    pub fn new(profile: ExtractionProfile, site_origin: Url) -> Self {
        Self {
            profile,
            site_origin,
        }
    }

    pub fn profile(&self) -> &ExtractionProfile {
        &self.profile
    }

    // ---- image ----

    /// 查找海报图片
    ///
    /// 依次尝试：已知选择器、全部图片扫描、背景图片（仅渲染文档）、data 属性。
    /// 找不到时返回 `None`，图片是可选信息。
    pub fn find_image<D: Document>(&self, doc: &D) -> Option<String> {
        if let Some(image) = self.image_from_selectors(doc) {
            debug!(strategy = "selectors", "Found poster image: {}", image);
            return Some(image);
        }
        if let Some(image) = self.image_from_all_images(doc) {
            debug!(strategy = "image_scan", "Found poster image: {}", image);
            return Some(image);
        }
        if doc.kind() == DocumentKind::Rendered {
            if let Some(image) = self.image_from_backgrounds(doc) {
                debug!(strategy = "background", "Found poster image: {}", image);
                return Some(image);
            }
        }
        if let Some(image) = self.image_from_data_attributes(doc) {
            debug!(strategy = "data_attributes", "Found poster image: {}", image);
            return Some(image);
        }
        debug!("No poster image found with any strategy");
        None
    }

    /// 兜底扫描使用的图片地址校验
    ///
    /// 绝对地址、长度足够、不含任何占位/logo/图标/横幅/广告特征
    pub fn is_valid_image(&self, src: &str) -> bool {
        self.passes_placeholder_rules(src)
            && !self
                .profile
                .image_deny_patterns
                .iter()
                .any(|p| src.contains(p.as_str()))
    }

    fn passes_placeholder_rules(&self, src: &str) -> bool {
        src.starts_with("http")
            && src != "about:blank"
            && src.chars().count() > self.profile.min_image_url_length
            && !self
                .profile
                .placeholder_patterns
                .iter()
                .any(|p| src.contains(p.as_str()))
    }

    fn looks_like_image(&self, src: &str) -> bool {
        self.profile
            .image_markers
            .iter()
            .any(|m| src.contains(m.as_str()))
    }

    fn image_source<E: Element>(&self, element: &E) -> Option<String> {
        self.profile
            .image_source_attributes
            .iter()
            .filter_map(|attr| element.attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(|v| absolutize(&self.site_origin, v))
    }

    fn image_from_selectors<D: Document>(&self, doc: &D) -> Option<String> {
        for selector in &self.profile.image_selectors {
            let Some(element) = doc.select_first(selector) else {
                continue;
            };
            let Some(src) = self.image_source(&element) else {
                continue;
            };
            if self.passes_placeholder_rules(&src) {
                return Some(src);
            }
            trace!("Filtered placeholder image {} from {}", src, selector);
        }
        None
    }

    fn image_from_all_images<D: Document>(&self, doc: &D) -> Option<String> {
        let min = self.profile.min_image_dimension;
        doc.select("img").into_iter().find_map(|img| {
            let src = self.image_source(&img)?;
            if !self.looks_like_image(&src) || !self.is_valid_image(&src) {
                return None;
            }
            // Only rendered documents know the laid-out size
            if let Some((width, height)) = img.dimensions() {
                if width <= min || height <= min {
                    trace!("Image {} too small ({}x{})", src, width, height);
                    return None;
                }
            }
            Some(src)
        })
    }

    fn image_from_backgrounds<D: Document>(&self, doc: &D) -> Option<String> {
        doc.select(&self.profile.background_selector)
            .into_iter()
            .filter_map(|el| el.background_image())
            .filter_map(|style| {
                CSS_URL
                    .captures(&style)
                    .and_then(|c| c.get(1))
                    .map(|m| absolutize(&self.site_origin, m.as_str()))
            })
            .find(|src| self.is_valid_image(src))
    }

    fn image_from_data_attributes<D: Document>(&self, doc: &D) -> Option<String> {
        let selector = self
            .profile
            .data_image_attributes
            .iter()
            .map(|attr| format!("[{}]", attr))
            .collect::<Vec<_>>()
            .join(", ");
        if selector.is_empty() {
            return None;
        }

        for element in doc.select(&selector) {
            for attr in &self.profile.data_image_attributes {
                let Some(value) = element.attr(attr) else {
                    continue;
                };
                let has_extension = self
                    .profile
                    .data_image_extensions
                    .iter()
                    .any(|ext| value.contains(ext.as_str()));
                if !has_extension {
                    continue;
                }
                let src = absolutize(&self.site_origin, value);
                if self.is_valid_image(&src) {
                    return Some(src);
                }
            }
        }
        None
    }

    // ---- streaming links ----

    /// 嵌入链接校验
    ///
    /// 非空、不是 `about:blank`、以 `http` 开头、长度达标、不命中黑名单，
    /// 且至少命中一个白名单片段。黑名单先于白名单检查。
    pub fn is_valid_streaming_link(&self, src: &str) -> bool {
        if src.is_empty()
            || src == "about:blank"
            || !src.starts_with("http")
            || src.chars().count() < self.profile.min_link_length
        {
            return false;
        }

        let lowered = src.to_lowercase();
        if self
            .profile
            .link_deny_patterns
            .iter()
            .any(|p| lowered.contains(&p.to_lowercase()))
        {
            return false;
        }

        self.profile
            .link_allow_patterns
            .iter()
            .any(|p| lowered.contains(&p.to_lowercase()))
    }

    fn iframe_source<E: Element>(&self, element: &E, page_url: &Url) -> Option<String> {
        self.profile
            .iframe_source_attributes
            .iter()
            .filter_map(|attr| element.attr(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(|v| absolutize(page_url, v))
    }

    /// iframe 中的所有有效链接，优先选择器在前，按出现顺序去重
    fn iframe_links<D: Document>(&self, doc: &D, page_url: &Url) -> Vec<String> {
        let mut links = Vec::new();

        for selector in &self.profile.iframe_priority_selectors {
            if let Some(iframe) = doc.select_first(selector) {
                if let Some(src) = self.iframe_source(&iframe, page_url) {
                    if self.is_valid_streaming_link(&src) {
                        debug!("Found valid iframe with priority selector: {}", selector);
                        links.push(src);
                    }
                }
            }
        }

        let iframes = doc.select("iframe");
        trace!("Scanning {} iframes", iframes.len());
        for iframe in iframes {
            let Some(src) = self.iframe_source(&iframe, page_url) else {
                continue;
            };
            if self.is_valid_streaming_link(&src) {
                links.push(src);
            } else {
                trace!("Rejected iframe source: {}", truncate(&src, 60));
            }
        }

        dedup_preserving_order(links)
    }

    /// 首选嵌入链接（只看 iframe）
    pub fn find_streaming_link<D: Document>(&self, doc: &D, page_url: &Url) -> Option<String> {
        self.iframe_links(doc, page_url).into_iter().next()
    }

    /// 页面上所有有效链接
    ///
    /// iframe 链接在前，然后是按钮、锚点上的 `data-url`/`data-src`/`href`。
    /// 没有任何 iframe 链接时返回空列表，页面视为未找到。
    pub fn find_streaming_servers<D: Document>(
        &self,
        doc: &D,
        page_url: &Url,
    ) -> Vec<StreamingServer> {
        let mut links = self.iframe_links(doc, page_url);
        if links.is_empty() {
            return Vec::new();
        }

        for element in doc.select(&self.profile.link_candidate_selector) {
            for attr in &self.profile.link_candidate_attributes {
                if let Some(value) = element.attr(attr) {
                    let src = absolutize(page_url, value);
                    if self.is_valid_streaming_link(&src) {
                        links.push(src);
                    }
                }
            }
        }

        dedup_preserving_order(links)
            .into_iter()
            .map(|url| StreamingServer {
                name: self.server_name(&url),
                url,
            })
            .collect()
    }

    /// 根据主机名得到服务器名称，表中没有时退回去掉 `www.` 的主机名
    pub fn server_name(&self, url: &str) -> String {
        let Some(host) = clean_host(url) else {
            return "Unknown".to_string();
        };
        let lowered = host.to_lowercase();
        self.profile
            .provider_names
            .iter()
            .find(|p| lowered.contains(&p.pattern.to_lowercase()))
            .map(|p| p.name.clone())
            .unwrap_or(host)
    }

    // ---- diagnostics ----

    /// 构造诊断信息
    pub fn debug_info<D: Document>(&self, doc: &D) -> DebugInfo {
        let iframes = doc.select("iframe");
        let iframe_sources = iframes
            .iter()
            .filter_map(|iframe| {
                let src = ["src", "data-src", "data-lazy"]
                    .iter()
                    .filter_map(|attr| iframe.attr(attr))
                    .find(|v| !v.is_empty())?;
                Some(IframeSample {
                    src: truncate(src, DEBUG_SRC_MAX_CHARS),
                    id: non_empty_or(iframe.attr("id"), "no-id"),
                    class: non_empty_or(iframe.attr("class"), "no-class"),
                })
            })
            .collect();

        DebugInfo {
            total_iframes: iframes.len(),
            iframe_sources,
            page_title: doc.title().unwrap_or_default(),
            has_play_buttons: doc.select(&self.profile.play_button_selector).len(),
            http_status: None,
        }
    }
}

fn dedup_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
