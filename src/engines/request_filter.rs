// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 渲染页面时的请求拦截策略
///
/// 字体、音视频、websocket、manifest 以及广告/统计/社交域名的请求直接拒绝，
/// 其余请求放行。
#[derive(Debug, Clone)]
pub struct RequestBlockPolicy {
    /// 拒绝的资源类型（小写）
    pub blocked_resource_types: Vec<String>,
    /// 地址中包含任一片段即拒绝
    pub blocked_url_patterns: Vec<String>,
}

impl Default for RequestBlockPolicy {
    fn default() -> Self {
        Self {
            blocked_resource_types: ["font", "media", "websocket", "manifest"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            blocked_url_patterns: [
                "google-analytics",
                "googletagmanager",
                "doubleclick",
                "adsystem",
                "googlesyndication",
                "facebook.com",
                "twitter.com",
                "dtscout.com",
                "ads",
                ".mp4",
                ".mp3",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RequestBlockPolicy {
    /// 判断请求是否应被拒绝
    pub fn should_block(&self, resource_type: &str, url: &str) -> bool {
        let resource_type = resource_type.to_lowercase();
        if self
            .blocked_resource_types
            .iter()
            .any(|t| *t == resource_type)
        {
            return true;
        }
        self.blocked_url_patterns
            .iter()
            .any(|p| url.contains(p.as_str()))
    }
}
