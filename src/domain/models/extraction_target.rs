// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ScrapeError;
use crate::utils::url_utils::slugify;

/// 抓取目标
///
/// 直接给出的剧集页面地址，或需要按站点模板拼接的（番剧名，集数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionTarget {
    Url(String),
    ByName {
        anime_name: String,
        episode_number: String,
    },
}

impl ExtractionTarget {
    /// 解析为规范的剧集页面地址
    ///
    /// 不做存在性检查，不存在的剧集由抓取阶段发现
    pub fn resolve(&self, base_url: &str) -> Result<String, ScrapeError> {
        match self {
            ExtractionTarget::Url(url) => {
                let url = url.trim();
                if !url.starts_with("http") {
                    return Err(ScrapeError::InvalidInput(format!(
                        "episodeUrl must be an absolute http(s) URL, got: {}",
                        url
                    )));
                }
                Ok(url.to_string())
            }
            ExtractionTarget::ByName {
                anime_name,
                episode_number,
            } => {
                let slug = slugify(anime_name);
                if slug.is_empty() {
                    return Err(ScrapeError::InvalidInput(
                        "animeName must contain at least one letter or digit".to_string(),
                    ));
                }
                let number = episode_number.trim();
                if number.is_empty() {
                    return Err(ScrapeError::InvalidInput(
                        "episodeNumber is required".to_string(),
                    ));
                }
                Ok(format!(
                    "{}/anime/{}/episode-{}",
                    base_url.trim_end_matches('/'),
                    slug,
                    number
                ))
            }
        }
    }

    /// 调用方提供的番剧名称（仅按名称抓取时存在）
    pub fn anime_name(&self) -> Option<&str> {
        match self {
            ExtractionTarget::Url(_) => None,
            ExtractionTarget::ByName { anime_name, .. } => Some(anime_name.as_str()),
        }
    }
}
