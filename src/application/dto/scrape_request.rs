// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::extraction_target::ExtractionTarget;
use crate::utils::errors::ScrapeError;

/// 按剧集地址抓取
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeEpisodeRequestDto {
    /// 剧集页面地址
    pub episode_url: Option<String>,
}

impl ScrapeEpisodeRequestDto {
    pub fn into_target(self) -> Result<ExtractionTarget, ScrapeError> {
        non_empty(self.episode_url).map(ExtractionTarget::Url).ok_or_else(|| {
            ScrapeError::InvalidInput("episodeUrl is required in request body".to_string())
        })
    }
}

/// 集数，客户端可能传数字或字符串
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EpisodeNumber {
    Number(u64),
    Text(String),
}

impl EpisodeNumber {
    fn into_string(self) -> String {
        match self {
            EpisodeNumber::Number(n) => n.to_string(),
            EpisodeNumber::Text(s) => s.trim().to_string(),
        }
    }
}

/// 按番剧名和集数抓取
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeByNameRequestDto {
    pub anime_name: Option<String>,
    pub episode_number: Option<EpisodeNumber>,
}

impl ScrapeByNameRequestDto {
    pub fn into_target(self) -> Result<ExtractionTarget, ScrapeError> {
        by_name(self.anime_name, self.episode_number).ok_or_else(|| {
            ScrapeError::InvalidInput(
                "animeName and episodeNumber are required in request body".to_string(),
            )
        })
    }
}

/// 静态抓取：查询参数或请求体，地址优先，其次番剧名加集数
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSimpleRequestDto {
    pub episode_url: Option<String>,
    pub anime_name: Option<String>,
    pub episode_number: Option<EpisodeNumber>,
}

impl ScrapeSimpleRequestDto {
    pub fn into_target(self) -> Result<ExtractionTarget, ScrapeError> {
        if let Some(url) = non_empty(self.episode_url) {
            return Ok(ExtractionTarget::Url(url));
        }
        by_name(self.anime_name, self.episode_number).ok_or_else(|| {
            ScrapeError::InvalidInput("episodeUrl parameter required".to_string())
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn by_name(
    anime_name: Option<String>,
    episode_number: Option<EpisodeNumber>,
) -> Option<ExtractionTarget> {
    let anime_name = non_empty(anime_name)?;
    let episode_number = episode_number
        .map(EpisodeNumber::into_string)
        .filter(|n| !n.is_empty())?;
    Some(ExtractionTarget::ByName {
        anime_name,
        episode_number,
    })
}
