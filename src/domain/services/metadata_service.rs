// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engines::document::{Document, Element};

pub const UNKNOWN_EPISODE: &str = "Unknown";
pub const UNKNOWN_TITLE: &str = "Unknown Anime";

static EPISODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)episode[/-]?(\d+)",
        r"(?i)ep[/-]?(\d+)",
        r"/(\d+)/?$",
        r"-(\d+)/?$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid episode pattern"))
    .collect()
});

static EMBEDDED_EPISODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:episode|ep\.?)\s*\d+\b").expect("valid embedded episode regex")
});
static TRAILING_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-:|–]+$").expect("valid separator regex"));
static INNER_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// 元数据服务
///
/// 从剧集地址或页面标题推导番剧名和集数
pub struct MetadataService;

impl MetadataService {
    /// 集数：按顺序尝试各个模式，第一个匹配的生效
    pub fn episode_number(episode_url: &str) -> String {
        EPISODE_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(episode_url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_EPISODE.to_string())
    }

    /// 番剧名：地址中 `anime` 段之后的那一段，连字符换成空格并首字母大写
    pub fn title_from_url(episode_url: &str) -> String {
        let parts: Vec<&str> = episode_url.split('/').collect();
        parts
            .iter()
            .position(|part| *part == "anime")
            .and_then(|idx| parts.get(idx + 1))
            .filter(|segment| !segment.is_empty())
            .map(|segment| title_case(&segment.replace('-', " ")))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }

    /// 从页面标题类元素读取番剧名，去掉其中的 "Episode N"
    pub fn title_from_document<D: Document>(doc: &D, selectors: &[String]) -> Option<String> {
        selectors.iter().find_map(|selector| {
            let element = doc.select_first(selector)?;
            let cleaned = clean_heading(&element.text());
            (!cleaned.is_empty()).then_some(cleaned)
        })
    }
}

fn clean_heading(raw: &str) -> String {
    let collapsed = INNER_WHITESPACE.replace_all(raw.trim(), " ");
    let without_episode = match EMBEDDED_EPISODE.find(&collapsed) {
        Some(m) => collapsed[..m.start()].to_string(),
        None => collapsed.to_string(),
    };
    TRAILING_SEPARATORS
        .replace(without_episode.trim(), "")
        .trim()
        .to_string()
}

/// 每个单词的第一个字符大写
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;
    for c in s.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}
