// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use url::{ParseError, Url};

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid slug regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid hyphen regex"));

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 将页面中读到的地址规范化为绝对地址
///
/// 绝对地址原样返回；`//host/...` 和 `/path` 形式按 `base_url` 补全。
/// 其余相对形式不做处理，交由后续校验拒绝。
pub fn absolutize(base_url: &Url, candidate: &str) -> String {
    let candidate = candidate.trim();
    if candidate.starts_with("//") || candidate.starts_with('/') {
        if let Ok(resolved) = resolve_url(base_url, candidate) {
            return resolved.to_string();
        }
    }
    candidate.to_string()
}

/// 生成番剧名称的 slug
///
/// 小写化，去掉非单词/空白/连字符字符，空白折叠为单个连字符，
/// 连续连字符合并，并去掉首尾连字符。结果对自身再次调用保持不变。
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RUN.replace_all(stripped.trim(), "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// 主机名展示形式（去掉 `www.` 前缀）
pub fn clean_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.trim_start_matches("www.").to_string())
}
