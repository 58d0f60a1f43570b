// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// 渲染页面中由浏览器写入的布局属性
pub const RENDERED_WIDTH_ATTR: &str = "data-scrape-width";
pub const RENDERED_HEIGHT_ATTR: &str = "data-scrape-height";
pub const RENDERED_BACKGROUND_ATTR: &str = "data-scrape-bg";

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));

/// 文档来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// 静态 HTML，没有脚本执行和布局信息
    Static,
    /// 无头浏览器渲染后的 DOM 快照
    Rendered,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Static => "static",
            DocumentKind::Rendered => "rendered",
        }
    }
}

/// 文档中的元素
pub trait Element {
    /// 读取属性
    fn attr(&self, name: &str) -> Option<&str>;

    /// 元素文本
    fn text(&self) -> String;

    /// 渲染尺寸（宽，高），静态文档中不存在
    fn dimensions(&self) -> Option<(f64, f64)>;

    /// 计算后的背景图片样式，静态文档中不存在
    fn background_image(&self) -> Option<String>;
}

/// 可查询的只读文档
///
/// 提取引擎只依赖这个接口，与文档是静态解析还是浏览器渲染无关
pub trait Document {
    type Element<'a>: Element
    where
        Self: 'a;

    /// 按 CSS 选择器查询所有匹配元素（文档顺序）
    fn select<'a>(&'a self, selector: &str) -> Vec<Self::Element<'a>>;

    /// 第一个匹配元素
    fn select_first<'a>(&'a self, selector: &str) -> Option<Self::Element<'a>> {
        self.select(selector).into_iter().next()
    }

    /// `<title>` 文本
    fn title(&self) -> Option<String>;

    fn kind(&self) -> DocumentKind;
}

/// 基于 scraper 的元素
pub struct HtmlElement<'a> {
    inner: ElementRef<'a>,
    kind: DocumentKind,
}

impl Element for HtmlElement<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.inner.value().attr(name)
    }

    fn text(&self) -> String {
        self.inner.text().collect::<Vec<_>>().join(" ")
    }

    fn dimensions(&self) -> Option<(f64, f64)> {
        if self.kind != DocumentKind::Rendered {
            return None;
        }
        let width = self.attr(RENDERED_WIDTH_ATTR)?.trim().parse::<f64>().ok()?;
        let height = self.attr(RENDERED_HEIGHT_ATTR)?.trim().parse::<f64>().ok()?;
        Some((width, height))
    }

    fn background_image(&self) -> Option<String> {
        if self.kind != DocumentKind::Rendered {
            return None;
        }
        if let Some(computed) = self.attr(RENDERED_BACKGROUND_ATTR) {
            if computed.contains("url(") {
                return Some(computed.to_string());
            }
        }
        // Inline style is the fallback when the computed style was not captured
        self.attr("style")
            .filter(|style| style.contains("url("))
            .map(|style| style.to_string())
    }
}

fn select_elements<'a>(html: &'a Html, selector: &str, kind: DocumentKind) -> Vec<HtmlElement<'a>> {
    match Selector::parse(selector) {
        Ok(parsed) => html
            .select(&parsed)
            .map(|inner| HtmlElement { inner, kind })
            .collect(),
        Err(e) => {
            warn!("Skipping invalid selector {:?}: {}", selector, e);
            Vec::new()
        }
    }
}

fn document_title(html: &Html) -> Option<String> {
    html.select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
}

/// 静态 HTML 文档
///
/// 由一次普通 GET 的响应体解析而来，属性和文本可查询，没有布局和脚本生成的内容
pub struct StaticDocument {
    html: Html,
}

impl StaticDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }
}

impl Document for StaticDocument {
    type Element<'a> = HtmlElement<'a>;

    fn select<'a>(&'a self, selector: &str) -> Vec<HtmlElement<'a>> {
        select_elements(&self.html, selector, DocumentKind::Static)
    }

    fn title(&self) -> Option<String> {
        document_title(&self.html)
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Static
    }
}

/// 渲染后的 DOM 快照
///
/// 浏览器在快照前把图片渲染尺寸和计算后的背景图片写入 `data-scrape-*` 属性，
/// 因此快照可以像静态文档一样查询，同时保留布局信息
pub struct RenderedDocument {
    html: Html,
}

impl RenderedDocument {
    pub fn parse(snapshot: &str) -> Self {
        Self {
            html: Html::parse_document(snapshot),
        }
    }
}

impl Document for RenderedDocument {
    type Element<'a> = HtmlElement<'a>;

    fn select<'a>(&'a self, selector: &str) -> Vec<HtmlElement<'a>> {
        select_elements(&self.html, selector, DocumentKind::Rendered)
    }

    fn title(&self) -> Option<String> {
        document_title(&self.html)
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Rendered
    }
}
