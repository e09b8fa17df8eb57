//! HTML URL 规则表
//!
//! 每条规则描述一个可能携带 URL 的位置：元素名、值的来源（属性或文本内容）、
//! 值的种类，以及规则生效的附加条件。
//!
//! | 规则 | 位置 | 值 |
//! |------|------|----|
//! | `a_href` | `<a href>` | URL |
//! | `area_href` | `<area href>` | URL |
//! | `body_background` | `<body background>` | URL |
//! | `embed_src` | `<embed src>` | URL |
//! | `frame_src` | `<frame src>` | URL |
//! | `iframe_src` | `<iframe src>` | URL |
//! | `img_src` | `<img src>` | URL |
//! | `link_href` | `<link href>` | URL |
//! | `meta_content` | `<meta http-equiv=refresh\|location content>` | `N;URL=...` 中的 URL |
//! | `object_data` | `<object data>` | URL |
//! | `script_src` | `<script src>` | URL |
//! | `style_attribute` | 任意元素的 `style` 属性 | 交给 `html-inline-style` 解析器 |
//! | `style_element` | `<style>` 的文本 | 交给 `text/css` 解析器 |
//! | `script_text` | JavaScript `<script>` 的文本 | 交给 `application/x-javascript` 解析器 |

use std::fmt;
use std::sync::OnceLock;

use markup5ever_rcdom::Handle;
use regex::{Captures, Regex};

use super::dom::get_node_attr;

/// 规则读取的值来自哪里
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    Attribute(&'static str),
    Text,
}

/// 规则读取的值是什么
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue {
    /// 整个值就是一个 URL
    Url,
    /// `<meta>` 刷新指令，URL 嵌在 `N;URL=...` 中
    MetaRefresh,
    /// 嵌入的其他格式内容，交给指定媒体类型的解析器处理
    Nested(&'static str),
}

/// 一条 URL 规则
#[derive(Clone, Copy)]
pub struct UrlRule {
    pub name: &'static str,
    /// `None` 表示匹配任意元素
    pub element: Option<&'static str>,
    pub source: RuleSource,
    pub value: RuleValue,
    pub applies: fn(&Handle) -> bool,
}

impl UrlRule {
    /// 规则是否作用于该元素
    pub fn matches(&self, element_name: &str, node: &Handle) -> bool {
        self.element.map_or(true, |element| element == element_name) && (self.applies)(node)
    }
}

impl fmt::Debug for UrlRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlRule")
            .field("name", &self.name)
            .field("element", &self.element)
            .field("source", &self.source)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

const fn attribute(element: &'static str, name: &'static str, attr: &'static str) -> UrlRule {
    UrlRule {
        name,
        element: Some(element),
        source: RuleSource::Attribute(attr),
        value: RuleValue::Url,
        applies: always,
    }
}

/// 所有规则，按应用顺序排列
pub const URL_RULES: &[UrlRule] = &[
    attribute("a", "a_href", "href"),
    attribute("area", "area_href", "href"),
    attribute("body", "body_background", "background"),
    attribute("embed", "embed_src", "src"),
    attribute("frame", "frame_src", "src"),
    attribute("iframe", "iframe_src", "src"),
    attribute("img", "img_src", "src"),
    attribute("link", "link_href", "href"),
    UrlRule {
        name: "meta_content",
        element: Some("meta"),
        source: RuleSource::Attribute("content"),
        value: RuleValue::MetaRefresh,
        applies: is_redirect_meta,
    },
    attribute("object", "object_data", "data"),
    attribute("script", "script_src", "src"),
    UrlRule {
        name: "style_attribute",
        element: None,
        source: RuleSource::Attribute("style"),
        value: RuleValue::Nested("html-inline-style"),
        applies: always,
    },
    UrlRule {
        name: "style_element",
        element: Some("style"),
        source: RuleSource::Text,
        value: RuleValue::Nested("text/css"),
        applies: always,
    },
    UrlRule {
        name: "script_text",
        element: Some("script"),
        source: RuleSource::Text,
        value: RuleValue::Nested("application/x-javascript"),
        applies: is_javascript,
    },
];

const JAVASCRIPT_TYPES: &[&str] = &[
    "application/javascript",
    "application/x-javascript",
    "text/javascript",
    "module",
];

fn always(_node: &Handle) -> bool {
    true
}

/// `http-equiv` 为 `refresh` 或 `location` 的 `<meta>`
pub fn is_redirect_meta(node: &Handle) -> bool {
    get_node_attr(node, "http-equiv").is_some_and(|value| {
        let value = value.trim();
        value.eq_ignore_ascii_case("refresh") || value.eq_ignore_ascii_case("location")
    })
}

/// 内容是 JavaScript 的 `<script>`
///
/// 有 `type` 时按 `type` 判断；没有 `type` 时只有 `language` 不是
/// `javascript` 才排除。
pub fn is_javascript(node: &Handle) -> bool {
    match get_node_attr(node, "type") {
        Some(script_type) => {
            let script_type = script_type.trim();
            script_type.is_empty()
                || JAVASCRIPT_TYPES
                    .iter()
                    .any(|known| script_type.eq_ignore_ascii_case(known))
        }
        None => get_node_attr(node, "language")
            .map_or(true, |language| language.trim().eq_ignore_ascii_case("javascript")),
    }
}

fn meta_refresh_regex() -> &'static Regex {
    static META_REFRESH: OnceLock<Regex> = OnceLock::new();
    META_REFRESH.get_or_init(|| {
        Regex::new(r#"(?i)^(\d+\s*;\s*url\s*=\s*)(?:'([^'"]+)'|"([^'"]+)"|([^'"]+))$"#)
            .expect("meta refresh pattern is valid")
    })
}

/// `<meta>` 刷新指令中 URL 所在的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaRefresh<'a> {
    pub start: usize,
    pub end: usize,
    pub url: &'a str,
}

/// 在 `content` 值里定位刷新目标 URL
///
/// 只接受 `N;URL=target` 形式，目标可以用单引号或双引号包围。
pub fn parse_meta_refresh(content: &str) -> Option<MetaRefresh<'_>> {
    let captures: Captures<'_> = meta_refresh_regex().captures(content.trim())?;
    let target = captures
        .get(2)
        .or_else(|| captures.get(3))
        .or_else(|| captures.get(4))?;

    // 捕获位置是相对去掉空白后的字符串
    let offset = content.len() - content.trim_start().len();
    Some(MetaRefresh {
        start: offset + target.start(),
        end: offset + target.end(),
        url: target.as_str(),
    })
}
