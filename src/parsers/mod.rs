//! # 解析器模块
//!
//! 这个模块包含在不同类型 web 内容中查找和重写 URL 的解析器：
//!
//! - `css` - CSS `url()` token 扫描与重写（也用于 HTML 内联样式）
//! - `html` - HTML 文档解析、DOM 遍历、URL 规则表
//! - `js` - JavaScript 字符串字面量中的 URL 查找与重写
//! - `rewrite` - 重写结果的分段拼接

use std::collections::HashSet;

pub mod css;
pub mod html;
pub mod js;
pub mod rewrite;

// Re-export commonly used items for convenience
pub use html::{get_base_url, html_to_dom, serialize_document};
pub use js::JsScanMode;
pub use rewrite::{RewriteResult, Segment};

/// 源内容中的一个 URL 引用
///
/// `start..end` 是负载在源缓冲区中的字节范围，`payload` 是该范围内的文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlReference<'a> {
    pub start: usize,
    pub end: usize,
    pub payload: &'a str,
}

/// 去重并保持首次出现的顺序
pub(crate) fn unique<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for item in items {
        let item = item.as_ref();
        if seen.insert(item.to_string()) {
            result.push(item.to_string());
        }
    }

    result
}
