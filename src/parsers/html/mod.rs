//! HTML解析和处理模块
//!
//! 这个模块被拆分为多个子模块：
//!
//! - `dom`: 基础DOM操作
//! - `metadata`: 文档元数据（`<base href>`）
//! - `rules`: 携带 URL 的位置组成的规则表
//! - `serializer`: 序列化功能
//! - `walker`: DOM遍历核心逻辑
//!
//! 提取 URL 就是用一个只收集、不替换的回调做一次重写，所以两者看到的 URL
//! 顺序完全一致。

use markup5ever_rcdom::RcDom;

use crate::error::ContentUrlsResult;
use crate::registry::ParserRegistry;

use super::unique;

pub mod dom;
pub mod metadata;
pub mod rules;
pub mod serializer;
pub mod walker;

pub use dom::{find_nodes, get_node_attr, get_node_name, html_to_dom, set_node_attr};
pub use metadata::get_base_url;
pub use rules::{UrlRule, URL_RULES};
pub use serializer::serialize_document;
pub use walker::UrlWalker;

/// 提取文档中所有的 URL，包括嵌入的 CSS 与 JavaScript 中的 URL
pub fn extract_urls(registry: &ParserRegistry, content: &str) -> ContentUrlsResult<Vec<String>> {
    let mut found = Vec::new();
    walk_document(registry, content, &mut |url| {
        found.push(url.to_string());
        None
    })?;

    Ok(unique(found))
}

/// 对文档中的每个 URL 调用回调，并返回序列化后的文档
pub fn rewrite_each_url(
    registry: &ParserRegistry,
    content: &str,
    callback: &mut dyn FnMut(&str) -> Option<String>,
) -> ContentUrlsResult<String> {
    let dom = walk_document(registry, content, callback)?;
    serialize_document(dom)
}

/// 文档声明的 base URL
pub fn base_url(content: &str) -> ContentUrlsResult<Option<String>> {
    let dom = html_to_dom(content)?;
    Ok(get_base_url(&dom.document))
}

fn walk_document(
    registry: &ParserRegistry,
    content: &str,
    callback: &mut dyn FnMut(&str) -> Option<String>,
) -> ContentUrlsResult<RcDom> {
    let dom = html_to_dom(content)?;
    UrlWalker::new(registry, callback).walk(&dom.document);
    Ok(dom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_document_order() {
        let registry = ParserRegistry::default();
        let html = "<html><head><link href='a.css'><style>p { background: url(b.png) }</style>\
                    </head><body style=\"background: url('c.png')\"><a href='d.html'>d</a>\
                    <img src='e.png'></body></html>";

        assert_eq!(
            extract_urls(&registry, html).unwrap(),
            vec!["a.css", "b.png", "c.png", "d.html", "e.png"]
        );
    }

    #[test]
    fn test_skips_empty_and_anchor_values() {
        let registry = ParserRegistry::default();
        let html = "<a href=''>x</a><a href='#top'>y</a><a href='  '>z</a><a href='ok'>ok</a>";

        assert_eq!(extract_urls(&registry, html).unwrap(), vec!["ok"]);
    }

    #[test]
    fn test_rewrite_writes_back_nested_content() {
        let registry = ParserRegistry::default();
        let html = "<style>p { background: url(b.png) }</style><div style='x: url(c.png)'></div>";

        let output = rewrite_each_url(&registry, html, &mut |url| Some(format!("/r/{}", url)))
            .unwrap();

        assert!(output.contains("p { background: url(/r/b.png) }"));
        assert!(output.contains("style=\"x: url(/r/c.png)\""));
    }

    #[test]
    fn test_base_url() {
        assert_eq!(
            base_url("<html><head><base href='/en/'></head></html>").unwrap(),
            Some("/en/".to_string())
        );
        assert_eq!(base_url("").unwrap(), None);
    }
}
