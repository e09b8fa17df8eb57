//! HTML 文档元数据处理模块
//!
//! 目前只读取 `<base href>`：它决定文档中相对引用的基准 URL。`<base>` 元素
//! 本身不属于 URL 规则表，所以重写时不会被修改。

use markup5ever_rcdom::Handle;

use super::dom::{find_nodes, get_node_attr};

/// 获取文档的 base URL
///
/// 从 HTML 文档的 `<head>` 部分查找 `<base>` 标签并提取其 `href` 属性值。
/// 根据 HTML 规范，只有第一个 `<base>` 标签有效，其余的将被忽略。
///
/// # 返回值
///
/// * `Some(String)` - 去掉首尾空白后的 href 值
/// * `None` - 没有 base 标签，或者 href 缺失、为空
///
/// # 示例
///
/// ```rust
/// use content_urls::parsers::html::{get_base_url, html_to_dom};
///
/// let dom = html_to_dom("<html><head><base href=' /en/ '></head></html>").unwrap();
/// assert_eq!(get_base_url(&dom.document), Some("/en/".to_string()));
/// ```
pub fn get_base_url(handle: &Handle) -> Option<String> {
    let base_node = find_nodes(handle, &["html", "head", "base"])
        .into_iter()
        .next()?;

    get_node_attr(&base_node, "href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}
