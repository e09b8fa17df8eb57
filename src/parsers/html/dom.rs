use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::{ContentUrlsError, ContentUrlsResult};

/// 将 HTML 文本解析为 DOM
///
/// html5ever 按浏览器的容错规则解析，几乎不会失败；只有底层读取出错时才返回
/// [`ContentUrlsError::MalformedContent`]。
///
/// 按关闭脚本的方式解析，`<noscript>` 的内容会成为普通元素而不是一段文本。
pub fn html_to_dom(content: &str) -> ContentUrlsResult<RcDom> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut content.as_bytes())
        .map_err(|error| ContentUrlsError::MalformedContent {
            media_type: "text/html".to_string(),
            reason: error.to_string(),
        })
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    match get_node_name(node) {
        Some(name) if name == *node_name && rest.is_empty() => {
            found_nodes.push(node.clone());
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names));
            }
        }
        Some(name) if name == *node_name => {
            found_nodes.append(&mut find_nodes(node, rest));
        }
        _ => {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names));
            }
        }
    }

    found_nodes
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 设置已有属性的值
///
/// 只修改节点上已经存在的属性，不会新增属性。
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        for attr in attrs.borrow_mut().iter_mut() {
            if &*attr.name.local == attr_name {
                attr.value.clear();
                attr.value.push_slice(attr_value);
            }
        }
    }
}

/// 拼接元素的直接文本子节点
///
/// 没有文本子节点时返回 `None`。
pub fn get_text_content(node: &Handle) -> Option<String> {
    let mut text: Option<String> = None;

    for child in node.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            text.get_or_insert_with(String::new)
                .push_str(&contents.borrow());
        }
    }

    text
}

/// 替换元素的文本内容
///
/// 新文本写入第一个文本子节点，其余文本子节点被移除。没有文本子节点时什么都不做。
pub fn set_text_content(node: &Handle, text: &str) {
    let mut replaced = false;

    node.children.borrow_mut().retain(|child| match &child.data {
        NodeData::Text { contents } if !replaced => {
            *contents.borrow_mut() = StrTendril::from_slice(text);
            replaced = true;
            true
        }
        NodeData::Text { .. } => false,
        _ => true,
    });
}
