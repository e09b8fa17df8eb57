//! DOM遍历器模块
//!
//! 按文档顺序遍历 DOM 树，对每个元素依次应用 [`URL_RULES`] 中匹配的规则，
//! 把找到的 URL 交给回调，并把回调的结果写回 DOM。
//!
//! # 工作流程
//!
//! 1. 从文档根节点开始遍历
//! 2. 对每个元素节点，按规则表顺序应用匹配的规则
//! 3. 嵌入的 CSS/JavaScript 通过解析器注册表交给对应的解析器
//! 4. 递归处理所有子节点
//!
//! 遍历不进入 `<template>` 的内容片段。

use markup5ever_rcdom::{Handle, NodeData};

use crate::registry::ParserRegistry;

use super::dom::{get_node_attr, get_node_name, get_text_content, set_node_attr, set_text_content};
use super::rules::{parse_meta_refresh, RuleSource, RuleValue, UrlRule, URL_RULES};

/// DOM遍历器
///
/// - `registry`: 处理嵌入内容时使用的解析器注册表
/// - `callback`: 每个 URL 出现一次就调用一次，返回 `Some` 时替换该 URL
pub struct UrlWalker<'r, 'c> {
    registry: &'r ParserRegistry,
    callback: &'c mut dyn FnMut(&str) -> Option<String>,
}

impl<'r, 'c> UrlWalker<'r, 'c> {
    pub fn new(
        registry: &'r ParserRegistry,
        callback: &'c mut dyn FnMut(&str) -> Option<String>,
    ) -> Self {
        UrlWalker { registry, callback }
    }

    /// 遍历DOM节点并处理所有子节点
    pub fn walk(&mut self, node: &Handle) {
        match node.data {
            NodeData::Document => self.walk_children(node),
            NodeData::Element { .. } => {
                if let Some(element_name) = get_node_name(node) {
                    for rule in URL_RULES {
                        if rule.matches(element_name, node) {
                            self.apply_rule(rule, node);
                        }
                    }
                }

                self.walk_children(node);
            }
            _ => {}
        }
    }

    fn walk_children(&mut self, node: &Handle) {
        // 子节点列表在遍历期间只修改文本内容，不增删元素
        let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
        for child_node in children.iter() {
            self.walk(child_node);
        }
    }

    fn apply_rule(&mut self, rule: &UrlRule, node: &Handle) {
        let value = match rule.source {
            RuleSource::Attribute(attr_name) => get_node_attr(node, attr_name),
            RuleSource::Text => get_text_content(node),
        };
        let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
            return;
        };

        let rewritten = match rule.value {
            RuleValue::Url => self.rewrite_url(&value),
            RuleValue::MetaRefresh => self.rewrite_meta_refresh(&value),
            RuleValue::Nested(media_type) => self.rewrite_nested(rule, media_type, &value),
        };

        if let Some(rewritten) = rewritten.filter(|rewritten| *rewritten != value) {
            tracing::trace!("规则 {} 重写了一个值", rule.name);
            match rule.source {
                RuleSource::Attribute(attr_name) => set_node_attr(node, attr_name, &rewritten),
                RuleSource::Text => set_text_content(node, &rewritten),
            }
        }
    }

    fn rewrite_url(&mut self, value: &str) -> Option<String> {
        let url = value.trim();
        if url.starts_with('#') {
            return None;
        }

        (self.callback)(url)
    }

    fn rewrite_meta_refresh(&mut self, value: &str) -> Option<String> {
        let refresh = parse_meta_refresh(value)?;
        let replacement = (self.callback)(refresh.url)?;

        Some(format!(
            "{}{}{}",
            &value[..refresh.start],
            replacement,
            &value[refresh.end..]
        ))
    }

    fn rewrite_nested(&mut self, rule: &UrlRule, media_type: &str, value: &str) -> Option<String> {
        match self
            .registry
            .rewrite_each_url(value, media_type, &mut *self.callback)
        {
            Ok(rewritten) => Some(rewritten),
            Err(error) => {
                tracing::debug!("跳过规则 {} 的嵌入内容: {}", rule.name, error);
                None
            }
        }
    }
}
