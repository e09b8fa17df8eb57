//! 解析器注册表模块
//!
//! 注册表把媒体类型映射到内容解析器。查找时按注册顺序检查每个绑定，第一个
//! 匹配的绑定生效，所以同一媒体类型再次注册不会覆盖之前的解析器。
//!
//! # 架构设计
//!
//! - [`MediaTypePattern`] 描述一个绑定能匹配哪些媒体类型
//! - [`ContentParser`] 是封闭的解析器集合（HTML、CSS、JavaScript）
//! - [`ParserRegistry`] 保存有序的绑定列表，并负责把嵌入内容分派给正确的解析器
//!
//! 注册表只在构造阶段被修改，之后可以在多个线程之间共享只读访问。
//!
//! # 使用示例
//!
//! ```rust
//! use content_urls::registry::{ContentParser, MediaTypePattern, ParserRegistry};
//!
//! let mut registry = ParserRegistry::default();
//! registry.register(MediaTypePattern::prefix("image/svg+xml"), ContentParser::Html);
//!
//! assert_eq!(registry.resolve("text/html; charset=utf-8"), Some(ContentParser::Html));
//! assert_eq!(registry.resolve("image/svg+xml"), Some(ContentParser::Html));
//! assert_eq!(registry.resolve("text/htmlx"), None);
//! ```

use std::fmt;

use regex::Regex;

use crate::error::{ContentUrlsError, ContentUrlsResult};
use crate::parsers::{css, html, js, JsScanMode};

/// 媒体类型匹配模式
#[derive(Debug, Clone)]
pub enum MediaTypePattern {
    /// 前缀匹配，前缀之后必须是字符串结尾或非单词字符
    Prefix(String),
    /// 正则匹配
    Regex(Regex),
}

impl MediaTypePattern {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        MediaTypePattern::Prefix(prefix.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(MediaTypePattern::Regex)
    }

    /// 判断媒体类型是否匹配（区分大小写）
    pub fn matches(&self, media_type: &str) -> bool {
        match self {
            MediaTypePattern::Prefix(prefix) => media_type
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.chars().next().map_or(true, |c| !is_word_char(c))),
            MediaTypePattern::Regex(regex) => regex.is_match(media_type),
        }
    }
}

impl PartialEq for MediaTypePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MediaTypePattern::Prefix(a), MediaTypePattern::Prefix(b)) => a == b,
            (MediaTypePattern::Regex(a), MediaTypePattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for MediaTypePattern {}

impl fmt::Display for MediaTypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTypePattern::Prefix(prefix) => write!(f, "{}", prefix),
            MediaTypePattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for MediaTypePattern {
    fn from(prefix: &str) -> Self {
        MediaTypePattern::prefix(prefix)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 内容解析器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentParser {
    Html,
    Css,
    JavaScript(JsScanMode),
}

impl ContentParser {
    /// 解析器能否读出内容中声明的 base URL
    pub fn supports_base_url(&self) -> bool {
        matches!(self, ContentParser::Html)
    }

    /// 提取内容中的 URL（去重，保持首次出现顺序）
    pub fn extract_urls(
        &self,
        registry: &ParserRegistry,
        content: &str,
    ) -> ContentUrlsResult<Vec<String>> {
        match self {
            ContentParser::Html => html::extract_urls(registry, content),
            ContentParser::Css => Ok(css::extract_urls(content)),
            ContentParser::JavaScript(mode) => Ok(js::extract_urls(content, *mode)),
        }
    }

    /// 对内容中的每个 URL 调用回调，返回重写后的内容
    pub fn rewrite_each_url(
        &self,
        registry: &ParserRegistry,
        content: &str,
        callback: &mut dyn FnMut(&str) -> Option<String>,
    ) -> ContentUrlsResult<String> {
        match self {
            ContentParser::Html => html::rewrite_each_url(registry, content, callback),
            ContentParser::Css => Ok(css::rewrite_each_url(content, callback)),
            ContentParser::JavaScript(mode) => Ok(js::rewrite_each_url(content, *mode, callback)),
        }
    }

    /// 内容中声明的 base URL；不支持该能力的解析器总是返回 `None`
    pub fn base_url(&self, content: &str) -> ContentUrlsResult<Option<String>> {
        match self {
            ContentParser::Html => html::base_url(content),
            ContentParser::Css | ContentParser::JavaScript(_) => Ok(None),
        }
    }
}

impl fmt::Display for ContentParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentParser::Html => write!(f, "html"),
            ContentParser::Css => write!(f, "css"),
            ContentParser::JavaScript(mode) => write!(f, "javascript ({})", mode),
        }
    }
}

/// 一条注册记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserBinding {
    pub pattern: MediaTypePattern,
    pub parser: ContentParser,
}

/// 解析器注册表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserRegistry {
    bindings: Vec<ParserBinding>,
}

impl ParserRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        ParserRegistry {
            bindings: Vec::new(),
        }
    }

    /// 创建包含标准绑定的注册表，JavaScript 使用指定的扫描模式
    ///
    /// | 媒体类型 | 解析器 |
    /// |----------|--------|
    /// | `text/html`, `application/xhtml+xml` | HTML |
    /// | `text/css`, `html-inline-style` | CSS |
    /// | `application/x-javascript`, `application/javascript`, `text/javascript` | JavaScript |
    pub fn with_js_mode(mode: JsScanMode) -> Self {
        if !mode.is_precise() {
            tracing::debug!("JavaScript 使用 {} 扫描模式，结果可能包含注释中的 URL", mode);
        }

        let mut registry = ParserRegistry::new();

        registry.register_parser(ContentParser::Html, ["text/html", "application/xhtml+xml"]);
        registry.register_parser(ContentParser::Css, ["text/css", "html-inline-style"]);
        registry.register_parser(
            ContentParser::JavaScript(mode),
            [
                "application/x-javascript",
                "application/javascript",
                "text/javascript",
            ],
        );

        registry
    }

    /// 注册一个绑定
    ///
    /// 完全相同的绑定（同一模式、同一解析器）只保留一份。返回是否新增了绑定。
    pub fn register(&mut self, pattern: MediaTypePattern, parser: ContentParser) -> bool {
        let binding = ParserBinding { pattern, parser };
        if self.bindings.contains(&binding) {
            return false;
        }

        tracing::trace!("注册 {} -> {}", binding.pattern, binding.parser);
        self.bindings.push(binding);
        true
    }

    /// 用多个模式注册同一个解析器
    pub fn register_parser<I, P>(&mut self, parser: ContentParser, patterns: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<MediaTypePattern>,
    {
        for pattern in patterns {
            self.register(pattern.into(), parser);
        }
    }

    /// 按注册顺序查找第一个能处理该媒体类型的解析器
    pub fn resolve(&self, media_type: &str) -> Option<ContentParser> {
        self.bindings
            .iter()
            .find(|binding| binding.pattern.matches(media_type))
            .map(|binding| binding.parser)
    }

    /// 与 [`ParserRegistry::resolve`] 相同，找不到时返回错误
    pub fn require(&self, media_type: &str) -> ContentUrlsResult<ContentParser> {
        self.resolve(media_type)
            .ok_or_else(|| ContentUrlsError::UnrecognizedMediaType(media_type.to_string()))
    }

    pub fn bindings(&self) -> &[ParserBinding] {
        &self.bindings
    }

    /// 把嵌入内容交给对应媒体类型的解析器重写
    pub fn rewrite_each_url(
        &self,
        content: &str,
        media_type: &str,
        callback: &mut dyn FnMut(&str) -> Option<String>,
    ) -> ContentUrlsResult<String> {
        self.require(media_type)?
            .rewrite_each_url(self, content, callback)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        ParserRegistry::with_js_mode(JsScanMode::default())
    }
}
