//! 统一错误处理
//!
//! 库内部的所有失败情况都用 [`ContentUrlsError`] 表示。公共 API 不会把这些错误
//! 抛给调用方，而是在出错的地方降级处理（返回空列表、原样返回内容、丢弃单个引用
//! 或跳过单个 token），并通过 `tracing` 记录下来。

use thiserror::Error;

/// 内容 URL 处理错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentUrlsError {
    /// 没有为该媒体类型注册解析器
    #[error("没有可处理媒体类型 '{0}' 的解析器")]
    UnrecognizedMediaType(String),

    /// 协作组件无法解析内容
    #[error("无法解析 {media_type} 内容: {reason}")]
    MalformedContent { media_type: String, reason: String },

    /// 引用无法与基准 URL 合并
    #[error("无法解析引用 '{reference}': {source}")]
    MalformedUrlReference {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    /// 基准 URL 无法解析，或者是相对 URL
    #[error("基准 URL '{0}' 无效或不是绝对 URL")]
    InvalidBaseUrl(String),

    /// 语法错误的 CSS `url()` 结构
    #[error("偏移 {offset} 处的 url() token 无效")]
    BadCssUriToken { offset: usize },
}

/// 结果类型别名
pub type ContentUrlsResult<T> = Result<T, ContentUrlsError>;
