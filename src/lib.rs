//! # content_urls
//!
//! 在 web 内容中查找和重写 URL 的工具库。根据媒体类型选择解析器，提取 HTML、
//! CSS 和 JavaScript 中的 URL 引用，可选地把它们解析为绝对 URL，或者按原位置
//! 替换它们，其余内容保持不变。库本身不做任何网络或文件 I/O。
//!
//! ## 模块组织
//!
//! - `core` - 对外的 [`ContentUrls`] 入口和提取选项
//! - `env` - 环境变量配置
//! - `error` - 统一错误类型
//! - `parsers` - 内容解析器（HTML、CSS、JavaScript）
//! - `registry` - 媒体类型到解析器的注册表
//! - `utils` - URL 与字符编码工具函数

pub mod core;
pub mod env;
pub mod error;
pub mod parsers;
pub mod registry;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::{ContentUrls, UrlOptions};
pub use error::{ContentUrlsError, ContentUrlsResult};
pub use registry::{ContentParser, MediaTypePattern, ParserRegistry};
pub use utils::url::to_absolute;
