//! # 工具模块
//!
//! - `url` - 绝对 URL 判断、引用合并、转义规范化
//! - `charset` - 字符编码解码

pub mod charset;
pub mod url;

// Re-export commonly used items for convenience
pub use charset::decode_content;
pub use url::{is_absolute, join_reference, normalize_escapes, parse_absolute, to_absolute, Url};
