//! URL 解析与合并工具
//!
//! 在 `url` crate 的基础上实现引用解析：判断基准 URL 是否为绝对 URL、
//! 把相对引用合并到基准 URL 上，以及 [`to_absolute`] 的规范化规则。

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
pub use url::Url;

use crate::error::{ContentUrlsError, ContentUrlsResult};

/// 规范化引用时需要重新转义的字符
///
/// 保留字符（`/`、`?`、`:`、`@`、`&`、`=` 等）不转义，这样解码再编码之后
/// 引用的结构不变，只是多余的转义被合并掉。
const REFERENCE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// 把字符串解析为可以作为基准的绝对 URL
///
/// 相对 URL、无法解析的 URL 以及不能作为基准的 URL（如 `mailto:`）都会返回
/// [`ContentUrlsError::InvalidBaseUrl`]。
pub fn parse_absolute(url: &str) -> ContentUrlsResult<Url> {
    match Url::parse(url.trim()) {
        Ok(parsed) if !parsed.cannot_be_a_base() => Ok(parsed),
        _ => Err(ContentUrlsError::InvalidBaseUrl(url.to_string())),
    }
}

/// 判断字符串是否为绝对 URL
pub fn is_absolute(url: &str) -> bool {
    parse_absolute(url).is_ok()
}

/// 按标准引用解析规则把引用合并到基准 URL 上
pub fn join_reference(base: &Url, reference: &str) -> ContentUrlsResult<Url> {
    base.join(reference)
        .map_err(|source| ContentUrlsError::MalformedUrlReference {
            reference: reference.to_string(),
            source,
        })
}

/// 合并多余的百分号转义
///
/// 先解码再按 [`REFERENCE_ENCODE_SET`] 重新编码，例如 `%7e` 变为 `~`，
/// 空格变为 `%20`。
pub fn normalize_escapes(reference: &str) -> String {
    let decoded = percent_decode_str(reference).decode_utf8_lossy();
    utf8_percent_encode(&decoded, REFERENCE_ENCODE_SET).to_string()
}

/// 把相对 URL 转换为绝对 URL
///
/// 处理步骤：
///
/// 1. 去掉片段（`#...`）
/// 2. 合并多余的百分号转义
/// 3. 按标准引用解析规则合并到 `base_url` 上
/// 4. 结果路径为空时使用 `/`
///
/// `url` 为 `None`，或者 `base_url` 不是绝对 URL，或者合并失败时返回 `None`。
///
/// # 示例
///
/// ```rust
/// use content_urls::to_absolute;
///
/// assert_eq!(
///     to_absolute(Some("../index.html"), "http://example.com/one/two/three/"),
///     Some("http://example.com/one/two/index.html".to_string())
/// );
/// assert_eq!(to_absolute(None, "http://example.com/"), None);
/// ```
pub fn to_absolute(url: Option<&str>, base_url: &str) -> Option<String> {
    let url = url?;
    let base = parse_absolute(base_url).ok()?;

    match absolutize(&base, url) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(error) => {
            tracing::debug!("{}", error);
            None
        }
    }
}

fn absolutize(base: &Url, url: &str) -> ContentUrlsResult<Url> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let mut absolute = join_reference(base, &normalize_escapes(without_fragment))?;

    if absolute.path().is_empty() && !absolute.cannot_be_a_base() {
        absolute.set_path("/");
    }

    Ok(absolute)
}
