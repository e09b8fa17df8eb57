//! CSS 解析器模块
//!
//! 此模块在 CSS 样式表（以及 HTML 的内联 `style` 属性）中查找 `url()` token，
//! 支持提取其中的 URL 和按位置重写 URL。识别规则来自 CSS 2.1 的词法定义
//! (<http://www.w3.org/TR/CSS21/syndata.html>)：
//!
//! ```text
//! w        [ \t\r\n\f]*
//! nl       \n|\r\n|\r|\f
//! unicode  \\[0-9a-f]{1,6}(\r\n|[ \n\r\t\f])?
//! escape   {unicode}|\\[^\n\r\f0-9a-f]
//! string1  \"([^\n\r\f\\"]|\\{nl}|{escape})*\"
//! string2  \'([^\n\r\f\\']|\\{nl}|{escape})*\'
//! nonascii [^\0-\177]
//! uri      url\({w}{string}{w}\)
//!          | url\({w}([!#$%&*-\[\]-~]|{nonascii}|{escape})*{w}\)
//! ```
//!
//! 词法匹配不区分 ASCII 大小写。扫描器是一个按字符类别推进的状态机，
//! 不做回溯：每个 `url(` 起点最多向前看到 token 结束处。
//!
//! # 主要功能
//!
//! - **URL 提取**: [`extract_urls`] 按首次出现顺序返回去重后的 URL
//! - **URL 重写**: [`rewrite_each_url`] 只替换 token 内部的负载，
//!   `url(`、引号和括号内的空白保持原样
//! - **容错**: 无效的 `url()` 结构会被跳过，扫描从该 token 的 `url(` 之后继续
//!
//! # 使用示例
//!
//! ```rust
//! use content_urls::parsers::css::{extract_urls, rewrite_each_url};
//!
//! let css = "body { background: url(/images/rainbows.jpg) }";
//! assert_eq!(extract_urls(css), vec!["/images/rainbows.jpg".to_string()]);
//!
//! let rewritten = rewrite_each_url(css, &mut |url| Some(url.replace("rainbows", "unicorns")));
//! assert_eq!(rewritten, "body { background: url(/images/unicorns.jpg) }");
//! ```

use crate::error::ContentUrlsError;

use super::rewrite::{splice, RewriteResult};
use super::{unique, UrlReference};

const URL_OPENER: &[u8] = b"url(";

/// `url()` token 迭代器
///
/// 每次产出一个有效 token 的负载引用，或者一个
/// [`ContentUrlsError::BadCssUriToken`]。游标只会向前移动。
pub struct UrlTokens<'a> {
    content: &'a str,
    cursor: usize,
}

/// 一个完整匹配的 token 的边界
struct TokenBounds {
    payload_start: usize,
    payload_end: usize,
    token_end: usize,
}

/// 在 CSS 内容中逐个识别 `url()` token
pub fn url_tokens(content: &str) -> UrlTokens<'_> {
    UrlTokens { content, cursor: 0 }
}

impl<'a> Iterator for UrlTokens<'a> {
    type Item = Result<UrlReference<'a>, ContentUrlsError>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.content.as_bytes();
        let start = find_opener(bytes, self.cursor)?;

        match scan_token(self.content, start) {
            Some(bounds) => {
                self.cursor = bounds.token_end;
                Some(Ok(UrlReference {
                    start: bounds.payload_start,
                    end: bounds.payload_end,
                    payload: &self.content[bounds.payload_start..bounds.payload_end],
                }))
            }
            None => {
                // 从 url( 之后继续，后面的有效 token 不会被吞掉
                self.cursor = start + URL_OPENER.len();
                Some(Err(ContentUrlsError::BadCssUriToken { offset: start }))
            }
        }
    }
}

/// 返回 CSS 内容中的 URL（去重，保持首次出现顺序）
pub fn extract_urls(content: &str) -> Vec<String> {
    unique(valid_references(content).map(|reference| reference.payload))
}

/// 对 CSS 内容中每个 URL 调用回调，返回分段的重写结果
///
/// 重复出现的 URL 每次出现都会单独交给回调。
pub fn rewrite<'a>(
    content: &'a str,
    callback: &mut dyn FnMut(&str) -> Option<String>,
) -> RewriteResult<'a> {
    splice(content, valid_references(content), callback)
}

/// 对 CSS 内容中每个 URL 调用回调并返回重写后的内容
///
/// 回调返回 `None` 表示保留原 URL。
pub fn rewrite_each_url(content: &str, callback: &mut dyn FnMut(&str) -> Option<String>) -> String {
    let result = rewrite(content, callback);
    tracing::trace!("CSS 中替换了 {} 个 URL", result.replaced_count());
    result.into_string()
}

fn valid_references(content: &str) -> impl Iterator<Item = UrlReference<'_>> {
    url_tokens(content).filter_map(|token| match token {
        Ok(reference) if !reference.payload.is_empty() => Some(reference),
        Ok(_) => None,
        Err(error) => {
            tracing::trace!("跳过无效 token: {}", error);
            None
        }
    })
}

/// 查找下一个 `url(` 的起点
///
/// 前面紧挨着标识符字符时（如 `myurl(`）那是另一个函数名，不算 url token。
fn find_opener(bytes: &[u8], from: usize) -> Option<usize> {
    let last = bytes.len().checked_sub(URL_OPENER.len())?;
    (from..=last).find(|&i| {
        bytes[i..i + URL_OPENER.len()].eq_ignore_ascii_case(URL_OPENER)
            && (i == 0 || !is_name_byte(bytes[i - 1]))
    })
}

fn scan_token(content: &str, start: usize) -> Option<TokenBounds> {
    let bytes = content.as_bytes();
    let mut pos = skip_whitespace(bytes, start + URL_OPENER.len());

    let (payload_start, payload_end) = match bytes.get(pos) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let payload_start = pos + 1;
            let close = scan_string_body(content, payload_start, quote)?;
            pos = close + 1;
            (payload_start, close)
        }
        _ => {
            let payload_start = pos;
            pos = scan_unquoted(content, pos)?;
            (payload_start, pos)
        }
    };

    pos = skip_whitespace(bytes, pos);
    if bytes.get(pos) == Some(&b')') {
        Some(TokenBounds {
            payload_start,
            payload_end,
            token_end: pos + 1,
        })
    } else {
        None
    }
}

/// 扫描引号字符串的内容，返回结束引号的位置
///
/// 遇到未转义的换行或内容结束时字符串无效（bad string）。
fn scan_string_body(content: &str, mut pos: usize, quote: u8) -> Option<usize> {
    let bytes = content.as_bytes();

    loop {
        match *bytes.get(pos)? {
            b if b == quote => return Some(pos),
            b'\n' | b'\r' | b'\x0c' => return None,
            b'\\' => match bytes.get(pos + 1) {
                // \{nl}
                Some(b'\n') | Some(b'\x0c') => pos += 2,
                Some(b'\r') if bytes.get(pos + 2) == Some(&b'\n') => pos += 3,
                Some(b'\r') => pos += 2,
                _ => pos = scan_escape(content, pos)?,
            },
            _ => pos += 1,
        }
    }
}

/// 扫描未加引号的 URL，返回负载结束位置
fn scan_unquoted(content: &str, mut pos: usize) -> Option<usize> {
    let bytes = content.as_bytes();

    while let Some(&b) = bytes.get(pos) {
        if is_url_byte(b) {
            pos += 1;
        } else if b == b'\\' {
            pos = scan_escape(content, pos)?;
        } else {
            break;
        }
    }

    Some(pos)
}

/// 扫描从反斜杠开始的转义序列，返回转义结束位置
fn scan_escape(content: &str, pos: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let next = pos + 1;

    match *bytes.get(next)? {
        b'\n' | b'\r' | b'\x0c' => None,
        b if b.is_ascii_hexdigit() => {
            let digits = bytes[next..]
                .iter()
                .take(6)
                .take_while(|b| b.is_ascii_hexdigit())
                .count();
            let end = next + digits;

            match bytes.get(end) {
                Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => Some(end + 2),
                Some(&b) if is_whitespace(b) => Some(end + 1),
                _ => Some(end),
            }
        }
        _ => {
            let escaped = content[next..].chars().next()?;
            Some(next + escaped.len_utf8())
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).copied().is_some_and(is_whitespace) {
        pos += 1;
    }
    pos
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c')
}

/// `[!#$%&*-\[\]-~]` 或非 ASCII 字节
fn is_url_byte(b: u8) -> bool {
    matches!(b, b'!' | b'#'..=b'&' | b'*'..=b'[' | b']'..=b'~') || b >= 0x80
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b >= 0x80
}
