//! JavaScript 解析器模块
//!
//! 此模块在 JavaScript 源码中查找形如 `scheme:...` 的绝对 URI（`http://`、`mailto:`、
//! `data:` 等），并支持按原位置重写。
//! 默认模式下，一个轻量的词法扫描器先找出所有字符串字面量（单引号、双引号和
//! 模板字符串的文本部分），跳过注释和正则字面量，只在字面量内部查找 URL。
//!
//! 没有字面量边界信息时可以使用 [`JsScanMode::PlainText`]：直接在整段源码上
//! 查找 URL。这种模式不精确，可能匹配到注释或者非字面量文本中的内容。
//!
//! 字面量的值按源码原样提供（不解码转义序列）；URL 匹配遇到反斜杠就会结束，
//! 所以被替换的范围总是和源码中的文本一致。

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::rewrite::{splice, RewriteResult};
use super::{unique, UrlReference};

/// 允许其后出现正则字面量的关键字
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "await", "case", "delete", "do", "else", "in", "instanceof", "new", "of", "return", "throw",
    "typeof", "void", "yield",
];

static URI_REGEX: OnceLock<Regex> = OnceLock::new();

fn uri_regex() -> &'static Regex {
    URI_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\b[a-z][a-z0-9+.\-]*:[^\s"'`<>\\]+"#)
            .expect("URI pattern is valid")
    })
}

/// JavaScript URL 扫描模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsScanMode {
    /// 只在字符串字面量内部查找
    #[default]
    Literals,
    /// 在整段源码上查找（不精确）
    PlainText,
}

impl JsScanMode {
    /// 是否能区分字面量和其它源码
    pub fn is_precise(self) -> bool {
        self == JsScanMode::Literals
    }
}

impl fmt::Display for JsScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsScanMode::Literals => write!(f, "literals"),
            JsScanMode::PlainText => write!(f, "plain"),
        }
    }
}

impl FromStr for JsScanMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "literals" | "literal" => Ok(JsScanMode::Literals),
            "plain" | "plaintext" | "plain-text" => Ok(JsScanMode::PlainText),
            _ => Err(format!(
                "Invalid JavaScript scan mode '{}'. Use: literals, plain",
                value
            )),
        }
    }
}

/// 字符串字面量
///
/// `start..end` 是引号之间的字节范围，`value` 是该范围内的原始文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsLiteral<'a> {
    pub start: usize,
    pub end: usize,
    pub value: &'a str,
    pub delimiter: char,
}

/// 按出现顺序列出源码中的字符串字面量
///
/// 未闭合的字面量会被丢弃；模板字符串中 `${...}` 表达式内的代码不展开。
pub fn string_literals(source: &str) -> Vec<JsLiteral<'_>> {
    let bytes = source.as_bytes();
    let mut literals = Vec::new();
    let mut regex_allowed = true;
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];

        match b {
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = skip_line(bytes, pos + 2);
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_block_comment(bytes, pos + 2);
            }
            b'/' if regex_allowed => {
                pos = skip_regex(bytes, pos + 1);
                regex_allowed = false;
            }
            b'\'' | b'"' => {
                let (literal, next) = scan_quoted(source, pos);
                literals.extend(literal);
                pos = next;
                regex_allowed = false;
            }
            b'`' => {
                pos = scan_template(source, pos + 1, &mut literals);
                regex_allowed = false;
            }
            _ if is_ident_byte(b) => {
                let end = pos
                    + bytes[pos..]
                        .iter()
                        .take_while(|&&b| is_ident_byte(b))
                        .count();
                regex_allowed = REGEX_PRECEDING_KEYWORDS.contains(&&source[pos..end]);
                pos = end;
            }
            _ if b.is_ascii_whitespace() => pos += 1,
            b')' | b']' | b'}' => {
                regex_allowed = false;
                pos += 1;
            }
            _ => {
                regex_allowed = true;
                pos += 1;
            }
        }
    }

    literals
}

/// 按扫描模式列出源码中的 URL 引用
pub fn url_references(source: &str, mode: JsScanMode) -> Vec<UrlReference<'_>> {
    match mode {
        JsScanMode::Literals => string_literals(source)
            .into_iter()
            .flat_map(|literal| {
                uri_regex().find_iter(literal.value).map(move |m| UrlReference {
                    start: literal.start + m.start(),
                    end: literal.start + m.end(),
                    payload: m.as_str(),
                })
            })
            .collect(),
        JsScanMode::PlainText => uri_regex()
            .find_iter(source)
            .map(|m| UrlReference {
                start: m.start(),
                end: m.end(),
                payload: m.as_str(),
            })
            .collect(),
    }
}

/// 返回 JavaScript 源码中的 URL（去重，保持首次出现顺序）
pub fn extract_urls(source: &str, mode: JsScanMode) -> Vec<String> {
    unique(url_references(source, mode).into_iter().map(|r| r.payload))
}

/// 对每个 URL 调用回调，返回分段的重写结果
pub fn rewrite<'a>(
    source: &'a str,
    mode: JsScanMode,
    callback: &mut dyn FnMut(&str) -> Option<String>,
) -> RewriteResult<'a> {
    splice(source, url_references(source, mode), callback)
}

/// 对每个 URL 调用回调并返回重写后的源码
pub fn rewrite_each_url(
    source: &str,
    mode: JsScanMode,
    callback: &mut dyn FnMut(&str) -> Option<String>,
) -> String {
    let result = rewrite(source, mode, callback);
    tracing::trace!("JavaScript 中替换了 {} 个 URL", result.replaced_count());
    result.into_string()
}

fn scan_quoted(source: &str, open: usize) -> (Option<JsLiteral<'_>>, usize) {
    let bytes = source.as_bytes();
    let quote = bytes[open];
    let mut pos = open + 1;

    loop {
        match bytes.get(pos) {
            None | Some(b'\n') | Some(b'\r') => return (None, pos),
            Some(b'\\') => {
                if bytes.get(pos + 1) == Some(&b'\r') && bytes.get(pos + 2) == Some(&b'\n') {
                    pos += 3;
                } else {
                    pos += 2;
                }
            }
            Some(&b) if b == quote => {
                let literal = JsLiteral {
                    start: open + 1,
                    end: pos,
                    value: &source[open + 1..pos],
                    delimiter: quote as char,
                };
                return (Some(literal), pos + 1);
            }
            _ => pos += 1,
        }
    }
}

fn scan_template<'a>(source: &'a str, mut pos: usize, literals: &mut Vec<JsLiteral<'a>>) -> usize {
    let bytes = source.as_bytes();
    let mut chunk_start = pos;

    let mut push_chunk = |start: usize, end: usize| {
        if end > start {
            literals.push(JsLiteral {
                start,
                end,
                value: &source[start..end],
                delimiter: '`',
            });
        }
    };

    loop {
        match bytes.get(pos) {
            None => return pos,
            Some(b'\\') => pos += 2,
            Some(b'`') => {
                push_chunk(chunk_start, pos);
                return pos + 1;
            }
            Some(b'$') if bytes.get(pos + 1) == Some(&b'{') => {
                push_chunk(chunk_start, pos);
                pos = skip_template_expression(bytes, pos + 2);
                chunk_start = pos;
            }
            _ => pos += 1,
        }
    }
}

fn skip_template_expression(bytes: &[u8], mut pos: usize) -> usize {
    let mut depth = 1;

    while let Some(&b) = bytes.get(pos) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return pos + 1;
                }
            }
            b'\'' | b'"' | b'`' => {
                pos += 1;
                while let Some(&inner) = bytes.get(pos) {
                    if inner == b'\\' {
                        pos += 1;
                    } else if inner == b {
                        break;
                    }
                    pos += 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }

    pos
}

fn skip_line(bytes: &[u8], pos: usize) -> usize {
    bytes[pos.min(bytes.len())..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| pos + offset)
}

fn skip_block_comment(bytes: &[u8], pos: usize) -> usize {
    bytes[pos.min(bytes.len())..]
        .windows(2)
        .position(|window| window == b"*/")
        .map_or(bytes.len(), |offset| pos + offset + 2)
}

fn skip_regex(bytes: &[u8], mut pos: usize) -> usize {
    let mut in_class = false;

    while let Some(&b) = bytes.get(pos) {
        match b {
            b'\n' | b'\r' => return pos,
            b'\\' => pos += 1,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                pos += 1;
                while bytes.get(pos).copied().is_some_and(is_ident_byte) {
                    pos += 1;
                }
                return pos;
            }
            _ => {}
        }
        pos += 1;
    }

    pos
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(source: &str) -> Vec<&str> {
        string_literals(source).iter().map(|l| l.value).collect()
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            values(r#"var a = "one", b = 'two'; f(`three`);"#),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn test_literal_positions() {
        let source = r#"var link="http://www.sample.com/index.html""#;
        let literal = string_literals(source)[0];
        assert_eq!(literal.delimiter, '"');
        assert_eq!(&source[literal.start..literal.end], "http://www.sample.com/index.html");
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(values(r#"x = "say \"hi\"";"#), vec![r#"say \"hi\""#]);
        assert_eq!(values(r"x = 'it\'s';"), vec![r"it\'s"]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            values("// 'not a literal'\n/* \"nor this\" */ x = 'yes';"),
            vec!["yes"]
        );
    }

    #[test]
    fn test_regex_literals_are_skipped() {
        assert_eq!(values(r#"var re = /"/g; x = "yes";"#), vec!["yes"]);
        assert_eq!(values(r#"return /[/"]/.test(s) ? 'a' : 'b';"#), vec!["a", "b"]);
    }

    #[test]
    fn test_division_is_not_a_regex() {
        assert_eq!(values(r#"x = a / 2; y = "q" / 1; z = 'w';"#), vec!["q", "w"]);
    }

    #[test]
    fn test_template_expressions() {
        assert_eq!(
            values("u = `http://a.com/${path}/x?${'q'}`;"),
            vec!["http://a.com/", "/x?"]
        );
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(values("x = 'open\ny = 'closed';"), vec!["closed"]);
        assert!(values("x = \"never closed").is_empty());
    }

    #[test]
    fn test_literal_mode_ignores_comments() {
        let source = "// see http://docs.example.com/\nload('http://cdn.example.com/app.js');";
        assert_eq!(
            extract_urls(source, JsScanMode::Literals),
            vec!["http://cdn.example.com/app.js".to_string()]
        );
        assert_eq!(
            extract_urls(source, JsScanMode::PlainText),
            vec![
                "http://docs.example.com/".to_string(),
                "http://cdn.example.com/app.js".to_string()
            ]
        );
    }

    #[test]
    fn test_url_inside_literal_text() {
        assert_eq!(
            extract_urls("msg = 'visit https://example.com/a today';", JsScanMode::Literals),
            vec!["https://example.com/a".to_string()]
        );
    }

    #[test]
    fn test_uris_without_authority() {
        let source = r#"a = 'mailto:x@y.com'; b = "urn:isbn:0451450523"; c = 'data:image/png;base64,iVBO';"#;
        assert_eq!(
            extract_urls(source, JsScanMode::Literals),
            vec![
                "mailto:x@y.com".to_string(),
                "urn:isbn:0451450523".to_string(),
                "data:image/png;base64,iVBO".to_string(),
            ]
        );
    }

    #[test]
    fn test_scheme_needs_letter_and_payload() {
        let source = r#"t = '12:30'; label = "key: value"; path = '/a/b';"#;
        assert!(extract_urls(source, JsScanMode::Literals).is_empty());
    }

    #[test]
    fn test_rewrite_splices_at_literal_position() {
        let source = r#"var a="http://x.com/1", b='http://x.com/1';"#;
        let rewritten = rewrite_each_url(source, JsScanMode::Literals, &mut |url| {
            Some(url.replace("x.com", "y.org"))
        });
        assert_eq!(rewritten, r#"var a="http://y.org/1", b='http://y.org/1';"#);
    }

    #[test]
    fn test_rewrite_keeps_original_on_none() {
        let source = r#"var link="http://example.com/";"#;
        assert_eq!(
            rewrite_each_url(source, JsScanMode::Literals, &mut |_| None),
            source
        );
    }

    #[test]
    fn test_scan_mode_from_str() {
        assert_eq!("literals".parse::<JsScanMode>(), Ok(JsScanMode::Literals));
        assert_eq!("Plain".parse::<JsScanMode>(), Ok(JsScanMode::PlainText));
        assert!("ast".parse::<JsScanMode>().is_err());
        assert!(JsScanMode::Literals.is_precise());
        assert!(!JsScanMode::PlainText.is_precise());
    }
}
