//! 重写结果的拼接
//!
//! 重写过程把原始内容切分为若干片段：没有匹配的部分原样引用源缓冲区，
//! 被替换的部分保存新的文本。按顺序拼接所有片段即得到输出内容。

use std::fmt;

use super::UrlReference;

/// 重写结果中的一个片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// 原样复制的源文本
    Literal(&'a str),
    /// 替换后的文本
    Replaced(String),
}

impl Segment<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(text) => text,
            Segment::Replaced(text) => text.as_str(),
        }
    }
}

/// 有序的片段序列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteResult<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> RewriteResult<'a> {
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// 被替换的片段数量
    pub fn replaced_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Replaced(_)))
            .count()
    }

    pub fn into_string(self) -> String {
        let len = self.segments.iter().map(|s| s.as_str().len()).sum();
        let mut output = String::with_capacity(len);
        for segment in &self.segments {
            output.push_str(segment.as_str());
        }
        output
    }

    fn push_literal(&mut self, text: &'a str) {
        if !text.is_empty() {
            self.segments.push(Segment::Literal(text));
        }
    }
}

impl fmt::Display for RewriteResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

/// 按引用列表把回调结果拼接到源内容中
///
/// `references` 必须按起始偏移升序排列且互不重叠。回调返回 `None` 时
/// 保留原来的负载，其余字节全部原样复制。
pub fn splice<'a, I>(
    content: &'a str,
    references: I,
    callback: &mut dyn FnMut(&str) -> Option<String>,
) -> RewriteResult<'a>
where
    I: IntoIterator<Item = UrlReference<'a>>,
{
    let mut result = RewriteResult::default();
    let mut cursor = 0;

    for reference in references {
        debug_assert!(reference.start >= cursor);

        if let Some(replacement) = callback(reference.payload) {
            result.push_literal(&content[cursor..reference.start]);
            result.segments.push(Segment::Replaced(replacement));
            cursor = reference.end;
        }
    }

    result.push_literal(&content[cursor..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference<'a>(content: &'a str, payload: &str) -> UrlReference<'a> {
        let start = content.find(payload).unwrap();
        let end = start + payload.len();
        UrlReference {
            start,
            end,
            payload: &content[start..end],
        }
    }

    #[test]
    fn test_splice_keeps_untouched_bytes() {
        let content = "a url(x.png) b url(y.png) c";
        let references = vec![reference(content, "x.png"), reference(content, "y.png")];

        let result = splice(content, references, &mut |url| {
            if url == "y.png" {
                Some("z.png".to_string())
            } else {
                None
            }
        });

        assert_eq!(result.replaced_count(), 1);
        assert_eq!(result.to_string(), "a url(x.png) b url(z.png) c");
        assert_eq!(result.into_string(), "a url(x.png) b url(z.png) c");
    }

    #[test]
    fn test_splice_without_references() {
        let result = splice("body {}", Vec::new(), &mut |_| Some("never".to_string()));
        assert_eq!(result.segments(), &[Segment::Literal("body {}")]);
    }

    #[test]
    fn test_splice_empty_content() {
        let result = splice("", Vec::new(), &mut |_| None);
        assert!(result.segments().is_empty());
        assert_eq!(result.into_string(), "");
    }
}
