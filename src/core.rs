//! 对外入口
//!
//! [`ContentUrls`] 按媒体类型选择解析器，提取或重写内容中的 URL，并根据
//! [`UrlOptions`] 计算基准 URL。这里还有命令行共用的几个小工具函数。

use std::collections::HashSet;

use crate::env::{self, EnvVar};
use crate::error::{ContentUrlsError, ContentUrlsResult};
use crate::parsers::JsScanMode;
use crate::registry::{ContentParser, MediaTypePattern, ParserRegistry};
use crate::utils::url::{join_reference, parse_absolute, Url};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Options for URL extraction
///
/// `use_base_url` honours a base declared inside the content (HTML `<base href>`);
/// `content_url` is the address the content was retrieved from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlOptions {
    pub use_base_url: bool,
    pub content_url: Option<String>,
}

impl UrlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, use_base_url: bool) -> Self {
        self.use_base_url = use_base_url;
        self
    }

    pub fn with_content_url(mut self, content_url: impl Into<String>) -> Self {
        self.content_url = Some(content_url.into());
        self
    }
}

/// Locates and rewrites URLs in web content
///
/// The facade owns a [`ParserRegistry`] and never fails: unknown media types,
/// malformed content and references that cannot be resolved degrade to empty
/// results or untouched content, and are logged at debug level.
///
/// # Examples
///
/// ```
/// use content_urls::{ContentUrls, UrlOptions};
///
/// let content_urls = ContentUrls::new();
/// let options = UrlOptions::new().with_content_url("http://example.com/docs/");
///
/// let urls = content_urls.urls(
///     "<a href='intro.html'>Intro</a><img src='/logo.png'>",
///     "text/html",
///     &options,
/// );
/// assert_eq!(
///     urls,
///     vec!["http://example.com/docs/intro.html", "http://example.com/logo.png"]
/// );
///
/// let css = content_urls.rewrite_each_url(
///     "body { background: url(rainbows.jpg) }",
///     "text/css",
///     |url| Some(url.replace("rainbows", "unicorns")),
/// );
/// assert_eq!(css, "body { background: url(unicorns.jpg) }");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ContentUrls {
    registry: ParserRegistry,
}

impl ContentUrls {
    /// Creates a facade with the standard media type table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ParserRegistry) -> Self {
        ContentUrls { registry }
    }

    /// Creates a facade configured from `CONTENT_URLS_*` environment variables
    ///
    /// Invalid values fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        let mode = env::parsing::JsMode::get_or_default(JsScanMode::default());
        ContentUrls::with_registry(ParserRegistry::with_js_mode(mode))
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Registers `parser` for every pattern, after the existing bindings
    pub fn register_parser<I, P>(&mut self, parser: ContentParser, patterns: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<MediaTypePattern>,
    {
        self.registry.register_parser(parser, patterns);
    }

    /// Returns every distinct URL in `content`, in first-seen order
    ///
    /// Returns an empty list when no parser handles `media_type` or the content
    /// cannot be parsed.
    pub fn urls(&self, content: &str, media_type: &str, options: &UrlOptions) -> Vec<String> {
        self.try_urls(content, media_type, options)
            .unwrap_or_else(|error| {
                tracing::debug!("{}", error);
                Vec::new()
            })
    }

    /// Same as [`ContentUrls::urls`] but reports why nothing was extracted
    pub fn try_urls(
        &self,
        content: &str,
        media_type: &str,
        options: &UrlOptions,
    ) -> ContentUrlsResult<Vec<String>> {
        let parser = self.registry.require(media_type)?;
        let urls = parser.extract_urls(&self.registry, content)?;

        Ok(match self.effective_base(parser, content, options) {
            Some(base) => absolutize_all(&base, urls),
            None => urls,
        })
    }

    /// Returns the base URL declared inside `content`, if the parser supports it
    pub fn base_url(&self, content: &str, media_type: &str) -> Option<String> {
        let parser = self.registry.resolve(media_type)?;

        parser.base_url(content).unwrap_or_else(|error| {
            tracing::debug!("{}", error);
            None
        })
    }

    /// Calls `callback` for every URL occurrence and splices in its result
    ///
    /// `None` keeps the original URL. Content of an unknown media type is
    /// returned unchanged.
    pub fn rewrite_each_url<F>(&self, content: &str, media_type: &str, mut callback: F) -> String
    where
        F: FnMut(&str) -> Option<String>,
    {
        self.try_rewrite_each_url(content, media_type, &mut callback)
            .unwrap_or_else(|error| {
                tracing::debug!("{}", error);
                content.to_string()
            })
    }

    /// Same as [`ContentUrls::rewrite_each_url`] but reports failures
    pub fn try_rewrite_each_url(
        &self,
        content: &str,
        media_type: &str,
        callback: &mut dyn FnMut(&str) -> Option<String>,
    ) -> ContentUrlsResult<String> {
        self.registry.rewrite_each_url(content, media_type, callback)
    }

    /// Computes the base that extracted references are resolved against
    ///
    /// A declared base is only considered when `use_base_url` is set and it is
    /// absolute. When both bases survive the declared one is resolved onto the
    /// content URL, so an absolute declared base wins.
    pub fn effective_base(
        &self,
        parser: ContentParser,
        content: &str,
        options: &UrlOptions,
    ) -> Option<Url> {
        let declared = if options.use_base_url && parser.supports_base_url() {
            parser
                .base_url(content)
                .unwrap_or_else(|error| {
                    tracing::debug!("{}", error);
                    None
                })
                .and_then(|base| discard_relative(&base))
        } else {
            None
        };

        let content_url = options
            .content_url
            .as_deref()
            .and_then(discard_relative);

        match (content_url, declared) {
            (Some(content_url), Some(declared)) => join_reference(&content_url, declared.as_str())
                .map_err(|error| tracing::debug!("{}", error))
                .ok(),
            (Some(content_url), None) => Some(content_url),
            (None, declared) => declared,
        }
    }
}

fn discard_relative(url: &str) -> Option<Url> {
    parse_absolute(url)
        .map_err(|error| tracing::debug!("{}", error))
        .ok()
}

fn absolutize_all(base: &Url, urls: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut absolute_urls = Vec::new();

    for url in urls {
        match join_reference(base, &url) {
            Ok(absolute) => {
                let absolute = absolute.to_string();
                if seen.insert(absolute.clone()) {
                    absolute_urls.push(absolute);
                }
            }
            Err(error) => tracing::debug!("{}", error),
        }
    }

    absolute_urls
}

/// Determines the media type based on file extension
pub fn detect_media_type_by_file_name(filename: &str) -> Option<&'static str> {
    let filename_lowercased = filename.to_lowercase();

    if filename_lowercased.ends_with(".html") || filename_lowercased.ends_with(".htm") {
        Some("text/html")
    } else if filename_lowercased.ends_with(".xhtml") {
        Some("application/xhtml+xml")
    } else if filename_lowercased.ends_with(".css") {
        Some("text/css")
    } else if filename_lowercased.ends_with(".js") || filename_lowercased.ends_with(".mjs") {
        Some("application/javascript")
    } else {
        None
    }
}

/// Parses a Content-Type value into its media type and charset
pub fn parse_content_type(content_type: &str) -> (String, Option<String>) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_string();
    let charset = parts
        .map(str::trim)
        .find_map(|part| {
            part.get(..8)
                .filter(|key| key.eq_ignore_ascii_case("charset="))
                .map(|_| part[8..].trim_matches('"').to_string())
        })
        .filter(|charset| !charset.is_empty());

    (media_type, charset)
}

/// Absolutizes every URL against `base`, keeping the original when it cannot be resolved
pub fn absolutize_callback(base: Url) -> impl FnMut(&str) -> Option<String> {
    move |url| match join_reference(&base, url) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(ContentUrlsError::MalformedUrlReference { reference, .. }) => {
            tracing::debug!("keeping unresolvable reference '{}'", reference);
            None
        }
        Err(error) => {
            tracing::debug!("{}", error);
            None
        }
    }
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_options_builder() {
        let options = UrlOptions::new()
            .with_base_url(true)
            .with_content_url("http://a/");

        assert!(options.use_base_url);
        assert_eq!(options.content_url.as_deref(), Some("http://a/"));
        assert_eq!(UrlOptions::default(), UrlOptions::new());
    }

    #[test]
    fn test_effective_base_precedence() {
        let content_urls = ContentUrls::new();
        let html = "<html><head><base href='https://b/test/'></head></html>";
        let options = UrlOptions::new()
            .with_base_url(true)
            .with_content_url("http://a/sample/");

        let base = content_urls.effective_base(ContentParser::Html, html, &options);
        assert_eq!(base.map(|b| b.to_string()), Some("https://b/test/".to_string()));
    }

    #[test]
    fn test_effective_base_discards_relative_declared_base() {
        let content_urls = ContentUrls::new();
        let html = "<html><head><base href='/en/'></head></html>";
        let options = UrlOptions::new().with_base_url(true);

        assert_eq!(
            content_urls.effective_base(ContentParser::Html, html, &options),
            None
        );

        let options = options.with_content_url("http://a/sample/");
        assert_eq!(
            content_urls
                .effective_base(ContentParser::Html, html, &options)
                .map(|b| b.to_string()),
            Some("http://a/sample/".to_string())
        );
    }

    #[test]
    fn test_effective_base_ignores_declared_base_when_disabled() {
        let content_urls = ContentUrls::new();
        let html = "<html><head><base href='https://b/test/'></head></html>";
        let options = UrlOptions::new().with_content_url("http://a/sample/");

        assert_eq!(
            content_urls
                .effective_base(ContentParser::Html, html, &options)
                .map(|b| b.to_string()),
            Some("http://a/sample/".to_string())
        );
    }

    #[test]
    fn test_detect_media_type_by_file_name() {
        assert_eq!(detect_media_type_by_file_name("index.HTML"), Some("text/html"));
        assert_eq!(detect_media_type_by_file_name("page.xhtml"), Some("application/xhtml+xml"));
        assert_eq!(detect_media_type_by_file_name("style.css"), Some("text/css"));
        assert_eq!(
            detect_media_type_by_file_name("file.min.js"),
            Some("application/javascript")
        );
        assert_eq!(detect_media_type_by_file_name("photo.png"), None);
    }

    #[test]
    fn test_parse_content_type() {
        assert_eq!(
            parse_content_type("text/html; charset=\"GBK\""),
            ("text/html".to_string(), Some("GBK".to_string()))
        );
        assert_eq!(
            parse_content_type("text/css"),
            ("text/css".to_string(), None)
        );
        assert_eq!(
            parse_content_type("text/html;Charset=utf-8"),
            ("text/html".to_string(), Some("utf-8".to_string()))
        );
    }

    #[test]
    fn test_absolutize_callback() {
        let mut callback = absolutize_callback(Url::parse("http://h/dir/").unwrap());

        assert_eq!(callback("a.png"), Some("http://h/dir/a.png".to_string()));
        assert_eq!(callback("http://[::1"), None);
    }
}
