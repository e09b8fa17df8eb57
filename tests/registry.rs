//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use content_urls::parsers::JsScanMode;
    use content_urls::{ContentParser, ContentUrls, MediaTypePattern, ParserRegistry, UrlOptions};

    #[test]
    fn default_table_order() {
        let registry = ParserRegistry::default();
        let patterns: Vec<String> = registry
            .bindings()
            .iter()
            .map(|binding| binding.pattern.to_string())
            .collect();

        assert_eq!(
            patterns,
            vec![
                "text/html",
                "application/xhtml+xml",
                "text/css",
                "html-inline-style",
                "application/x-javascript",
                "application/javascript",
                "text/javascript",
            ]
        );
    }

    #[test]
    fn parameters_are_ignored() {
        let registry = ParserRegistry::default();

        assert_eq!(registry.resolve("text/css; charset=utf-8"), Some(ContentParser::Css));
        assert_eq!(registry.resolve("text/html;q=0.9"), Some(ContentParser::Html));
    }

    #[test]
    fn custom_registration_extends_the_facade() {
        let mut content_urls = ContentUrls::new();
        content_urls.register_parser(ContentParser::Html, ["image/svg+xml"]);

        let svg = r#"<svg><image href="x.png"/><a href="y.html">y</a></svg>"#;
        assert_eq!(
            content_urls.urls(svg, "image/svg+xml", &UrlOptions::default()),
            vec!["y.html"]
        );
    }

    #[test]
    fn regex_pattern() {
        let mut registry = ParserRegistry::new();
        registry.register(
            MediaTypePattern::regex(r"^text/(x-)?less\b").unwrap(),
            ContentParser::Css,
        );

        assert_eq!(registry.resolve("text/less"), Some(ContentParser::Css));
        assert_eq!(registry.resolve("text/x-less"), Some(ContentParser::Css));
        assert_eq!(registry.resolve("text/lesser"), None);
    }

    #[test]
    fn overlapping_patterns_resolve_by_registration_order() {
        let mut registry = ParserRegistry::new();
        registry.register_parser(ContentParser::Css, ["text"]);
        registry.register_parser(ContentParser::Html, ["text/html"]);

        assert_eq!(registry.resolve("text/html"), Some(ContentParser::Css));
    }

    #[test]
    fn js_mode_is_part_of_the_binding() {
        let registry = ParserRegistry::with_js_mode(JsScanMode::PlainText);
        assert_eq!(
            registry.resolve("application/javascript"),
            Some(ContentParser::JavaScript(JsScanMode::PlainText))
        );
    }

    #[test]
    fn shared_between_threads() {
        use std::sync::Arc;
        use std::thread;

        let content_urls = Arc::new(ContentUrls::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let content_urls = Arc::clone(&content_urls);
                thread::spawn(move || {
                    let css = format!("a {{ background: url({}.png) }}", i);
                    content_urls.urls(&css, "text/css", &UrlOptions::default())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), vec![format!("{}.png", i)]);
        }
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use content_urls::{ContentParser, ContentUrlsError, ParserRegistry};

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(ParserRegistry::default().resolve("Text/HTML"), None);
    }

    #[test]
    fn prefix_must_end_at_a_boundary() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.resolve("text/htmlfragment"), None);
        assert_eq!(registry.resolve("text/css2"), None);
    }

    #[test]
    fn unknown_media_type() {
        let registry = ParserRegistry::default();
        assert_eq!(
            registry.require("bogus/bogus"),
            Err(ContentUrlsError::UnrecognizedMediaType("bogus/bogus".to_string()))
        );
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = ParserRegistry::new();
        assert_eq!(registry.resolve("text/html"), None::<ContentParser>);
    }
}
