//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use content_urls::to_absolute;

    const BASE: &str = "http://www.sample.com/one/two/three/";

    #[test]
    fn relative_file() {
        assert_eq!(
            to_absolute(Some("index.html"), BASE),
            Some("http://www.sample.com/one/two/three/index.html".to_string())
        );
    }

    #[test]
    fn root_relative() {
        assert_eq!(
            to_absolute(Some("/index.html"), BASE),
            Some("http://www.sample.com/index.html".to_string())
        );
        assert_eq!(
            to_absolute(Some("/four/index.html"), BASE),
            Some("http://www.sample.com/four/index.html".to_string())
        );
    }

    #[test]
    fn parent_directory() {
        assert_eq!(
            to_absolute(Some("../index.html"), BASE),
            Some("http://www.sample.com/one/two/index.html".to_string())
        );
        assert_eq!(
            to_absolute(Some("../four/index.html"), BASE),
            Some("http://www.sample.com/one/two/four/index.html".to_string())
        );
    }

    #[test]
    fn strips_fragment() {
        assert_eq!(
            to_absolute(Some("index.html#section-2"), BASE),
            Some("http://www.sample.com/one/two/three/index.html".to_string())
        );
    }

    #[test]
    fn normalizes_escapes() {
        assert_eq!(
            to_absolute(Some("my%7efile.html"), BASE),
            Some("http://www.sample.com/one/two/three/my~file.html".to_string())
        );
        assert_eq!(
            to_absolute(Some("my file.html"), BASE),
            Some("http://www.sample.com/one/two/three/my%20file.html".to_string())
        );
    }

    #[test]
    fn forces_a_path() {
        assert_eq!(
            to_absolute(Some("http://other.example.com"), BASE),
            Some("http://other.example.com/".to_string())
        );
    }

    #[test]
    fn absolute_reference_wins() {
        assert_eq!(
            to_absolute(Some("https://cdn.example.com/a.js"), BASE),
            Some("https://cdn.example.com/a.js".to_string())
        );
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
    use content_urls::to_absolute;

    #[test]
    fn absent_url() {
        assert_eq!(to_absolute(None, "http://www.sample.com/"), None);
    }

    #[test]
    fn relative_base() {
        assert_eq!(to_absolute(Some("index.html"), "/one/two/"), None);
    }

    #[test]
    fn unparsable_reference() {
        assert_eq!(to_absolute(Some("http://[::1"), "http://www.sample.com/"), None);
    }
}
