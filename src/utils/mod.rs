//! Utility functions and helpers.

pub mod http;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
///
/// Falls back to `href` unchanged when `base` is not a valid URL.
pub fn resolve(base_url: &str, href: &str) -> String {
    match Url::parse(base_url) {
        Ok(base) => resolve_url(&base, href),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/sitemaps/index.xml").unwrap();
        assert_eq!(
            resolve_url(&base, "page-1.xml"),
            "https://example.com/sitemaps/page-1.xml"
        );
        assert_eq!(
            resolve_url(&base, "/sitemap.xml?page=2"),
            "https://example.com/sitemap.xml?page=2"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x.xml"),
            "https://other.com/x.xml"
        );
    }

    #[test]
    fn test_resolve_with_invalid_base() {
        assert_eq!(resolve("not a url", "/a.xml"), "/a.xml");
    }
}
