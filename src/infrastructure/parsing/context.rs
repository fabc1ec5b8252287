//! Parsing context for HTML extraction

use url::Url;

use super::{ParsingError, ParsingResult};

/// Where the document being parsed came from
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// URL the document was fetched from; relative links resolve against it
    pub url: String,
}

impl ParseContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Resolve a possibly relative `href` to an absolute URL
    pub fn resolve_url(&self, href: &str) -> ParsingResult<String> {
        let base = Url::parse(&self.url).map_err(|e| ParsingError::UrlResolutionFailed {
            url: self.url.clone(),
            reason: format!("Invalid base URL: {}", e),
            base_url: None,
        })?;

        base.join(href.trim())
            .map(String::from)
            .map_err(|e| ParsingError::UrlResolutionFailed {
                url: href.to_string(),
                reason: format!("Failed to join URL: {}", e),
                base_url: Some(self.url.clone()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolution() {
        let context = ParseContext::new("https://www.thomann.de/intl/mythomann_orderlist.html");

        assert_eq!(
            context.resolve_url("/intl/order_123.html").unwrap(),
            "https://www.thomann.de/intl/order_123.html"
        );
        assert_eq!(
            context.resolve_url("https://other.com/test").unwrap(),
            "https://other.com/test"
        );
        assert_eq!(
            context.resolve_url("mythomann_order.html?id=7").unwrap(),
            "https://www.thomann.de/intl/mythomann_order.html?id=7"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let context = ParseContext::new("not a url");
        assert!(matches!(
            context.resolve_url("/x"),
            Err(ParsingError::UrlResolutionFailed { base_url: None, .. })
        ));
    }
}
