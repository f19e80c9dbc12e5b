//! CSRF token discovery.
//!
//! The portal exposes its CSRF token in two places: a hidden
//! `csrfmiddlewaretoken` form input and a `csrftoken` cookie. Neither is
//! authoritative, so both are available as strategies. The chosen strategy is
//! resolved once when a client is built and the token is injected into it.

use crate::config::CsrfConfig;
use crate::errors::ConfigError;
use crate::http::errors::CsrfError;
use regex::Regex;
use std::sync::LazyLock;

static INPUT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("input tag pattern is valid"));

static NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']([^"']*)["']"#).expect("name attribute pattern is valid")
});

static VALUE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bvalue\s*=\s*["']([^"']*)["']"#).expect("value attribute pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrfStrategy {
    /// Scrape a hidden `<input>` from a server-rendered form page.
    HiddenField { name: String },
    /// Read a cookie from the configured `Cookie` header.
    Cookie { name: String },
}

/// A resolved CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CsrfStrategy {
    pub fn from_config(config: &CsrfConfig) -> Result<Self, ConfigError> {
        match config.strategy() {
            "cookie" => Ok(CsrfStrategy::Cookie {
                name: config.cookie_name().to_string(),
            }),
            "field" => Ok(CsrfStrategy::HiddenField {
                name: config.field_name().to_string(),
            }),
            other => Err(ConfigError::InvalidCsrfStrategy {
                strategy: other.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CsrfStrategy::HiddenField { .. } => "field",
            CsrfStrategy::Cookie { .. } => "cookie",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CsrfStrategy::HiddenField { name } | CsrfStrategy::Cookie { name } => name,
        }
    }
}

/// Find the value of the hidden input called `name` in an HTML document.
pub fn token_from_html(html: &str, name: &str) -> Result<CsrfToken, CsrfError> {
    INPUT_TAG
        .find_iter(html)
        .map(|tag| tag.as_str())
        .filter(|tag| {
            NAME_ATTR
                .captures(tag)
                .is_some_and(|caps| &caps[1] == name)
        })
        .find_map(|tag| VALUE_ATTR.captures(tag).map(|caps| caps[1].to_string()))
        .filter(|value| !value.is_empty())
        .map(CsrfToken)
        .ok_or_else(|| CsrfError::TokenNotFound {
            strategy: "field",
            name: name.to_string(),
        })
}

/// Find the cookie called `name` in a raw `Cookie` header value.
pub fn token_from_cookie(cookie_header: &str, name: &str) -> Result<CsrfToken, CsrfError> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| CsrfToken(value.to_string()))
        .ok_or_else(|| CsrfError::TokenNotFound {
            strategy: "cookie",
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_html_finds_hidden_field() {
        let html = r#"
<form method="post">
  <input type="hidden" name="csrfmiddlewaretoken" value="abc123">
  <input type="text" name="q" value="">
</form>"#;
        let token = token_from_html(html, "csrfmiddlewaretoken").unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn test_token_from_html_attribute_order_independent() {
        let html = r#"<INPUT value='tok-9' type='hidden' name='csrfmiddlewaretoken' />"#;
        let token = token_from_html(html, "csrfmiddlewaretoken").unwrap();
        assert_eq!(token.as_str(), "tok-9");
    }

    #[test]
    fn test_token_from_html_ignores_similar_names() {
        let html = r#"<input name="csrfmiddlewaretoken_old" value="stale">"#;
        let err = token_from_html(html, "csrfmiddlewaretoken").unwrap_err();
        assert!(matches!(err, CsrfError::TokenNotFound { strategy: "field", .. }));
    }

    #[test]
    fn test_token_from_cookie() {
        let token =
            token_from_cookie("sessionid=s1; csrftoken=xyz; theme=dark", "csrftoken").unwrap();
        assert_eq!(token.as_str(), "xyz");
    }

    #[test]
    fn test_token_from_cookie_missing() {
        let err = token_from_cookie("sessionid=s1", "csrftoken").unwrap_err();
        assert!(matches!(err, CsrfError::TokenNotFound { strategy: "cookie", .. }));
    }

    #[test]
    fn test_token_from_cookie_empty_value() {
        assert!(token_from_cookie("csrftoken=", "csrftoken").is_err());
    }

    #[test]
    fn test_strategy_from_config() {
        let mut config = CsrfConfig::default();
        assert_eq!(
            CsrfStrategy::from_config(&config).unwrap(),
            CsrfStrategy::Cookie {
                name: "csrftoken".to_string()
            }
        );

        config.strategy = Some("field".to_string());
        let strategy = CsrfStrategy::from_config(&config).unwrap();
        assert_eq!(strategy.kind(), "field");
        assert_eq!(strategy.name(), "csrfmiddlewaretoken");

        config.strategy = Some("meta".to_string());
        assert!(CsrfStrategy::from_config(&config).is_err());
    }
}
