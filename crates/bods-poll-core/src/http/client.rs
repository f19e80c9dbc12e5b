use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE, EXPIRES, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Method, Url};
use tracing::{debug, info, warn};

use crate::config::BodsConfig;
use crate::http::csrf::{self, CsrfStrategy, CsrfToken};
use crate::http::errors::{CsrfError, HttpError};

/// Connection settings for an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientSettings {
    /// Origin that every request must share.
    pub base_url: String,
    /// Raw `Cookie` header value sent with every request.
    pub cookie: Option<String>,
    /// Header the CSRF token is sent in on POST.
    pub csrf_header: String,
    /// Per-request timeout. `None` lets a request hang indefinitely.
    pub timeout: Option<Duration>,
}

impl HttpClientSettings {
    pub fn from_config(config: &BodsConfig) -> Self {
        Self {
            base_url: config.portal.base_url().to_string(),
            cookie: config.portal.cookie.clone(),
            csrf_header: config.csrf.header_name().to_string(),
            timeout: config.poll.request_timeout(),
        }
    }
}

/// Credentialed, same-origin JSON client.
///
/// Requests to any origin other than `base_url` are refused before they are
/// sent. Non-2xx responses become [`HttpError::Status`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Url,
    cookie: Option<String>,
    csrf_header: String,
    csrf_token: Option<CsrfToken>,
}

impl HttpClient {
    pub fn new(settings: HttpClientSettings) -> Result<Self, HttpError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| HttpError::InvalidUrl {
            url: settings.base_url.clone(),
            message: e.to_string(),
        })?;

        let mut builder = reqwest::Client::builder()
            .default_headers(no_cache_headers())
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let inner = builder.build()?;

        Ok(Self {
            inner,
            base_url,
            cookie: settings.cookie,
            csrf_header: settings.csrf_header,
            csrf_token: None,
        })
    }

    pub fn from_config(config: &BodsConfig) -> Result<Self, HttpError> {
        Self::new(HttpClientSettings::from_config(config))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Inject a resolved CSRF token. Subsequent POSTs send it.
    pub fn with_csrf_token(mut self, token: CsrfToken) -> Self {
        self.csrf_token = Some(token);
        self
    }

    pub fn csrf_token(&self) -> Option<&CsrfToken> {
        self.csrf_token.as_ref()
    }

    /// A copy of this client bound to a different origin, keeping the
    /// session cookie and CSRF token.
    ///
    /// The portal shares its session cookie across sibling subdomains, so the
    /// `publish` and `data` hosts accept the same credentials.
    pub fn for_origin(&self, base_url: Url) -> Self {
        Self {
            base_url,
            ..self.clone()
        }
    }

    /// Resolve `path_or_url` against the base URL and check it is same-origin.
    pub fn url(&self, path_or_url: &str) -> Result<Url, HttpError> {
        let url = self
            .base_url
            .join(path_or_url)
            .map_err(|e| HttpError::InvalidUrl {
                url: path_or_url.to_string(),
                message: e.to_string(),
            })?;

        if url.origin() != self.base_url.origin() {
            warn!(
                event = "core.http.cross_origin_rejected",
                url = %url,
                origin = %self.base_url
            );
            return Err(HttpError::CrossOrigin {
                url: url.to_string(),
            });
        }

        Ok(url)
    }

    /// Resolve the CSRF token with the given strategy.
    ///
    /// `form_path` is only fetched for [`CsrfStrategy::HiddenField`].
    pub async fn resolve_csrf(
        &self,
        strategy: &CsrfStrategy,
        form_path: &str,
    ) -> Result<CsrfToken, CsrfError> {
        info!(
            event = "core.http.csrf_resolve_started",
            strategy = strategy.kind(),
            name = strategy.name()
        );

        let token = match strategy {
            CsrfStrategy::Cookie { name } => {
                let cookie = self
                    .cookie
                    .as_deref()
                    .ok_or_else(|| CsrfError::NoCookie { name: name.clone() })?;
                csrf::token_from_cookie(cookie, name)?
            }
            CsrfStrategy::HiddenField { name } => {
                let html = self.get_text(form_path).await?;
                csrf::token_from_html(&html, name)?
            }
        };

        info!(
            event = "core.http.csrf_resolve_completed",
            strategy = strategy.kind()
        );
        Ok(token)
    }

    /// GET a JSON document.
    pub async fn get_json(&self, path_or_url: &str) -> Result<serde_json::Value, HttpError> {
        let url = self.url(path_or_url)?;
        let body = self.send(self.request(Method::GET, url)).await?;
        decode_json(&body)
    }

    /// GET a text document, such as a form page.
    pub async fn get_text(&self, path_or_url: &str) -> Result<String, HttpError> {
        let url = self.url(path_or_url)?;
        let body = self.send(self.request(Method::GET, url)).await?;
        String::from_utf8(body).map_err(|e| HttpError::Decode {
            message: e.to_string(),
        })
    }

    /// POST a JSON body with the CSRF header attached.
    ///
    /// An empty response body decodes to `null`.
    pub async fn post_json(
        &self,
        path_or_url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let url = self.url(path_or_url)?;
        let token = self
            .csrf_token
            .as_ref()
            .ok_or_else(|| HttpError::MissingCsrfToken {
                url: url.to_string(),
            })?;

        let payload = serde_json::to_vec(body).map_err(|e| HttpError::Decode {
            message: e.to_string(),
        })?;
        let request = self
            .request(Method::POST, url)
            .header(self.csrf_header.as_str(), token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(payload);

        let body = self.send(request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        decode_json(&body)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.inner.request(method, url);
        match &self.cookie {
            Some(cookie) => builder.header(COOKIE, cookie.as_str()),
            None => builder,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, HttpError> {
        let response = request.send().await?;
        let status = response.status();

        debug!(
            event = "core.http.response_received",
            url = %response.url(),
            status = status.as_u16()
        );

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers
}

fn decode_json(body: &[u8]) -> Result<serde_json::Value, HttpError> {
    serde_json::from_slice(body).map_err(|e| HttpError::Decode {
        message: e.to_string(),
    })
}
