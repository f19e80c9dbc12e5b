use crate::errors::BodsError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("Network request failed: {message}")]
    Network { message: String },

    #[error("Refusing cross-origin request to '{url}'")]
    CrossOrigin { url: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to decode response body: {message}")]
    Decode { message: String },

    #[error("No CSRF token available for POST to '{url}'")]
    MissingCsrfToken { url: String },
}

impl BodsError for HttpError {
    fn error_code(&self) -> &'static str {
        match self {
            HttpError::Status { .. } => "HTTP_STATUS",
            HttpError::Network { .. } => "HTTP_NETWORK",
            HttpError::CrossOrigin { .. } => "HTTP_CROSS_ORIGIN",
            HttpError::InvalidUrl { .. } => "HTTP_INVALID_URL",
            HttpError::Decode { .. } => "HTTP_DECODE",
            HttpError::MissingCsrfToken { .. } => "HTTP_MISSING_CSRF_TOKEN",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            HttpError::CrossOrigin { .. }
                | HttpError::InvalidUrl { .. }
                | HttpError::MissingCsrfToken { .. }
        )
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return HttpError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            };
        }
        HttpError::Network {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CsrfError {
    #[error("CSRF {strategy} '{name}' not found")]
    TokenNotFound {
        strategy: &'static str,
        name: String,
    },

    #[error("No cookie configured to read CSRF cookie '{name}' from")]
    NoCookie { name: String },

    #[error("Failed to fetch CSRF form page: {source}")]
    FormFetch {
        #[from]
        source: HttpError,
    },
}

impl BodsError for CsrfError {
    fn error_code(&self) -> &'static str {
        match self {
            CsrfError::TokenNotFound { .. } => "CSRF_TOKEN_NOT_FOUND",
            CsrfError::NoCookie { .. } => "CSRF_NO_COOKIE",
            CsrfError::FormFetch { .. } => "CSRF_FORM_FETCH_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, CsrfError::NoCookie { .. })
    }
}
