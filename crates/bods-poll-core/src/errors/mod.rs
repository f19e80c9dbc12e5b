use std::error::Error;

/// Base trait for all application errors
pub trait BodsError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at '{path}'")]
    ConfigNotFound { path: String },

    #[error("Failed to parse config file: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid URL for '{field}': '{value}'")]
    InvalidUrl { field: String, value: String },

    #[error("Invalid CSRF strategy '{strategy}'. Supported strategies: cookie, field")]
    InvalidCsrfStrategy { strategy: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl BodsError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidUrl { .. } => "CONFIG_INVALID_URL",
            ConfigError::InvalidCsrfStrategy { .. } => "INVALID_CSRF_STRATEGY",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigParseError { .. }
                | ConfigError::InvalidUrl { .. }
                | ConfigError::InvalidCsrfStrategy { .. }
                | ConfigError::InvalidConfiguration { .. }
        )
    }
}
