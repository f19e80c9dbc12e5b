//! Configuration validation logic.

use crate::config::types::BodsConfig;
use crate::errors::ConfigError;
use reqwest::Url;

/// Valid CSRF discovery strategies.
pub const VALID_CSRF_STRATEGIES: [&str; 2] = ["cookie", "field"];

/// Validate a BodsConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - `portal.base_url` must be an absolute http(s) URL
/// - Poll intervals must be greater than zero
/// - `csrf.strategy` must be one of [`VALID_CSRF_STRATEGIES`]
/// - The timeout warning must be shorter than the timeout itself
pub fn validate_config(config: &BodsConfig) -> Result<(), ConfigError> {
    let base_url = config.portal.base_url();
    match Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => {
            return Err(ConfigError::InvalidUrl {
                field: "portal.base_url".to_string(),
                value: base_url.to_string(),
            });
        }
    }

    if config.poll.interval().is_zero() || config.poll.dqs_interval().is_zero() {
        return Err(ConfigError::InvalidConfiguration {
            message: "Poll intervals must be greater than 0ms".to_string(),
        });
    }

    if let Some(statuses) = &config.poll.success_statuses
        && statuses.is_empty()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "poll.success_statuses cannot be empty".to_string(),
        });
    }

    let strategy = config.csrf.strategy();
    if !VALID_CSRF_STRATEGIES.contains(&strategy) {
        return Err(ConfigError::InvalidCsrfStrategy {
            strategy: strategy.to_string(),
        });
    }

    if config.session_timeout.warning() >= config.session_timeout.timeout() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "session_timeout.warning_secs ({}) must be less than timeout_secs ({})",
                config.session_timeout.warning().as_secs(),
                config.session_timeout.timeout().as_secs()
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BodsConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = BodsConfig::default();
        config.portal.base_url = Some("not a url".to_string());
        assert!(matches!(
            validate_config(&config).unwrap_err(),
            ConfigError::InvalidUrl { .. }
        ));
    }

    #[test]
    fn test_non_http_base_url() {
        let mut config = BodsConfig::default();
        config.portal.base_url = Some("ftp://example.com".to_string());
        assert!(matches!(
            validate_config(&config).unwrap_err(),
            ConfigError::InvalidUrl { .. }
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = BodsConfig::default();
        config.poll.interval_ms = Some(0);
        assert!(matches!(
            validate_config(&config).unwrap_err(),
            ConfigError::InvalidConfiguration { .. }
        ));
    }

    #[test]
    fn test_empty_success_statuses_rejected() {
        let mut config = BodsConfig::default();
        config.poll.success_statuses = Some(vec![]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_csrf_strategy() {
        let mut config = BodsConfig::default();
        config.csrf.strategy = Some("header".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidCsrfStrategy { ref strategy } if strategy == "header"
        ));
    }

    #[test]
    fn test_warning_longer_than_timeout() {
        let mut config = BodsConfig::default();
        config.session_timeout.timeout_secs = Some(60);
        config.session_timeout.warning_secs = Some(60);
        assert!(validate_config(&config).is_err());
    }
}
