//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.bods/config.toml` (global user preferences)
//! 3. **Project config** - `./.bods/config.toml` (working-directory overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)

use crate::config::types::{
    BodsConfig, CsrfConfig, PollConfig, PortalConfig, SessionTimeoutConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration from the hierarchy of config files.
///
/// Loads and merges configuration from:
/// 1. Default values
/// 2. User config (`~/.bods/config.toml`)
/// 3. Project config (`./.bods/config.toml`)
///
/// # Errors
///
/// Returns an error if a file exists but cannot be parsed, or if validation
/// fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<BodsConfig, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".bods").join("config.toml"));
    }
    paths.push(std::env::current_dir()?.join(".bods").join("config.toml"));

    Ok(load_from_paths(&paths)?)
}

/// Load and merge the given config files in order, skipping missing ones.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<BodsConfig, ConfigError> {
    let mut config = BodsConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(file_config) => config = merge_configs(config, file_config),
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<BodsConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with override_config taking precedence.
///
/// Optional fields from the override replace base values only if present.
pub fn merge_configs(base: BodsConfig, override_config: BodsConfig) -> BodsConfig {
    BodsConfig {
        portal: PortalConfig {
            base_url: override_config.portal.base_url.or(base.portal.base_url),
            api_root: override_config.portal.api_root.or(base.portal.api_root),
            cookie: override_config.portal.cookie.or(base.portal.cookie),
        },
        poll: PollConfig {
            interval_ms: override_config.poll.interval_ms.or(base.poll.interval_ms),
            dqs_interval_ms: override_config
                .poll
                .dqs_interval_ms
                .or(base.poll.dqs_interval_ms),
            request_timeout_ms: override_config
                .poll
                .request_timeout_ms
                .or(base.poll.request_timeout_ms),
            sequencing: override_config.poll.sequencing.or(base.poll.sequencing),
            success_statuses: override_config
                .poll
                .success_statuses
                .or(base.poll.success_statuses),
        },
        csrf: CsrfConfig {
            strategy: override_config.csrf.strategy.or(base.csrf.strategy),
            cookie_name: override_config.csrf.cookie_name.or(base.csrf.cookie_name),
            field_name: override_config.csrf.field_name.or(base.csrf.field_name),
            header_name: override_config.csrf.header_name.or(base.csrf.header_name),
            form_path: override_config.csrf.form_path.or(base.csrf.form_path),
        },
        session_timeout: SessionTimeoutConfig {
            timeout_secs: override_config
                .session_timeout
                .timeout_secs
                .or(base.session_timeout.timeout_secs),
            warning_secs: override_config
                .session_timeout
                .warning_secs
                .or(base.session_timeout.warning_secs),
            keep_alive_path: override_config
                .session_timeout
                .keep_alive_path
                .or(base.session_timeout.keep_alive_path),
            logout_path: override_config
                .session_timeout
                .logout_path
                .or(base.session_timeout.logout_path),
        },
    }
}
