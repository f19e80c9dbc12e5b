//! # Configuration System
//!
//! Hierarchical TOML configuration for the BODS status pollers.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.bods/config.toml` (global user preferences)
//! 3. **Project config** - `./.bods/config.toml` (working-directory overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.bods/config.toml
//! [portal]
//! base_url = "https://publish.bus-data.dft.gov.uk"
//! cookie = "sessionid=abc; csrftoken=xyz"
//!
//! [poll]
//! interval_ms = 5000
//!
//! [csrf]
//! strategy = "cookie"
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use bods_poll_core::config::BodsConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BodsConfig::load_hierarchy()?;
//!     let interval = config.poll.interval();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{BodsConfig, CsrfConfig, PollConfig, PortalConfig, SessionTimeoutConfig};
pub use validation::{VALID_CSRF_STRATEGIES, validate_config};

impl BodsConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, Box<dyn std::error::Error>> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
