//! Registry configuration
//!
//! Re-exports the shared `RegistryConfig` from xztimer-types and provides
//! persistence through confy.

use xztimer_types::RegistryConfig;

use super::error::ConfigError;

pub const APP_NAME: &str = "xztimer";
pub const CONFIG_NAME: &str = "config";

/// Extension trait for RegistryConfig persistence
pub trait RegistryConfigExt: Sized {
    /// Load, falling back to defaults when the file is missing or unreadable
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl RegistryConfigExt for RegistryConfig {
    fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        let config: RegistryConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.identifier_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "identifier_prefix must not be empty".to_string(),
            });
        }
        if self.default_interval_ms <= 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "default_interval_ms must be positive, got {}",
                    self.default_interval_ms
                ),
            });
        }
        Ok(())
    }
}
