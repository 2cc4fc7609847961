mod config;
mod error;

pub use config::{APP_NAME, CONFIG_NAME, RegistryConfigExt};
pub use error::ConfigError;
pub use xztimer_types::RegistryConfig;
