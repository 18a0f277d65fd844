use std::fmt::Display;

use widgets_core::CoreError;

/// Invalid environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(var: &'static str, value: &str, reason: impl Display) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from the demo binary.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Error reading settings from the environment.
    #[error("demo config error: {0}")]
    Config(#[from] ConfigError),
    /// Error while provisioning the table or round-tripping the item.
    #[error("demo core error: {0}")]
    Core(#[from] CoreError),
}
