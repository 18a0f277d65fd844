use std::num::NonZeroU32;
use std::time::Duration;

use widgets_core::wait::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use widgets_core::{Backoff, WaitPolicy};

use crate::errors::ConfigError;

/// Cap on the exponential backoff delay unless overridden.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime settings read from the environment.
///
/// AWS region and credentials are not listed here; they come from the
/// standard AWS provider chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// `DYNAMODB_ENDPOINT_URL`: alternative endpoint, e.g. DynamoDB Local.
    pub endpoint_url: Option<String>,
    /// `WIDGETS_POLL_*`: bounds on the readiness poll.
    pub wait: WaitPolicy,
    /// `LOG_FORMAT`: `text` or `json`.
    pub log_format: LogFormat,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint_url = lookup("DYNAMODB_ENDPOINT_URL").filter(|url| !url.is_empty());

        let interval = match lookup("WIDGETS_POLL_INTERVAL") {
            Some(value) => parse_delay("WIDGETS_POLL_INTERVAL", &value)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let max_attempts = match lookup("WIDGETS_POLL_MAX_ATTEMPTS") {
            Some(value) => value
                .parse::<NonZeroU32>()
                .map_err(|e| ConfigError::invalid("WIDGETS_POLL_MAX_ATTEMPTS", &value, e))?
                .get(),
            None => DEFAULT_MAX_ATTEMPTS,
        };

        let backoff = match lookup("WIDGETS_POLL_BACKOFF").as_deref() {
            None | Some("fixed") => Backoff::Fixed,
            Some("exponential") => {
                let max_delay = match lookup("WIDGETS_POLL_MAX_DELAY") {
                    Some(value) => parse_delay("WIDGETS_POLL_MAX_DELAY", &value)?,
                    None => DEFAULT_MAX_DELAY,
                };
                Backoff::Exponential { max_delay }
            }
            Some(other) => {
                return Err(ConfigError::invalid(
                    "WIDGETS_POLL_BACKOFF",
                    other,
                    "expected `fixed` or `exponential`",
                ));
            }
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "LOG_FORMAT",
                    other,
                    "expected `text` or `json`",
                ));
            }
        };

        Ok(Self {
            endpoint_url,
            wait: WaitPolicy {
                interval,
                max_attempts,
                backoff,
            },
            log_format,
        })
    }
}

/// Parse a non-zero delay: humantime shorthand ("500ms", "2s", "1m") or raw
/// milliseconds ("750").
fn parse_delay(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let delay = match humantime::parse_duration(value) {
        Ok(d) => d,
        Err(_) => value.parse::<u64>().map(Duration::from_millis).map_err(|_| {
            ConfigError::invalid(var, value, "expected a duration like `500ms` or `2s`")
        })?,
    };

    if delay.is_zero() {
        return Err(ConfigError::invalid(var, value, "must be greater than zero"));
    }
    Ok(delay)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<DemoConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DemoConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.endpoint_url, None);
        assert_eq!(config.wait, WaitPolicy::default());
        assert_eq!(config.wait.interval, Duration::from_millis(500));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DYNAMODB_ENDPOINT_URL", "http://localhost:8000"),
            ("WIDGETS_POLL_INTERVAL", "2s"),
            ("WIDGETS_POLL_MAX_ATTEMPTS", "10"),
            ("WIDGETS_POLL_BACKOFF", "exponential"),
            ("WIDGETS_POLL_MAX_DELAY", "30s"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.wait.interval, Duration::from_secs(2));
        assert_eq!(config.wait.max_attempts, 10);
        assert_eq!(
            config.wait.backoff,
            Backoff::Exponential {
                max_delay: Duration::from_secs(30)
            }
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn empty_endpoint_is_ignored() {
        let config = config_from(&[("DYNAMODB_ENDPOINT_URL", "")]).unwrap();
        assert_eq!(config.endpoint_url, None);
    }

    #[test]
    fn parse_humantime_and_raw_millis() {
        assert_eq!(
            parse_delay("X", "500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(
            parse_delay("X", "1m30s").unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(parse_delay("X", "750").unwrap(), Duration::from_millis(750));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("WIDGETS_POLL_INTERVAL", "soon")]).is_err());
        assert!(config_from(&[("WIDGETS_POLL_MAX_ATTEMPTS", "-1")]).is_err());
        assert!(config_from(&[("WIDGETS_POLL_BACKOFF", "linear")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn rejects_zero_attempts_and_zero_delays() {
        assert!(config_from(&[("WIDGETS_POLL_MAX_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("WIDGETS_POLL_INTERVAL", "0")]).is_err());
        assert!(config_from(&[("WIDGETS_POLL_INTERVAL", "0s")]).is_err());
        assert!(
            config_from(&[
                ("WIDGETS_POLL_BACKOFF", "exponential"),
                ("WIDGETS_POLL_MAX_DELAY", "0ms"),
            ])
            .is_err()
        );
    }

    #[test]
    fn max_delay_only_read_for_exponential_backoff() {
        let config = config_from(&[
            ("WIDGETS_POLL_BACKOFF", "fixed"),
            ("WIDGETS_POLL_MAX_DELAY", "whenever"),
        ])
        .unwrap();
        assert_eq!(config.wait.backoff, Backoff::Fixed);

        let config = config_from(&[("WIDGETS_POLL_BACKOFF", "exponential")]).unwrap();
        assert_eq!(
            config.wait.backoff,
            Backoff::Exponential {
                max_delay: Duration::from_secs(5)
            }
        );
    }

    #[test]
    fn error_names_the_variable() {
        let err = config_from(&[("WIDGETS_POLL_INTERVAL", "soon")]).unwrap_err();
        assert!(err.to_string().contains("WIDGETS_POLL_INTERVAL"));
    }
}
