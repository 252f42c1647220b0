//! Provider configuration.
//!
//! Values come from the provider configuration block first and fall back to
//! the conventional Datadog environment variables.

use crate::schema::{Attribute, Diagnostic, Schema};
use crate::state::StateReader;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.datadoghq.com/";

/// Default HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 60;

const API_KEY_ENV: &[&str] = &["DD_API_KEY", "DATADOG_API_KEY"];
const APP_KEY_ENV: &[&str] = &["DD_APP_KEY", "DATADOG_APP_KEY"];
const API_URL_ENV: &[&str] = &["DD_HOST", "DATADOG_HOST"];

/// How long to wait for a newly created dashboard to become readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Overall deadline.
    pub timeout: Duration,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound of the delay between retries.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to use after `current`, doubling up to `max_backoff`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20 * 60),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// Resolved provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Datadog API key.
    pub api_key: String,
    /// Datadog application key.
    pub app_key: String,
    /// Base URL of the API.
    pub api_url: String,
    /// Check the keys against the API during configure.
    pub validate: bool,
    /// Timeout of each HTTP request.
    pub http_timeout: Duration,
    /// Wait policy after create.
    pub retry: RetryPolicy,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("validate", &self.validate)
            .field("http_timeout", &self.http_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration with explicit keys and defaults elsewhere.
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_key: app_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            validate: true,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the client at another API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Enable or disable credential validation during configure.
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Replace the create wait policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Schema of the provider configuration block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Datadog API key. Falls back to DD_API_KEY or DATADOG_API_KEY."),
            )
            .with_attribute(
                "app_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Datadog application key. Falls back to DD_APP_KEY or DATADOG_APP_KEY."),
            )
            .with_attribute(
                "api_url",
                Attribute::optional_string()
                    .with_description("API endpoint. Falls back to DD_HOST or DATADOG_HOST."),
            )
            .with_attribute(
                "validate",
                Attribute::optional_bool()
                    .with_description("Validate the keys during configure.")
                    .with_default(json!(true)),
            )
            .with_attribute(
                "http_timeout_seconds",
                Attribute::optional_int64()
                    .with_description("Timeout of each API request in seconds.")
                    .with_default(json!(DEFAULT_HTTP_TIMEOUT_SECONDS)),
            )
    }

    /// Resolve the configuration block against the process environment.
    pub fn resolve(config: &Value) -> Result<Self, Vec<Diagnostic>> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve the configuration block with a custom environment lookup.
    pub fn resolve_with<F>(config: &Value, env: F) -> Result<Self, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = StateReader::new(config);
        let lookup = |key: &str, names: &[&str]| {
            reader.string(key).or_else(|| {
                names
                    .iter()
                    .filter_map(|name| env(name))
                    .find(|value| !value.is_empty())
            })
        };

        let mut diagnostics = Vec::new();
        let api_key = lookup("api_key", API_KEY_ENV);
        if api_key.is_none() {
            diagnostics.push(
                Diagnostic::error("Missing Datadog API key")
                    .with_detail("Set api_key or the DD_API_KEY environment variable")
                    .with_attribute("api_key"),
            );
        }
        let app_key = lookup("app_key", APP_KEY_ENV);
        if app_key.is_none() {
            diagnostics.push(
                Diagnostic::error("Missing Datadog application key")
                    .with_detail("Set app_key or the DD_APP_KEY environment variable")
                    .with_attribute("app_key"),
            );
        }

        let timeout = reader
            .int("http_timeout_seconds")
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS as i64);
        if timeout <= 0 {
            diagnostics.push(
                Diagnostic::error("http_timeout_seconds must be positive")
                    .with_attribute("http_timeout_seconds"),
            );
        }

        match (api_key, app_key) {
            (Some(api_key), Some(app_key)) if diagnostics.is_empty() => Ok(Self {
                api_key,
                app_key,
                api_url: lookup("api_url", API_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                validate: reader.bool("validate").unwrap_or(true),
                http_timeout: Duration::from_secs(timeout as u64),
                retry: RetryPolicy::default(),
            }),
            _ => Err(diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_block_wins_over_environment() {
        let config = json!({"api_key": "from-config", "app_key": "app", "validate": false});
        let resolved =
            ProviderConfig::resolve_with(&config, env_of(&[("DD_API_KEY", "from-env")])).unwrap();

        assert_eq!(resolved.api_key, "from-config");
        assert!(!resolved.validate);
        assert_eq!(resolved.api_url, DEFAULT_API_URL);
        assert_eq!(resolved.http_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_environment_fallbacks_in_order() {
        let env = env_of(&[
            ("DD_API_KEY", ""),
            ("DATADOG_API_KEY", "datadog-api"),
            ("DD_APP_KEY", "dd-app"),
            ("DATADOG_APP_KEY", "datadog-app"),
            ("DATADOG_HOST", "https://api.datadoghq.eu/"),
        ]);
        let resolved = ProviderConfig::resolve_with(&json!({}), env).unwrap();

        assert_eq!(resolved.api_key, "datadog-api");
        assert_eq!(resolved.app_key, "dd-app");
        assert_eq!(resolved.api_url, "https://api.datadoghq.eu/");
        assert!(resolved.validate);
    }

    #[test]
    fn test_missing_keys_are_diagnostics() {
        let diagnostics = ProviderConfig::resolve_with(&json!({}), env_of(&[])).unwrap_err();
        let attributes: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attributes, vec!["api_key", "app_key"]);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = ProviderConfig::new("secret-api", "secret-app");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_retry_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        let mut delay = policy.initial_backoff;
        let mut delays = Vec::new();
        for _ in 0..7 {
            delays.push(delay.as_millis());
            delay = policy.next_backoff(delay);
        }
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 10000, 10000]);
    }
}
