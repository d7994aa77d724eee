//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `MPIC_CONFIG` env var
//! 3. **Environment variables**: `MPIC__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`OrchestrationConfig`]: perspective/quorum defaults, attempt budget, per-call timeout
//! - `perspectives`: endpoint URLs and headers per perspective code; its keys are the
//!   target perspectives of this deployment
//! - [`RegistryConfig`]: location of the available-perspectives file
//! - [`HttpClientConfig`]: connection pool and concurrency bound
//! - [`LoggingConfig`]: Log level and format
//!
//! # Example
//!
//! ```toml
//! [orchestration]
//! default_perspective_count = 3
//! global_max_attempts = 2
//! hash_secret = "change-me"
//!
//! [perspectives.us-east-1.caa_endpoint_info]
//! url = "https://caa.us-east-1.example.com/caa"
//!
//! [perspectives.us-east-1.dcv_endpoint_info]
//! url = "https://dcv.us-east-1.example.com/dcv"
//! headers = { x-api-key = "secret" }
//! ```

use crate::{perspective::PerspectiveEndpoints, remote::HttpClientConfig};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, time::Duration};

/// Orchestration defaults, floors and ceilings applied to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Perspective count used when a request does not specify one. Defaults to `3`.
    #[serde(default = "default_perspective_count")]
    pub default_perspective_count: usize,

    /// Smallest perspective count a request may ask for. Defaults to `2`.
    #[serde(default = "default_min_perspective_count")]
    pub min_perspective_count: usize,

    /// Ceiling on attempts per request; also the default. Defaults to `2`.
    #[serde(default = "default_global_max_attempts")]
    pub global_max_attempts: u32,

    /// Timeout for each individual perspective call, in milliseconds. Defaults to `3000`.
    #[serde(default = "default_per_call_timeout_ms")]
    pub per_call_timeout_ms: u64,

    /// Secret mixed into the per-target perspective ordering.
    #[serde(default)]
    pub hash_secret: String,

    /// Distinct RIRs the passing perspectives must span. `1` disables the rule.
    #[serde(default = "default_min_passing_rirs")]
    pub min_passing_rirs: usize,

    /// Fail startup when a configured perspective code is missing from the registry.
    #[serde(default)]
    pub strict_perspective_codes: bool,
}

fn default_perspective_count() -> usize {
    3
}

fn default_min_perspective_count() -> usize {
    2
}

fn default_global_max_attempts() -> u32 {
    2
}

fn default_per_call_timeout_ms() -> u64 {
    3000
}

fn default_min_passing_rirs() -> usize {
    1
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            default_perspective_count: default_perspective_count(),
            min_perspective_count: default_min_perspective_count(),
            global_max_attempts: default_global_max_attempts(),
            per_call_timeout_ms: default_per_call_timeout_ms(),
            hash_secret: String::new(),
            min_passing_rirs: default_min_passing_rirs(),
            strict_perspective_codes: false,
        }
    }
}

impl OrchestrationConfig {
    #[must_use]
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_millis(self.per_call_timeout_ms)
    }
}

/// Location of the available-perspectives registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the registry TOML file. Defaults to `config/available_perspectives.toml`.
    #[serde(default = "default_registry_path")]
    pub path: String,
}

fn default_registry_path() -> String {
    "config/available_perspectives.toml".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { path: default_registry_path() }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "`mpic_core=debug`"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Root application configuration.
///
/// Loaded with the `MPIC` prefix for environment overrides using `__` as a separator,
/// e.g. `MPIC__ORCHESTRATION__GLOBAL_MAX_ATTEMPTS=3`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub orchestration: OrchestrationConfig,

    /// Endpoints keyed by perspective code.
    #[serde(default)]
    pub perspectives: BTreeMap<String, PerspectiveEndpoints>,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub http_client: HttpClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("MPIC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml`, or from the path in `MPIC_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("MPIC_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Codes of the perspectives this deployment targets, in sorted order.
    #[must_use]
    pub fn target_perspective_codes(&self) -> Vec<&str> {
        self.perspectives.keys().map(String::as_str).collect()
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.perspectives.is_empty() {
            return Err("No perspective endpoints configured".to_string());
        }

        for (code, endpoints) in &self.perspectives {
            for (check, endpoint) in
                [("caa", &endpoints.caa_endpoint_info), ("dcv", &endpoints.dcv_endpoint_info)]
            {
                if !endpoint.url.starts_with("http") {
                    return Err(format!(
                        "Invalid {check} URL for perspective {code}: {}",
                        endpoint.url
                    ));
                }
            }
        }

        let orchestration = &self.orchestration;
        if orchestration.min_perspective_count == 0 {
            return Err("Minimum perspective count must be greater than 0".to_string());
        }
        if orchestration.default_perspective_count < orchestration.min_perspective_count {
            return Err(
                "Default perspective count must not be below the minimum perspective count"
                    .to_string(),
            );
        }
        if orchestration.global_max_attempts == 0 {
            return Err("Global max attempts must be greater than 0".to_string());
        }
        if orchestration.per_call_timeout_ms == 0 {
            return Err("Per-call timeout must be greater than 0".to_string());
        }
        if orchestration.hash_secret.is_empty() {
            return Err("Hash secret must not be empty".to_string());
        }

        if self.http_client.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }
        if self.http_client.connect_timeout_ms == 0 {
            return Err("HTTP client connect timeout must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
