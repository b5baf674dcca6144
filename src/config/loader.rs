// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_TRANSITION_DURATION_MS, DEFAULT_TRANSITION_EASING, DEFAULT_WASM_MAX_FUNCTION_COUNT,
    DEFAULT_WASM_MAX_MEMORY_PAGES, DEFAULT_WASM_MAX_SIZE, DEFAULT_WASM_WARN_SIZE,
};
use crate::errors::ConfigError;
use crate::layout::{BreakpointRange, TransitionOptions};
use crate::lifecycle::{PartialFailureMode, RetryOptions};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine-wide configuration.
///
/// Every section is optional; a missing section falls back to built-in
/// defaults. Loaded from YAML or TOML depending on the file extension.
///
/// # Example
/// ```yaml
/// lifecycle:
///   partial_failure_mode: continue
///   retry:
///     max_retries: 3
///     initial_delay_ms: 100
///     backoff_factor: 2.0
/// wasm:
///   max_memory_pages: 128
/// layout:
///   breakpoints:
///     narrow: { max_width: 600 }
///     wide: { min_width: 601 }
/// transitions:
///   duration_ms: 250
///   easing: linear
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub wasm: WasmConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub transitions: TransitionConfig,
}

impl EngineConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

/// Defaults applied to `initialize_assembly` when the caller passes none.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub partial_failure_mode: PartialFailureMode,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl From<&RetryConfig> for RetryOptions {
    fn from(cfg: &RetryConfig) -> Self {
        RetryOptions {
            max_retries: cfg.max_retries,
            initial_delay: Duration::from_millis(cfg.initial_delay_ms),
            backoff_factor: cfg.backoff_factor,
        }
    }
}

/// Limits enforced by the WASM validator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WasmConfig {
    pub warn_size_bytes: Option<usize>,
    pub max_size_bytes: Option<usize>,
    pub max_memory_pages: Option<u64>,
    pub max_function_count: Option<u32>,
}

impl WasmConfig {
    pub fn get_warn_size(&self) -> usize {
        self.warn_size_bytes.unwrap_or(DEFAULT_WASM_WARN_SIZE)
    }

    pub fn get_max_size(&self) -> usize {
        self.max_size_bytes.unwrap_or(DEFAULT_WASM_MAX_SIZE)
    }

    pub fn get_max_memory_pages(&self) -> u64 {
        self.max_memory_pages.unwrap_or(DEFAULT_WASM_MAX_MEMORY_PAGES)
    }

    pub fn get_max_function_count(&self) -> u32 {
        self.max_function_count
            .unwrap_or(DEFAULT_WASM_MAX_FUNCTION_COUNT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    /// Replaces the built-in mobile/tablet/desktop ranges when set.
    pub breakpoints: Option<IndexMap<String, BreakpointRange>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionConfig {
    pub duration_ms: Option<u64>,
    pub easing: Option<String>,
}

impl TransitionConfig {
    pub fn options(&self) -> TransitionOptions {
        TransitionOptions {
            duration: Duration::from_millis(
                self.duration_ms.unwrap_or(DEFAULT_TRANSITION_DURATION_MS),
            ),
            easing: self
                .easing
                .clone()
                .unwrap_or_else(|| DEFAULT_TRANSITION_EASING.to_string()),
        }
    }
}

/// Load a configuration file, picking the parser from its extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "yaml" | "yml" => EngineConfig::from_yaml_str(&content),
        "toml" => EngineConfig::from_toml_str(&content),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Load a configuration file and reject out-of-range values.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let config = load_config(path)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if let Some(retry) = &config.lifecycle.retry {
        if retry.max_retries == 0 {
            return Err(invalid("lifecycle.retry.max_retries", "must be at least 1"));
        }
        if !(retry.backoff_factor >= 1.0) {
            return Err(invalid(
                "lifecycle.retry.backoff_factor",
                format!("must be >= 1.0, got {}", retry.backoff_factor),
            ));
        }
    }

    if config.wasm.get_warn_size() > config.wasm.get_max_size() {
        return Err(invalid(
            "wasm.warn_size_bytes",
            format!(
                "{} exceeds max_size_bytes {}",
                config.wasm.get_warn_size(),
                config.wasm.get_max_size()
            ),
        ));
    }

    if let Some(breakpoints) = &config.layout.breakpoints {
        for (name, range) in breakpoints {
            if let (Some(min), Some(max)) = (range.min_width, range.max_width) {
                if min > max {
                    return Err(invalid(
                        &format!("layout.breakpoints.{name}"),
                        format!("min_width {min} is greater than max_width {max}"),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();

        assert_eq!(config.lifecycle.partial_failure_mode, PartialFailureMode::Fail);
        assert!(config.lifecycle.retry.is_none());
        assert_eq!(config.wasm.get_max_size(), DEFAULT_WASM_MAX_SIZE);
        assert_eq!(config.wasm.get_max_memory_pages(), 256);
        assert!(config.layout.breakpoints.is_none());

        let transitions = config.transitions.options();
        assert_eq!(transitions.duration, Duration::from_millis(300));
        assert_eq!(transitions.easing, "ease-in-out");
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
lifecycle:
  partial_failure_mode: continue
  retry:
    max_retries: 4
    initial_delay_ms: 50
wasm:
  max_memory_pages: 64
layout:
  breakpoints:
    narrow: {{ max_width: 600 }}
    wide: {{ min_width: 601 }}
"#
        )
        .unwrap();

        let config = load_and_validate_config(file.path()).unwrap();
        assert_eq!(config.lifecycle.partial_failure_mode, PartialFailureMode::Continue);

        let retry = RetryOptions::from(config.lifecycle.retry.as_ref().unwrap());
        assert_eq!(retry.max_retries, 4);
        assert_eq!(retry.initial_delay, Duration::from_millis(50));
        assert_eq!(retry.backoff_factor, 2.0);

        assert_eq!(config.wasm.get_max_memory_pages(), 64);
        let breakpoints = config.layout.breakpoints.unwrap();
        assert_eq!(breakpoints.keys().collect::<Vec<_>>(), vec!["narrow", "wide"]);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[transitions]
duration_ms = 120
easing = "linear"

[wasm]
max_function_count = 50
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.transitions.options().duration, Duration::from_millis(120));
        assert_eq!(config.wasm.get_max_function_count(), 50);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "json"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases = [
            "lifecycle: { retry: { max_retries: 0, initial_delay_ms: 10 } }",
            "lifecycle: { retry: { max_retries: 2, initial_delay_ms: 10, backoff_factor: 0.5 } }",
            "wasm: { warn_size_bytes: 100, max_size_bytes: 10 }",
            "layout: { breakpoints: { odd: { min_width: 900, max_width: 100 } } }",
        ];

        for case in cases {
            let config = EngineConfig::from_yaml_str(case).unwrap();
            let result = validate_config(&config);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "expected invalid config for: {case}"
            );
        }
    }
}
