// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while loading and validating an engine configuration file.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    /// The file parsed but one of its values is out of range.
    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}
