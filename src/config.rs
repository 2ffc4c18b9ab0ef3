//! Configuration types for the header transform.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::transformer::{Direction, MissingValue};

/// Main configuration for the header transform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransformConfig {
    /// Configuration version
    pub version: String,
    /// Global settings
    pub settings: Settings,
    /// Request-side variable names
    #[serde(deserialize_with = "request_direction")]
    pub request: DirectionConfig,
    /// Response-side variable names
    #[serde(deserialize_with = "response_direction")]
    pub response: DirectionConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            settings: Settings::default(),
            request: DirectionConfig::defaults_for(Direction::Request),
            response: DirectionConfig::defaults_for(Direction::Response),
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// How headers listed without a value are written
    pub missing_values: MissingValue,
}

/// Variable names used for one direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectionConfig {
    /// Pseudo-list variable holding the header names
    pub names_variable: String,
    /// Prefix prepended to each header name to look up its value
    pub value_prefix: String,
    /// Variable receiving the encoded header map
    pub output_variable: String,
}

impl DirectionConfig {
    /// The fixed gateway variable names for a direction.
    pub fn defaults_for(direction: Direction) -> Self {
        let (names_variable, value_prefix, output_variable) = match direction {
            Direction::Request => (
                "request.headers.names",
                "request.header.",
                "apic.reqHeaders",
            ),
            Direction::Response => (
                "response.headers.names",
                "response.header.",
                "apic.resHeaders",
            ),
        };

        Self {
            names_variable: names_variable.to_string(),
            value_prefix: value_prefix.to_string(),
            output_variable: output_variable.to_string(),
        }
    }

    /// Replace the names given in `overrides`.
    fn merge(mut self, overrides: DirectionOverrides) -> Self {
        if let Some(v) = overrides.names_variable {
            self.names_variable = v;
        }
        if let Some(v) = overrides.value_prefix {
            self.value_prefix = v;
        }
        if let Some(v) = overrides.output_variable {
            self.output_variable = v;
        }
        self
    }

    /// Variable name holding the value of `header`.
    pub fn value_variable(&self, header: &str) -> String {
        format!("{}{}", self.value_prefix, header)
    }
}

/// A direction block as written; unset names keep the direction's defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectionOverrides {
    names_variable: Option<String>,
    value_prefix: Option<String>,
    output_variable: Option<String>,
}

fn request_direction<'de, D: Deserializer<'de>>(d: D) -> Result<DirectionConfig, D::Error> {
    let overrides = DirectionOverrides::deserialize(d)?;
    Ok(DirectionConfig::defaults_for(Direction::Request).merge(overrides))
}

fn response_direction<'de, D: Deserializer<'de>>(d: D) -> Result<DirectionConfig, D::Error> {
    let overrides = DirectionOverrides::deserialize(d)?;
    Ok(DirectionConfig::defaults_for(Direction::Response).merge(overrides))
}

impl TransformConfig {
    /// Parse a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Variable names for a direction.
    pub fn direction(&self, direction: Direction) -> &DirectionConfig {
        match direction {
            Direction::Request => &self.request,
            Direction::Response => &self.response,
        }
    }

    /// Check that every variable name is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for direction in Direction::ALL {
            let cfg = self.direction(direction);
            if cfg.names_variable.is_empty() {
                return Err(ConfigError::EmptyVariable {
                    direction: direction.as_str(),
                    field: "names_variable",
                });
            }
            if cfg.output_variable.is_empty() {
                return Err(ConfigError::EmptyVariable {
                    direction: direction.as_str(),
                    field: "output_variable",
                });
            }
        }

        if self.request.output_variable == self.response.output_variable {
            return Err(ConfigError::SharedOutput(self.request.output_variable.clone()));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{direction}.{field} must not be empty")]
    EmptyVariable {
        direction: &'static str,
        field: &'static str,
    },

    #[error("request and response both write to '{0}'")]
    SharedOutput(String),
}
