//! Effective settings with full provenance
//!
//! The merged settings tree plus a record of every layer that contributed
//! to it.

use std::path::Path;

use chrono::{DateTime, Utc};
use profile_schema::{ConfigTree, ConfigValue};
use serde::{Deserialize, Serialize};

use super::defaults::BuiltinDefaults;
use crate::document::{load_document, DocumentError};
use crate::logging::{LoggingConfig, FORMATS, LEVELS};
use crate::merge::merge_layers;

/// Schema version for effective settings
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "profile-compile/effective_settings@1";

/// Origin of a settings source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub pretty: bool,
    pub redact_secrets: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty: true,
            redact_secrets: true,
        }
    }
}

/// Typed view of the merged settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub output: OutputSettings,
    pub logging: LoggingConfig,
}

/// Effective settings with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub schema_version: u32,
    pub schema_id: String,

    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// The merged settings object
    pub config: ConfigValue,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    #[serde(skip)]
    settings: Settings,
}

impl EffectiveSettings {
    /// Build effective settings from layers.
    ///
    /// A settings path that was given must exist; there is no implicit
    /// settings file.
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<ConfigTree>,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_tree());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Settings file
        if let Some(path) = settings_path {
            let document = load_document(path)?;
            layers.push(document.tree);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(document.digest),
            });
        }

        // Layer 3: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = ConfigValue::Object(merge_layers(layers));
        let settings = Self::validate(&merged)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
            settings,
        })
    }

    fn validate(config: &ConfigValue) -> Result<Settings, ConfigError> {
        for key in ["output.pretty", "output.redact_secrets"] {
            if !lookup(config, key).is_some_and(ConfigValue::is_boolean) {
                return Err(ConfigError::ValidationError(format!("{} must be a boolean", key)));
            }
        }

        let level = lookup(config, "logging.level").and_then(ConfigValue::as_str);
        if !level.is_some_and(|level| LEVELS.contains(&level)) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LEVELS.join(", ")
            )));
        }

        let format = lookup(config, "logging.format").and_then(ConfigValue::as_str);
        if !format.is_some_and(|format| FORMATS.contains(&format)) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of {}",
                FORMATS.join(", ")
            )));
        }

        serde_json::from_value(config.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Typed view of [`config`](Self::config).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a settings value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        lookup(&self.config, path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }
}

fn lookup<'a>(value: &'a ConfigValue, path: &str) -> Option<&'a ConfigValue> {
    let mut current = value;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
