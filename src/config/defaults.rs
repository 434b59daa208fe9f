//! Built-in defaults (layer 1)

use profile_schema::{ConfigTree, ConfigValue};
use serde::{Deserialize, Serialize};

/// Built-in default settings values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Pretty-print JSON output (default: true)
    pub output_pretty: bool,

    /// Redact secret-looking values in printed plans (default: true)
    pub output_redact_secrets: bool,

    /// Log level (default: "warn")
    pub logging_level: String,

    /// Log format (default: "text")
    pub logging_format: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            output_pretty: true,
            output_redact_secrets: true,
            logging_level: "warn".to_string(),
            logging_format: "text".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a tree for merging
    pub fn to_tree(&self) -> ConfigTree {
        let value = serde_json::json!({
            "output": {
                "pretty": self.output_pretty,
                "redact_secrets": self.output_redact_secrets
            },
            "logging": {
                "level": self.logging_level,
                "format": self.logging_format
            }
        });
        match value {
            ConfigValue::Object(tree) => tree,
            _ => ConfigTree::new(),
        }
    }
}
