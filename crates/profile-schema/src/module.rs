//! Module records for providers, tools and hooks.

use serde::{Deserialize, Serialize};

use crate::{ConfigTree, ConfigValue};

/// Where a module's code comes from.
///
/// Either a locator string (git URL, path, package name) or a structured
/// object whose shape is owned by the source resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleSource {
    Locator(String),
    Spec(ConfigTree),
}

impl ModuleSource {
    pub fn to_value(&self) -> ConfigValue {
        match self {
            Self::Locator(s) => ConfigValue::String(s.clone()),
            Self::Spec(tree) => ConfigValue::Object(tree.clone()),
        }
    }
}

/// A reference to a loadable module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Module ID to load
    pub module: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ModuleSource>,

    /// Module-specific configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigTree>,

    /// Fields this schema does not name; carried through merges untouched
    #[serde(flatten)]
    pub extra: ConfigTree,
}

impl ModuleRecord {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            source: None,
            config: None,
            extra: ConfigTree::new(),
        }
    }

    pub fn with_source(mut self, source: ModuleSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_config(mut self, config: ConfigTree) -> Self {
        self.config = Some(config);
        self
    }

    /// Plain mount plan record; absent `source` and `config` are omitted.
    pub fn to_tree(&self) -> ConfigTree {
        let mut tree = self.extra.clone();
        tree.insert("module".to_string(), ConfigValue::String(self.module.clone()));
        if let Some(source) = &self.source {
            tree.insert("source".to_string(), source.to_value());
        }
        if let Some(config) = &self.config {
            tree.insert("config".to_string(), ConfigValue::Object(config.clone()));
        }
        tree
    }
}
