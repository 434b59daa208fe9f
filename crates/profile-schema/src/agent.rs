//! Agent records.
//!
//! Agents are simpler than profiles: no `extends`, no overlays of their own.
//! An agent is a partial mount plan applied to whatever session it is
//! mounted into.

use serde::{Deserialize, Serialize};

use crate::agents::AgentVisibility;
use crate::error::ValidationError;
use crate::exclusion::ExclusionSpec;
use crate::module::ModuleRecord;
use crate::{ConfigTree, ConfigValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetadata {
    /// Unique agent identifier
    pub name: String,

    /// Human-readable purpose, shown when choosing a delegate
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub instruction: String,
}

/// Complete agent specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(alias = "meta")]
    pub metadata: AgentMetadata,

    #[serde(default)]
    pub providers: Vec<ModuleRecord>,

    #[serde(default)]
    pub tools: Vec<ModuleRecord>,

    #[serde(default)]
    pub hooks: Vec<ModuleRecord>,

    /// Session configuration overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<ConfigTree>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemConfig>,

    /// Sub-agents this agent may delegate to; inherits the session's when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<AgentVisibility>,

    /// Inherited session content removed when this agent is mounted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<ExclusionSpec>,
}

impl Agent {
    pub fn from_tree(tree: ConfigTree) -> Result<Self, ValidationError> {
        crate::parse_record("agent", tree)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Partial mount plan carrying this agent's configuration.
    ///
    /// Only `description` is taken from the metadata; the compiler tags the
    /// fragment with its name.
    pub fn to_mount_plan_fragment(&self) -> ConfigTree {
        let mut fragment = ConfigTree::new();
        fragment.insert(
            "description".to_string(),
            ConfigValue::String(self.metadata.description.clone()),
        );

        for (section, records) in [
            ("providers", &self.providers),
            ("tools", &self.tools),
            ("hooks", &self.hooks),
        ] {
            if !records.is_empty() {
                fragment.insert(
                    section.to_string(),
                    ConfigValue::Array(
                        records
                            .iter()
                            .map(|record| ConfigValue::Object(record.to_tree()))
                            .collect(),
                    ),
                );
            }
        }

        if let Some(session) = &self.session {
            fragment.insert("session".to_string(), ConfigValue::Object(session.clone()));
        }
        if let Some(system) = &self.system {
            let mut tree = ConfigTree::new();
            tree.insert(
                "instruction".to_string(),
                ConfigValue::String(system.instruction.clone()),
            );
            fragment.insert("system".to_string(), ConfigValue::Object(tree));
        }
        if let Some(agents) = &self.agents {
            fragment.insert("agents".to_string(), agents.to_value());
        }
        if let Some(exclude) = &self.exclude {
            fragment.insert("exclude".to_string(), ConfigValue::Object(exclude.to_tree()));
        }

        fragment
    }
}
