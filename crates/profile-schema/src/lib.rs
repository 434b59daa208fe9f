//! Profile Schema Types
//!
//! Typed records for profiles, agents, exclusions and compiled mount plans,
//! plus the untyped `ConfigTree` currency the merge engine works over.

pub mod agent;
pub mod agents;
pub mod error;
pub mod exclusion;
pub mod module;
pub mod plan;
pub mod profile;

pub use agent::{Agent, AgentMetadata, SystemConfig};
pub use agents::{AgentDiscoverySpec, AgentRecord, AgentVisibility, AgentsSpec, CompiledAgentMap};
pub use error::ValidationError;
pub use exclusion::{ExclusionRule, ExclusionSpec};
pub use module::{ModuleRecord, ModuleSource};
pub use plan::{AgentFragment, ConfigBlock, MountPlan, SessionMount};
pub use profile::{Profile, ProfileMetadata, SessionConfig};

/// Any value that can appear in a configuration tree.
pub type ConfigValue = serde_json::Value;

/// String-keyed mapping of configuration values.
pub type ConfigTree = serde_json::Map<String, serde_json::Value>;

/// Module list sections keyed by `module`.
pub const MODULE_SECTIONS: &[&str] = &["providers", "tools", "hooks"];

/// Returns true if `section` holds a list of module records.
pub fn is_module_section(section: &str) -> bool {
    MODULE_SECTIONS.contains(&section)
}

pub(crate) fn parse_record<T>(kind: &'static str, tree: ConfigTree) -> Result<T, ValidationError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(ConfigValue::Object(tree))
        .map_err(|source| ValidationError::Record { kind, source })
}
