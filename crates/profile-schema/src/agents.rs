//! The three shapes an `agents` field takes over a profile's lifecycle.
//!
//! - [`AgentVisibility`]: which sub-agents a session may delegate to
//!   (`"all"`, `"none"`, or a list of names).
//! - [`AgentDiscoverySpec`]: profile-level enumeration and filtering of agent
//!   definitions before they are loaded.
//! - [`CompiledAgentMap`]: loaded agent fragments keyed by name, the form a
//!   compiled mount plan presents to an agent being resolved against it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::module::ModuleSource;
use crate::plan::AgentFragment;
use crate::{ConfigTree, ConfigValue};

/// Sentinel selecting every available agent.
pub const ALL: &str = "all";

/// Sentinel disabling delegation.
pub const NONE: &str = "none";

/// Sub-agent access control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigValue", into = "ConfigValue")]
pub enum AgentVisibility {
    All,
    None,
    Only(Vec<String>),
}

impl AgentVisibility {
    /// Interpret a value as a visibility selector.
    ///
    /// Returns `None` for anything that is not `"all"`, `"none"`, or an array
    /// made only of strings.
    pub fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::String(s) if s == ALL => Some(Self::All),
            ConfigValue::String(s) if s == NONE => Some(Self::None),
            ConfigValue::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Self::Only),
            _ => None,
        }
    }

    pub fn to_value(&self) -> ConfigValue {
        match self {
            Self::All => ConfigValue::String(ALL.to_string()),
            Self::None => ConfigValue::String(NONE.to_string()),
            Self::Only(names) => {
                ConfigValue::Array(names.iter().cloned().map(ConfigValue::String).collect())
            }
        }
    }

    /// Apply `filter` as a restriction of this (inherited) selection.
    ///
    /// `"all"` keeps what was inherited, `"none"` disables delegation, and a
    /// name list narrows the inherited selection to those names. An empty
    /// name list is not a usable filter and leaves the selection untouched.
    pub fn restrict(&self, filter: &AgentVisibility) -> AgentVisibility {
        match filter {
            Self::All => self.clone(),
            Self::None => Self::None,
            Self::Only(names) if names.is_empty() => self.clone(),
            Self::Only(names) => match self {
                Self::All => Self::Only(names.clone()),
                Self::None => Self::None,
                Self::Only(inherited) => Self::Only(
                    inherited
                        .iter()
                        .filter(|name| names.contains(name))
                        .cloned()
                        .collect(),
                ),
            },
        }
    }

    /// Remove `names` from an explicit list. Sentinels are left as they are.
    pub fn without(&self, names: &[String]) -> AgentVisibility {
        match self {
            Self::Only(current) => Self::Only(
                current
                    .iter()
                    .filter(|name| !names.contains(name))
                    .cloned()
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl TryFrom<ConfigValue> for AgentVisibility {
    type Error = ValidationError;

    fn try_from(value: ConfigValue) -> Result<Self, Self::Error> {
        Self::from_value(&value).ok_or_else(|| {
            ValidationError::Agents(format!(
                "expected \"{}\", \"{}\", or a list of agent names, got {}",
                ALL, NONE, value
            ))
        })
    }
}

impl From<AgentVisibility> for ConfigValue {
    fn from(visibility: AgentVisibility) -> Self {
        visibility.to_value()
    }
}

/// An explicit agent definition inside a discovery spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ModuleSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigTree>,
}

/// Keys that mark an object as a discovery spec.
pub const DISCOVERY_KEYS: &[&str] = &["items", "dirs", "include-only", "include_only"];

/// Agent discovery and filtering configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDiscoverySpec {
    /// Explicit agent definitions
    #[serde(default)]
    pub items: Vec<AgentRecord>,

    /// Directories to discover agent definitions in
    #[serde(default)]
    pub dirs: Option<Vec<String>>,

    /// Only these agents are active; all others are discarded
    #[serde(default, rename = "include-only", alias = "include_only")]
    pub include_only: Option<Vec<String>>,
}

impl AgentDiscoverySpec {
    /// Returns true if `tree` has only discovery keys (an empty tree counts).
    pub fn is_discovery_shaped(tree: &ConfigTree) -> bool {
        tree.keys().all(|key| DISCOVERY_KEYS.contains(&key.as_str()))
    }

    pub fn from_tree(tree: ConfigTree) -> Result<Self, ValidationError> {
        crate::parse_record("agents discovery spec", tree)
    }

    /// The active include filter, if one is set and non-empty.
    pub fn include_filter(&self) -> Option<&[String]> {
        self.include_only
            .as_deref()
            .filter(|names| !names.is_empty())
    }

    /// Directories to search, if any are configured.
    pub fn search_dirs(&self) -> Option<&[String]> {
        self.dirs.as_deref().filter(|dirs| !dirs.is_empty())
    }
}

/// Profile-level `agents` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentsSpec {
    Visibility(AgentVisibility),
    Discovery(AgentDiscoverySpec),
}

/// Loaded agent fragments keyed by agent name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledAgentMap(BTreeMap<String, ConfigTree>);

impl CompiledAgentMap {
    pub fn from_fragments(fragments: &[AgentFragment]) -> Self {
        Self(
            fragments
                .iter()
                .map(|fragment| (fragment.name.clone(), fragment.body.clone()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&ConfigTree> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_tree(&self) -> ConfigTree {
        self.0
            .iter()
            .map(|(name, body)| (name.clone(), ConfigValue::Object(body.clone())))
            .collect()
    }
}
