//! Compiled mount plans.

use serde::{Deserialize, Serialize};

use crate::agents::CompiledAgentMap;
use crate::module::ModuleSource;
use crate::{ConfigTree, ConfigValue};

/// Session module selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMount {
    pub orchestrator: String,
    pub context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator_source: Option<ModuleSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_source: Option<ModuleSource>,
}

/// `{config: ...}` block for the orchestrator or context module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigBlock {
    pub config: ConfigTree,
}

/// A loaded agent, tagged with its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFragment {
    pub name: String,

    #[serde(flatten)]
    pub body: ConfigTree,
}

impl AgentFragment {
    pub fn new(name: impl Into<String>, mut body: ConfigTree) -> Self {
        body.remove("name");
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn to_tree(&self) -> ConfigTree {
        let mut tree = ConfigTree::new();
        tree.insert("name".to_string(), ConfigValue::String(self.name.clone()));
        tree.extend(self.body.clone());
        tree
    }
}

/// Fully resolved runtime specification for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountPlan {
    pub session: SessionMount,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator: Option<ConfigBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ConfigBlock>,

    #[serde(default)]
    pub providers: Vec<ConfigTree>,

    #[serde(default)]
    pub tools: Vec<ConfigTree>,

    #[serde(default)]
    pub hooks: Vec<ConfigTree>,

    /// Always present, possibly empty
    #[serde(default)]
    pub agents: Vec<AgentFragment>,
}

impl MountPlan {
    /// Look up a loaded agent by name.
    pub fn agent(&self, name: &str) -> Option<&AgentFragment> {
        self.agents.iter().find(|fragment| fragment.name == name)
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|fragment| fragment.name.as_str()).collect()
    }

    pub fn compiled_agents(&self) -> CompiledAgentMap {
        CompiledAgentMap::from_fragments(&self.agents)
    }

    /// Plain tree form, with `agents` as a list of named fragments.
    pub fn to_tree(&self) -> ConfigTree {
        let mut tree = self.base_tree();
        tree.insert(
            "agents".to_string(),
            ConfigValue::Array(
                self.agents
                    .iter()
                    .map(|fragment| ConfigValue::Object(fragment.to_tree()))
                    .collect(),
            ),
        );
        tree
    }

    /// Tree form an agent fragment is merged against: `agents` is the
    /// name-keyed map of loaded fragments.
    pub fn to_session_tree(&self) -> ConfigTree {
        let mut tree = self.base_tree();
        tree.insert(
            "agents".to_string(),
            ConfigValue::Object(self.compiled_agents().to_tree()),
        );
        tree
    }

    fn base_tree(&self) -> ConfigTree {
        let mut session = ConfigTree::new();
        session.insert(
            "orchestrator".to_string(),
            ConfigValue::String(self.session.orchestrator.clone()),
        );
        session.insert(
            "context".to_string(),
            ConfigValue::String(self.session.context.clone()),
        );
        if let Some(source) = &self.session.orchestrator_source {
            session.insert("orchestrator_source".to_string(), source.to_value());
        }
        if let Some(source) = &self.session.context_source {
            session.insert("context_source".to_string(), source.to_value());
        }

        let mut tree = ConfigTree::new();
        tree.insert("session".to_string(), ConfigValue::Object(session));
        for (key, block) in [("orchestrator", &self.orchestrator), ("context", &self.context)] {
            if let Some(block) = block {
                let mut wrapper = ConfigTree::new();
                wrapper.insert("config".to_string(), ConfigValue::Object(block.config.clone()));
                tree.insert(key.to_string(), ConfigValue::Object(wrapper));
            }
        }
        for (key, records) in [
            ("providers", &self.providers),
            ("tools", &self.tools),
            ("hooks", &self.hooks),
        ] {
            tree.insert(
                key.to_string(),
                ConfigValue::Array(records.iter().cloned().map(ConfigValue::Object).collect()),
            );
        }
        tree
    }
}
