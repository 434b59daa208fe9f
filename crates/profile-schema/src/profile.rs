//! Profile records.
//!
//! A profile is validated after its inheritance chain has been merged as
//! plain trees, so partial child profiles never need to satisfy this schema
//! on their own.

use serde::{Deserialize, Serialize};

use crate::agents::AgentsSpec;
use crate::error::ValidationError;
use crate::module::ModuleRecord;
use crate::{ConfigTree, ConfigValue};

/// Profile metadata and identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    /// Unique profile identifier
    pub name: String,

    /// Semantic version (e.g. "1.0.0")
    pub version: String,

    pub description: String,

    /// Model in "provider/model" format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Parent profile to inherit from, resolved by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

/// Core session modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub orchestrator: ModuleRecord,
    pub context: ModuleRecord,
}

/// Complete profile specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "profile")]
    pub metadata: ProfileMetadata,

    pub session: SessionConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<AgentsSpec>,

    #[serde(default)]
    pub providers: Vec<ModuleRecord>,

    #[serde(default)]
    pub tools: Vec<ModuleRecord>,

    #[serde(default)]
    pub hooks: Vec<ModuleRecord>,
}

impl Profile {
    pub fn from_tree(tree: ConfigTree) -> Result<Self, ValidationError> {
        crate::parse_record("profile", tree)
    }

    pub fn from_value(value: ConfigValue) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|source| ValidationError::Record {
            kind: "profile",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentVisibility;
    use serde_json::json;

    fn minimal() -> ConfigValue {
        json!({
            "metadata": {"name": "test", "version": "1.0.0", "description": "Test profile"},
            "session": {
                "orchestrator": {"module": "loop-basic"},
                "context": {"module": "context-simple"}
            }
        })
    }

    #[test]
    fn test_minimal_profile() {
        let profile = Profile::from_value(minimal()).unwrap();
        assert_eq!(profile.metadata.name, "test");
        assert!(profile.metadata.model.is_none());
        assert!(profile.metadata.extends.is_none());
        assert_eq!(profile.session.orchestrator.module, "loop-basic");
        assert_eq!(profile.session.context.module, "context-simple");
        assert!(profile.agents.is_none());
        assert!(profile.providers.is_empty());
        assert!(profile.tools.is_empty());
        assert!(profile.hooks.is_empty());
    }

    #[test]
    fn test_legacy_metadata_key() {
        let profile = Profile::from_value(json!({
            "profile": {
                "name": "dev",
                "version": "2.0.0",
                "description": "Dev",
                "model": "anthropic/claude-sonnet",
                "extends": "base"
            },
            "session": {
                "orchestrator": {"module": "loop-streaming"},
                "context": {"module": "context-simple"}
            }
        }))
        .unwrap();
        assert_eq!(profile.metadata.extends.as_deref(), Some("base"));
        assert_eq!(profile.metadata.model.as_deref(), Some("anthropic/claude-sonnet"));
    }

    #[test]
    fn test_session_module_config() {
        let mut value = minimal();
        value["session"]["orchestrator"]["config"] = json!({"max_tokens": 8000});
        let profile = Profile::from_value(value).unwrap();
        assert_eq!(
            profile.session.orchestrator.config.as_ref().unwrap()["max_tokens"],
            8000
        );
    }

    #[test]
    fn test_agents_shapes() {
        let mut value = minimal();
        value["agents"] = json!(["zen-architect"]);
        let profile = Profile::from_value(value.clone()).unwrap();
        assert_eq!(
            profile.agents,
            Some(AgentsSpec::Visibility(AgentVisibility::Only(vec!["zen-architect".to_string()])))
        );

        value["agents"] = json!({"dirs": ["./agents"], "include-only": ["zen-architect"]});
        let profile = Profile::from_value(value).unwrap();
        match profile.agents {
            Some(AgentsSpec::Discovery(spec)) => assert_eq!(spec.dirs, Some(vec!["./agents".to_string()])),
            other => panic!("expected discovery spec, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_metadata_rejected() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("metadata");
        let err = Profile::from_value(value).unwrap_err();
        assert!(err.to_string().contains("profile"));
    }

    #[test]
    fn test_missing_version_rejected() {
        let mut value = minimal();
        value["metadata"].as_object_mut().unwrap().remove("version");
        assert!(Profile::from_value(value).is_err());
    }

    #[test]
    fn test_missing_context_rejected() {
        let mut value = minimal();
        value["session"].as_object_mut().unwrap().remove("context");
        assert!(Profile::from_value(value).is_err());
    }

    #[test]
    fn test_module_lists() {
        let mut value = minimal();
        value["providers"] = json!([{"module": "provider-anthropic", "config": {"model": "sonnet"}}]);
        value["tools"] = json!([{"module": "tool-bash"}, {"module": "tool-web", "source": "git+web"}]);
        value["hooks"] = json!([{"module": "hooks-logging"}]);
        let profile = Profile::from_value(value).unwrap();
        assert_eq!(profile.providers.len(), 1);
        assert_eq!(profile.tools.len(), 2);
        assert_eq!(profile.hooks[0].module, "hooks-logging");
    }
}
