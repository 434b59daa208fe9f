//! Agent loading collaborator.
//!
//! The compiler never locates or parses agent files itself. It asks an
//! [`AgentLoader`] for the names it can see and for one validated [`Agent`]
//! at a time.

use std::collections::BTreeMap;

use profile_schema::{Agent, ConfigTree, ConfigValue, ValidationError};

use crate::document::Document;

/// Agent loading errors
#[derive(Debug, thiserror::Error)]
pub enum AgentLoadError {
    #[error("agent not found: {0}")]
    NotFound(String),

    #[error("failed to parse agent '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("agent listing failed: {0}")]
    Listing(String),
}

/// Source of agent definitions.
pub trait AgentLoader {
    /// Names of every agent in the configured search locations.
    fn list_agents(&self) -> Result<Vec<String>, AgentLoadError>;

    /// Load and validate one agent.
    fn load_agent(&self, name: &str) -> Result<Agent, AgentLoadError>;
}

/// In-memory loader over raw agent trees.
///
/// Trees are stored as given and validated when loaded, so a malformed
/// definition only fails the agent that names it.
#[derive(Debug, Clone, Default)]
pub struct StaticAgentLoader {
    agents: BTreeMap<String, ConfigTree>,
}

impl StaticAgentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, name: impl Into<String>, tree: ConfigTree) -> Self {
        self.insert(name, tree);
        self
    }

    /// Register documents under the name their metadata gives (`metadata`
    /// or `meta`), falling back to the file stem. Later documents win.
    pub fn from_documents<'d>(documents: impl IntoIterator<Item = &'d Document>) -> Self {
        let mut loader = Self::new();
        for document in documents {
            let declared = ["metadata", "meta"]
                .iter()
                .filter_map(|key| document.tree.get(*key))
                .find_map(|metadata| metadata.get("name").and_then(ConfigValue::as_str));
            match declared.or_else(|| document.stem()) {
                Some(name) => loader.insert(name, document.tree.clone()),
                None => tracing::warn!(path = %document.path.display(), "agent document has no name, skipping"),
            }
        }
        loader
    }

    pub fn insert(&mut self, name: impl Into<String>, tree: ConfigTree) {
        self.agents.insert(name.into(), tree);
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl AgentLoader for StaticAgentLoader {
    fn list_agents(&self) -> Result<Vec<String>, AgentLoadError> {
        Ok(self.agents.keys().cloned().collect())
    }

    fn load_agent(&self, name: &str) -> Result<Agent, AgentLoadError> {
        let tree = self
            .agents
            .get(name)
            .ok_or_else(|| AgentLoadError::NotFound(name.to_string()))?;
        Agent::from_tree(tree.clone()).map_err(|source| AgentLoadError::Parse {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ConfigTree {
        value.as_object().cloned().unwrap()
    }

    fn loader() -> StaticAgentLoader {
        StaticAgentLoader::new()
            .with_agent(
                "zen-architect",
                tree(json!({"meta": {"name": "zen-architect", "description": "Designs"}})),
            )
            .with_agent("broken", tree(json!({"meta": {"name": "broken"}})))
    }

    #[test]
    fn test_list_agents_sorted() {
        assert_eq!(loader().list_agents().unwrap(), vec!["broken", "zen-architect"]);
    }

    #[test]
    fn test_load_agent() {
        let agent = loader().load_agent("zen-architect").unwrap();
        assert_eq!(agent.name(), "zen-architect");
        assert_eq!(agent.metadata.description, "Designs");
    }

    #[test]
    fn test_load_missing_agent() {
        let err = loader().load_agent("ghost").unwrap_err();
        assert!(matches!(err, AgentLoadError::NotFound(ref name) if name == "ghost"));
    }

    #[test]
    fn test_from_documents_names() {
        let documents = vec![
            Document {
                path: "agents/first.toml".into(),
                tree: tree(json!({"meta": {"name": "bug-hunter", "description": "Finds bugs"}})),
                digest: String::new(),
            },
            Document {
                path: "agents/zen-architect.json".into(),
                tree: tree(json!({"tools": []})),
                digest: String::new(),
            },
        ];
        let loader = StaticAgentLoader::from_documents(&documents);
        assert_eq!(loader.list_agents().unwrap(), vec!["bug-hunter", "zen-architect"]);
        assert!(loader.load_agent("bug-hunter").is_ok());
        assert!(matches!(
            loader.load_agent("zen-architect").unwrap_err(),
            AgentLoadError::Parse { .. }
        ));
    }

    #[test]
    fn test_load_malformed_agent() {
        let err = loader().load_agent("broken").unwrap_err();
        assert!(matches!(err, AgentLoadError::Parse { ref name, .. } if name == "broken"));
        assert!(err.to_string().contains("broken"));
    }
}
