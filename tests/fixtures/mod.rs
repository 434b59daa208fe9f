//! Test fixtures for profile compilation
//!
//! This module provides:
//! - Profile documents (base, overlay, partial child with exclusions)
//! - Agent documents (two valid agents, one malformed)
//! - Tree builders for inline profiles

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use profile_compiler::schema::{ConfigTree, ConfigValue, Profile};
use profile_compiler::{load_document, Document, StaticAgentLoader};

/// Path to a profile fixture
pub fn profile_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/profiles")
        .join(name)
}

/// Path to an agent fixture
pub fn agent_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/agents")
        .join(name)
}

pub fn load_profile_document(name: &str) -> Document {
    load_document(&profile_path(name)).expect("Failed to load profile fixture")
}

pub fn load_profile(name: &str) -> Profile {
    Profile::from_tree(load_profile_document(name).tree).expect("Invalid profile fixture")
}

/// Loader over every agent fixture, the malformed one included
pub fn agent_loader() -> StaticAgentLoader {
    let documents: Vec<Document> = ["bug-hunter.toml", "zen-architect.toml", "broken.toml"]
        .iter()
        .map(|name| load_document(&agent_path(name)).expect("Failed to load agent fixture"))
        .collect();
    StaticAgentLoader::from_documents(&documents)
}

pub fn tree(value: ConfigValue) -> ConfigTree {
    value
        .as_object()
        .cloned()
        .expect("fixture value must be an object")
}

/// Inline profile with the given session modules and tools
pub fn inline_profile(name: &str, orchestrator: &str, context: &str, tools: &[&str]) -> Profile {
    let tools: Vec<ConfigValue> = tools
        .iter()
        .map(|module| serde_json::json!({"module": module}))
        .collect();
    Profile::from_value(serde_json::json!({
        "metadata": {"name": name, "version": "1.0.0", "description": name},
        "session": {
            "orchestrator": {"module": orchestrator},
            "context": {"module": context}
        },
        "tools": tools
    }))
    .expect("Invalid inline profile")
}

/// Module ids of a list of records, in order
pub fn module_ids(records: &[ConfigTree]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.get("module").and_then(ConfigValue::as_str))
        .map(str::to_string)
        .collect()
}
