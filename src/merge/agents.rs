//! Merging of `agents` fields.
//!
//! The same field name carries three shapes (see `profile_schema::agents`).
//! Both sides are classified once and the pair decides the merge.

use profile_schema::{AgentDiscoverySpec, AgentVisibility, ConfigTree, ConfigValue};

use super::modules::{merge_module_item, merge_module_lists, record_id, IdField};

const INCLUDE_ONLY: &str = "include-only";
const INCLUDE_ONLY_ALIAS: &str = "include_only";

/// Classified shape of an `agents` value.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentsShape<'a> {
    /// `"all"`, `"none"`, or a list of names (an empty list included)
    Visibility(AgentVisibility),
    /// Object holding only `items`/`dirs`/`include-only` keys
    Discovery(&'a ConfigTree),
    /// Any other object: agent name to fragment
    Compiled(&'a ConfigTree),
    /// Non-empty list of records identified by `name`
    Records(&'a [ConfigValue]),
    Other,
}

impl<'a> AgentsShape<'a> {
    pub fn of(value: &'a ConfigValue) -> Self {
        if let Some(visibility) = AgentVisibility::from_value(value) {
            return Self::Visibility(visibility);
        }
        match value {
            ConfigValue::Object(tree) if AgentDiscoverySpec::is_discovery_shaped(tree) => {
                Self::Discovery(tree)
            }
            ConfigValue::Object(tree) => Self::Compiled(tree),
            ConfigValue::Array(items) if items.iter().all(ConfigValue::is_object) => {
                Self::Records(items)
            }
            _ => Self::Other,
        }
    }
}

/// Merge a child `agents` value into an inherited one.
pub fn merge_agents(parent: &ConfigValue, child: &ConfigValue) -> ConfigValue {
    match (AgentsShape::of(parent), AgentsShape::of(child)) {
        (AgentsShape::Visibility(inherited), AgentsShape::Visibility(filter)) => {
            let restricted = inherited.restrict(&filter);
            tracing::debug!(
                inherited = %inherited.to_value(),
                result = %restricted.to_value(),
                "restricted agent visibility"
            );
            restricted.to_value()
        }
        (AgentsShape::Discovery(parent_spec), AgentsShape::Discovery(child_spec)) => {
            ConfigValue::Object(merge_agents_discovery(parent_spec, child_spec))
        }
        (AgentsShape::Discovery(parent_spec), AgentsShape::Visibility(AgentVisibility::Only(names))) => {
            // A bare name list narrows discovery; an explicit empty list resets it.
            let mut child_spec = ConfigTree::new();
            if !names.is_empty() {
                child_spec.insert(INCLUDE_ONLY.to_string(), string_list(&names));
            }
            ConfigValue::Object(merge_agents_discovery(parent_spec, &child_spec))
        }
        (AgentsShape::Discovery(_), AgentsShape::Visibility(AgentVisibility::All | AgentVisibility::None)) => {
            tracing::debug!(child = %child, "visibility marker ignored for discovery spec");
            parent.clone()
        }
        (AgentsShape::Records(parent_items), AgentsShape::Records(child_items)) => {
            ConfigValue::Array(merge_module_lists(parent_items, child_items, IdField::Name))
        }
        (AgentsShape::Compiled(parent_map), AgentsShape::Compiled(child_map)) => {
            ConfigValue::Object(merge_compiled(parent_map, child_map))
        }
        (AgentsShape::Records(_) | AgentsShape::Compiled(_), AgentsShape::Visibility(AgentVisibility::All)) => {
            parent.clone()
        }
        (AgentsShape::Records(items), AgentsShape::Visibility(AgentVisibility::Only(names))) => {
            if names.is_empty() {
                return parent.clone();
            }
            ConfigValue::Array(
                items
                    .iter()
                    .filter(|item| {
                        record_id(item, IdField::Name).is_some_and(|id| names.iter().any(|n| n == id))
                    })
                    .cloned()
                    .collect(),
            )
        }
        (AgentsShape::Compiled(map), AgentsShape::Visibility(AgentVisibility::Only(names))) => {
            if names.is_empty() {
                return parent.clone();
            }
            ConfigValue::Object(
                map.iter()
                    .filter(|(name, _)| names.contains(name))
                    .map(|(name, fragment)| (name.clone(), fragment.clone()))
                    .collect(),
            )
        }
        _ => child.clone(),
    }
}

/// Merge two discovery specs.
///
/// An empty child resets to no agents, no dirs and no filter. Otherwise
/// items merge by name, dirs concatenate without duplicates, and the child's
/// `include-only` replaces the parent's when present. The include filter is
/// applied last, so items added by either side are subject to it.
pub fn merge_agents_discovery(parent: &ConfigTree, child: &ConfigTree) -> ConfigTree {
    if child.is_empty() {
        tracing::debug!("agents discovery reset by empty child");
        return discovery_tree(Vec::new(), ConfigValue::Null, ConfigValue::Null);
    }

    let mut items = merge_module_lists(list_field(parent, "items"), list_field(child, "items"), IdField::Name);

    let mut dirs: Vec<ConfigValue> = Vec::new();
    for dir in list_field(parent, "dirs").iter().chain(list_field(child, "dirs")) {
        if !dirs.contains(dir) {
            dirs.push(dir.clone());
        }
    }
    let dirs = if dirs.is_empty() {
        ConfigValue::Null
    } else {
        ConfigValue::Array(dirs)
    };

    let include_only = if has_include_only(child) {
        include_only_of(child)
    } else {
        include_only_of(parent)
    };

    if let Some(filter) = include_only.as_array().filter(|names| !names.is_empty()) {
        items.retain(|item| {
            record_id(item, IdField::Name)
                .is_some_and(|name| filter.iter().any(|allowed| allowed.as_str() == Some(name)))
        });
        tracing::debug!(
            agents = ?items.iter().filter_map(|item| record_id(item, IdField::Name)).collect::<Vec<_>>(),
            "filtered agents by include-only"
        );
    }

    discovery_tree(items, dirs, include_only)
}

fn merge_compiled(parent: &ConfigTree, child: &ConfigTree) -> ConfigTree {
    let mut merged = parent.clone();
    for (name, fragment) in child {
        let value = match (merged.get(name), fragment) {
            (Some(ConfigValue::Object(existing)), ConfigValue::Object(update)) => {
                ConfigValue::Object(merge_module_item(existing, update))
            }
            _ => fragment.clone(),
        };
        merged.insert(name.clone(), value);
    }
    merged
}

fn discovery_tree(items: Vec<ConfigValue>, dirs: ConfigValue, include_only: ConfigValue) -> ConfigTree {
    let mut tree = ConfigTree::new();
    tree.insert("items".to_string(), ConfigValue::Array(items));
    tree.insert("dirs".to_string(), dirs);
    tree.insert(INCLUDE_ONLY.to_string(), include_only);
    tree
}

fn list_field<'a>(tree: &'a ConfigTree, key: &str) -> &'a [ConfigValue] {
    tree.get(key)
        .and_then(ConfigValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn has_include_only(tree: &ConfigTree) -> bool {
    tree.contains_key(INCLUDE_ONLY) || tree.contains_key(INCLUDE_ONLY_ALIAS)
}

/// First non-empty of the two spellings, else null.
fn include_only_of(tree: &ConfigTree) -> ConfigValue {
    [INCLUDE_ONLY, INCLUDE_ONLY_ALIAS]
        .iter()
        .filter_map(|key| tree.get(*key))
        .find(|value| !is_blank(value))
        .cloned()
        .unwrap_or(ConfigValue::Null)
}

fn is_blank(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Null => true,
        ConfigValue::Array(items) => items.is_empty(),
        ConfigValue::String(s) => s.is_empty(),
        _ => false,
    }
}

fn string_list(names: &[String]) -> ConfigValue {
    ConfigValue::Array(names.iter().cloned().map(ConfigValue::String).collect())
}
