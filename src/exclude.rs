//! Exclusion rules for inherited configuration
//!
//! Applied to the parent side of a merge before the child's additions, so
//! exclusions never touch what the child brings itself. Excluding a missing
//! section or item is a silent no-op.

use profile_schema::{
    is_module_section, AgentDiscoverySpec, AgentVisibility, ConfigTree, ConfigValue, ExclusionRule,
    ExclusionSpec,
};

use crate::merge::{record_id, IdField};

/// Remove excluded sections and items from `inherited`, returning a new tree.
pub fn apply_exclusions(inherited: &ConfigTree, exclusions: &ExclusionSpec) -> ConfigTree {
    let mut result = inherited.clone();

    for (section, rule) in exclusions.iter() {
        if !result.contains_key(section) {
            continue;
        }
        match rule {
            ExclusionRule::All => exclude_section(&mut result, section),
            ExclusionRule::Items(ids) => {
                if let Some(value) = result.get_mut(section) {
                    exclude_items(section, value, ids);
                }
            }
            ExclusionRule::Nested(nested) => match result.get_mut(section) {
                Some(ConfigValue::Object(tree)) => apply_nested(tree, nested),
                _ => {
                    tracing::debug!(section, "nested exclusion ignored for non-mapping section");
                }
            },
        }
    }

    result
}

fn exclude_section(tree: &mut ConfigTree, section: &str) {
    if is_module_section(section) {
        tree.insert(section.to_string(), ConfigValue::Array(Vec::new()));
    } else if section == "agents" {
        let cleared = match tree.get(section) {
            Some(ConfigValue::Object(_)) => ConfigValue::Object(ConfigTree::new()),
            _ => AgentVisibility::None.to_value(),
        };
        tree.insert(section.to_string(), cleared);
    } else {
        tree.remove(section);
    }
    tracing::debug!(section, "excluded inherited section");
}

fn exclude_items(section: &str, value: &mut ConfigValue, ids: &[String]) {
    let before = item_count(value);

    if is_module_section(section) {
        if let ConfigValue::Array(items) = value {
            retain_records(items, IdField::Module, ids);
        }
    } else if section == "agents" {
        match &mut *value {
            ConfigValue::Object(tree) if AgentDiscoverySpec::is_discovery_shaped(tree) => {
                if let Some(ConfigValue::Array(items)) = tree.get_mut("items") {
                    retain_records(items, IdField::Name, ids);
                }
            }
            ConfigValue::Object(tree) => tree.retain(|name, _| !ids.contains(name)),
            other => {
                if let Some(visibility) = AgentVisibility::from_value(other) {
                    *other = visibility.without(ids).to_value();
                } else if let ConfigValue::Array(items) = other {
                    retain_records(items, IdField::Name, ids);
                }
            }
        }
    } else {
        exclude_generic(value, ids);
    }

    tracing::debug!(section, before, after = item_count(value), "excluded inherited items");
}

/// Nested rules for a mapping-shaped section. `"all"` empties a list value
/// and removes anything else.
fn apply_nested(tree: &mut ConfigTree, nested: &ExclusionSpec) {
    for (key, rule) in nested.iter() {
        match rule {
            ExclusionRule::All => match tree.get_mut(key) {
                Some(ConfigValue::Array(items)) => items.clear(),
                Some(_) => {
                    tree.remove(key);
                }
                None => {}
            },
            ExclusionRule::Items(ids) => {
                if let Some(value) = tree.get_mut(key) {
                    exclude_generic(value, ids);
                }
            }
            ExclusionRule::Nested(deeper) => {
                if let Some(ConfigValue::Object(inner)) = tree.get_mut(key) {
                    apply_nested(inner, deeper);
                }
            }
        }
    }
}

/// Drop matching strings or records from a list, or matching keys from a mapping.
fn exclude_generic(value: &mut ConfigValue, ids: &[String]) {
    match value {
        ConfigValue::Array(items) => {
            let id = IdField::detect(items, &[]);
            items.retain(|item| match item {
                ConfigValue::String(s) => !ids.contains(s),
                record => record_id(record, id).map_or(true, |key| !ids.iter().any(|x| x == key)),
            });
        }
        ConfigValue::Object(tree) => tree.retain(|key, _| !ids.contains(key)),
        _ => {}
    }
}

fn retain_records(items: &mut Vec<ConfigValue>, id: IdField, ids: &[String]) {
    items.retain(|item| record_id(item, id).map_or(true, |key| !ids.iter().any(|x| x == key)));
}

fn item_count(value: &ConfigValue) -> usize {
    match value {
        ConfigValue::Array(items) => items.len(),
        ConfigValue::Object(tree) => tree.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: ConfigValue) -> ConfigTree {
        value.as_object().cloned().unwrap()
    }

    fn spec(value: ConfigValue) -> ExclusionSpec {
        ExclusionSpec::from_value(&value).unwrap().unwrap()
    }

    fn apply(inherited: ConfigValue, exclusions: ConfigValue) -> ConfigValue {
        ConfigValue::Object(apply_exclusions(&tree(inherited), &spec(exclusions)))
    }

    #[test]
    fn test_no_exclusions() {
        let inherited = tree(json!({"tools": [{"module": "tool-bash"}], "hooks": [{"module": "hooks-logging"}]}));
        assert_eq!(apply_exclusions(&inherited, &ExclusionSpec::new()), inherited);
    }

    #[test]
    fn test_exclude_all_module_sections() {
        let result = apply(
            json!({
                "tools": [{"module": "tool-bash"}, {"module": "tool-web"}],
                "hooks": [{"module": "hooks-logging"}],
                "providers": [{"module": "provider-anthropic"}]
            }),
            json!({"tools": "all", "providers": "all"}),
        );
        assert_eq!(result["tools"], json!([]));
        assert_eq!(result["providers"], json!([]));
        assert_eq!(result["hooks"], json!([{"module": "hooks-logging"}]));
    }

    #[test]
    fn test_exclude_all_agents_list_becomes_none() {
        let result = apply(json!({"agents": ["agent-one", "agent-two"]}), json!({"agents": "all"}));
        assert_eq!(result["agents"], "none");
    }

    #[test]
    fn test_exclude_all_agents_mapping_becomes_empty() {
        let result = apply(
            json!({"agents": {"items": [{"name": "a"}], "dirs": ["./agents"]}}),
            json!({"agents": "all"}),
        );
        assert_eq!(result["agents"], json!({}));
    }

    #[test]
    fn test_exclude_list_is_exact_and_ordered() {
        let result = apply(
            json!({"tools": [{"module": "tool-bash"}, {"module": "tool-web"}, {"module": "tool-fs"}]}),
            json!({"tools": ["tool-bash", "tool-fs"]}),
        );
        assert_eq!(result["tools"], json!([{"module": "tool-web"}]));
    }

    #[test]
    fn test_exclude_nonexistent_item_and_section() {
        let inherited = json!({"tools": [{"module": "tool-bash"}]});
        assert_eq!(apply(inherited.clone(), json!({"tools": ["tool-nonexistent"]})), inherited);
        assert_eq!(apply(inherited.clone(), json!({"hooks": "all"})), inherited);
    }

    #[test]
    fn test_exclude_agent_names_from_list() {
        let result = apply(
            json!({"agents": ["agent-one", "agent-two", "agent-three", "agent-four"]}),
            json!({"agents": ["agent-two", "agent-four"]}),
        );
        assert_eq!(result["agents"], json!(["agent-one", "agent-three"]));
    }

    #[test]
    fn test_exclude_agent_names_from_record_list() {
        let result = apply(
            json!({"agents": [{"name": "a", "config": {"x": 1}}, {"name": "b"}]}),
            json!({"agents": ["a"]}),
        );
        assert_eq!(result["agents"], json!([{"name": "b"}]));
    }

    #[test]
    fn test_exclude_agent_names_from_compiled_map() {
        let result = apply(
            json!({"agents": {
                "bug-hunter": {"description": "Bug hunter"},
                "tdd-specialist": {"description": "TDD specialist"}
            }}),
            json!({"agents": ["tdd-specialist"]}),
        );
        assert_eq!(result["agents"], json!({"bug-hunter": {"description": "Bug hunter"}}));
    }

    #[test]
    fn test_exclude_agent_names_from_discovery_items() {
        let result = apply(
            json!({"agents": {"items": [{"name": "a"}, {"name": "b"}], "dirs": ["./agents"]}}),
            json!({"agents": ["a"]}),
        );
        assert_eq!(result["agents"], json!({"items": [{"name": "b"}], "dirs": ["./agents"]}));
    }

    #[test]
    fn test_exclude_names_from_all_sentinel_is_noop() {
        let result = apply(json!({"agents": "all"}), json!({"agents": ["a"]}));
        assert_eq!(result["agents"], "all");
    }

    #[test]
    fn test_nested_on_non_mapping_is_noop() {
        let inherited = json!({"agents": ["agent-one", "agent-two"]});
        assert_eq!(apply(inherited.clone(), json!({"agents": {"some_key": "all"}})), inherited);
    }

    #[test]
    fn test_nested_rules() {
        let result = apply(
            json!({"session": {
                "orchestrator": {"module": "loop-basic"},
                "context": {"module": "context-simple"},
                "allowed": ["read", "write", "exec"],
                "features": ["a", "b"]
            }}),
            json!({"session": {"orchestrator": "all", "allowed": ["exec"], "features": "all"}}),
        );
        assert_eq!(
            result["session"],
            json!({"context": {"module": "context-simple"}, "allowed": ["read", "write"], "features": []})
        );
    }

    #[test]
    fn test_nested_recurses() {
        let result = apply(
            json!({"session": {"orchestrator": {"config": {"a": 1, "b": 2}}}}),
            json!({"session": {"orchestrator": {"config": ["a"]}}}),
        );
        assert_eq!(result["session"], json!({"orchestrator": {"config": {"b": 2}}}));
    }

    #[test]
    fn test_exclude_other_section_removed_entirely() {
        let result = apply(json!({"custom": {"setting": "value"}, "keep": 1}), json!({"custom": "all"}));
        assert_eq!(result, json!({"keep": 1}));
    }

    #[test]
    fn test_exclude_items_from_generic_sections() {
        let result = apply(
            json!({"labels": ["x", "y"], "extras": {"a": 1, "b": 2}, "plugins": [{"name": "p1"}, {"name": "p2"}]}),
            json!({"labels": ["x"], "extras": ["a"], "plugins": ["p2"]}),
        );
        assert_eq!(result["labels"], json!(["y"]));
        assert_eq!(result["extras"], json!({"b": 2}));
        assert_eq!(result["plugins"], json!([{"name": "p1"}]));
    }

    #[test]
    fn test_input_not_modified() {
        let inherited = tree(json!({"tools": [{"module": "tool-bash"}]}));
        let _ = apply_exclusions(&inherited, &spec(json!({"tools": "all"})));
        assert_eq!(inherited["tools"], json!([{"module": "tool-bash"}]));
    }
}
