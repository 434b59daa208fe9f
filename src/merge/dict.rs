//! Generic recursive merge of configuration trees.

use profile_schema::{ConfigTree, ConfigValue};

/// Deep merge two values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (overlay wins entirely)
/// - Scalars: override (overlay wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: ConfigValue, overlay: ConfigValue) -> ConfigValue {
    match (base, overlay) {
        (ConfigValue::Object(base_map), ConfigValue::Object(overlay_map)) => {
            ConfigValue::Object(merge_owned(base_map, overlay_map))
        }
        (_, overlay) => overlay,
    }
}

/// Merge `child` into `parent`, returning a new tree.
///
/// Keys only in `parent` carry through, keys only in `child` are added as-is,
/// and keys in both recurse when both values are trees. Otherwise the
/// child's value wins. Inputs are not modified.
pub fn merge_dicts(parent: &ConfigTree, child: &ConfigTree) -> ConfigTree {
    let mut merged = parent.clone();
    for (key, child_value) in child {
        let value = match (merged.get(key), child_value) {
            (Some(ConfigValue::Object(parent_tree)), ConfigValue::Object(child_tree)) => {
                ConfigValue::Object(merge_dicts(parent_tree, child_tree))
            }
            _ => child_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Merge layers in order (first is base, last has highest precedence).
pub fn merge_layers(layers: Vec<ConfigTree>) -> ConfigTree {
    layers.into_iter().fold(ConfigTree::new(), merge_owned)
}

fn merge_owned(mut base: ConfigTree, overlay: ConfigTree) -> ConfigTree {
    for (key, overlay_value) in overlay {
        let merged = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged);
    }
    base
}
