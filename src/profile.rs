//! Profile merging.
//!
//! Combines the exclusion applier, the module-list merger and the dict merger
//! to merge one child profile tree into its parent. Directional: exclusions
//! and agent filters flow from child to parent only.

use profile_schema::{is_module_section, ConfigTree, ConfigValue, ExclusionSpec, ValidationError};

use crate::exclude::apply_exclusions;
use crate::merge::{merge_agents, merge_dicts, merge_module_lists, IdField};

const EXCLUDE_KEY: &str = "exclude";

/// Merge `child` into `parent`.
///
/// The child's `exclude` block is applied to the parent first and never
/// appears in the result. Fails only when that block is malformed.
pub fn merge_profile(parent: &ConfigTree, child: &ConfigTree) -> Result<ConfigTree, ValidationError> {
    let mut child = child.clone();
    let exclusions = match child.remove(EXCLUDE_KEY) {
        Some(value) => ExclusionSpec::from_value(&value)?,
        None => None,
    };

    let mut merged = match &exclusions {
        Some(exclusions) if !exclusions.is_empty() => apply_exclusions(parent, exclusions),
        _ => parent.clone(),
    };
    merged.remove(EXCLUDE_KEY);

    for (key, child_value) in child {
        let value = match merged.get(&key) {
            None => child_value,
            Some(parent_value) => merge_section(&key, parent_value, child_value),
        };
        merged.insert(key, value);
    }

    Ok(merged)
}

/// Fold `merge_profile` over a chain of trees, first to last.
pub fn merge_chain<'a, I>(base: &ConfigTree, layers: I) -> Result<ConfigTree, ValidationError>
where
    I: IntoIterator<Item = &'a ConfigTree>,
{
    layers
        .into_iter()
        .try_fold(base.clone(), |merged, layer| merge_profile(&merged, layer))
}

fn merge_section(key: &str, parent: &ConfigValue, child: ConfigValue) -> ConfigValue {
    match (parent, child) {
        // An explicit empty module list drops everything inherited.
        (_, ConfigValue::Array(child_items)) if is_module_section(key) && child_items.is_empty() => {
            ConfigValue::Array(Vec::new())
        }
        (ConfigValue::Array(parent_items), ConfigValue::Array(child_items)) if is_module_section(key) => {
            ConfigValue::Array(merge_module_lists(parent_items, &child_items, IdField::Module))
        }
        (_, child) if key == "agents" => merge_agents(parent, &child),
        (ConfigValue::Object(parent_tree), ConfigValue::Object(child_tree)) => {
            ConfigValue::Object(merge_dicts(parent_tree, &child_tree))
        }
        (_, child) => child,
    }
}
