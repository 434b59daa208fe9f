//! Module list merging by identifier.

use std::collections::HashMap;

use profile_schema::{ConfigTree, ConfigValue};

use super::dict::merge_dicts;

/// Field that identifies a record within a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    /// `module`, used by providers, tools and hooks
    Module,
    /// `name`, used by agent records
    Name,
}

impl IdField {
    pub fn key(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Name => "name",
        }
    }

    /// Guess the identifier field from list contents.
    ///
    /// `name` if any record in either list carries a `name` field, else
    /// `module`. Two empty lists detect as `module`.
    pub fn detect(parent: &[ConfigValue], child: &[ConfigValue]) -> Self {
        let has_name = parent
            .iter()
            .chain(child)
            .any(|item| item.as_object().is_some_and(|record| record.contains_key("name")));
        if has_name {
            Self::Name
        } else {
            Self::Module
        }
    }
}

/// Identifier of a list element, if it is a record with a non-empty string id.
pub fn record_id(item: &ConfigValue, id: IdField) -> Option<&str> {
    item.as_object()?
        .get(id.key())?
        .as_str()
        .filter(|value| !value.is_empty())
}

/// Merge two module lists by identifier.
///
/// Parent records keep their original order (merged in place when the child
/// repeats them); child-only records follow in child order. Elements without
/// an identifier are dropped from either side.
pub fn merge_module_lists(
    parent: &[ConfigValue],
    child: &[ConfigValue],
    id: IdField,
) -> Vec<ConfigValue> {
    let mut order: Vec<(String, ConfigTree)> = Vec::with_capacity(parent.len() + child.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in parent.iter().chain(child) {
        let (Some(key), Some(record)) = (record_id(item, id), item.as_object()) else {
            continue;
        };
        match index.get(key) {
            Some(&position) => {
                let merged = merge_module_item(&order[position].1, record);
                order[position].1 = merged;
            }
            None => {
                index.insert(key.to_string(), order.len());
                order.push((key.to_string(), record.clone()));
            }
        }
    }

    order
        .into_iter()
        .map(|(_, record)| ConfigValue::Object(record))
        .collect()
}

/// Merge one module record into another.
///
/// Every child field overrides the parent's except `config`, which is
/// deep-merged when both sides hold trees. A `source` the child omits is
/// inherited; any `source` the child provides, null included, wins.
pub fn merge_module_item(parent: &ConfigTree, child: &ConfigTree) -> ConfigTree {
    let mut merged = parent.clone();
    for (key, value) in child {
        let value = match (key.as_str(), merged.get(key), value) {
            ("config", Some(ConfigValue::Object(parent_config)), ConfigValue::Object(child_config)) => {
                ConfigValue::Object(merge_dicts(parent_config, child_config))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}
