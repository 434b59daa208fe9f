//! Exclusion directives.
//!
//! An exclusion spec names inherited sections (or items within them) that a
//! child removes before its own additions are merged. It is consumed by the
//! merge that reads it and never written into a merge result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{ConfigTree, ConfigValue};

/// Marker excluding a whole section.
pub const EXCLUDE_ALL: &str = "all";

/// What to remove from one inherited section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Remove the whole section.
    All,
    /// Remove the listed identifiers.
    Items(Vec<String>),
    /// Apply rules to the keys of a dict-shaped section.
    Nested(ExclusionSpec),
}

impl ExclusionRule {
    fn parse(section: &str, value: &ConfigValue) -> Result<Self, ValidationError> {
        match value {
            ConfigValue::String(s) if s == EXCLUDE_ALL => Ok(Self::All),
            ConfigValue::String(s) => Err(ValidationError::exclusion(
                section,
                format!("expected \"{}\", got \"{}\"", EXCLUDE_ALL, s),
            )),
            ConfigValue::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ValidationError::exclusion(
                            section,
                            format!("identifiers must be strings, got {}", item),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Items),
            ConfigValue::Object(tree) => ExclusionSpec::from_tree(tree).map(Self::Nested),
            other => Err(ValidationError::exclusion(
                section,
                format!("expected \"all\", a list, or a mapping, got {}", other),
            )),
        }
    }

    pub fn to_value(&self) -> ConfigValue {
        match self {
            Self::All => ConfigValue::String(EXCLUDE_ALL.to_string()),
            Self::Items(ids) => ConfigValue::Array(ids.iter().cloned().map(ConfigValue::String).collect()),
            Self::Nested(spec) => ConfigValue::Object(spec.to_tree()),
        }
    }
}

/// Section name to exclusion rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigValue", into = "ConfigValue")]
pub struct ExclusionSpec(BTreeMap<String, ExclusionRule>);

impl ExclusionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, section: impl Into<String>, rule: ExclusionRule) -> Self {
        self.0.insert(section.into(), rule);
        self
    }

    /// Parse section rules. A `null` rule excludes nothing and is skipped.
    pub fn from_tree(tree: &ConfigTree) -> Result<Self, ValidationError> {
        tree.iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(section, value)| Ok((section.clone(), ExclusionRule::parse(section, value)?)))
            .collect::<Result<BTreeMap<_, _>, ValidationError>>()
            .map(Self)
    }

    /// Parse an `exclude` value. `null` means no exclusions.
    pub fn from_value(value: &ConfigValue) -> Result<Option<Self>, ValidationError> {
        match value {
            ConfigValue::Null => Ok(None),
            ConfigValue::Object(tree) => Self::from_tree(tree).map(Some),
            other => Err(ValidationError::exclusion(
                "exclude",
                format!("expected a mapping of sections, got {}", other),
            )),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExclusionRule)> {
        self.0.iter().map(|(section, rule)| (section.as_str(), rule))
    }

    pub fn get(&self, section: &str) -> Option<&ExclusionRule> {
        self.0.get(section)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_tree(&self) -> ConfigTree {
        self.0
            .iter()
            .map(|(section, rule)| (section.clone(), rule.to_value()))
            .collect()
    }
}

impl TryFrom<ConfigValue> for ExclusionSpec {
    type Error = ValidationError;

    fn try_from(value: ConfigValue) -> Result<Self, Self::Error> {
        Self::from_value(&value).map(Option::unwrap_or_default)
    }
}

impl From<ExclusionSpec> for ConfigValue {
    fn from(spec: ExclusionSpec) -> Self {
        ConfigValue::Object(spec.to_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: ConfigValue) -> Result<ExclusionSpec, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::exclusion("test", e.to_string()))
    }

    #[test]
    fn test_parse_all_list_nested() {
        let spec = parse(json!({
            "tools": "all",
            "hooks": ["hooks-logging"],
            "session": {"orchestrator": "all"}
        }))
        .unwrap();

        assert_eq!(spec.get("tools"), Some(&ExclusionRule::All));
        assert_eq!(spec.get("hooks"), Some(&ExclusionRule::Items(vec!["hooks-logging".to_string()])));
        match spec.get("session") {
            Some(ExclusionRule::Nested(nested)) => {
                assert_eq!(nested.get("orchestrator"), Some(&ExclusionRule::All));
            }
            other => panic!("expected nested rule, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_marker_rejected() {
        let err = ExclusionSpec::from_value(&json!({"tools": "everything"})).unwrap_err();
        assert!(err.to_string().contains("tools"));
    }

    #[test]
    fn test_non_string_identifier_rejected() {
        assert!(ExclusionSpec::from_value(&json!({"tools": ["tool-bash", 3]})).is_err());
        assert!(ExclusionSpec::from_value(&json!({"tools": true})).is_err());
        assert!(ExclusionSpec::from_value(&json!(["tools"])).is_err());
    }

    #[test]
    fn test_null_means_none() {
        assert_eq!(ExclusionSpec::from_value(&ConfigValue::Null).unwrap(), None);
    }

    #[test]
    fn test_null_section_rules_skipped() {
        let spec = ExclusionSpec::from_value(&json!({"tools": null, "session": {"context": null}}))
            .unwrap()
            .unwrap();
        assert_eq!(spec.get("tools"), None);
        assert_eq!(spec.get("session"), Some(&ExclusionRule::Nested(ExclusionSpec::new())));
    }

    #[test]
    fn test_round_trip_value() {
        let value = json!({"agents": "all", "tools": ["tool-bash"]});
        let spec = parse(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&spec).unwrap(), value);
    }
}
