//! Secret redaction for printed plans and settings.

use profile_schema::ConfigValue;

/// Keys that contain secrets and should be redacted
pub const SECRET_KEYS: &[&str] = &[
    "password",
    "token",
    "secret",
    "private_key",
    "api_key",
    "credential",
];

pub const REDACTED: &str = "[REDACTED]";

/// Redact secrets in place, returning the redacted key paths.
///
/// Only scalar values are replaced; a secret-named object or list is
/// descended into instead.
pub fn redact_secrets(value: &mut ConfigValue) -> Vec<String> {
    let mut redactions = Vec::new();
    redact_recursive(value, String::new(), &mut redactions);
    redactions
}

fn redact_recursive(value: &mut ConfigValue, path: String, redactions: &mut Vec<String>) {
    match value {
        ConfigValue::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                let current_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };

                let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

                if is_secret && !val.is_object() && !val.is_array() {
                    *val = ConfigValue::String(REDACTED.to_string());
                    redactions.push(current_path);
                } else {
                    redact_recursive(val, current_path, redactions);
                }
            }
        }
        ConfigValue::Array(arr) => {
            for (i, val) in arr.iter_mut().enumerate() {
                redact_recursive(val, format!("{}[{}]", path, i), redactions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_module_config_secrets() {
        let mut plan = json!({
            "providers": [{"module": "provider-anthropic", "config": {"api_key": "sk-123", "model": "m"}}],
            "session": {"orchestrator": "loop-basic"}
        });
        let redactions = redact_secrets(&mut plan);

        assert_eq!(plan["providers"][0]["config"]["api_key"], REDACTED);
        assert_eq!(plan["providers"][0]["config"]["model"], "m");
        assert_eq!(redactions, vec!["providers[0].config.api_key"]);
    }

    #[test]
    fn test_key_match_is_case_insensitive() {
        let mut value = json!({"GitHub_Token": "ghp", "DB_PASSWORD": "x"});
        let redactions = redact_secrets(&mut value);
        assert_eq!(value, json!({"GitHub_Token": REDACTED, "DB_PASSWORD": REDACTED}));
        assert_eq!(redactions.len(), 2);
    }

    #[test]
    fn test_secret_named_tree_is_descended() {
        let mut value = json!({"credentials": {"user": "u", "password": "p"}});
        let redactions = redact_secrets(&mut value);
        assert_eq!(value["credentials"]["user"], "u");
        assert_eq!(redactions, vec!["credentials.password"]);
    }

    #[test]
    fn test_nothing_to_redact() {
        let mut value = json!({"tools": [{"module": "tool-fs"}]});
        let before = value.clone();
        assert!(redact_secrets(&mut value).is_empty());
        assert_eq!(value, before);
    }
}
