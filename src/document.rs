//! Reading profile, agent and settings documents from disk.
//!
//! `.json` files are parsed as JSON; anything else as TOML. Both become a
//! [`ConfigTree`], with a SHA-256 digest of the raw bytes for provenance.

use std::fs;
use std::path::{Path, PathBuf};

use profile_schema::{ConfigTree, ConfigValue};
use sha2::{Digest, Sha256};

/// A parsed document and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pub tree: ConfigTree,
    /// SHA-256 of the raw file bytes, hex encoded
    pub digest: String,
}

impl Document {
    /// File stem, used to name documents that do not name themselves.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }
}

/// Document errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path}: top level must be a table or object")]
    NotATree { path: PathBuf },
}

/// Read and parse a document.
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let bytes = fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = sha256_hex(&bytes);

    let contents = String::from_utf8(bytes).map_err(|e| DocumentError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {}", e),
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let value = if is_json {
        serde_json::from_str::<ConfigValue>(&contents).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            message: format!("JSON parse error: {}", e),
        })?
    } else {
        let toml_value: toml::Value = toml::from_str(&contents).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            message: format!("TOML parse error: {}", e),
        })?;
        toml_to_json(toml_value)
    };

    match value {
        ConfigValue::Object(tree) => Ok(Document {
            path: path.to_path_buf(),
            tree,
            digest,
        }),
        _ => Err(DocumentError::NotATree {
            path: path.to_path_buf(),
        }),
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> ConfigValue {
    match toml {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(ConfigValue::Number)
            .unwrap_or(ConfigValue::Null),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(arr) => ConfigValue::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => ConfigValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
