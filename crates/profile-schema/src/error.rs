//! Validation errors for profile and agent records.

/// A record did not have the shape its schema requires.
///
/// Raised at the schema boundary and never recovered by the merge engine.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {kind}: {source}")]
    Record {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid exclusion for section '{section}': {message}")]
    Exclusion { section: String, message: String },

    #[error("invalid agents value: {0}")]
    Agents(String),
}

impl ValidationError {
    pub(crate) fn exclusion(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exclusion {
            section: section.into(),
            message: message.into(),
        }
    }
}
