//! Error types for cty-core

use thiserror::Error;

/// Result type for cty-core operations
pub type Result<T> = std::result::Result<T, CtyError>;

/// Errors that can occur while extracting, generating or validating
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CtyError {
    /// A field required by the CRD layout is absent
    #[error("missing field '{path}'")]
    MissingField { path: String },

    /// A field exists but does not have the expected shape
    #[error("field '{path}' must be {expected}, found {found}")]
    InvalidField {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Schema nesting exceeds the supported depth
    #[error("schema at '{path}' is nested deeper than {max} levels")]
    SchemaTooDeep { path: String, max: usize },

    /// Requested version does not exist in the CRD
    #[error("version '{requested}' not found (available: {available})")]
    VersionNotFound { requested: String, available: String },

    /// Input is not valid YAML
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing generated output failed
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    /// Serializing a report failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CtyError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    pub(crate) fn invalid(
        path: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::InvalidField {
            path: path.into(),
            expected,
            found: value_kind(found),
        }
    }
}

/// Name of the JSON shape of a value, used in error messages
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a map",
    }
}
