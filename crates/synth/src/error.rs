//! Synthesis errors. All of them are fatal to the generation call.

/// Errors raised while turning a schema into values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A `$ref` names a schema that is not among the known definitions.
    #[error("unresolved $ref '{reference}' at {path}")]
    UnresolvedRef { reference: String, path: String },

    /// A field whose constraints admit no value (e.g. `minimum > maximum`).
    #[error("impossible constraints on field '{field}': {message}")]
    Conflict { field: String, message: String },

    /// A required `$ref` chain nested deeper than the recursion limit.
    #[error("$ref '{reference}' at {path} nests deeper than {limit} levels")]
    RecursionLimit {
        reference: String,
        path: String,
        limit: usize,
    },

    /// A request or scenario names a schema the pack does not declare.
    #[error("unknown schema '{name}' in pack '{pack}'")]
    UnknownSchema { pack: String, name: String },

    /// A generation context or request carries an unusable value.
    #[error("invalid {field} '{value}': {message}")]
    InvalidInput {
        field: &'static str,
        value: String,
        message: String,
    },
}

impl SchemaError {
    pub(crate) fn conflict(field: &str, message: impl Into<String>) -> Self {
        SchemaError::Conflict {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
