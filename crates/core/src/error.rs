//! Error taxonomy for loading, validating, and looking up packs.

use std::fmt;

/// A single violated validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON-pointer-like location, e.g. `#/schemas/user/properties/age`.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Structural rule violations for one pack. Always carries every
/// violation found, never just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Pack id if it could be read, otherwise the source label.
    pub pack: String,
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pack '{}' failed validation with {} violation(s):",
            self.pack,
            self.violations.len()
        )?;
        for v in &self.violations {
            write!(f, "\n  - {}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// All errors that can be returned while loading or querying packs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// The pack source could not be read.
    #[error("could not load pack from {origin}: {message}")]
    Load { origin: String, message: String },

    /// The pack document violates one or more structural rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Two packs in a batch (or a batch and the registry) share an id.
    #[error("duplicate pack id '{id}'")]
    DuplicateId { id: String },

    /// A pack, scenario, or persona lookup missed.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl PackError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        PackError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError {
            pack: "crm".to_string(),
            violations: vec![
                Violation::new("#/id", "must match ^[a-z0-9-]+$"),
                Violation::new("#/version", "missing required string"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("2 violation(s)"));
        assert!(text.contains("#/id: must match"));
        assert!(text.contains("#/version: missing required string"));
    }

    #[test]
    fn duplicate_id_names_the_id() {
        let err = PackError::DuplicateId {
            id: "core".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate pack id 'core'");
    }
}
