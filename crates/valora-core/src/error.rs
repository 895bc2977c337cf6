//! # Error Types
//!
//! Every failure the model can report to its caller. All variants carry a
//! human-readable message; the front end decides how to present them.
//!
//! ## Design
//!
//! - Descriptor errors name the document and the offending field.
//! - Assignment errors name the requirement and why the value was refused.
//! - Evaluation errors name the requirement that blocked the evaluation.

use thiserror::Error;

/// Top-level error type for the evaluation model.
#[derive(Error, Debug)]
pub enum ValoraError {
    /// The descriptor is missing fields, has wrong types, an unknown kind
    /// tag, or an illegal bound. The case is left empty.
    #[error("malformed descriptor '{source_name}': {reason}")]
    MalformedDescriptor {
        /// Path or label of the document being loaded.
        source_name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The descriptor file could not be read.
    #[error("cannot read descriptor '{path}': {source}")]
    FileAccess {
        /// Path that was opened.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// A value of the wrong type or outside the accepted range was assigned.
    /// The requirement keeps its previous value.
    #[error("invalid value for requirement '{requirement}': {reason}")]
    InvalidValueAssignment {
        /// Name of the requirement.
        requirement: String,
        /// Why the value was refused.
        reason: String,
    },

    /// Evaluation reached a requirement with no value assigned.
    #[error("requirement '{requirement}' has no value assigned")]
    UnassignedValue {
        /// Name of the requirement.
        requirement: String,
    },

    /// Evaluation was requested on a case with no requirements.
    #[error("case has no requirements to evaluate")]
    EmptyCase,

    /// A requirement index past the end of the case.
    #[error("requirement index {index} out of range (case has {count} requirements)")]
    RequirementNotFound {
        /// Requested index.
        index: usize,
        /// Number of requirements in the case.
        count: usize,
    },

    /// A requirement was constructed with an illegal name or bound.
    #[error("invalid definition for requirement '{requirement}': {reason}")]
    InvalidBound {
        /// Name of the requirement (may be empty if the name itself is the problem).
        requirement: String,
        /// What was wrong with the definition.
        reason: String,
    },
}

impl ValoraError {
    /// Short machine-readable label for the error kind. The CLI reports it
    /// as the `error` field when a command fails under `--format json`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDescriptor { .. } => "malformed_descriptor",
            Self::FileAccess { .. } => "file_access",
            Self::InvalidValueAssignment { .. } => "invalid_value_assignment",
            Self::UnassignedValue { .. } => "unassigned_value",
            Self::EmptyCase => "empty_case",
            Self::RequirementNotFound { .. } => "requirement_not_found",
            Self::InvalidBound { .. } => "invalid_bound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_requirement() {
        let err = ValoraError::UnassignedValue {
            requirement: "Edad".into(),
        };
        assert_eq!(err.to_string(), "requirement 'Edad' has no value assigned");

        let err = ValoraError::InvalidValueAssignment {
            requirement: "Asistencia".into(),
            reason: "expected a number".into(),
        };
        assert!(err.to_string().contains("Asistencia"));
        assert!(err.to_string().contains("expected a number"));
    }

    #[test]
    fn file_access_exposes_io_source() {
        let err = ValoraError::FileAccess {
            path: "missing.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind(), "file_access");
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            ValoraError::EmptyCase.kind(),
            ValoraError::RequirementNotFound { index: 3, count: 1 }.kind(),
            ValoraError::MalformedDescriptor {
                source_name: "x".into(),
                reason: "y".into(),
            }
            .kind(),
        ];
        assert_eq!(kinds, ["empty_case", "requirement_not_found", "malformed_descriptor"]);
    }
}
