//! # Descriptor Schema Validation
//!
//! Structural validation of case descriptors against the JSON Schema
//! (Draft 2020-12) embedded from `schemas/case-descriptor.schema.json`.
//!
//! The schema is the first gate a descriptor passes through: it rejects
//! missing fields, wrong field types, unknown `tipo` tags and percentage
//! bounds outside `[0, 1]`, and reports every violation at once with the
//! JSON Pointer of the offending field. Typed decoding runs only on
//! documents that pass.

use std::fmt;

use jsonschema::Validator;
use serde_json::Value;

/// The embedded descriptor schema.
pub const CASE_DESCRIPTOR_SCHEMA: &str = include_str!("../schemas/case-descriptor.schema.json");

/// A single violation with its location in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Every violation found in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Compiled validator for case descriptors.
pub struct DescriptorSchema {
    validator: Validator,
}

impl fmt::Debug for DescriptorSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorSchema").finish_non_exhaustive()
    }
}

impl DescriptorSchema {
    /// Compile the embedded schema.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the embedded schema is not
    /// valid JSON or not a valid schema.
    pub fn new() -> Result<Self, String> {
        let schema: Value = serde_json::from_str(CASE_DESCRIPTOR_SCHEMA)
            .map_err(|e| format!("embedded descriptor schema is not valid JSON: {e}"))?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| format!("embedded descriptor schema does not compile: {e}"))?;

        Ok(Self { validator })
    }

    /// Validate a parsed document.
    ///
    /// # Errors
    ///
    /// Returns every violation found, in the order the validator reports them.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationViolations> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationViolations { violations })
        }
    }
}
