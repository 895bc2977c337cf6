//! # Requirement Values
//!
//! The value a user enters for a requirement. Only two shapes exist: a
//! yes/no answer and a number. Which one a requirement accepts is decided by
//! its kind, at assignment time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value entered for a requirement.
///
/// Serializes untagged, so JSON `true` and `0.5` map directly onto
/// `Value::Bool(true)` and `Value::Number(0.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A yes/no answer.
    Bool(bool),
    /// A numeric answer. Percentages are expressed as fractions of one.
    Number(f64),
}

impl Value {
    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(_) => None,
        }
    }

    /// The numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            Self::Number(n) => Some(*n),
        }
    }

    /// Human name of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Text could not be read as a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot read {input:?} as a value: expected true/false, a number, or a percentage like 50%")]
pub struct ParseValueError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Value {
    type Err = ParseValueError;

    /// Parse user input.
    ///
    /// Accepts `true`/`false`, `yes`/`no`, `si`/`sí`/`no`, decimal numbers
    /// (with `.` or `,` as the decimal separator) and percentages with a `%`
    /// suffix, which are divided by 100.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError {
            input: s.to_string(),
        };
        let text = s.trim();
        match text.to_lowercase().as_str() {
            "true" | "yes" | "y" | "si" | "sí" => return Ok(Self::Bool(true)),
            "false" | "no" | "n" => return Ok(Self::Bool(false)),
            _ => {}
        }

        let (digits, scale) = match text.strip_suffix('%') {
            Some(rest) => (rest.trim_end(), 100.0),
            None => (text, 1.0),
        };
        let normalized = if digits.contains('.') {
            digits.to_string()
        } else {
            digits.replacen(',', ".", 1)
        };
        let n: f64 = normalized.parse().map_err(|_| err())?;
        if !n.is_finite() {
            return Err(err());
        }
        Ok(Self::Number(n / scale))
    }
}
