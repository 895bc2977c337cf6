//! # Requirements
//!
//! A requirement is one named check inside a case. Its kind fixes the
//! comparison it performs:
//!
//! | Kind | Bounds | Accepts | Passes when |
//! |------|--------|---------|-------------|
//! | Boolean | `desired` | booleans | `value == desired` |
//! | Percentage | `min`, `max` in `[0, 1]` | numbers in `[0, 1]` | `min <= value <= max` |
//! | Number | finite `min`, `max` | finite numbers | `min <= value <= max` |
//!
//! Bounds are validated once, at construction, and never change afterwards.
//! `min <= max` is deliberately not checked: a requirement with inverted
//! bounds is legal and simply never passes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValoraError;
use crate::value::Value;

// ─── Kind ────────────────────────────────────────────────────────────

/// Discriminator selecting a requirement's evaluation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// Yes/no answer compared for equality against a desired answer.
    Boolean,
    /// Fraction of one compared against an inclusive window inside `[0, 1]`.
    Percentage,
    /// Arbitrary number compared against an inclusive range.
    Number,
}

impl RequirementKind {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Percentage => "Percentage",
            Self::Number => "Number",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────

/// Kind-specific target of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bounds {
    /// The answer a boolean requirement expects.
    Boolean {
        /// Value that passes.
        desired: bool,
    },
    /// Inclusive window for a percentage requirement.
    Percentage {
        /// Lowest passing fraction.
        min: f64,
        /// Highest passing fraction.
        max: f64,
    },
    /// Inclusive range for a numeric requirement.
    Number {
        /// Lowest passing value.
        min: f64,
        /// Highest passing value.
        max: f64,
    },
}

impl Bounds {
    /// The kind these bounds belong to.
    pub fn kind(&self) -> RequirementKind {
        match self {
            Self::Boolean { .. } => RequirementKind::Boolean,
            Self::Percentage { .. } => RequirementKind::Percentage,
            Self::Number { .. } => RequirementKind::Number,
        }
    }

    /// The `(min, max)` pair of a range kind.
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Boolean { .. } => None,
            Self::Percentage { min, max } | Self::Number { min, max } => Some((*min, *max)),
        }
    }

    /// Whether a range kind has `min > max` and therefore can never pass.
    pub fn is_inverted(&self) -> bool {
        self.range().is_some_and(|(min, max)| min > max)
    }

    /// Check the bounds themselves. Returns the reason they are illegal.
    fn check(&self) -> Result<(), String> {
        match self {
            Self::Boolean { .. } => Ok(()),
            Self::Percentage { min, max } => {
                check_fraction("minimum", *min)?;
                check_fraction("maximum", *max)
            }
            Self::Number { min, max } => {
                check_finite("minimum", *min)?;
                check_finite("maximum", *max)
            }
        }
    }

    /// Check that a value has the right shape and range for these bounds.
    fn admit(&self, value: Value) -> Result<(), String> {
        match (self, value) {
            (Self::Boolean { .. }, Value::Bool(_)) => Ok(()),
            (Self::Boolean { .. }, other) => Err(format!(
                "expected a boolean, got a {}",
                other.type_name()
            )),
            (Self::Percentage { .. }, Value::Number(n)) => check_fraction("value", n),
            (Self::Number { .. }, Value::Number(n)) => check_finite("value", n),
            (_, other) => Err(format!("expected a number, got a {}", other.type_name())),
        }
    }

    /// Apply the pass rule to an admitted value.
    fn passes(&self, value: Value) -> bool {
        match self {
            Self::Boolean { desired } => value.as_bool() == Some(*desired),
            Self::Percentage { min, max } | Self::Number { min, max } => {
                value.as_number().is_some_and(|n| *min <= n && n <= *max)
            }
        }
    }
}

fn check_fraction(what: &str, n: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&n) {
        Ok(())
    } else {
        Err(format!("{what} {n} must be between 0 and 1"))
    }
}

fn check_finite(what: &str, n: f64) -> Result<(), String> {
    if n.is_finite() {
        Ok(())
    } else {
        Err(format!("{what} {n} is not a finite number"))
    }
}

// ─── Requirement ─────────────────────────────────────────────────────

/// A single named check with a kind-specific pass rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    name: String,
    description: String,
    bounds: Bounds,
    value: Option<Value>,
}

impl Requirement {
    /// Build a requirement, validating its name and bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValoraError::InvalidBound`] if the name is empty, a
    /// percentage bound lies outside `[0, 1]`, or a numeric bound is not finite.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        bounds: Bounds,
    ) -> Result<Self, ValoraError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValoraError::InvalidBound {
                requirement: name,
                reason: "name must not be empty".into(),
            });
        }
        bounds.check().map_err(|reason| ValoraError::InvalidBound {
            requirement: name.clone(),
            reason,
        })?;
        Ok(Self {
            name,
            description: description.into(),
            bounds,
            value: None,
        })
    }

    /// Boolean requirement that passes when the entered value equals `desired`.
    pub fn boolean(
        name: impl Into<String>,
        description: impl Into<String>,
        desired: bool,
    ) -> Result<Self, ValoraError> {
        Self::new(name, description, Bounds::Boolean { desired })
    }

    /// Percentage requirement over the inclusive window `[min, max]`.
    pub fn percentage(
        name: impl Into<String>,
        description: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Result<Self, ValoraError> {
        Self::new(name, description, Bounds::Percentage { min, max })
    }

    /// Numeric requirement over the inclusive range `[min, max]`.
    pub fn number(
        name: impl Into<String>,
        description: impl Into<String>,
        min: f64,
        max: f64,
    ) -> Result<Self, ValoraError> {
        Self::new(name, description, Bounds::Number { min, max })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> RequirementKind {
        self.bounds.kind()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The currently assigned value, if any.
    pub fn value(&self) -> Option<Value> {
        self.value
    }

    /// Assign a value after checking its shape and range.
    ///
    /// On error the previous value is kept.
    pub fn assign(&mut self, value: Value) -> Result<(), ValoraError> {
        self.bounds
            .admit(value)
            .map_err(|reason| ValoraError::InvalidValueAssignment {
                requirement: self.name.clone(),
                reason,
            })?;
        self.value = Some(value);
        Ok(())
    }

    /// Apply the pass rule to the assigned value.
    ///
    /// # Errors
    ///
    /// Returns [`ValoraError::UnassignedValue`] when no value has been assigned.
    pub fn evaluate(&self) -> Result<bool, ValoraError> {
        self.outcome().map(|(_, passed)| passed)
    }

    /// The assigned value together with whether it passes.
    pub(crate) fn outcome(&self) -> Result<(Value, bool), ValoraError> {
        let value = self.value.ok_or_else(|| ValoraError::UnassignedValue {
            requirement: self.name.clone(),
        })?;
        Ok((value, self.bounds.passes(value)))
    }

    /// Clear the assigned value. Name, description and bounds are untouched.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Read-only projection for rendering.
    pub fn view(&self, index: usize) -> RequirementView {
        RequirementView {
            index,
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind(),
            value: self.value,
            bounds: self.bounds,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}\nDescription: {}\nKind: {}",
            self.name,
            self.description,
            self.kind()
        )?;
        match self.bounds {
            Bounds::Boolean { desired } => write!(f, "\nDesired value: {desired}"),
            Bounds::Percentage { min, max } | Bounds::Number { min, max } => {
                write!(f, "\nMinimum: {min}\nMaximum: {max}")
            }
        }
    }
}

/// Snapshot of a requirement as shown to a front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementView {
    /// Position in the case, starting at zero.
    pub index: usize,
    pub name: String,
    pub description: String,
    pub kind: RequirementKind,
    /// Currently assigned value; `None` until the user enters one.
    pub value: Option<Value>,
    pub bounds: Bounds,
}

// ─── Tests ───────────────────────────────────────────────────────────
