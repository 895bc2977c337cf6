//! # Case Lifecycle and Evaluation
//!
//! A [`Case`] owns an ordered list of requirements and produces a verdict
//! over all of them.
//!
//! ## States
//!
//! ```text
//!            load (ok)              evaluate (ok)
//! Empty ───────────────▶ Loaded ───────────────▶ Evaluated
//!   ▲                      ▲                         │
//!   │ load (failed)        └──── reset / assign ─────┘
//!   └──── from any state
//! ```
//!
//! A load always passes through `Empty`: the current contents are dropped
//! before the descriptor is read, and the decoded candidate is committed
//! only after every requirement in it has been built.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::descriptor::{self, DescriptorFormat};
use crate::error::ValoraError;
use crate::requirement::{Requirement, RequirementView};
use crate::value::Value;

/// Marker printed for a passing requirement or case.
pub const PASS_MARKER: &str = "PASS";
/// Marker printed for a failing requirement or case.
pub const FAIL_MARKER: &str = "FAIL";

fn marker(passed: bool) -> &'static str {
    if passed {
        PASS_MARKER
    } else {
        FAIL_MARKER
    }
}

// ─── State ───────────────────────────────────────────────────────────

/// Where a case is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Nothing loaded.
    Empty,
    /// A descriptor is loaded; no current explanation.
    Loaded,
    /// The last evaluation succeeded and its explanation is current.
    Evaluated,
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "EMPTY"),
            Self::Loaded => write!(f, "LOADED"),
            Self::Evaluated => write!(f, "EVALUATED"),
        }
    }
}

// ─── Evaluation Result ───────────────────────────────────────────────

/// Result of one requirement inside an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementOutcome {
    pub index: usize,
    pub name: String,
    pub value: Value,
    pub passed: bool,
}

/// Result of evaluating a whole case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// `true` only if every requirement passed.
    pub passed: bool,
    /// Numbered, human-readable report.
    pub explanation: String,
    /// Per-requirement results in case order.
    pub outcomes: Vec<RequirementOutcome>,
}

impl Evaluation {
    /// Number of requirements that passed.
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }
}

// ─── Case ────────────────────────────────────────────────────────────

/// An ordered set of requirements under evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Case {
    name: Option<String>,
    description: Option<String>,
    requirements: Vec<Requirement>,
    explanation: Option<String>,
}

impl Case {
    /// An empty case. Call [`Case::load`] to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loaded case built directly from requirements.
    pub fn with_requirements(
        name: impl Into<String>,
        description: impl Into<String>,
        requirements: Vec<Requirement>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            requirements,
            explanation: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Report produced by the last successful evaluation.
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn state(&self) -> CaseState {
        if self.name.is_none() {
            CaseState::Empty
        } else if self.explanation.is_some() {
            CaseState::Evaluated
        } else {
            CaseState::Loaded
        }
    }

    /// Load a descriptor file, replacing whatever the case held.
    ///
    /// The format is chosen from the file extension (see
    /// [`DescriptorFormat::from_path`]).
    ///
    /// # Errors
    ///
    /// [`ValoraError::FileAccess`] if the file cannot be read and
    /// [`ValoraError::MalformedDescriptor`] if its content is invalid. In
    /// both cases the case is left empty.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ValoraError> {
        let path = path.as_ref();
        self.clear();

        let text = std::fs::read_to_string(path).map_err(|source| ValoraError::FileAccess {
            path: path.display().to_string(),
            source,
        })?;

        self.load_str(
            &text,
            DescriptorFormat::from_path(path),
            &path.display().to_string(),
        )
    }

    /// Load a descriptor already held in memory.
    ///
    /// `source_name` labels the document in error messages.
    pub fn load_str(
        &mut self,
        text: &str,
        format: DescriptorFormat,
        source_name: &str,
    ) -> Result<(), ValoraError> {
        self.clear();
        let candidate = descriptor::parse(text, format, source_name)?;
        tracing::debug!(
            source = source_name,
            requirements = candidate.len(),
            "loaded case descriptor"
        );
        *self = candidate;
        Ok(())
    }

    /// Clear the explanation and every requirement's value, keeping the
    /// loaded structure.
    pub fn reset(&mut self) {
        self.explanation = None;
        for requirement in &mut self.requirements {
            requirement.reset();
        }
    }

    /// Read-only projection of all requirements, in case order.
    pub fn list_requirements(&self) -> Vec<RequirementView> {
        self.requirements
            .iter()
            .enumerate()
            .map(|(i, r)| r.view(i))
            .collect()
    }

    /// Position of the requirement with the given name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.requirements.iter().position(|r| r.name() == name)
    }

    /// Assign a value to the requirement at `index`.
    ///
    /// A successful assignment invalidates the current explanation.
    ///
    /// # Errors
    ///
    /// [`ValoraError::RequirementNotFound`] for an index past the end and
    /// [`ValoraError::InvalidValueAssignment`] for a value the requirement
    /// refuses. Either way nothing changes.
    pub fn assign_value(&mut self, index: usize, value: Value) -> Result<(), ValoraError> {
        let count = self.requirements.len();
        let requirement = self
            .requirements
            .get_mut(index)
            .ok_or(ValoraError::RequirementNotFound { index, count })?;
        requirement.assign(value)?;
        self.explanation = None;
        Ok(())
    }

    /// Evaluate every requirement in order.
    ///
    /// Every requirement is visited so the explanation covers all of them;
    /// the case passes only if all of them pass.
    ///
    /// # Errors
    ///
    /// [`ValoraError::EmptyCase`] when there is nothing to evaluate and
    /// [`ValoraError::UnassignedValue`] when a requirement has no value. On
    /// error the stored explanation is left as it was.
    pub fn evaluate(&mut self) -> Result<Evaluation, ValoraError> {
        if self.requirements.is_empty() {
            return Err(ValoraError::EmptyCase);
        }

        let mut passed = true;
        let mut explanation = String::new();
        let mut outcomes = Vec::with_capacity(self.requirements.len());

        for (index, requirement) in self.requirements.iter().enumerate() {
            let (value, ok) = requirement.outcome()?;

            explanation.push_str(&format!(
                "{}. {}\n==> Entered value: {}\n==> Result: {}\n\n",
                index + 1,
                requirement,
                value,
                marker(ok)
            ));
            outcomes.push(RequirementOutcome {
                index,
                name: requirement.name().to_string(),
                value,
                passed: ok,
            });
            passed &= ok;
        }

        let mut evaluation = Evaluation {
            passed,
            explanation,
            outcomes,
        };
        let passed_count = evaluation.passed_count();
        let total = evaluation.outcomes.len();
        evaluation.explanation.push_str(&format!(
            "Overall result: {} ({passed_count} of {total} requirements passed)\n",
            marker(passed),
        ));

        tracing::debug!(
            case = self.name.as_deref().unwrap_or_default(),
            passed,
            passed_count,
            total,
            "evaluated case"
        );

        self.explanation = Some(evaluation.explanation.clone());
        Ok(evaluation)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}\nDescription: {}\nRequirements: {}",
            self.name.as_deref().unwrap_or("-"),
            self.description.as_deref().unwrap_or("-"),
            self.requirements.len()
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::RequirementKind;

    fn three_requirement_case() -> Case {
        Case::with_requirements(
            "Beca",
            "Solicitud de beca",
            vec![
                Requirement::boolean("Matriculado", "Esta matriculado", true).unwrap(),
                Requirement::percentage("Asistencia", "Asistencia a clase", 0.3, 0.7).unwrap(),
                Requirement::number("Edad", "Edad del solicitante", 5.0, 10.0).unwrap(),
            ],
        )
    }

    fn numbered_blocks(explanation: &str) -> Vec<&str> {
        explanation
            .lines()
            .filter(|l| {
                l.split_once(". ")
                    .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
            })
            .collect()
    }

    #[test]
    fn new_case_is_empty() {
        let case = Case::new();
        assert_eq!(case.state(), CaseState::Empty);
        assert!(case.is_empty());
        assert!(case.explanation().is_none());
        assert!(case.name().is_none());
    }

    #[test]
    fn all_passing_case_passes() {
        let mut case = three_requirement_case();
        case.assign_value(0, Value::Bool(true)).unwrap();
        case.assign_value(1, Value::Number(0.5)).unwrap();
        case.assign_value(2, Value::Number(7.0)).unwrap();

        let eval = case.evaluate().unwrap();
        assert!(eval.passed);
        assert_eq!(eval.passed_count(), 3);
        assert_eq!(case.state(), CaseState::Evaluated);
        assert_eq!(case.explanation(), Some(eval.explanation.as_str()));
    }

    #[test]
    fn one_failure_fails_the_case_and_reports_every_block_in_order() {
        let mut case = three_requirement_case();
        case.assign_value(0, Value::Bool(true)).unwrap();
        case.assign_value(1, Value::Number(0.2)).unwrap();
        case.assign_value(2, Value::Number(7.0)).unwrap();

        let eval = case.evaluate().unwrap();
        assert!(!eval.passed);

        let blocks = numbered_blocks(&eval.explanation);
        assert_eq!(
            blocks,
            vec!["1. Name: Matriculado", "2. Name: Asistencia", "3. Name: Edad"]
        );
        assert_eq!(eval.explanation.matches("==> Entered value:").count(), 3);
        assert_eq!(eval.explanation.matches("==> Result: PASS").count(), 2);
        assert_eq!(eval.explanation.matches("==> Result: FAIL").count(), 1);
        assert!(eval.explanation.contains("==> Entered value: 0.2\n==> Result: FAIL"));
        assert!(eval
            .explanation
            .ends_with("Overall result: FAIL (2 of 3 requirements passed)\n"));

        let names: Vec<_> = eval.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["Matriculado", "Asistencia", "Edad"]);
        assert_eq!(
            eval.outcomes.iter().map(|o| o.passed).collect::<Vec<_>>(),
            [true, false, true]
        );
    }

    #[test]
    fn unassigned_value_aborts_without_touching_explanation() {
        let mut case = three_requirement_case();
        case.assign_value(0, Value::Bool(true)).unwrap();
        case.assign_value(2, Value::Number(7.0)).unwrap();

        let err = case.evaluate().unwrap_err();
        match err {
            ValoraError::UnassignedValue { requirement } => assert_eq!(requirement, "Asistencia"),
            other => panic!("expected UnassignedValue, got {other:?}"),
        }
        assert!(case.explanation().is_none());
        assert_eq!(case.state(), CaseState::Loaded);
    }

    #[test]
    fn empty_case_cannot_be_evaluated() {
        let mut case = Case::new();
        assert!(matches!(case.evaluate(), Err(ValoraError::EmptyCase)));

        let mut case = Case::with_requirements("Vacio", "Sin requisitos", Vec::new());
        assert_eq!(case.state(), CaseState::Loaded);
        assert!(matches!(case.evaluate(), Err(ValoraError::EmptyCase)));
    }

    #[test]
    fn reset_clears_values_and_explanation_but_keeps_structure() {
        let mut case = three_requirement_case();
        case.assign_value(0, Value::Bool(false)).unwrap();
        case.assign_value(1, Value::Number(0.5)).unwrap();
        case.assign_value(2, Value::Number(15.0)).unwrap();
        case.evaluate().unwrap();

        let before = case.list_requirements();
        case.reset();

        assert_eq!(case.state(), CaseState::Loaded);
        assert!(case.explanation().is_none());
        let after = case.list_requirements();
        assert_eq!(after.len(), before.len());
        for (a, b) in after.iter().zip(&before) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.description, b.description);
            assert_eq!(a.bounds, b.bounds);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.value, None);
        }
        assert_eq!(case.name(), Some("Beca"));
    }

    #[test]
    fn rejected_assignment_keeps_prior_value() {
        let mut case = three_requirement_case();
        case.assign_value(1, Value::Number(0.4)).unwrap();

        let err = case.assign_value(1, Value::Bool(true)).unwrap_err();
        assert!(matches!(err, ValoraError::InvalidValueAssignment { .. }));
        assert_eq!(case.list_requirements()[1].value, Some(Value::Number(0.4)));

        let err = case.assign_value(2, Value::Bool(true)).unwrap_err();
        assert!(matches!(err, ValoraError::InvalidValueAssignment { .. }));
        assert_eq!(case.list_requirements()[2].value, None);
    }

    #[test]
    fn assignment_out_of_range_index() {
        let mut case = three_requirement_case();
        match case.assign_value(3, Value::Bool(true)) {
            Err(ValoraError::RequirementNotFound { index, count }) => {
                assert_eq!((index, count), (3, 3));
            }
            other => panic!("expected RequirementNotFound, got {other:?}"),
        }
    }

    #[test]
    fn assignment_after_evaluation_drops_stale_explanation() {
        let mut case = three_requirement_case();
        case.assign_value(0, Value::Bool(true)).unwrap();
        case.assign_value(1, Value::Number(0.5)).unwrap();
        case.assign_value(2, Value::Number(7.0)).unwrap();
        case.evaluate().unwrap();

        case.assign_value(2, Value::Number(15.0)).unwrap();
        assert_eq!(case.state(), CaseState::Loaded);
        assert!(case.explanation().is_none());
        assert!(!case.evaluate().unwrap().passed);
    }

    #[test]
    fn find_and_list_follow_case_order() {
        let case = three_requirement_case();
        assert_eq!(case.find("Edad"), Some(2));
        assert_eq!(case.find("edad"), None);
        let kinds: Vec<_> = case.list_requirements().iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            [
                RequirementKind::Boolean,
                RequirementKind::Percentage,
                RequirementKind::Number
            ]
        );
    }

    #[test]
    fn display_summarizes_case() {
        let case = three_requirement_case();
        assert_eq!(
            case.to_string(),
            "Name: Beca\nDescription: Solicitud de beca\nRequirements: 3"
        );
        assert_eq!(CaseState::Evaluated.to_string(), "EVALUATED");
    }
}
