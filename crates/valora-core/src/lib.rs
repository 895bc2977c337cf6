//! # valora-core — Rule Evaluation Model
//!
//! A case is an ordered list of named requirements. Each requirement is a
//! single check with kind-specific semantics: a boolean that must match a
//! desired answer, a percentage that must fall inside a `[0, 1]` window, or
//! a number that must fall inside an arbitrary range. A front end loads a
//! case from a descriptor file, assigns a value to each requirement and asks
//! the case to evaluate; the case answers with an overall verdict and a
//! numbered explanation.
//!
//! ## Key Design Principles
//!
//! 1. **Closed set of kinds.** [`RequirementKind`] is one enum with three
//!    variants. Every `match` on it is exhaustive, so adding a kind forces
//!    every consumer to handle it.
//!
//! 2. **Validated constructors, explicit mutators.** Bounds are checked when
//!    a requirement is built; values are checked when they are assigned.
//!    A rejected assignment never touches the previous value.
//!
//! 3. **All-or-nothing loading.** A descriptor is decoded into a candidate
//!    case and committed only when every entry has been built. A failed load
//!    leaves the case empty, never half-populated.
//!
//! 4. **No silent defaults.** Evaluating a requirement without a value is an
//!    error, not a FAIL.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod case;
pub mod descriptor;
pub mod error;
pub mod requirement;
pub mod schema;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use case::{Case, CaseState, Evaluation, RequirementOutcome};
pub use descriptor::DescriptorFormat;
pub use error::ValoraError;
pub use requirement::{Bounds, Requirement, RequirementKind, RequirementView};
pub use value::Value;
