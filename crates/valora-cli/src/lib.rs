//! # valora-cli — Command-Line Front End
//!
//! Drives the `valora-core` evaluation model from a terminal. The model
//! never prints or prompts; everything user-facing lives here.
//!
//! ## Subcommands
//!
//! - `valora show <FILE>` — Print a case and its requirements.
//! - `valora evaluate <FILE> --set NAME=VALUE ...` — Assign values and evaluate.
//! - `valora session [FILE]` — Interactive load / set / evaluate / reset loop.
//!
//! ```bash
//! valora show cases/beca.json
//! valora evaluate cases/beca.json --set Matriculado=si --set Asistencia=50% --set Edad=7
//! valora --format json evaluate cases/beca.yaml --values cases/respuestas.yaml
//! valora session cases/beca.json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument structs are separated from handler functions.
//! - Handlers write to a caller-supplied `Write` so they can be tested.
//! - Handlers return the process exit code; `main.rs` only dispatches.
//! - A failed command exits with `1`; under `--format json` it is also
//!   reported on stdout as `{"error": kind, "message": ...}`.

pub mod evaluate;
pub mod session;
pub mod show;

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use valora_core::{Bounds, Case, RequirementView, ValoraError};

/// Exit code for a completed evaluation that passed, or any other success.
pub const EXIT_OK: u8 = 0;
/// Exit code for a command that could not complete.
pub const EXIT_ERROR: u8 = 1;
/// Exit code for a completed evaluation that failed.
pub const EXIT_REJECTED: u8 = 2;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Load a descriptor file into a fresh case.
pub fn load_case(path: &Path) -> Result<Case> {
    let mut case = Case::new();
    case.load(path)
        .with_context(|| format!("failed to load case from {}", path.display()))?;
    Ok(case)
}

/// Resolve a requirement reference to its index.
///
/// An exact name match wins; otherwise a 1-based position is accepted.
pub fn resolve_requirement(case: &Case, key: &str) -> Result<usize> {
    if let Some(index) = case.find(key) {
        return Ok(index);
    }
    match key.parse::<usize>() {
        Ok(n) if (1..=case.len()).contains(&n) => Ok(n - 1),
        Ok(n) => bail!(
            "requirement number {n} out of range (case has {} requirements)",
            case.len()
        ),
        Err(_) => bail!("no requirement named {key:?}"),
    }
}

/// One-line summary of a requirement for listings.
pub fn summarize(view: &RequirementView) -> String {
    let target = match view.bounds {
        Bounds::Boolean { desired } => format!("desired {desired}"),
        Bounds::Percentage { min, max } | Bounds::Number { min, max } => {
            format!("between {min} and {max}")
        }
    };
    let value = view
        .value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>2}. {} [{}, {}] = {}",
        view.index + 1,
        view.name,
        view.kind,
        target,
        value
    )
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json(out: &mut dyn Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'a str,
    message: String,
}

/// Write a failed command as `{"error": kind, "message": ...}`.
///
/// `kind` comes from the first [`ValoraError`] in the error chain, or is
/// `command_failed` for errors raised by the CLI itself.
pub fn write_error_json(out: &mut dyn Write, err: &anyhow::Error) -> Result<()> {
    let kind = err
        .chain()
        .find_map(|e| e.downcast_ref::<ValoraError>())
        .map_or("command_failed", ValoraError::kind);
    write_json(
        out,
        &ErrorReport {
            error: kind,
            message: format!("{err:#}"),
        },
    )
}

/// Turn a handler result into the process exit code.
///
/// Errors are logged and, under `--format json`, also reported on `out`.
/// A failure to flush `out` turns any result into [`EXIT_ERROR`].
pub fn finish(result: Result<u8>, format: OutputFormat, out: &mut dyn Write) -> u8 {
    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            if format == OutputFormat::Json {
                if let Err(report_err) = write_error_json(out, &e) {
                    tracing::error!("failed to write error report: {report_err:#}");
                }
            }
            EXIT_ERROR
        }
    };
    match out.flush() {
        Ok(()) => code,
        Err(e) => {
            tracing::error!("failed to flush output: {e}");
            EXIT_ERROR
        }
    }
}
