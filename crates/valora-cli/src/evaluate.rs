//! # Evaluate Subcommand
//!
//! Loads a case, assigns the supplied values and prints the evaluation.
//!
//! Values come from a values file (a JSON or YAML map of requirement name
//! to value), from repeated `--set NAME=VALUE` flags, or both; `--set`
//! wins when a requirement appears in both.
//!
//! Exit codes: `0` when the case passes, `2` when it fails, `1` when it
//! could not be evaluated at all.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use valora_core::{Case, DescriptorFormat, Evaluation, Value};

use crate::{load_case, resolve_requirement, write_json, OutputFormat, EXIT_OK, EXIT_REJECTED};

/// Arguments for the `valora evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Case descriptor (`.json`, `.yaml` or `.yml`).
    pub file: PathBuf,

    /// Assign a value: `NAME=VALUE`. NAME may also be a 1-based position.
    /// VALUE is true/false/si/no, a number, or a percentage like `50%`.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, Value)>,

    /// JSON or YAML file mapping requirement names to values.
    #[arg(long)]
    pub values: Option<PathBuf>,
}

/// Parse a `NAME=VALUE` flag. The last `=` separates name from value.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing requirement name in {raw:?}"));
    }
    let value = value.parse::<Value>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), value))
}

/// Read a values file into name → value pairs.
pub fn read_values_file(path: &Path) -> Result<BTreeMap<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read values file {}", path.display()))?;
    let values = match DescriptorFormat::from_path(path) {
        DescriptorFormat::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in values file {}", path.display()))?,
        DescriptorFormat::Json => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in values file {}", path.display()))?,
    };
    Ok(values)
}

#[derive(Serialize)]
struct EvaluationReport<'a> {
    case: Option<&'a str>,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

/// Assign every value, in order, to the case.
fn apply_assignments<'a>(
    case: &mut Case,
    assignments: impl IntoIterator<Item = (&'a str, Value)>,
) -> Result<()> {
    for (key, value) in assignments {
        let index = resolve_requirement(case, key)?;
        case.assign_value(index, value)
            .with_context(|| format!("cannot assign {value} to {key:?}"))?;
        tracing::debug!(requirement = key, %value, "assigned value");
    }
    Ok(())
}

/// Execute the evaluate subcommand.
pub fn run_evaluate(args: &EvaluateArgs, format: OutputFormat, out: &mut dyn Write) -> Result<u8> {
    let mut case = load_case(&args.file)?;

    if let Some(path) = &args.values {
        let from_file = read_values_file(path)?;
        apply_assignments(&mut case, from_file.iter().map(|(k, v)| (k.as_str(), *v)))?;
    }
    apply_assignments(
        &mut case,
        args.assignments.iter().map(|(k, v)| (k.as_str(), *v)),
    )?;

    let evaluation = case
        .evaluate()
        .with_context(|| format!("cannot evaluate {}", args.file.display()))?;

    match format {
        OutputFormat::Json => write_json(
            out,
            &EvaluationReport {
                case: case.name(),
                evaluation: &evaluation,
            },
        )?,
        OutputFormat::Text => write!(out, "{}", evaluation.explanation)?,
    }

    Ok(if evaluation.passed {
        EXIT_OK
    } else {
        EXIT_REJECTED
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"{
        "caso": {
            "nombre": "Beca",
            "descripcion": "Solicitud",
            "requisitos": [
                { "tipo": "Booleano", "nombre": "Matriculado", "descripcion": "", "valor_deseado": true },
                { "tipo": "Porcentaje", "nombre": "Asistencia", "descripcion": "", "valor_minimo": 0.3, "valor_maximo": 0.7 },
                { "tipo": "Numero", "nombre": "Edad", "descripcion": "", "valor_minimo": 5, "valor_maximo": 10 }
            ]
        }
    }"#;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beca.json");
        std::fs::write(&path, DESCRIPTOR).unwrap();
        (dir, path)
    }

    fn sets(pairs: &[&str]) -> Vec<(String, Value)> {
        pairs.iter().map(|p| parse_assignment(p).unwrap()).collect()
    }

    #[test]
    fn parse_assignment_forms() {
        assert_eq!(
            parse_assignment("Edad=7").unwrap(),
            ("Edad".to_string(), Value::Number(7.0))
        );
        assert_eq!(
            parse_assignment("a=b=50%").unwrap(),
            ("a=b".to_string(), Value::Number(0.5))
        );
        assert_eq!(
            parse_assignment(" Matriculado =si").unwrap(),
            ("Matriculado".to_string(), Value::Bool(true))
        );
        assert!(parse_assignment("Edad").is_err());
        assert!(parse_assignment("=7").is_err());
        assert!(parse_assignment("Edad=siete").is_err());
    }

    #[test]
    fn passing_case_exits_zero() {
        let (_dir, file) = setup();
        let args = EvaluateArgs {
            file,
            assignments: sets(&["Matriculado=true", "Asistencia=50%", "Edad=7"]),
            values: None,
        };
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(run_evaluate(&args, OutputFormat::Text, &mut out).unwrap(), EXIT_OK);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Overall result: PASS"));
    }

    #[test]
    fn failing_case_exits_two_with_json_report() {
        let (_dir, file) = setup();
        let args = EvaluateArgs {
            file,
            assignments: sets(&["1=true", "2=0.2", "3=7"]),
            values: None,
        };
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(
            run_evaluate(&args, OutputFormat::Json, &mut out).unwrap(),
            EXIT_REJECTED
        );
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["case"], "Beca");
        assert_eq!(json["passed"], false);
        assert_eq!(json["outcomes"][1]["name"], "Asistencia");
        assert_eq!(json["outcomes"][1]["passed"], false);
        assert_eq!(json["outcomes"][1]["value"], 0.2);
    }

    #[test]
    fn values_file_then_flags_override() {
        let (dir, file) = setup();
        let values = dir.path().join("valores.yaml");
        std::fs::write(&values, "Matriculado: true\nAsistencia: 0.5\nEdad: 15\n").unwrap();

        let args = EvaluateArgs {
            file: file.clone(),
            assignments: Vec::new(),
            values: Some(values.clone()),
        };
        assert_eq!(
            run_evaluate(&args, OutputFormat::Text, &mut Vec::<u8>::new()).unwrap(),
            EXIT_REJECTED
        );

        let args = EvaluateArgs {
            file,
            assignments: sets(&["Edad=8"]),
            values: Some(values),
        };
        assert_eq!(
            run_evaluate(&args, OutputFormat::Text, &mut Vec::<u8>::new()).unwrap(),
            EXIT_OK
        );
    }

    #[test]
    fn missing_value_is_an_error() {
        let (_dir, file) = setup();
        let args = EvaluateArgs {
            file,
            assignments: sets(&["Matriculado=true", "Edad=7"]),
            values: None,
        };
        let err = run_evaluate(&args, OutputFormat::Text, &mut Vec::<u8>::new()).unwrap_err();
        assert!(format!("{err:#}").contains("Asistencia"));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let (_dir, file) = setup();
        let args = EvaluateArgs {
            file,
            assignments: sets(&["Edad=true"]),
            values: None,
        };
        let err = run_evaluate(&args, OutputFormat::Text, &mut Vec::<u8>::new()).unwrap_err();
        assert!(format!("{err:#}").contains("Edad"));
    }

    #[test]
    fn unknown_requirement_is_an_error() {
        let (_dir, file) = setup();
        let args = EvaluateArgs {
            file,
            assignments: sets(&["Peso=70"]),
            values: None,
        };
        assert!(run_evaluate(&args, OutputFormat::Text, &mut Vec::<u8>::new()).is_err());
    }
}
