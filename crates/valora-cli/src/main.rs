//! # valora CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! subcommand handlers in the library crate.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use valora_cli::evaluate::{run_evaluate, EvaluateArgs};
use valora_cli::session::{run_session, SessionArgs};
use valora_cli::show::{run_show, ShowArgs};
use valora_cli::{finish, OutputFormat};

/// Valora — evaluate a case against its requirements.
///
/// Loads a case descriptor (JSON or YAML), takes a value for every
/// requirement and reports PASS/FAIL per requirement and overall.
#[derive(Parser, Debug)]
#[command(name = "valora", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for command results.
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a case and its requirements.
    Show(ShowArgs),

    /// Assign values to a case and evaluate it (exit 0 = PASS, 2 = FAIL).
    Evaluate(EvaluateArgs),

    /// Interactive session: load, set values, evaluate, reset.
    Session(SessionArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "valora starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match &cli.command {
        Commands::Show(args) => run_show(args, cli.format, &mut out),
        Commands::Evaluate(args) => run_evaluate(args, cli.format, &mut out),
        Commands::Session(args) => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            run_session(args, &mut input, &mut out)
        }
    };

    ExitCode::from(finish(result, cli.format, &mut out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use valora_core::Value;

    #[test]
    fn cli_parse_show() {
        let cli = Cli::try_parse_from(["valora", "show", "beca.json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Show(args) => assert_eq!(args.file, PathBuf::from("beca.json")),
            other => panic!("expected show, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_evaluate_with_sets_and_values() {
        let cli = Cli::try_parse_from([
            "valora",
            "evaluate",
            "beca.yaml",
            "--set",
            "Edad=7",
            "--set",
            "Asistencia=50%",
            "--values",
            "respuestas.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.file, PathBuf::from("beca.yaml"));
                assert_eq!(
                    args.assignments,
                    vec![
                        ("Edad".to_string(), Value::Number(7.0)),
                        ("Asistencia".to_string(), Value::Number(0.5)),
                    ]
                );
                assert_eq!(args.values, Some(PathBuf::from("respuestas.json")));
            }
            other => panic!("expected evaluate, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_rejects_bad_assignment() {
        assert!(Cli::try_parse_from(["valora", "evaluate", "beca.json", "--set", "Edad"]).is_err());
        assert!(
            Cli::try_parse_from(["valora", "evaluate", "beca.json", "--set", "Edad=x"]).is_err()
        );
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["valora", "session", "-vv", "--format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Session(args) => assert!(args.file.is_none()),
            other => panic!("expected session, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["valora"]).is_err());
        assert!(Cli::try_parse_from(["valora", "show"]).is_err());
    }
}
