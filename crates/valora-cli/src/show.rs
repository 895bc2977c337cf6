//! # Show Subcommand
//!
//! Prints a case descriptor the way a form would lay it out: the case
//! header followed by each requirement's description block.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use valora_core::{CaseState, RequirementView};

use crate::{load_case, write_json, OutputFormat, EXIT_OK};

/// Arguments for the `valora show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Case descriptor (`.json`, `.yaml` or `.yml`).
    pub file: PathBuf,
}

#[derive(Serialize)]
struct CaseReport<'a> {
    name: Option<&'a str>,
    description: Option<&'a str>,
    state: CaseState,
    requirements: Vec<RequirementView>,
}

/// Execute the show subcommand.
pub fn run_show(args: &ShowArgs, format: OutputFormat, out: &mut dyn Write) -> Result<u8> {
    let case = load_case(&args.file)?;

    match format {
        OutputFormat::Json => write_json(
            out,
            &CaseReport {
                name: case.name(),
                description: case.description(),
                state: case.state(),
                requirements: case.list_requirements(),
            },
        )?,
        OutputFormat::Text => {
            writeln!(out, "{case}")?;
            for (i, requirement) in case.requirements().iter().enumerate() {
                writeln!(out)?;
                writeln!(out, "{}. {requirement}", i + 1)?;
            }
        }
    }

    Ok(EXIT_OK)
}
