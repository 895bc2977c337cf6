//! # Session Subcommand
//!
//! A line-oriented form: load a case, fill in values one at a time, evaluate,
//! reset and try again without re-opening the file. Every model error is
//! printed and the session carries on.
//!
//! ```text
//! valora> load cases/beca.json
//! valora> list
//! valora> set Asistencia 50%
//! valora> eval
//! valora> reset
//! valora> quit
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use valora_core::{Case, CaseState, Value};

use crate::{resolve_requirement, summarize, EXIT_OK};

const PROMPT: &str = "valora> ";

const HELP: &str = "\
Commands:
  load <path>           Load a case descriptor, replacing the current case
  list                  List requirements with their current values
  show                  Show the case and every requirement in detail
  set <name|n> <value>  Assign a value (true/false/si/no, number, or 50%)
  eval                  Evaluate the case and print the explanation
  reset                 Clear all values and the explanation
  help                  Show this help
  quit                  Leave the session";

/// Arguments for the `valora session` subcommand.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Case descriptor to load on start.
    pub file: Option<PathBuf>,
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive state: the single live case.
#[derive(Debug, Default)]
pub struct Session {
    case: Case,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    /// Run one command line. I/O failures on `out` are the only errors.
    fn handle(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" | "?" => writeln!(out, "{HELP}")?,
            "load" | "open" => self.load(rest, out)?,
            "list" | "ls" => self.list(out)?,
            "show" => self.show(out)?,
            "set" => self.set(rest, out)?,
            "eval" | "evaluate" => self.evaluate(out)?,
            "reset" => {
                self.case.reset();
                writeln!(out, "Values and explanation cleared.")?;
            }
            other => writeln!(out, "error: unknown command {other:?} (type 'help')")?,
        }
        Ok(Flow::Continue)
    }

    fn load(&mut self, path: &str, out: &mut dyn Write) -> Result<()> {
        if path.is_empty() {
            writeln!(out, "error: usage: load <path>")?;
            return Ok(());
        }
        match self.case.load(path) {
            Ok(()) => writeln!(
                out,
                "Loaded '{}' with {} requirements.",
                self.case.name().unwrap_or_default(),
                self.case.len()
            )?,
            Err(e) => {
                tracing::warn!(path, error = %e, "load failed");
                writeln!(out, "error: {e}")?;
            }
        }
        Ok(())
    }

    fn require_loaded(&self, out: &mut dyn Write) -> Result<bool> {
        if self.case.state() == CaseState::Empty {
            writeln!(out, "error: no case loaded (use 'load <path>')")?;
            return Ok(false);
        }
        Ok(true)
    }

    fn list(&self, out: &mut dyn Write) -> Result<()> {
        if !self.require_loaded(out)? {
            return Ok(());
        }
        for view in self.case.list_requirements() {
            writeln!(out, "{}", summarize(&view))?;
        }
        Ok(())
    }

    fn show(&self, out: &mut dyn Write) -> Result<()> {
        if !self.require_loaded(out)? {
            return Ok(());
        }
        writeln!(out, "{}\nState: {}", self.case, self.case.state())?;
        for (i, requirement) in self.case.requirements().iter().enumerate() {
            let value = requirement
                .value()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(out, "\n{}. {requirement}\nValue: {value}", i + 1)?;
        }
        Ok(())
    }

    fn set(&mut self, args: &str, out: &mut dyn Write) -> Result<()> {
        if !self.require_loaded(out)? {
            return Ok(());
        }
        let Some((key, raw)) = args.rsplit_once(char::is_whitespace) else {
            writeln!(out, "error: usage: set <name|n> <value>")?;
            return Ok(());
        };
        let key = key.trim();

        let index = match resolve_requirement(&self.case, key) {
            Ok(index) => index,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                return Ok(());
            }
        };
        let value = match raw.parse::<Value>() {
            Ok(value) => value,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                return Ok(());
            }
        };

        match self.case.assign_value(index, value) {
            Ok(()) => writeln!(
                out,
                "{} = {value}",
                self.case.requirements()[index].name()
            )?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        Ok(())
    }

    fn evaluate(&mut self, out: &mut dyn Write) -> Result<()> {
        if !self.require_loaded(out)? {
            return Ok(());
        }
        match self.case.evaluate() {
            Ok(evaluation) => write!(out, "{}", evaluation.explanation)?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        Ok(())
    }
}

/// Run the session loop until `quit` or end of input.
pub fn run_session(
    args: &SessionArgs,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<u8> {
    let mut session = Session::new();
    if let Some(path) = &args.file {
        session.load(&path.display().to_string(), out)?;
    }
    writeln!(out, "Type 'help' for commands.")?;

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        if session.handle(&line, out)? == Flow::Quit {
            break;
        }
    }

    Ok(EXIT_OK)
}
