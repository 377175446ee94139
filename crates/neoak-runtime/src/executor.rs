//! Program execution.
//!
//! The VM runs on one dedicated thread whose stack size comes from
//! `[run] stack_size_mb`; the thread is joined before returning. The
//! program itself is single-threaded.

use std::path::Path;

use neoak_engine::compiler::{from_json, to_json};
use neoak_engine::{Program, RunOutcome, Vm, VmOptions};

use crate::compile::{check_units, compile_units};
use crate::config::{Config, RunConfig};
use crate::error::RuntimeError;
use crate::loader::discover;

/// Per-run options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Program arguments (`String[] args`)
    pub args: Vec<String>,
    /// Fixed standard input; the process stdin when `None`
    pub stdin: Option<String>,
    /// Keep program output in the outcome instead of writing it out
    pub capture_output: bool,
}

/// Summary of a successful `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Units checked
    pub units: usize,
    /// Classes and interfaces declared
    pub classes: usize,
}

/// Executes lowered programs with one run configuration.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: RunConfig,
}

impl Runtime {
    /// Create a runtime with the given `[run]` settings.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// The `[run]` settings in effect.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run `main` of a program on the executor thread.
    pub fn execute(&self, program: &Program, options: RunOptions) -> Result<RunOutcome, RuntimeError> {
        let vm_options = VmOptions {
            args: options.args,
            max_call_depth: self.config.max_call_depth,
            stdin: options.stdin,
            capture_output: options.capture_output,
        };
        log::debug!(
            "executing {} (stack {} MiB, call depth {})",
            program.entry_class,
            self.config.stack_size_mb,
            self.config.max_call_depth
        );
        let outcome = std::thread::scope(|scope| {
            let handle = std::thread::Builder::new()
                .name("main".to_string())
                .stack_size(self.config.stack_size())
                .spawn_scoped(scope, move || Vm::new(program, vm_options).run())
                .map_err(|e| RuntimeError::Executor(format!("cannot spawn executor thread: {}", e)))?;
            handle
                .join()
                .map_err(|_| RuntimeError::Executor("executor thread panicked".to_string()))
        })??;
        log::debug!("exit status {}", outcome.exit_code);
        Ok(outcome)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Discover, compile, and run the project at `path`.
pub fn run_path(path: &Path, options: RunOptions) -> Result<RunOutcome, RuntimeError> {
    let project = discover(path)?;
    let program = compile_units(&project.units)?;
    Runtime::new(project.config.run).execute(&program, options)
}

/// Discover, parse, and check the project at `path` without running it.
pub fn check_path(path: &Path) -> Result<CheckReport, RuntimeError> {
    let project = discover(path)?;
    let parsed = check_units(&project.units)?;
    Ok(CheckReport {
        units: parsed.len(),
        classes: parsed.iter().map(|u| u.classes.len()).sum(),
    })
}

/// Compile the project at `path` and return the IR artifact as JSON.
pub fn emit_path(path: &Path) -> Result<String, RuntimeError> {
    let project = discover(path)?;
    let program = compile_units(&project.units)?;
    let json = to_json(&program)?;
    log::debug!("emitted {} bytes", json.len());
    Ok(json)
}

/// Run an artifact written by [`emit_path`].
///
/// `[run]` settings come from a `neoak.toml` next to the artifact, if any.
pub fn exec_artifact(path: &Path, options: RunOptions) -> Result<RunOutcome, RuntimeError> {
    let text = std::fs::read_to_string(path)?;
    let program = from_json(&text)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let config = Config::load(dir)?;
    Runtime::new(config.run).execute(&program, options)
}
