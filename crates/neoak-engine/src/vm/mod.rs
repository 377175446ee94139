//! NeOak VM Runtime
//!
//! This module provides the object-model runtime that executes a lowered
//! [`Program`]:
//! - Tree-walking interpreter over the IR
//! - Class registry with per-class static initialization records
//! - Overload selection over coarse type tags
//! - Access control for instance members
//! - Built-in library surface (`System`, `Math`, `Scanner`, `File`, ...)
//! - Trace rewriting of uncaught exceptions back to source coordinates

pub mod access;
pub mod builtins;
pub mod class_registry;
pub mod console;
pub mod dispatch;
pub mod exceptions;
pub mod heap;
pub mod interpreter;
pub mod object;
pub mod ops;
pub mod trace;
pub mod value;

use crate::compiler::ir::Program;
use interpreter::{Interpreter, Unwind};
use thiserror::Error;

pub use class_registry::ClassRegistry;
pub use value::Value;

/// Default bound on nested calls before `StackOverflowError`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 2048;

/// VM errors that are not Java exceptions: the program cannot start or the
/// IR is inconsistent.
#[derive(Debug, Error)]
pub enum VmError {
    /// Entry class has no `static void main(String[])`
    #[error("no 'public static void main(String[])' in class {0}")]
    MissingEntry(String),

    /// A class referenced by the IR is not registered
    #[error("unknown class {0}")]
    UnknownClass(String),

    /// Local slot outside the frame
    #[error("invalid local slot {slot} in {method}")]
    InvalidSlot {
        /// Slot index
        slot: u32,
        /// Enclosing method
        method: String,
    },

    /// Inconsistent interpreter state
    #[error("internal error: {0}")]
    Internal(String),
}

/// VM execution result
pub type VmResult<T> = Result<T, VmError>;

/// Options for one run.
#[derive(Debug, Clone)]
pub struct VmOptions {
    /// Program arguments (`String[] args`)
    pub args: Vec<String>,
    /// Nested call bound
    pub max_call_depth: usize,
    /// Fixed standard input; the process stdin when `None`
    pub stdin: Option<String>,
    /// Keep program output in [`RunOutcome`] instead of writing it out
    pub capture_output: bool,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            stdin: None,
            capture_output: false,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// 0 on success, 1 on an uncaught exception, `n` after `System.exit(n)`
    pub exit_code: i32,
    /// Captured standard output (empty unless capturing)
    pub stdout: String,
    /// Captured standard error (empty unless capturing)
    pub stderr: String,
    /// First trace line of an uncaught exception
    pub uncaught: Option<String>,
}

/// NeOak virtual machine
pub struct Vm {
    interpreter: Interpreter,
    args: Vec<String>,
}

impl Vm {
    /// Create a VM for a program.
    pub fn new(program: &Program, options: VmOptions) -> Self {
        let args = options.args.clone();
        Self {
            interpreter: Interpreter::new(program, &options),
            args,
        }
    }

    /// Run `main` to completion.
    pub fn run(mut self) -> VmResult<RunOutcome> {
        log::debug!(
            "running {} with {} classes",
            self.interpreter.entry(),
            self.interpreter.class_count()
        );
        let result = self.interpreter.run_main(&self.args);
        let (exit_code, uncaught) = match result {
            Ok(()) => (0, None),
            Err(Unwind::Exit(code)) => (code, None),
            Err(Unwind::Throw(exception)) => {
                let data = self.interpreter.trace_data(&exception);
                self.interpreter
                    .console_mut()
                    .err(&trace::render_uncaught(&data));
                (1, Some(data.header))
            }
            Err(Unwind::Fatal(error)) => {
                self.interpreter.console_mut().flush();
                return Err(error);
            }
        };
        let console = self.interpreter.console_mut();
        console.flush();
        let (stdout, stderr) = console.take();
        log::debug!("program exited with status {}", exit_code);
        Ok(RunOutcome {
            exit_code,
            stdout,
            stderr,
            uncaught,
        })
    }
}
