//! Tree-walking interpreter
//!
//! Executes lowered IR directly. Statements produce a [`Completion`];
//! exceptions, `System.exit`, and fatal VM errors travel as the `Err` side
//! ([`Unwind`]) so `?` propagates them through every nesting level.

mod eval;
mod exec;
mod execution;
mod invoke;
mod library;
mod state;

pub use execution::{Completion, EvalResult, ExecResult, Unwind};
pub use state::Interpreter;
