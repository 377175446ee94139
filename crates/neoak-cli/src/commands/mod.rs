//! Subcommand implementations.
//!
//! Each command returns the process exit status on success; failures are
//! reported by the caller.

pub mod check;
pub mod emit;
pub mod exec;
pub mod run;

use neoak_runtime::RunOptions;

/// Options for a run against the real console.
fn console_options(args: Vec<String>) -> RunOptions {
    RunOptions {
        args,
        stdin: None,
        capture_output: false,
    }
}
