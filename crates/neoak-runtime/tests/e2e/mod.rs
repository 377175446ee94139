//! End-to-end tests for the NeOak runtime
//!
//! These tests lay out projects on disk, run them through discovery,
//! compilation, and execution, and check program output, exit codes,
//! and diagnostics.

mod harness;
mod artifacts;
mod diagnostics;
mod exceptions;
mod io;
mod programs;
mod projects;
