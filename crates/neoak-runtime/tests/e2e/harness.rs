//! Test harness for end-to-end runs
//!
//! Provides a temporary project directory and helpers that run it through
//! the runtime with captured output.

#![allow(dead_code)]

use neoak_runtime::{
    check_path, emit_path, exec_artifact, run_path, CheckReport, RunOptions, RunOutcome,
    RuntimeError,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project laid out in a temporary directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Create an empty project.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Create a project whose entry unit is `Main.java`.
    pub fn with_main(source: &str) -> Self {
        let project = Self::new();
        project.file("Main.java", source);
        project
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, relative: &str, text: &str) -> &Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dirs");
        }
        std::fs::write(path, text).expect("write file");
        self
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a project file.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Run with no input and no arguments.
    pub fn run(&self) -> Result<RunOutcome, RuntimeError> {
        self.run_with("", &[])
    }

    /// Run with the given standard input and arguments.
    pub fn run_with(&self, stdin: &str, args: &[&str]) -> Result<RunOutcome, RuntimeError> {
        run_path(self.root(), options(stdin, args))
    }

    /// Check without running.
    pub fn check(&self) -> Result<CheckReport, RuntimeError> {
        check_path(self.root())
    }

    /// Emit the artifact into the project directory and return its path.
    pub fn emit(&self, name: &str) -> Result<PathBuf, RuntimeError> {
        let json = emit_path(self.root())?;
        let out = self.dir.path().join(name);
        std::fs::write(&out, json)?;
        Ok(out)
    }

    /// Run an emitted artifact.
    pub fn exec(&self, artifact: &Path) -> Result<RunOutcome, RuntimeError> {
        exec_artifact(artifact, options("", &[]))
    }
}

/// Captured-output options.
pub fn options(stdin: &str, args: &[&str]) -> RunOptions {
    RunOptions {
        args: args.iter().map(|a| a.to_string()).collect(),
        stdin: Some(stdin.to_string()),
        capture_output: true,
    }
}

/// Run a single-file program and return its outcome.
pub fn run_main(source: &str) -> RunOutcome {
    Project::with_main(source).run().expect("run")
}

/// Assert that a single-file program exits 0 and prints `expected`.
pub fn expect_output(source: &str, expected: &str) {
    let outcome = run_main(source);
    assert_eq!(outcome.exit_code, 0, "stderr:\n{}", outcome.stderr);
    assert_eq!(outcome.stdout, expected);
}

/// Compile a single-file program that must fail; returns the diagnostics.
pub fn expect_diagnostics(source: &str) -> (i32, Vec<String>) {
    match Project::with_main(source).run() {
        Ok(outcome) => panic!("expected a compile failure, got {:?}", outcome),
        Err(err) => (err.exit_code(), err.diagnostics()),
    }
}
