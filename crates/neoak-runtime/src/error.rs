//! Runtime error types.

use crate::config::ConfigError;
use crate::loader::DiscoveryError;
use neoak_engine::compiler::{ArtifactError, CompileError};
use neoak_engine::{CheckErrors, ParseError, VmError};

/// Exit status for discovery and configuration failures.
pub const EXIT_DISCOVERY: i32 = 2;

/// Exit status for parse, check, and lowering failures.
pub const EXIT_COMPILE: i32 = 3;

/// Errors that can occur during discovery, compilation, loading, or execution.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Malformed `neoak.toml`
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Source discovery failed
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// One or more units failed to parse
    #[error("{}", join_lines(.0))]
    Parse(Vec<ParseError>),

    /// Semantic diagnostics
    #[error(transparent)]
    Check(#[from] CheckErrors),

    /// Lowering error
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Unreadable IR artifact
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The VM could not start or reached an inconsistent state
    #[error("runtime error: {0}")]
    Vm(#[from] VmError),

    /// The executor thread could not be spawned or panicked
    #[error("executor failed: {0}")]
    Executor(String),
}

impl RuntimeError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Io(_)
            | RuntimeError::Config(_)
            | RuntimeError::Discovery(_)
            | RuntimeError::Artifact(_) => EXIT_DISCOVERY,
            RuntimeError::Parse(_) | RuntimeError::Check(_) | RuntimeError::Compile(_) => EXIT_COMPILE,
            RuntimeError::Vm(_) | RuntimeError::Executor(_) => 1,
        }
    }

    /// One line per diagnostic.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            RuntimeError::Parse(errors) => errors.iter().map(|e| e.to_string()).collect(),
            RuntimeError::Check(errors) => errors.errors().iter().map(|e| e.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}

fn join_lines(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
