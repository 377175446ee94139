//! Lowering and artifact errors.

use crate::parser::error::{Location, ParseError};
use thiserror::Error;

/// Errors raised while lowering declarations to IR.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A body failed to parse, or used an unsupported construct
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A name that resolves to nothing
    #[error("cannot find symbol: {kind} {name} at {location}")]
    UnknownSymbol {
        /// `variable`, `method`, or `class`
        kind: &'static str,
        /// The name
        name: String,
        /// Use site
        location: Location,
    },

    /// An instance member named from a static context
    #[error("non-static {kind} {name} cannot be referenced from a static context at {location}")]
    StaticContext {
        /// `variable` or `method`
        kind: &'static str,
        /// Member name
        name: String,
        /// Use site
        location: Location,
    },

    /// A local declared twice in overlapping scopes
    #[error("variable {name} is already defined at {location}")]
    DuplicateVariable {
        /// Local name
        name: String,
        /// Second declaration
        location: Location,
    },

    /// Assignment to something that is not a variable, field, or element
    #[error("unexpected assignment target at {location}")]
    InvalidAssignment {
        /// Assignment site
        location: Location,
    },

    /// `super(...)` / `this(...)` outside the first constructor statement
    #[error("call to {call} must be first statement in constructor at {location}")]
    MisplacedConstructorCall {
        /// `super` or `this`
        call: &'static str,
        /// Call site
        location: Location,
    },

    /// `this` or `super` in a static context
    #[error("{keyword} cannot be referenced from a static context at {location}")]
    StaticThis {
        /// `this` or `super`
        keyword: &'static str,
        /// Use site
        location: Location,
    },

    /// `break` / `continue` with no enclosing target
    #[error("{what} outside of loop at {location}")]
    OrphanJump {
        /// `break` or `continue`
        what: &'static str,
        /// Statement site
        location: Location,
    },

    /// `break label` / `continue label` naming no enclosing label
    #[error("undefined label: {label} at {location}")]
    UndefinedLabel {
        /// Label name
        label: String,
        /// Statement site
        location: Location,
    },

    /// No class declares `static void main(String[] args)`
    #[error("no entry point: static void main(String[] args) not found in {file}")]
    MissingMain {
        /// Entry unit
        file: String,
    },

    /// No sources at all
    #[error("no classes to compile")]
    EmptyProgram,
}

/// Errors reading an emitted artifact back.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Malformed JSON or shape mismatch
    #[error("invalid artifact: {0}")]
    Json(#[from] serde_json::Error),

    /// Written by an incompatible version
    #[error("artifact version {found} is not supported (expected {expected})")]
    Version {
        /// Version in the artifact
        found: u32,
        /// Version this build reads
        expected: u32,
    },

    /// Entry class missing from the class list
    #[error("artifact entry class {0} is not defined")]
    MissingEntry(String),
}
