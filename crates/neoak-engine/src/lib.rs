//! NeOak Language Engine
//!
//! This crate provides the complete NeOak pipeline for Java-syntax programs:
//! - **Parser**: Source units, lexer, structural declaration parser, and body parser (`parser` module)
//! - **Checker**: Termination, completeness, instantiation, and hierarchy passes (`checker` module)
//! - **Compiler**: Lowering of declarations and bodies into the serializable IR (`compiler` module)
//! - **VM**: Object-model runtime, tree-walking interpreter, and trace rewriter (`vm` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use neoak_engine::{parser, checker, compiler, vm};
//!
//! let unit = parser::SourceUnit::preprocess("Main.java", source);
//! let parsed = parser::parse_unit(&unit)?;
//! checker::check(&[parsed.clone()])?;
//! let program = compiler::lower(&[parsed])?;
//! let outcome = vm::Vm::new(&program, vm::VmOptions::default()).run()?;
//! ```

#![warn(rust_2018_idioms)]
#![allow(clippy::new_without_default)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::large_enum_variant)]

// ============================================================================
// Core Modules
// ============================================================================

/// Parser module: source units, lexer, declaration and body parsing
pub mod parser;

/// Checker module: semantic validation over the declaration table
pub mod checker;

/// Compiler module: lowering to IR and IR serialization
pub mod compiler;

/// VM module: object model, interpreter, builtins, and trace rendering
pub mod vm;

// ============================================================================
// Re-exports
// ============================================================================

pub use checker::{check, CheckError, CheckErrors};
pub use compiler::{lower, CompileError, Program};
pub use parser::{parse_unit, CompilationUnit, ParseError, SourceUnit};
pub use vm::{RunOutcome, Vm, VmError, VmOptions};
