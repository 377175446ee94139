//! Intermediate Representation (IR) for NeOak
//!
//! The IR is the generated target program: a serializable tree with every
//! name resolved and every statement tagged with an origin.
//!
//! # Structure
//!
//! - `Program` - Entry class, classes, and the origin table
//! - `ClassDef` - Fields, constructors, overload groups, initializers
//! - `Function` - Parameters, local slot count, and body statements
//! - `Stmt` / `Expr` - Tree nodes

pub mod node;
pub mod program;

pub use node::{CastKind, Catch, Const, Expr, Place, Stmt, SwitchCase};
pub use program::{
    ClassDef, FieldDef, Function, MethodGroup, OriginId, OriginMarker, ParamDef, Program,
};

/// Artifact format version written by `emit`.
pub const IR_VERSION: u32 = 1;
