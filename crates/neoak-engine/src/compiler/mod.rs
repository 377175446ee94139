//! NeOak Compiler
//!
//! Turns checked declaration tables into the IR program the VM executes.
//!
//! - [`lower`]: body parsing, name resolution, and IR construction
//! - [`ir`]: the serializable target program
//! - [`emit`]: JSON artifacts for `neoak emit` / `neoak exec`

pub mod emit;
pub mod error;
pub mod ir;
pub mod lower;

pub use emit::{from_json, to_json};
pub use error::{ArtifactError, CompileError};
pub use ir::Program;
pub use lower::lower;
