//! Abstract syntax: the declaration table and the body AST.

pub mod decl;
pub mod expr;
pub mod stmt;

pub use decl::*;
pub use expr::*;
pub use stmt::*;
