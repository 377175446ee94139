//! Parser module: source units, lexer, declaration and body parsing.
//!
//! - [`source`]: preprocessing into origin-tagged [`SourceUnit`]s
//! - [`lexer`] / [`token`]: logos tokenizer with original-line spans
//! - [`parser::decl`]: structural declaration parser
//! - [`parser::stmt`] / [`parser::expr`]: recursive-descent body parser

pub mod ast;
pub mod error;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod source;
pub mod token;

pub use ast::{ClassDecl, ClassKind, CoarseType, CompilationUnit, TypeRef, Visibility};
pub use error::{LexError, Location, ParseError};
pub use lexer::{tokenize, Lexer};
pub use parser::decl::parse_unit;
pub use parser::stmt::{parse_body, parse_initializer};
pub use source::SourceUnit;
pub use token::{Span, Spanned, Token};
