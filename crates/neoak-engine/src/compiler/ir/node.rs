//! IR statements and expressions.
//!
//! A tree IR: names are resolved to local slots, fields, or classes, `+`
//! chains are flattened, and every statement carries an origin id.

use super::program::OriginId;
use crate::parser::ast::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};

/// A constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Const {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integral number (`int`, `long`, `short`, `byte`)
    Int(i64),
    /// Floating number (`double`, `float`)
    Double(f64),
    /// `char`
    Char(char),
    /// String literal
    Str(String),
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression evaluated for effect
    Expr { expr: Expr, origin: OriginId },
    /// Local declaration; no initializer leaves the slot `null`
    Local {
        slot: u32,
        init: Option<Expr>,
        origin: OriginId,
    },
    /// `if` / `else`
    If {
        cond: Expr,
        then: Vec<Stmt>,
        els: Vec<Stmt>,
        origin: OriginId,
    },
    /// `while`, `do`/`while`, and classic `for`
    Loop {
        label: Option<String>,
        cond: Option<Expr>,
        body: Vec<Stmt>,
        update: Vec<Expr>,
        /// `false` for `do`/`while`
        test_first: bool,
        origin: OriginId,
    },
    /// for-each over an array
    ForEach {
        label: Option<String>,
        slot: u32,
        iterable: Expr,
        body: Vec<Stmt>,
        origin: OriginId,
    },
    /// `switch` with fallthrough
    Switch {
        label: Option<String>,
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
        origin: OriginId,
    },
    /// Nested block, optionally labeled
    Block {
        label: Option<String>,
        body: Vec<Stmt>,
        origin: OriginId,
    },
    /// `return`
    Return { value: Option<Expr>, origin: OriginId },
    /// `break`
    Break {
        label: Option<String>,
        origin: OriginId,
    },
    /// `continue`
    Continue {
        label: Option<String>,
        origin: OriginId,
    },
    /// `throw`
    Throw { value: Expr, origin: OriginId },
    /// `try` / `catch` / `finally`
    Try {
        body: Vec<Stmt>,
        catches: Vec<Catch>,
        finally: Option<Vec<Stmt>>,
        origin: OriginId,
    },
    /// Superclass constructor call, explicit or synthesized
    SuperInit {
        class: String,
        args: Vec<Expr>,
        origin: OriginId,
    },
    /// `this(...)` delegation
    ThisInit { args: Vec<Expr>, origin: OriginId },
}

impl Stmt {
    /// Origin id of the statement.
    pub fn origin(&self) -> OriginId {
        match self {
            Stmt::Expr { origin, .. }
            | Stmt::Local { origin, .. }
            | Stmt::If { origin, .. }
            | Stmt::Loop { origin, .. }
            | Stmt::ForEach { origin, .. }
            | Stmt::Switch { origin, .. }
            | Stmt::Block { origin, .. }
            | Stmt::Return { origin, .. }
            | Stmt::Break { origin, .. }
            | Stmt::Continue { origin, .. }
            | Stmt::Throw { origin, .. }
            | Stmt::Try { origin, .. }
            | Stmt::SuperInit { origin, .. }
            | Stmt::ThisInit { origin, .. } => *origin,
        }
    }
}

/// One `case` group: its labels and the statements that follow them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub labels: Vec<Expr>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
}

/// A catch clause; `types` holds every multi-catch alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catch {
    pub types: Vec<String>,
    pub slot: u32,
    pub body: Vec<Stmt>,
}

/// An assignable location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Place {
    Local(u32),
    Field { target: Box<Expr>, name: String },
    StaticField { class: String, name: String },
    Index { target: Box<Expr>, index: Box<Expr> },
}

/// Target of a cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CastKind {
    Int,
    Long,
    Short,
    Byte,
    Char,
    Double,
    Float,
    Boolean,
    /// Reference cast, checked at run time
    Class { name: String, dims: u32 },
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Const(Const),
    Local(u32),
    This,
    /// Instance field or array `length`
    Field {
        target: Box<Expr>,
        name: String,
        origin: OriginId,
    },
    /// Static field of a user or built-in class
    StaticField { class: String, name: String },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        origin: OriginId,
    },
    /// `=` or compound assignment; `cast` narrows to the declared
    /// primitive type of the place when it is known
    Assign {
        place: Box<Place>,
        op: Option<BinaryOp>,
        value: Box<Expr>,
        cast: Option<CastKind>,
        origin: OriginId,
    },
    /// `++` / `--`
    IncDec {
        place: Box<Place>,
        increment: bool,
        prefix: bool,
        origin: OriginId,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Arithmetic, bitwise, and comparison operators except `+`, `&&`, `||`
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        origin: OriginId,
    },
    /// A flattened `+` chain, combined left to right on runtime kinds
    Plus { operands: Vec<Expr>, origin: OriginId },
    /// `&&` (`and == true`) or `||`
    Logical {
        and: bool,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    /// `expr instanceof Class` (arrays via `dims`)
    InstanceOf {
        expr: Box<Expr>,
        class: String,
        dims: u32,
    },
    Cast {
        kind: CastKind,
        expr: Box<Expr>,
        origin: OriginId,
    },
    /// Virtual call on a receiver
    Invoke {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
        origin: OriginId,
    },
    /// `super.name(...)`: lookup starts at `class`
    InvokeSuper {
        class: String,
        name: String,
        args: Vec<Expr>,
        origin: OriginId,
    },
    /// Static call on a user or built-in class
    InvokeStatic {
        class: String,
        name: String,
        args: Vec<Expr>,
        origin: OriginId,
    },
    /// `new Class(...)`
    New {
        class: String,
        args: Vec<Expr>,
        origin: OriginId,
    },
    /// `new T[d1][d2]...[]`
    NewArray {
        component: String,
        dims: Vec<Expr>,
        extra_dims: u32,
        origin: OriginId,
    },
    /// `{a, b, c}`; `dims` counts the literal's own dimensions
    ArrayLit {
        component: String,
        dims: u32,
        elements: Vec<Expr>,
    },
}
