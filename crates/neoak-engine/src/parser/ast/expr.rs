//! Expression AST for member bodies.

use crate::parser::ast::decl::TypeRef;
use crate::parser::token::Span;
use serde::{Deserialize, Serialize};

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `int` literal
    Int(i64),
    /// `long` literal
    Long(i64),
    /// `double` / `float` literal
    Double(f64),
    /// `char` literal
    Char(char),
    /// String literal
    Str(String),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
}

/// Expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal
    Literal { value: Literal, span: Span },
    /// Bare identifier
    Name { name: String, span: Span },
    /// `this`
    This { span: Span },
    /// `target.name`
    FieldAccess {
        target: Box<Expr>,
        name: String,
        span: Span,
    },
    /// `super.name`
    SuperField { name: String, span: Span },
    /// `target[index]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// `name(args)` or `target.name(args)`
    Call {
        target: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `super.name(args)`
    SuperCall {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `new C(args)`
    New {
        class: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `new T[a][b][]` or `new T[] { ... }`
    NewArray {
        elem: TypeRef,
        dims: Vec<Expr>,
        extra_dims: u32,
        init: Option<Vec<Expr>>,
        span: Span,
    },
    /// `{ a, b }` in a declaration
    ArrayInit { elements: Vec<Expr>, span: Span },
    /// `target = value` and compound forms (`op` is `Some` for compounds)
    Assign {
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    /// Prefix unary operator
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `++x`, `x--`, ...
    IncDec {
        increment: bool,
        prefix: bool,
        target: Box<Expr>,
        span: Span,
    },
    /// Binary operator
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    /// `cond ? then : els`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
        span: Span,
    },
    /// `expr instanceof T`
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRef,
        span: Span,
    },
    /// `(T) expr`
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    /// Span of the expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Name { span, .. }
            | Expr::This { span }
            | Expr::FieldAccess { span, .. }
            | Expr::SuperField { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. }
            | Expr::SuperCall { span, .. }
            | Expr::New { span, .. }
            | Expr::NewArray { span, .. }
            | Expr::ArrayInit { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Unary { span, .. }
            | Expr::IncDec { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::Cast { span, .. } => *span,
        }
    }

    /// Dotted path for chains of names, e.g. `System.out` → `["System", "out"]`.
    pub fn as_path(&self) -> Option<Vec<&str>> {
        match self {
            Expr::Name { name, .. } => Some(vec![name.as_str()]),
            Expr::FieldAccess { target, name, .. } => {
                let mut path = target.as_path()?;
                path.push(name);
                Some(path)
            }
            _ => None,
        }
    }
}
