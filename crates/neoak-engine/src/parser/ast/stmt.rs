//! Statement AST for member bodies.

use crate::parser::ast::decl::TypeRef;
use crate::parser::ast::expr::Expr;
use crate::parser::token::Span;

/// One declarator of a local variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    /// Variable name
    pub name: String,
    /// Extra array dimensions written after the name (`int a[]`)
    pub dims: u32,
    /// Initializer
    pub init: Option<Expr>,
    /// Span of the name
    pub span: Span,
}

/// One `case` group of a `switch`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Case label expressions (empty for a bare `default`)
    pub labels: Vec<Expr>,
    /// Group includes `default`
    pub is_default: bool,
    /// Statements up to the next group
    pub body: Vec<Stmt>,
    /// Span of the first label
    pub span: Span,
}

/// One `catch` clause; `types` has several entries for multi-catch.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// Caught type names
    pub types: Vec<String>,
    /// Binding name
    pub name: String,
    /// Handler body
    pub body: Vec<Stmt>,
    /// Span of `catch`
    pub span: Span,
}

/// Statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Local variable declaration
    Local {
        ty: TypeRef,
        decls: Vec<Declarator>,
        span: Span,
    },
    /// Expression statement
    Expr { expr: Expr, span: Span },
    /// `if (cond) then else els`
    If {
        cond: Expr,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
        span: Span,
    },
    /// `while (cond) body`
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// `do body while (cond);`
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
        span: Span,
    },
    /// Classic `for`
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
        span: Span,
    },
    /// `for (T x : iterable)`
    ForEach {
        ty: TypeRef,
        name: String,
        iterable: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// `switch` statement with fallthrough
    Switch {
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
        span: Span,
    },
    /// `break [label];`
    Break { label: Option<String>, span: Span },
    /// `continue [label];`
    Continue { label: Option<String>, span: Span },
    /// `return [value];`
    Return { value: Option<Expr>, span: Span },
    /// `throw value;`
    Throw { value: Expr, span: Span },
    /// `try { } catch { } finally { }`
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
        span: Span,
    },
    /// `{ ... }`
    Block { body: Vec<Stmt>, span: Span },
    /// `label: stmt`
    Labeled {
        label: String,
        body: Box<Stmt>,
        span: Span,
    },
    /// `synchronized (lock) { ... }`
    Synchronized {
        lock: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `super(args);`
    SuperInit { args: Vec<Expr>, span: Span },
    /// `this(args);`
    ThisInit { args: Vec<Expr>, span: Span },
    /// `;`
    Empty { span: Span },
}

impl Stmt {
    /// Span of the statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Local { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::DoWhile { span, .. }
            | Stmt::For { span, .. }
            | Stmt::ForEach { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::Break { span, .. }
            | Stmt::Continue { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Throw { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::Block { span, .. }
            | Stmt::Labeled { span, .. }
            | Stmt::Synchronized { span, .. }
            | Stmt::SuperInit { span, .. }
            | Stmt::ThisInit { span, .. }
            | Stmt::Empty { span } => *span,
        }
    }
}
