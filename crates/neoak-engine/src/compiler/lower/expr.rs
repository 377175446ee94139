//! Expression lowering and name resolution.

use super::{primitive_cast, FnLowerer};
use crate::compiler::error::CompileError;
use crate::compiler::ir::{self, CastKind, Const, Place};
use crate::parser::ast::{BinaryOp, ClassDecl, Expr, Literal, TypeRef};
use crate::parser::token::Span;
use crate::vm::builtins::catalog::is_builtin;

/// What a bare identifier resolved to.
enum Resolved {
    Local(u32),
    Field,
    StaticField(String),
}

impl<'l, 'a> FnLowerer<'l, 'a> {
    /// Lower an expression.
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Result<ir::Expr, CompileError> {
        Ok(match expr {
            Expr::Literal { value, .. } => ir::Expr::Const(match value {
                Literal::Int(v) | Literal::Long(v) => Const::Int(*v),
                Literal::Double(v) => Const::Double(*v),
                Literal::Char(c) => Const::Char(*c),
                Literal::Str(s) => Const::Str(s.clone()),
                Literal::Bool(b) => Const::Bool(*b),
                Literal::Null => Const::Null,
            }),
            Expr::Name { name, span } => match self.resolve_name(name, *span)? {
                Resolved::Local(slot) => ir::Expr::Local(slot),
                Resolved::Field => ir::Expr::Field {
                    target: Box::new(ir::Expr::This),
                    name: name.clone(),
                    origin: self.origin(span.line),
                },
                Resolved::StaticField(class) => ir::Expr::StaticField {
                    class,
                    name: name.clone(),
                },
            },
            Expr::This { span } => {
                self.require_instance("this", *span)?;
                ir::Expr::This
            }
            Expr::FieldAccess { target, name, span } => {
                if let Some(class) = self.class_ref(target) {
                    ir::Expr::StaticField {
                        class: self.static_field_owner(&class, name, *span)?,
                        name: name.clone(),
                    }
                } else {
                    ir::Expr::Field {
                        target: Box::new(self.lower_expr(target)?),
                        name: name.clone(),
                        origin: self.origin(span.line),
                    }
                }
            }
            Expr::SuperField { name, span } => {
                self.require_instance("super", *span)?;
                ir::Expr::Field {
                    target: Box::new(ir::Expr::This),
                    name: name.clone(),
                    origin: self.origin(span.line),
                }
            }
            Expr::Index {
                target,
                index,
                span,
            } => ir::Expr::Index {
                target: Box::new(self.lower_expr(target)?),
                index: Box::new(self.lower_expr(index)?),
                origin: self.origin(span.line),
            },
            Expr::Call {
                target,
                name,
                args,
                span,
            } => self.lower_call(target.as_deref(), name, args, *span)?,
            Expr::SuperCall { name, args, span } => {
                self.require_instance("super", *span)?;
                ir::Expr::InvokeSuper {
                    class: self.superclass_name(),
                    name: name.clone(),
                    args: self.lower_args(args)?,
                    origin: self.origin(span.line),
                }
            }
            Expr::New { class, args, span } => {
                if !self.is_class_name(class) {
                    return Err(CompileError::UnknownSymbol {
                        kind: "class",
                        name: class.clone(),
                        location: self.location(span.line),
                    });
                }
                ir::Expr::New {
                    class: class.clone(),
                    args: self.lower_args(args)?,
                    origin: self.origin(span.line),
                }
            }
            Expr::NewArray {
                elem,
                dims,
                extra_dims,
                init,
                span,
            } => match init {
                Some(elements) => {
                    let array_ty = TypeRef {
                        name: elem.name.clone(),
                        dims: elem.dims + 1,
                        coarse: crate::parser::CoarseType::Array,
                    };
                    self.lower_array_literal(elements, &array_ty)?
                }
                None => ir::Expr::NewArray {
                    component: elem.name.clone(),
                    dims: self.lower_args(dims)?,
                    extra_dims: *extra_dims,
                    origin: self.origin(span.line),
                },
            },
            Expr::ArrayInit { span, .. } => {
                // only valid where the declared type is known
                return Err(crate::parser::ParseError::Malformed {
                    message: "array initializer is not allowed here".into(),
                    location: self.location(span.line),
                }
                .into());
            }
            Expr::Assign {
                op,
                target,
                value,
                span,
            } => ir::Expr::Assign {
                cast: self.place_cast(target),
                place: Box::new(self.lower_place(target)?),
                op: *op,
                value: Box::new(self.lower_expr(value)?),
                origin: self.origin(span.line),
            },
            Expr::Unary { op, operand, .. } => ir::Expr::Unary {
                op: *op,
                operand: Box::new(self.lower_expr(operand)?),
            },
            Expr::IncDec {
                increment,
                prefix,
                target,
                span,
            } => ir::Expr::IncDec {
                place: Box::new(self.lower_place(target)?),
                increment: *increment,
                prefix: *prefix,
                origin: self.origin(span.line),
            },
            Expr::Binary {
                op: BinaryOp::Add,
                span,
                ..
            } => {
                let mut chain = Vec::new();
                flatten_plus(expr, &mut chain);
                let operands = chain
                    .into_iter()
                    .map(|e| self.lower_expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                ir::Expr::Plus {
                    operands,
                    origin: self.origin(span.line),
                }
            }
            Expr::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                lhs,
                rhs,
                ..
            } => ir::Expr::Logical {
                and: *op == BinaryOp::And,
                lhs: Box::new(self.lower_expr(lhs)?),
                rhs: Box::new(self.lower_expr(rhs)?),
            },
            Expr::Binary { op, lhs, rhs, span } => ir::Expr::Binary {
                op: *op,
                lhs: Box::new(self.lower_expr(lhs)?),
                rhs: Box::new(self.lower_expr(rhs)?),
                origin: self.origin(span.line),
            },
            Expr::Conditional {
                cond, then, els, ..
            } => ir::Expr::Conditional {
                cond: Box::new(self.lower_expr(cond)?),
                then: Box::new(self.lower_expr(then)?),
                els: Box::new(self.lower_expr(els)?),
            },
            Expr::InstanceOf { expr, ty, .. } => ir::Expr::InstanceOf {
                expr: Box::new(self.lower_expr(expr)?),
                class: ty.name.clone(),
                dims: ty.dims,
            },
            Expr::Cast { ty, expr, span } => ir::Expr::Cast {
                kind: cast_kind(ty),
                expr: Box::new(self.lower_expr(expr)?),
                origin: self.origin(span.line),
            },
        })
    }

    /// Lower call arguments in order.
    pub(super) fn lower_args(&mut self, args: &[Expr]) -> Result<Vec<ir::Expr>, CompileError> {
        args.iter().map(|a| self.lower_expr(a)).collect()
    }

    /// Lower a declaration initializer; `{...}` takes its shape from `ty`.
    pub(super) fn lower_var_init(&mut self, expr: &Expr, ty: &TypeRef) -> Result<ir::Expr, CompileError> {
        match expr {
            Expr::ArrayInit { elements, span } => {
                if ty.dims == 0 {
                    return Err(crate::parser::ParseError::Malformed {
                        message: format!("illegal initializer for {}", ty.name),
                        location: self.location(span.line),
                    }
                    .into());
                }
                self.lower_array_literal(elements, ty)
            }
            other => self.lower_expr(other),
        }
    }

    fn lower_array_literal(&mut self, elements: &[Expr], ty: &TypeRef) -> Result<ir::Expr, CompileError> {
        let element_ty = ty.element();
        let elements = elements
            .iter()
            .map(|e| self.lower_var_init(e, &element_ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ir::Expr::ArrayLit {
            component: ty.name.clone(),
            dims: ty.dims,
            elements,
        })
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn lower_call(
        &mut self,
        target: Option<&Expr>,
        name: &str,
        args: &[Expr],
        span: Span,
    ) -> Result<ir::Expr, CompileError> {
        let origin = self.origin(span.line);
        if let Some(target) = target {
            if let Some(class) = self.class_ref(target) {
                return Ok(ir::Expr::InvokeStatic {
                    class,
                    name: name.to_string(),
                    args: self.lower_args(args)?,
                    origin,
                });
            }
            return Ok(ir::Expr::Invoke {
                target: Box::new(self.lower_expr(target)?),
                name: name.to_string(),
                args: self.lower_args(args)?,
                origin,
            });
        }

        // bare call: the class chain, then enclosing classes
        let found = self.table.find_methods(self.class, name);
        if let Some((declaring, methods)) = found {
            let all_static = methods.iter().all(|m| m.modifiers.is_static);
            if all_static {
                return Ok(ir::Expr::InvokeStatic {
                    class: declaring.name.clone(),
                    name: name.to_string(),
                    args: self.lower_args(args)?,
                    origin,
                });
            }
            if self.is_static {
                if methods.iter().any(|m| m.modifiers.is_static) {
                    return Ok(ir::Expr::InvokeStatic {
                        class: declaring.name.clone(),
                        name: name.to_string(),
                        args: self.lower_args(args)?,
                        origin,
                    });
                }
                return Err(CompileError::StaticContext {
                    kind: "method",
                    name: name.to_string(),
                    location: self.location(span.line),
                });
            }
            return Ok(ir::Expr::Invoke {
                target: Box::new(ir::Expr::This),
                name: name.to_string(),
                args: self.lower_args(args)?,
                origin,
            });
        }
        for outer in self.enclosing_classes() {
            if let Some((declaring, methods)) = self.table.find_methods(outer, name) {
                if methods.iter().any(|m| m.modifiers.is_static) {
                    return Ok(ir::Expr::InvokeStatic {
                        class: declaring.name.clone(),
                        name: name.to_string(),
                        args: self.lower_args(args)?,
                        origin,
                    });
                }
            }
        }
        // inherited from a built-in superclass (`getMessage()`, `hashCode()`)
        if !self.is_static {
            return Ok(ir::Expr::Invoke {
                target: Box::new(ir::Expr::This),
                name: name.to_string(),
                args: self.lower_args(args)?,
                origin,
            });
        }
        Err(CompileError::UnknownSymbol {
            kind: "method",
            name: name.to_string(),
            location: self.location(span.line),
        })
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// Resolve a bare identifier: locals, then fields along the chain, then
    /// static fields of enclosing classes.
    fn resolve_name(&self, name: &str, span: Span) -> Result<Resolved, CompileError> {
        if let Some(slot) = self.scopes.lookup(name) {
            return Ok(Resolved::Local(slot));
        }
        if let Some((declaring, field)) = self.table.find_field(self.class, name) {
            if field.modifiers.is_static || declaring.is_interface() {
                return Ok(Resolved::StaticField(declaring.name.clone()));
            }
            if self.is_static {
                return Err(CompileError::StaticContext {
                    kind: "variable",
                    name: name.to_string(),
                    location: self.location(span.line),
                });
            }
            return Ok(Resolved::Field);
        }
        for outer in self.enclosing_classes() {
            if let Some((declaring, field)) = self.table.find_field(outer, name) {
                if field.modifiers.is_static || declaring.is_interface() {
                    return Ok(Resolved::StaticField(declaring.name.clone()));
                }
            }
        }
        Err(CompileError::UnknownSymbol {
            kind: "variable",
            name: name.to_string(),
            location: self.location(span.line),
        })
    }

    /// Returns true if a bare name denotes a value rather than a class.
    fn is_value_name(&self, name: &str) -> bool {
        self.scopes.lookup(name).is_some()
            || self.table.find_field(self.class, name).is_some()
            || self
                .enclosing_classes()
                .iter()
                .any(|outer| self.table.find_field(outer, name).is_some())
    }

    pub(super) fn is_class_name(&self, name: &str) -> bool {
        self.table.get(name).is_some() || is_builtin(name)
    }

    /// If `expr` names a class (`Math`, `java.lang.Math`, `Outer.Inner`),
    /// return its simple name.
    fn class_ref(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Name { name, .. } => {
                (!self.is_value_name(name) && self.is_class_name(name)).then(|| name.clone())
            }
            Expr::FieldAccess { target, name, .. } => {
                if !self.is_class_name(name) {
                    return None;
                }
                let qualified = self.class_ref(target).is_some() || self.is_package_path(target);
                qualified.then(|| name.clone())
            }
            _ => None,
        }
    }

    /// A dotted path whose head names nothing in scope (`java.util`).
    fn is_package_path(&self, expr: &Expr) -> bool {
        match expr.as_path() {
            Some(path) => path
                .first()
                .map(|head| !self.is_value_name(head) && !self.is_class_name(head))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Class declaring static field `name` as seen from `class`.
    fn static_field_owner(&self, class: &str, name: &str, span: Span) -> Result<String, CompileError> {
        let Some(decl) = self.table.get(class) else {
            return Ok(class.to_string());
        };
        match self.table.find_field(decl, name) {
            Some((declaring, field)) if field.modifiers.is_static || declaring.is_interface() => {
                Ok(declaring.name.clone())
            }
            Some(_) => Err(CompileError::StaticContext {
                kind: "variable",
                name: name.to_string(),
                location: self.location(span.line),
            }),
            None => Err(CompileError::UnknownSymbol {
                kind: "variable",
                name: format!("{}.{}", class, name),
                location: self.location(span.line),
            }),
        }
    }

    /// Classes lexically enclosing the current one, innermost first.
    fn enclosing_classes(&self) -> Vec<&'a ClassDecl> {
        let mut out = Vec::new();
        let mut current = self.class.outer.as_deref();
        while let Some(name) = current {
            let Some(decl) = self.table.get(name) else {
                break;
            };
            if out.iter().any(|c: &&ClassDecl| c.name == decl.name) {
                break;
            }
            out.push(decl);
            current = decl.outer.as_deref();
        }
        out
    }

    fn superclass_name(&self) -> String {
        self.class
            .superclass
            .clone()
            .unwrap_or_else(|| "Object".to_string())
    }

    fn require_instance(&self, keyword: &'static str, span: Span) -> Result<(), CompileError> {
        if self.is_static {
            return Err(CompileError::StaticThis {
                keyword,
                location: self.location(span.line),
            });
        }
        Ok(())
    }

    /// Declared primitive conversion of an assignment target, when the
    /// target's declaration is visible here.
    fn place_cast(&self, target: &Expr) -> Option<CastKind> {
        let field = match target {
            Expr::Name { name, .. } => {
                if let Some(slot) = self.scopes.lookup(name) {
                    return self.scopes.cast_of(slot);
                }
                self.table.find_field(self.class, name)
            }
            Expr::FieldAccess { target, name, .. } => match target.as_ref() {
                Expr::This { .. } => self.table.find_field(self.class, name),
                other => {
                    let class = self.class_ref(other)?;
                    self.table.find_field(self.table.get(&class)?, name)
                }
            },
            Expr::SuperField { name, .. } => self.table.find_field(self.class, name),
            _ => None,
        };
        field.and_then(|(_, decl)| primitive_cast(&decl.ty))
    }

    /// Lower an assignment target.
    fn lower_place(&mut self, expr: &Expr) -> Result<Place, CompileError> {
        match expr {
            Expr::Name { name, span } => Ok(match self.resolve_name(name, *span)? {
                Resolved::Local(slot) => Place::Local(slot),
                Resolved::Field => Place::Field {
                    target: Box::new(ir::Expr::This),
                    name: name.clone(),
                },
                Resolved::StaticField(class) => Place::StaticField {
                    class,
                    name: name.clone(),
                },
            }),
            Expr::FieldAccess { target, name, span } => {
                if let Some(class) = self.class_ref(target) {
                    return Ok(Place::StaticField {
                        class: self.static_field_owner(&class, name, *span)?,
                        name: name.clone(),
                    });
                }
                Ok(Place::Field {
                    target: Box::new(self.lower_expr(target)?),
                    name: name.clone(),
                })
            }
            Expr::SuperField { name, span } => {
                self.require_instance("super", *span)?;
                Ok(Place::Field {
                    target: Box::new(ir::Expr::This),
                    name: name.clone(),
                })
            }
            Expr::Index { target, index, .. } => Ok(Place::Index {
                target: Box::new(self.lower_expr(target)?),
                index: Box::new(self.lower_expr(index)?),
            }),
            other => Err(CompileError::InvalidAssignment {
                location: self.location(other.span().line),
            }),
        }
    }
}

/// Collect the left spine of a `+` chain: `((a + b) + c)` gives `[a, b, c]`.
fn flatten_plus<'e>(expr: &'e Expr, out: &mut Vec<&'e Expr>) {
    match expr {
        Expr::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
            ..
        } => {
            flatten_plus(lhs, out);
            out.push(rhs);
        }
        other => out.push(other),
    }
}

fn cast_kind(ty: &TypeRef) -> CastKind {
    if ty.dims > 0 {
        return CastKind::Class {
            name: ty.name.clone(),
            dims: ty.dims,
        };
    }
    match ty.name.as_str() {
        "int" => CastKind::Int,
        "long" => CastKind::Long,
        "short" => CastKind::Short,
        "byte" => CastKind::Byte,
        "char" => CastKind::Char,
        "double" => CastKind::Double,
        "float" => CastKind::Float,
        "boolean" => CastKind::Boolean,
        other => CastKind::Class {
            name: other.to_string(),
            dims: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::ir::{Const, Expr, Place, Program, Stmt};
    use crate::compiler::lower;
    use crate::parser::{parse_unit, SourceUnit};

    fn lower_src(src: &str) -> Result<Program, String> {
        let unit = parse_unit(&SourceUnit::preprocess("Main.java", src)).map_err(|e| e.to_string())?;
        lower(&[unit]).map_err(|e| e.to_string())
    }

    fn first_expr(program: &Program, class: &str, method: &str) -> Expr {
        let group = program.class(class).unwrap().group(method).unwrap();
        match &group.overloads[0].body[0] {
            Stmt::Expr { expr, .. } => expr.clone(),
            Stmt::Return { value: Some(expr), .. } => expr.clone(),
            Stmt::Local { init: Some(expr), .. } => expr.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_plus_chain_is_flattened() {
        let program = lower_src(
            "class Main { public static void main(String[] args) { String s = 1 + 2 + \"x\" + (3 + 4); } }",
        )
        .unwrap();
        let Expr::Plus { operands, .. } = first_expr(&program, "Main", "main") else { panic!() };
        assert_eq!(operands.len(), 4);
        assert_eq!(operands[0], Expr::Const(Const::Int(1)));
        assert!(matches!(&operands[3], Expr::Plus { operands, .. } if operands.len() == 2));
    }

    #[test]
    fn test_fields_are_qualified() {
        let program = lower_src(
            "class Base { protected int hp = 10; static int count; }
class Main extends Base {
    int read() { return hp; }
    void bump() { count++; }
    public static void main(String[] args) {}
}",
        )
        .unwrap();
        let read = first_expr(&program, "Main", "read");
        assert!(matches!(read, Expr::Field { target, name, .. } if *target == Expr::This && name == "hp"));
        let Expr::IncDec { place, .. } = first_expr(&program, "Main", "bump") else { panic!() };
        assert_eq!(
            *place,
            Place::StaticField {
                class: "Base".into(),
                name: "count".into()
            }
        );
    }

    #[test]
    fn test_locals_shadow_fields() {
        let program = lower_src(
            "class Main {
    int x;
    int get(int x) { return x; }
    public static void main(String[] args) {}
}",
        )
        .unwrap();
        assert_eq!(first_expr(&program, "Main", "get"), Expr::Local(0));
    }

    #[test]
    fn test_static_context_errors() {
        let err = lower_src(
            "class Main {
    int x;
    public static void main(String[] args) {
        System.out.println(x);
    }
}",
        )
        .unwrap_err();
        assert_eq!(
            err,
            "non-static variable x cannot be referenced from a static context at Main.java:4 (in Main.main)"
        );
        let err = lower_src(
            "class Main {
    void helper() {}
    public static void main(String[] args) { helper(); }
}",
        )
        .unwrap_err();
        assert!(err.starts_with("non-static method helper cannot be referenced"));
    }

    #[test]
    fn test_calls_resolve_by_receiver_kind() {
        let program = lower_src(
            "class Util { static int twice(int v) { return v * 2; } }
class Main {
    int value() { return Util.twice(size()); }
    int size() { return java.lang.Math.max(1, 2); }
    public static void main(String[] args) { System.out.println(args.length); }
}",
        )
        .unwrap();
        let Expr::InvokeStatic { class, args, .. } = first_expr(&program, "Main", "value") else { panic!() };
        assert_eq!(class, "Util");
        assert!(matches!(&args[0], Expr::Invoke { target, name, .. } if **target == Expr::This && name == "size"));
        assert!(matches!(first_expr(&program, "Main", "size"), Expr::InvokeStatic { class, .. } if class == "Math"));
        let Expr::Invoke { target, name, .. } = first_expr(&program, "Main", "main") else { panic!() };
        assert_eq!(name, "println");
        assert_eq!(
            *target,
            Expr::StaticField {
                class: "System".into(),
                name: "out".into()
            }
        );
    }

    #[test]
    fn test_unknown_symbols() {
        let err = lower_src("class Main { public static void main(String[] a) { y = 2; } }").unwrap_err();
        assert_eq!(err, "cannot find symbol: variable y at Main.java:1 (in Main.main)");
        let err = lower_src("class Main { public static void main(String[] a) { new Ghost(); } }").unwrap_err();
        assert_eq!(err, "cannot find symbol: class Ghost at Main.java:1 (in Main.main)");
    }

    #[test]
    fn test_array_initializers_take_declared_shape() {
        let program = lower_src(
            "class Main { public static void main(String[] a) { int[][] g = {{1}, {2, 3}}; } }",
        )
        .unwrap();
        let Expr::ArrayLit { component, dims, elements } = first_expr(&program, "Main", "main") else {
            panic!()
        };
        assert_eq!(component, "int");
        assert_eq!(dims, 2);
        assert!(matches!(&elements[1], Expr::ArrayLit { dims: 1, elements, .. } if elements.len() == 2));
    }

    #[test]
    fn test_unsupported_constructs_surface_with_location() {
        let err = lower_src(
            "class Main {
    public static void main(String[] args) {
        Runnable r = () -> {};
    }
}",
        )
        .unwrap_err();
        assert!(err.starts_with("lambda expression is not supported at Main.java:3"), "{}", err);
    }
}
