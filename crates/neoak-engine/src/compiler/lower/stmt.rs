//! Statement lowering.

use super::scope::TargetKind;
use super::{primitive_cast, FnLowerer};
use crate::compiler::error::CompileError;
use crate::compiler::ir;
use crate::parser::ast::{CatchClause, Stmt, SwitchCase};
use crate::parser::parser::types::with_extra_dims;

impl<'l, 'a> FnLowerer<'l, 'a> {
    /// Lower one statement. Local declarations with several declarators
    /// produce several IR statements.
    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<Vec<ir::Stmt>, CompileError> {
        let origin = self.origin(stmt.span().line);
        // only the first statement itself may be `super(..)` / `this(..)`
        let ctor_call_allowed = std::mem::replace(&mut self.ctor_call_allowed, false);
        let lowered = match stmt {
            Stmt::Local { ty, decls, .. } => {
                let mut out = Vec::with_capacity(decls.len());
                for decl in decls {
                    let decl_ty = with_extra_dims(ty.clone(), decl.dims);
                    let cast = primitive_cast(&decl_ty);
                    let origin = self.origin(decl.span.line);
                    let init = match &decl.init {
                        Some(init) => {
                            let value = self.lower_var_init(init, &decl_ty)?;
                            Some(match cast.clone() {
                                Some(kind) => ir::Expr::Cast {
                                    kind,
                                    expr: Box::new(value),
                                    origin,
                                },
                                None => value,
                            })
                        }
                        None => None,
                    };
                    if self.scopes.is_declared(&decl.name) {
                        return Err(CompileError::DuplicateVariable {
                            name: decl.name.clone(),
                            location: self.location(decl.span.line),
                        });
                    }
                    let slot = self.scopes.declare(&decl.name);
                    self.scopes.set_cast(slot, cast);
                    out.push(ir::Stmt::Local { slot, init, origin });
                }
                return Ok(out);
            }
            Stmt::Expr { expr, .. } => ir::Stmt::Expr {
                expr: self.lower_expr(expr)?,
                origin,
            },
            Stmt::If { cond, then, els, .. } => {
                let cond = self.lower_expr(cond)?;
                let then = self.lower_branch(then)?;
                let els = match els {
                    Some(els) => self.lower_branch(els)?,
                    None => Vec::new(),
                };
                ir::Stmt::If {
                    cond,
                    then,
                    els,
                    origin,
                }
            }
            Stmt::While { .. }
            | Stmt::DoWhile { .. }
            | Stmt::For { .. }
            | Stmt::ForEach { .. }
            | Stmt::Switch { .. } => return self.lower_breakable(stmt, None),
            Stmt::Labeled { label, body, .. } => match body.as_ref() {
                Stmt::While { .. }
                | Stmt::DoWhile { .. }
                | Stmt::For { .. }
                | Stmt::ForEach { .. }
                | Stmt::Switch { .. } => return self.lower_breakable(body, Some(label.clone())),
                other => {
                    self.targets.push(TargetKind::Block, Some(label.clone()));
                    let body = self.lower_branch(other);
                    self.targets.pop();
                    ir::Stmt::Block {
                        label: Some(label.clone()),
                        body: body?,
                        origin,
                    }
                }
            },
            Stmt::Break { label, span } => {
                if !self.targets.can_break(label.as_deref()) {
                    return Err(self.jump_error("break", label, span.line));
                }
                ir::Stmt::Break {
                    label: label.clone(),
                    origin,
                }
            }
            Stmt::Continue { label, span } => {
                if !self.targets.can_continue(label.as_deref()) {
                    return Err(self.jump_error("continue", label, span.line));
                }
                ir::Stmt::Continue {
                    label: label.clone(),
                    origin,
                }
            }
            Stmt::Return { value, .. } => ir::Stmt::Return {
                value: match value {
                    Some(v) => Some(self.lower_expr(v)?),
                    None => None,
                },
                origin,
            },
            Stmt::Throw { value, .. } => ir::Stmt::Throw {
                value: self.lower_expr(value)?,
                origin,
            },
            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => {
                let body = self.lower_scoped(body)?;
                let catches = catches
                    .iter()
                    .map(|c| self.lower_catch(c))
                    .collect::<Result<Vec<_>, _>>()?;
                let finally = match finally {
                    Some(stmts) => Some(self.lower_scoped(stmts)?),
                    None => None,
                };
                ir::Stmt::Try {
                    body,
                    catches,
                    finally,
                    origin,
                }
            }
            Stmt::Block { body, .. } => ir::Stmt::Block {
                label: None,
                body: self.lower_scoped(body)?,
                origin,
            },
            Stmt::Synchronized { lock, body, .. } => {
                // single-threaded: evaluate the monitor, run the body
                let mut stmts = vec![ir::Stmt::Expr {
                    expr: self.lower_expr(lock)?,
                    origin,
                }];
                stmts.extend(self.lower_scoped(body)?);
                ir::Stmt::Block {
                    label: None,
                    body: stmts,
                    origin,
                }
            }
            Stmt::SuperInit { args, span } => {
                if !ctor_call_allowed {
                    return Err(CompileError::MisplacedConstructorCall {
                        call: "super",
                        location: self.location(span.line),
                    });
                }
                let args = self.lower_args(args)?;
                ir::Stmt::SuperInit {
                    class: self
                        .class
                        .superclass
                        .clone()
                        .unwrap_or_else(|| "Object".to_string()),
                    args,
                    origin,
                }
            }
            Stmt::ThisInit { args, span } => {
                if !ctor_call_allowed {
                    return Err(CompileError::MisplacedConstructorCall {
                        call: "this",
                        location: self.location(span.line),
                    });
                }
                ir::Stmt::ThisInit {
                    args: self.lower_args(args)?,
                    origin,
                }
            }
            Stmt::Empty { .. } => return Ok(Vec::new()),
        };
        Ok(vec![lowered])
    }

    /// Loops and switches, which `break` (and for loops `continue`) target.
    fn lower_breakable(
        &mut self,
        stmt: &Stmt,
        label: Option<String>,
    ) -> Result<Vec<ir::Stmt>, CompileError> {
        let origin = self.origin(stmt.span().line);
        let lowered = match stmt {
            Stmt::While { cond, body, .. } => {
                let cond = self.lower_expr(cond)?;
                let body = self.lower_loop_body(body, &label)?;
                ir::Stmt::Loop {
                    label,
                    cond: Some(cond),
                    body,
                    update: Vec::new(),
                    test_first: true,
                    origin,
                }
            }
            Stmt::DoWhile { body, cond, .. } => {
                let body = self.lower_loop_body(body, &label)?;
                let cond = self.lower_expr(cond)?;
                ir::Stmt::Loop {
                    label,
                    cond: Some(cond),
                    body,
                    update: Vec::new(),
                    test_first: false,
                    origin,
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                // the init declarations scope over the whole loop
                self.scopes.push();
                let result = self.lower_for(init, cond.as_ref(), update, body, label, origin);
                self.scopes.pop();
                return result;
            }
            Stmt::ForEach {
                ty,
                name,
                iterable,
                body,
                span,
            } => {
                let iterable = self.lower_expr(iterable)?;
                self.scopes.push();
                if self.scopes.is_declared(name) {
                    self.scopes.pop();
                    return Err(CompileError::DuplicateVariable {
                        name: name.clone(),
                        location: self.location(span.line),
                    });
                }
                let slot = self.scopes.declare(name);
                self.scopes.set_cast(slot, primitive_cast(ty));
                let body = self.lower_loop_body(body, &label);
                self.scopes.pop();
                ir::Stmt::ForEach {
                    label,
                    slot,
                    iterable,
                    body: body?,
                    origin,
                }
            }
            Stmt::Switch {
                scrutinee, cases, ..
            } => {
                let scrutinee = self.lower_expr(scrutinee)?;
                self.targets.push(TargetKind::Switch, label.clone());
                self.scopes.push();
                let cases = cases
                    .iter()
                    .map(|c| self.lower_case(c))
                    .collect::<Result<Vec<_>, _>>();
                self.scopes.pop();
                self.targets.pop();
                ir::Stmt::Switch {
                    label,
                    scrutinee,
                    cases: cases?,
                    origin,
                }
            }
            other => return self.lower_stmt(other),
        };
        Ok(vec![lowered])
    }

    fn lower_for(
        &mut self,
        init: &[Stmt],
        cond: Option<&crate::parser::ast::Expr>,
        update: &[crate::parser::ast::Expr],
        body: &Stmt,
        label: Option<String>,
        origin: ir::OriginId,
    ) -> Result<Vec<ir::Stmt>, CompileError> {
        let mut out = Vec::new();
        for stmt in init {
            out.extend(self.lower_stmt(stmt)?);
        }
        let cond = match cond {
            Some(c) => Some(self.lower_expr(c)?),
            None => None,
        };
        let update = update
            .iter()
            .map(|e| self.lower_expr(e))
            .collect::<Result<Vec<_>, _>>()?;
        let body = self.lower_loop_body(body, &label)?;
        out.push(ir::Stmt::Loop {
            label,
            cond,
            body,
            update,
            test_first: true,
            origin,
        });
        // keep the init locals in their own block
        Ok(vec![ir::Stmt::Block {
            label: None,
            body: out,
            origin,
        }])
    }

    fn lower_loop_body(
        &mut self,
        body: &Stmt,
        label: &Option<String>,
    ) -> Result<Vec<ir::Stmt>, CompileError> {
        self.targets.push(TargetKind::Loop, label.clone());
        let result = self.lower_branch(body);
        self.targets.pop();
        result
    }

    fn lower_case(&mut self, case: &SwitchCase) -> Result<ir::SwitchCase, CompileError> {
        let labels = case
            .labels
            .iter()
            .map(|l| self.lower_expr(l))
            .collect::<Result<Vec<_>, _>>()?;
        let mut body = Vec::new();
        for stmt in &case.body {
            body.extend(self.lower_stmt(stmt)?);
        }
        Ok(ir::SwitchCase {
            labels,
            is_default: case.is_default,
            body,
        })
    }

    fn lower_catch(&mut self, clause: &CatchClause) -> Result<ir::Catch, CompileError> {
        self.scopes.push();
        let result = self.lower_catch_clause(clause);
        self.scopes.pop();
        result
    }

    fn lower_catch_clause(&mut self, clause: &CatchClause) -> Result<ir::Catch, CompileError> {
        if self.scopes.is_declared(&clause.name) {
            return Err(CompileError::DuplicateVariable {
                name: clause.name.clone(),
                location: self.location(clause.span.line),
            });
        }
        let slot = self.scopes.declare(&clause.name);
        let mut body = Vec::new();
        for stmt in &clause.body {
            body.extend(self.lower_stmt(stmt)?);
        }
        Ok(ir::Catch {
            types: clause.types.clone(),
            slot,
            body,
        })
    }

    /// A nested statement in its own scope, flattened when it is a block.
    fn lower_branch(&mut self, stmt: &Stmt) -> Result<Vec<ir::Stmt>, CompileError> {
        match stmt {
            Stmt::Block { body, .. } => self.lower_scoped(body),
            other => {
                self.scopes.push();
                let result = self.lower_stmt(other);
                self.scopes.pop();
                result
            }
        }
    }

    /// Statements in a fresh scope.
    pub(super) fn lower_scoped(&mut self, stmts: &[Stmt]) -> Result<Vec<ir::Stmt>, CompileError> {
        self.scopes.push();
        let mut out = Vec::with_capacity(stmts.len());
        let mut result = Ok(());
        for stmt in stmts {
            match self.lower_stmt(stmt) {
                Ok(lowered) => out.extend(lowered),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.scopes.pop();
        result.map(|_| out)
    }

    fn jump_error(&self, what: &'static str, label: &Option<String>, line: u32) -> CompileError {
        match label {
            Some(label) => CompileError::UndefinedLabel {
                label: label.clone(),
                location: self.location(line),
            },
            None => CompileError::OrphanJump {
                what,
                location: self.location(line),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::ir::{Program, Stmt};
    use crate::compiler::lower;
    use crate::parser::{parse_unit, SourceUnit};

    fn main_body(body: &str) -> Result<Vec<Stmt>, String> {
        let src = format!(
            "class Main {{\n    public static void main(String[] args) {{\n{}\n    }}\n}}",
            body
        );
        let unit = parse_unit(&SourceUnit::preprocess("Main.java", &src)).map_err(|e| e.to_string())?;
        let program: Program = lower(&[unit]).map_err(|e| e.to_string())?;
        let group = program.class("Main").unwrap().group("main").unwrap();
        Ok(group.overloads[0].body.clone())
    }

    #[test]
    fn test_labeled_loops_carry_labels() {
        let body = main_body(
            "outer:
for (int i = 0; i < 3; i++) {
    for (int j = 0; j < 3; j++) {
        if (j == 1) continue outer;
    }
}",
        )
        .unwrap();
        let Stmt::Block { body, .. } = &body[0] else { panic!("{:?}", body) };
        assert!(matches!(&body[1], Stmt::Loop { label: Some(l), .. } if l == "outer"));
    }

    #[test]
    fn test_jump_errors() {
        assert_eq!(
            main_body("break;").unwrap_err(),
            "break outside of loop at Main.java:3 (in Main.main)"
        );
        assert_eq!(
            main_body("while (true) { continue nowhere; }").unwrap_err(),
            "undefined label: nowhere at Main.java:3 (in Main.main)"
        );
        assert!(main_body("block: { break block; }").is_ok());
    }

    #[test]
    fn test_duplicate_locals() {
        assert_eq!(
            main_body("int x = 1;\nif (true) { int x = 2; }").unwrap_err(),
            "variable x is already defined at Main.java:4 (in Main.main)"
        );
        assert!(main_body("{ int x = 1; }\n{ int x = 2; }").is_ok());
        assert!(main_body("for (int i = 0; i < 1; i++) {}\nfor (int i = 0; i < 1; i++) {}").is_ok());
    }

    #[test]
    fn test_try_multi_catch_finally() {
        let body = main_body(
            "try {
    System.out.println(1);
} catch (IllegalStateException | IllegalArgumentException e) {
    System.out.println(e);
} finally {
    System.out.println(3);
}",
        )
        .unwrap();
        let Stmt::Try { catches, finally, .. } = &body[0] else { panic!() };
        assert_eq!(catches[0].types, vec!["IllegalStateException", "IllegalArgumentException"]);
        assert!(finally.is_some());
    }
}
