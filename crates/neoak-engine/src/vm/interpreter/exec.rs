//! Statement execution.

use super::execution::{targets, Completion, ExecResult, Unwind};
use super::state::Interpreter;
use crate::compiler::ir::{Catch, Expr, Stmt, SwitchCase};
use crate::vm::dispatch;
use crate::vm::exceptions::is_builtin_throwable;
use crate::vm::value::Value;

impl Interpreter {
    /// Execute statements in order until one completes abruptly.
    pub(super) fn exec_block(&mut self, stmts: &[Stmt]) -> ExecResult {
        for stmt in stmts {
            match self.exec(stmt)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    pub(super) fn exec(&mut self, stmt: &Stmt) -> ExecResult {
        self.mark(stmt.origin());
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.eval(expr)?;
                Ok(Completion::Normal)
            }
            Stmt::Local { slot, init, .. } => {
                if let Some(init) = init {
                    let value = self.eval(init)?;
                    self.store_local(*slot, value)?;
                }
                Ok(Completion::Normal)
            }
            Stmt::If { cond, then, els, .. } => {
                if self.eval_condition(cond)? {
                    self.exec_block(then)
                } else {
                    self.exec_block(els)
                }
            }
            Stmt::Loop {
                label,
                cond,
                body,
                update,
                test_first,
                ..
            } => self.exec_loop(label, cond.as_ref(), body, update, *test_first),
            Stmt::ForEach {
                label,
                slot,
                iterable,
                body,
                ..
            } => self.exec_for_each(label, *slot, iterable, body),
            Stmt::Switch {
                label,
                scrutinee,
                cases,
                ..
            } => self.exec_switch(label, scrutinee, cases),
            Stmt::Block { label, body, .. } => match self.exec_block(body)? {
                Completion::Break(Some(target)) if label.as_deref() == Some(target.as_str()) => {
                    Ok(Completion::Normal)
                }
                other => Ok(other),
            },
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Ok(Completion::Return(value))
            }
            Stmt::Break { label, .. } => Ok(Completion::Break(label.clone())),
            Stmt::Continue { label, .. } => Ok(Completion::Continue(label.clone())),
            Stmt::Throw { value, .. } => {
                let exception = self.eval(value)?;
                if exception.is_null() {
                    return self.raise(
                        "NullPointerException",
                        "Cannot throw exception because value is null",
                    );
                }
                Err(Unwind::Throw(exception))
            }
            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => self.exec_try(body, catches, finally.as_deref()),
            Stmt::SuperInit { class, args, .. } => {
                let args = self.eval_args(args)?;
                self.super_init(class, args)?;
                Ok(Completion::Normal)
            }
            Stmt::ThisInit { args, .. } => {
                let args = self.eval_args(args)?;
                self.this_init(args)?;
                Ok(Completion::Normal)
            }
        }
    }

    // ========================================================================
    // Loops
    // ========================================================================

    fn exec_loop(
        &mut self,
        label: &Option<String>,
        cond: Option<&Expr>,
        body: &[Stmt],
        update: &[Expr],
        test_first: bool,
    ) -> ExecResult {
        let mut first = true;
        loop {
            if test_first || !first {
                if let Some(cond) = cond {
                    if !self.eval_condition(cond)? {
                        break;
                    }
                }
            }
            first = false;
            match self.exec_block(body)? {
                Completion::Normal => {}
                Completion::Break(target) if targets(&target, label) => break,
                Completion::Continue(target) if targets(&target, label) => {}
                abrupt => return Ok(abrupt),
            }
            for expr in update {
                self.eval(expr)?;
            }
        }
        Ok(Completion::Normal)
    }

    fn exec_for_each(
        &mut self,
        label: &Option<String>,
        slot: u32,
        iterable: &Expr,
        body: &[Stmt],
    ) -> ExecResult {
        let items = match self.eval(iterable)? {
            Value::Array(array) => array.items.borrow().clone(),
            Value::Null => {
                return self.raise(
                    "NullPointerException",
                    "Cannot read the array length because value is null",
                )
            }
            other => {
                let message = format!("cannot iterate over {}", other.class_name());
                return self.raise("UnsupportedOperationException", message);
            }
        };
        for item in items {
            self.store_local(slot, item)?;
            match self.exec_block(body)? {
                Completion::Normal => {}
                Completion::Break(target) if targets(&target, label) => break,
                Completion::Continue(target) if targets(&target, label) => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    // ========================================================================
    // Switch
    // ========================================================================

    fn exec_switch(&mut self, label: &Option<String>, scrutinee: &Expr, cases: &[SwitchCase]) -> ExecResult {
        let value = self.eval(scrutinee)?;
        if value.is_null() {
            return self.raise("NullPointerException", "Cannot switch on a null value");
        }
        let mut start = None;
        'search: for (index, case) in cases.iter().enumerate() {
            for case_label in &case.labels {
                let candidate = self.eval(case_label)?;
                if switch_matches(&value, &candidate) {
                    start = Some(index);
                    break 'search;
                }
            }
        }
        let start = match start.or_else(|| cases.iter().position(|c| c.is_default)) {
            Some(index) => index,
            None => return Ok(Completion::Normal),
        };
        // fall through from the selected case
        for case in &cases[start..] {
            match self.exec_block(&case.body)? {
                Completion::Normal => {}
                Completion::Break(target) if targets(&target, label) => return Ok(Completion::Normal),
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    fn exec_try(&mut self, body: &[Stmt], catches: &[Catch], finally: Option<&[Stmt]>) -> ExecResult {
        let mut outcome = self.exec_block(body);
        if let Err(Unwind::Throw(exception)) = &outcome {
            let exception = exception.clone();
            if let Some(handler) = catches.iter().find(|c| self.catches(c, &exception)) {
                outcome = self
                    .store_local(handler.slot, exception)
                    .and_then(|_| self.exec_block(&handler.body));
            }
        }
        let Some(finally) = finally else {
            return outcome;
        };
        if matches!(outcome, Err(Unwind::Exit(_) | Unwind::Fatal(_))) {
            return outcome;
        }
        match self.exec_block(finally)? {
            Completion::Normal => outcome,
            abrupt => Ok(abrupt),
        }
    }

    fn catches(&self, handler: &Catch, exception: &Value) -> bool {
        let class = exception.class_name();
        handler.types.iter().any(|t| self.registry.is_subclass(class, t))
    }

    // ========================================================================
    // Constructor chaining
    // ========================================================================

    /// `super(args)`: run the superclass constructor body on `this`.
    fn super_init(&mut self, class: &str, args: Vec<Value>) -> Result<(), Unwind> {
        let this = self.this_object()?;
        if let Some(parent) = self.registry.get(class).cloned() {
            let Some((_, constructor)) = dispatch::select(&self.registry, &parent.def.constructors, &args) else {
                return self.raise("NoSuchMethodError", format!("{}.<init>", class));
            };
            self.check_access(constructor.visibility, class, "constructor", "<init>")?;
            self.call_function(constructor, Some(this), args)?;
        } else if is_builtin_throwable(class) {
            self.init_throwable(&this, &args)?;
        }
        Ok(())
    }

    /// `this(args)`: delegate to another constructor of the same class.
    fn this_init(&mut self, args: Vec<Value>) -> Result<(), Unwind> {
        let this = self.this_object()?;
        let class_name = self.current_class();
        let Some(class) = self.registry.get(&class_name).cloned() else {
            return self.raise("NoSuchMethodError", format!("{}.<init>", class_name));
        };
        let Some((_, constructor)) = dispatch::select(&self.registry, &class.def.constructors, &args) else {
            return self.raise("NoSuchMethodError", format!("{}.<init>", class_name));
        };
        self.call_function(constructor, Some(this), args)?;
        Ok(())
    }
}

/// Case label equality: by value for numbers, chars, and strings.
fn switch_matches(value: &Value, label: &Value) -> bool {
    match (value, label) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => match (value.as_int(), label.as_int()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}
