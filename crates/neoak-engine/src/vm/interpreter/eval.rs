//! Expression evaluation.

use super::execution::{EvalResult, Unwind};
use super::state::{apply_cast, Interpreter};
use crate::compiler::ir::{CastKind, Expr, Place};
use crate::parser::ast::BinaryOp;
use crate::vm::builtins::{catalog, coerce_element};
use crate::vm::heap::element_default;
use crate::vm::object::Array;
use crate::vm::ops;
use crate::vm::value::Value;
use std::rc::Rc;

/// A resolved assignment target.
enum Target {
    Local(u32),
    Field(Value, String),
    Static(String, String),
    Element(Rc<Array>, usize),
}

impl Interpreter {
    pub(super) fn eval(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Const(c) => Ok(Value::from(c)),
            Expr::Local(slot) => self.load_local(*slot),
            Expr::This => Ok(Value::Object(self.this_object()?)),
            Expr::Field { target, name, origin } => {
                let target = self.eval(target)?;
                self.mark(*origin);
                self.get_field(target, name)
            }
            Expr::StaticField { class, name } => self.get_static(class, name),
            Expr::Index { target, index, origin } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                self.mark(*origin);
                let (array, i) = self.element(&target, &index, "load from")?;
                let value = array.items.borrow()[i].clone();
                Ok(value)
            }
            Expr::Assign {
                place,
                op,
                value,
                cast,
                origin,
            } => {
                let target = self.resolve(place)?;
                let value = match op {
                    None => self.eval(value)?,
                    Some(op) => {
                        let current = self.read(&target)?;
                        let rhs = self.eval(value)?;
                        self.mark(*origin);
                        let combined = self.compound(*op, &current, &rhs)?;
                        narrow_like(&current, combined, cast.is_some())
                    }
                };
                let value = apply_cast(cast.as_ref(), value);
                self.mark(*origin);
                self.write(&target, value)
            }
            Expr::IncDec {
                place,
                increment,
                prefix,
                origin,
            } => {
                let target = self.resolve(place)?;
                let current = self.read(&target)?;
                self.mark(*origin);
                if current.is_null() {
                    return self.raise_bare("NullPointerException");
                }
                let stepped = ops::step(&current, *increment);
                let stepped = self.operator(stepped)?;
                let stored = self.write(&target, stepped)?;
                Ok(if *prefix { stored } else { current })
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                let result = ops::unary(*op, &value);
                self.operator(result)
            }
            Expr::Binary { op, lhs, rhs, origin } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.mark(*origin);
                self.binary(*op, &lhs, &rhs)
            }
            Expr::Plus { operands, origin } => {
                let mut operands = operands.iter();
                let mut acc = match operands.next() {
                    Some(first) => self.eval(first)?,
                    None => return Ok(Value::Int(0)),
                };
                for operand in operands {
                    let rhs = self.eval(operand)?;
                    self.mark(*origin);
                    acc = self.plus(&acc, &rhs)?;
                }
                Ok(acc)
            }
            Expr::Logical { and, lhs, rhs } => {
                let left = self.eval_condition(lhs)?;
                if left != *and {
                    return Ok(Value::Bool(left));
                }
                Ok(Value::Bool(self.eval_condition(rhs)?))
            }
            Expr::Conditional { cond, then, els } => {
                if self.eval_condition(cond)? {
                    self.eval(then)
                } else {
                    self.eval(els)
                }
            }
            Expr::InstanceOf { expr, class, dims } => {
                let value = self.eval(expr)?;
                Ok(Value::Bool(self.instance_of(&value, class, *dims)))
            }
            Expr::Cast { kind, expr, origin } => {
                let value = self.eval(expr)?;
                self.mark(*origin);
                self.cast(kind, value)
            }
            Expr::Invoke {
                target,
                name,
                args,
                origin,
            } => {
                let receiver = self.eval(target)?;
                let args = self.eval_args(args)?;
                self.mark(*origin);
                self.invoke_virtual(receiver, name, args)
            }
            Expr::InvokeSuper {
                class,
                name,
                args,
                origin,
            } => {
                let args = self.eval_args(args)?;
                self.mark(*origin);
                self.invoke_super(class, name, args)
            }
            Expr::InvokeStatic {
                class,
                name,
                args,
                origin,
            } => {
                let args = self.eval_args(args)?;
                self.mark(*origin);
                self.invoke_static(class, name, args)
            }
            Expr::New { class, args, origin } => {
                let args = self.eval_args(args)?;
                self.mark(*origin);
                self.instantiate(class, args)
            }
            Expr::NewArray {
                component,
                dims,
                extra_dims,
                origin,
            } => {
                let mut lengths = Vec::with_capacity(dims.len());
                for dim in dims {
                    let length = self.eval(dim)?;
                    lengths.push(length.as_int().unwrap_or(0));
                }
                self.mark(*origin);
                if let Some(negative) = lengths.iter().find(|l| **l < 0) {
                    return self.raise("NegativeArraySizeException", negative.to_string());
                }
                let total = lengths.len() as u32 + extra_dims;
                Ok(self.new_array(component, total, &lengths))
            }
            Expr::ArrayLit {
                component,
                dims,
                elements,
            } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    let value = self.eval(element)?;
                    items.push(coerce_element(component, *dims, value));
                }
                Ok(self.heap.array(component, *dims, items))
            }
        }
    }

    /// Evaluate call arguments left to right.
    pub(super) fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, Unwind> {
        args.iter().map(|a| self.eval(a)).collect()
    }

    /// Evaluate a `boolean` expression.
    pub(super) fn eval_condition(&mut self, expr: &Expr) -> Result<bool, Unwind> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            Value::Null => self.raise_bare("NullPointerException"),
            other => {
                let message = format!("{} cannot be used as a condition", other.class_name());
                self.raise("ClassCastException", message)
            }
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn binary(&mut self, op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            let equal = ops::primitive_equals(lhs, rhs).unwrap_or_else(|| lhs.same_ref(rhs));
            return Ok(Value::Bool(equal == (op == BinaryOp::Eq)));
        }
        if lhs.is_null() || rhs.is_null() {
            return self.raise_bare("NullPointerException");
        }
        let result = ops::binary(op, lhs, rhs);
        self.operator(result)
    }

    /// One step of a `+` chain: concatenation if either side is a string.
    fn plus(&mut self, lhs: &Value, rhs: &Value) -> EvalResult {
        if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
            let mut text = self.stringify(lhs)?;
            text.push_str(&self.stringify(rhs)?);
            return Ok(Value::str(text));
        }
        match ops::numeric_add(lhs, rhs) {
            Some(sum) => Ok(sum),
            None if lhs.is_null() || rhs.is_null() => self.raise_bare("NullPointerException"),
            None => self.raise("RuntimeException", "bad operand types for binary operator '+'"),
        }
    }

    fn compound(&mut self, op: BinaryOp, current: &Value, rhs: &Value) -> EvalResult {
        match op {
            BinaryOp::Add => self.plus(current, rhs),
            other => self.binary(other, current, rhs),
        }
    }

    // ========================================================================
    // Places
    // ========================================================================

    fn resolve(&mut self, place: &Place) -> Result<Target, Unwind> {
        Ok(match place {
            Place::Local(slot) => Target::Local(*slot),
            Place::Field { target, name } => Target::Field(self.eval(target)?, name.clone()),
            Place::StaticField { class, name } => Target::Static(class.clone(), name.clone()),
            Place::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                let (array, i) = self.element(&target, &index, "store to")?;
                Target::Element(array, i)
            }
        })
    }

    fn read(&mut self, target: &Target) -> EvalResult {
        match target {
            Target::Local(slot) => self.load_local(*slot),
            Target::Field(object, name) => self.get_field(object.clone(), name),
            Target::Static(class, name) => self.get_static(class, name),
            Target::Element(array, i) => Ok(array.items.borrow()[*i].clone()),
        }
    }

    /// Store and return the stored value.
    fn write(&mut self, target: &Target, value: Value) -> EvalResult {
        match target {
            Target::Local(slot) => self.store_local(*slot, value.clone())?,
            Target::Field(object, name) => self.set_field(object.clone(), name, value.clone())?,
            Target::Static(class, name) => self.put_static(class, name, value.clone())?,
            Target::Element(array, i) => {
                let value = coerce_element(&array.component, array.dims, value);
                array.items.borrow_mut()[*i] = value.clone();
                return Ok(value);
            }
        }
        Ok(value)
    }

    /// Bounds-checked element position.
    fn element(&mut self, target: &Value, index: &Value, action: &str) -> Result<(Rc<Array>, usize), Unwind> {
        let array = match target {
            Value::Array(array) => array.clone(),
            Value::Null => {
                let message = format!("Cannot {} array because value is null", action);
                return self.raise("NullPointerException", message);
            }
            other => {
                let message = format!("{} is not an array", other.class_name());
                return self.raise("ClassCastException", message);
            }
        };
        let Some(i) = index.as_int() else {
            return self.raise_bare("NullPointerException");
        };
        let length = array.len();
        if i < 0 || i as usize >= length {
            let message = format!("Index {} out of bounds for length {}", i, length);
            return self.raise("ArrayIndexOutOfBoundsException", message);
        }
        Ok((array, i as usize))
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn new_array(&self, component: &str, dims: u32, lengths: &[i64]) -> Value {
        let Some((&length, rest)) = lengths.split_first() else {
            return Value::Null;
        };
        let items = if rest.is_empty() {
            vec![element_default(component, dims); length as usize]
        } else {
            (0..length).map(|_| self.new_array(component, dims - 1, rest)).collect()
        };
        self.heap.array(component, dims, items)
    }

    /// `value instanceof Class[]...`; `null` is never an instance.
    pub(super) fn instance_of(&self, value: &Value, class: &str, dims: u32) -> bool {
        if dims > 0 {
            return match value {
                Value::Array(array) => {
                    array.dims == dims
                        && (&*array.component == class
                            || (!is_primitive(&array.component)
                                && self.registry.is_subclass(&array.component, class)))
                }
                _ => false,
            };
        }
        match value {
            Value::Null => false,
            Value::Object(object) => self.registry.is_subclass(&object.class, class),
            Value::Str(_) => matches!(class, "String" | "Object" | "CharSequence" | "Comparable"),
            Value::Int(_) => matches!(
                class,
                "Integer" | "Long" | "Short" | "Byte" | "Number" | "Object" | "Comparable"
            ),
            Value::Double(_) => matches!(class, "Double" | "Float" | "Number" | "Object" | "Comparable"),
            Value::Char(_) => matches!(class, "Character" | "Object" | "Comparable"),
            Value::Bool(_) => matches!(class, "Boolean" | "Object" | "Comparable"),
            Value::Array(_) => matches!(class, "Object" | "Cloneable" | "Serializable"),
            Value::Class(_) => matches!(class, "Class" | "Object"),
        }
    }

    fn cast(&mut self, kind: &CastKind, value: Value) -> EvalResult {
        let CastKind::Class { name, dims } = kind else {
            if value.is_null() {
                return self.raise_bare("NullPointerException");
            }
            return match ops::convert(kind, &value) {
                Some(converted) => Ok(converted),
                None => {
                    let message = format!(
                        "class {} cannot be cast to {}",
                        self.registry.qualified_name(value.class_name()),
                        primitive_name(kind)
                    );
                    self.raise("ClassCastException", message)
                }
            };
        };
        if value.is_null() || self.instance_of(&value, name, *dims) {
            return Ok(value);
        }
        let known = *dims > 0 || self.registry.get(name).is_some() || catalog::is_builtin(name);
        if !known {
            // erased type parameter
            return Ok(value);
        }
        let from = match &value {
            Value::Array(array) => array.descriptor(),
            other => self.registry.qualified_name(other.class_name()),
        };
        let message = format!(
            "class {} cannot be cast to class {}",
            from,
            self.registry.qualified_name(name)
        );
        self.raise("ClassCastException", message)
    }
}

/// Compound assignment keeps the kind of the variable: `c += 1` on a
/// `char` stays a `char`, `i += 1.5` on an `int` stays integral.
fn narrow_like(current: &Value, combined: Value, has_cast: bool) -> Value {
    if has_cast {
        return combined;
    }
    match (current, &combined) {
        (Value::Char(_), Value::Int(code)) => Value::Char(ops::char_from_code(*code)),
        (Value::Int(_), Value::Double(d)) => Value::Int(*d as i64),
        _ => combined,
    }
}

fn primitive_name(kind: &CastKind) -> &str {
    match kind {
        CastKind::Int => "int",
        CastKind::Long => "long",
        CastKind::Short => "short",
        CastKind::Byte => "byte",
        CastKind::Char => "char",
        CastKind::Double => "double",
        CastKind::Float => "float",
        CastKind::Boolean => "boolean",
        CastKind::Class { name, .. } => name,
    }
}

pub(super) fn is_primitive(name: &str) -> bool {
    matches!(
        name,
        "int" | "long" | "short" | "byte" | "char" | "double" | "float" | "boolean"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_like() {
        assert!(matches!(narrow_like(&Value::Char('a'), Value::Int(98), false), Value::Char('b')));
        assert!(matches!(narrow_like(&Value::Int(1), Value::Double(2.5), false), Value::Int(2)));
        assert!(matches!(narrow_like(&Value::Int(1), Value::Double(2.5), true), Value::Double(_)));
        assert!(matches!(narrow_like(&Value::Double(1.0), Value::Double(2.5), false), Value::Double(_)));
    }

    #[test]
    fn test_primitive_names() {
        assert!(is_primitive("char"));
        assert!(!is_primitive("String"));
    }
}
