//! Runtime values
//!
//! Values are dynamically typed. Integral Java types share [`Value::Int`]
//! and floating types share [`Value::Double`]; references are `Rc` handles,
//! so identity is pointer identity.

use crate::compiler::ir::Const;
use crate::vm::object::{Array, Object};
use std::fmt;
use std::rc::Rc;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// `null`
    Null,
    /// `boolean`
    Bool(bool),
    /// `int`, `long`, `short`, `byte`
    Int(i64),
    /// `double`, `float`
    Double(f64),
    /// `char`
    Char(char),
    /// `String`
    Str(Rc<str>),
    /// Any array
    Array(Rc<Array>),
    /// A user object or a built-in object (exception, scanner, ...)
    Object(Rc<Object>),
    /// Result of `getClass()`: the class name
    Class(Rc<str>),
}

impl Value {
    /// Build a string value.
    pub fn str(text: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(text.as_ref()))
    }

    /// Returns true for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for numbers and `char`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_) | Value::Char(_))
    }

    /// Integral view: `int` values and `char` code points.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    /// Floating view of any number.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Char(c) => Some(*c as u32 as f64),
            _ => None,
        }
    }

    /// Reference identity (`==` on references); strings compare by content.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// Simple runtime class name of the value.
    pub fn class_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::Double(_) => "Double",
            Value::Char(_) => "Character",
            Value::Str(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(obj) => &obj.class,
            Value::Class(_) => "Class",
        }
    }
}

impl From<&Const> for Value {
    fn from(c: &Const) -> Self {
        match c {
            Const::Null => Value::Null,
            Const::Bool(b) => Value::Bool(*b),
            Const::Int(v) => Value::Int(*v),
            Const::Double(v) => Value::Double(*v),
            Const::Char(c) => Value::Char(*c),
            Const::Str(s) => Value::str(s),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(a) => write!(f, "<{}[] #{}>", a.component, a.id),
            Value::Object(o) => write!(f, "<{} #{}>", o.class, o.id),
            Value::Class(name) => write!(f, "class {}", name),
        }
    }
}
