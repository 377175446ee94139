//! Library calls that need the interpreter: `System.exit`, formatting, and
//! helpers that call `toString()`, `equals()`, `hashCode()`, or
//! `compareTo()` on user objects. Everything else goes to the built-ins.

use super::eval::is_primitive;
use super::execution::{EvalResult, Unwind};
use super::state::Interpreter;
use crate::vm::builtins::{self, format, NativeError};
use crate::vm::object::Array;
use crate::vm::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

impl Interpreter {
    /// Static call on a built-in class.
    pub(super) fn library_call(&mut self, class: &str, name: &str, args: Vec<Value>) -> EvalResult {
        match (class, name, args.len()) {
            ("System", "exit", 1) => {
                let code = args[0].as_int().unwrap_or(0) as i32;
                log::debug!("System.exit({})", code);
                Err(Unwind::Exit(code))
            }
            ("String", "valueOf" | "copyValueOf", 1) => match &args[0] {
                Value::Array(array) if &*array.component == "char" => Ok(Value::str(chars(array))),
                other => Ok(Value::str(self.stringify(other)?)),
            },
            ("String", "valueOf" | "copyValueOf", 3) => {
                let result = builtins::construct(&self.heap, &self.stdin, "String", &args);
                self.native(result)
            }
            ("String", "format", n) if n >= 1 => Ok(Value::str(self.format_call(&args)?)),
            ("String", "join", n) if n >= 1 => {
                let separator = match &args[0] {
                    Value::Null => return self.raise_bare("NullPointerException"),
                    other => self.stringify(other)?,
                };
                let elements = match &args[1..] {
                    [Value::Array(array)] => array.items.borrow().clone(),
                    rest => rest.to_vec(),
                };
                Ok(Value::str(self.texts(&elements)?.join(&separator)))
            }
            ("Arrays", "toString", 1) => Ok(Value::str(self.array_text(&args[0], false)?)),
            ("Arrays", "deepToString", 1) => Ok(Value::str(self.array_text(&args[0], true)?)),
            ("Arrays", "sort", 1) if holds_objects(&args[0]) => {
                if let Value::Array(array) = &args[0] {
                    self.sort_objects(array)?;
                }
                Ok(Value::Null)
            }
            ("Arrays", "hashCode", 1) => match &args[0] {
                Value::Array(array) => {
                    let items = array.items.borrow().clone();
                    Ok(Value::Int(self.combined_hash(&items)?))
                }
                _ => Ok(Value::Int(0)),
            },
            ("Objects", "equals", 2) => Ok(Value::Bool(self.values_equal(&args[0], &args[1])?)),
            ("Objects", "hashCode", 1) => Ok(Value::Int(self.hash_code(&args[0])?)),
            ("Objects", "hash", _) => {
                let values = match args.as_slice() {
                    [Value::Array(array)] if !is_primitive(&array.component) => array.items.borrow().clone(),
                    _ => args.clone(),
                };
                Ok(Value::Int(self.combined_hash(&values)?))
            }
            ("Objects", "toString", 1 | 2) => match (&args[0], args.get(1)) {
                (Value::Null, Some(fallback)) => Ok(fallback.clone()),
                (value, _) => Ok(Value::str(self.stringify(value)?)),
            },
            ("Objects", "requireNonNullElse", 2) => Ok(if args[0].is_null() {
                args[1].clone()
            } else {
                args[0].clone()
            }),
            _ => {
                let result = builtins::static_call(&self.heap, class, name, &args);
                self.native(result)
            }
        }
    }

    /// `String.format` / `printf`: pattern first, then the arguments, with a
    /// lone `Object[]` spread into them.
    pub(super) fn format_call(&mut self, args: &[Value]) -> Result<String, Unwind> {
        let pattern = match args.first() {
            Some(Value::Str(pattern)) => pattern.clone(),
            Some(Value::Null) | None => return self.raise_bare("NullPointerException"),
            Some(other) => Rc::from(self.stringify(other)?.as_str()),
        };
        let values = match &args[1..] {
            [Value::Array(array)] if !is_primitive(&array.component) => array.items.borrow().clone(),
            rest => rest.to_vec(),
        };
        let texts = self.texts(&values)?;
        let result = format::format(&pattern, &values, &texts).map_err(NativeError::from);
        self.native(result)
    }

    fn array_text(&mut self, value: &Value, deep: bool) -> Result<String, Unwind> {
        let Value::Array(array) = value else {
            return self.stringify(value);
        };
        let items = array.items.borrow().clone();
        let mut parts = Vec::with_capacity(items.len());
        for item in &items {
            let text = match item {
                Value::Array(_) if deep => self.array_text(item, true)?,
                other => self.stringify(other)?,
            };
            parts.push(text);
        }
        Ok(format!("[{}]", parts.join(", ")))
    }

    /// `Arrays.sort` on objects through their `compareTo`.
    fn sort_objects(&mut self, array: &Rc<Array>) -> Result<(), Unwind> {
        let mut items = array.items.borrow().clone();
        if let Some(Value::Object(object)) = items
            .iter()
            .find(|v| matches!(v, Value::Object(o) if !self.registry.is_subclass(&o.class, "Comparable")))
        {
            let message = format!(
                "class {} cannot be cast to class java.lang.Comparable",
                self.registry.qualified_name(&object.class)
            );
            return self.raise("ClassCastException", message);
        }
        let mut compare = |a: &Value, b: &Value| -> Result<Ordering, Unwind> {
            let result = self.invoke_virtual(a.clone(), "compareTo", vec![b.clone()])?;
            Ok(result.as_int().unwrap_or(0).cmp(&0))
        };
        builtins::sort_by(&mut items, &mut compare)?;
        *array.items.borrow_mut() = items;
        Ok(())
    }

    /// `Objects.equals`.
    fn values_equal(&mut self, a: &Value, b: &Value) -> Result<bool, Unwind> {
        if a.is_null() {
            return Ok(b.is_null());
        }
        let result = self.invoke_virtual(a.clone(), "equals", vec![b.clone()])?;
        Ok(matches!(result, Value::Bool(true)))
    }

    /// `Objects.hashCode`: 0 for `null`.
    fn hash_code(&mut self, value: &Value) -> Result<i64, Unwind> {
        if value.is_null() {
            return Ok(0);
        }
        let hash = self.invoke_virtual(value.clone(), "hashCode", Vec::new())?;
        Ok(hash.as_int().unwrap_or(0) as i32 as i64)
    }

    /// `31 * h + hash(e)` over the elements, starting at 1.
    fn combined_hash(&mut self, values: &[Value]) -> Result<i64, Unwind> {
        let mut hash: i32 = 1;
        for value in values {
            let element = self.hash_code(value)? as i32;
            hash = hash.wrapping_mul(31).wrapping_add(element);
        }
        Ok(hash as i64)
    }
}

fn chars(array: &Array) -> String {
    array
        .items
        .borrow()
        .iter()
        .filter_map(|v| match v {
            Value::Char(c) => Some(*c),
            _ => None,
        })
        .collect()
}

/// Whether `Arrays.sort` needs `compareTo` on user objects.
fn holds_objects(value: &Value) -> bool {
    match value {
        Value::Array(array) => array.items.borrow().iter().any(|v| matches!(v, Value::Object(_))),
        _ => false,
    }
}
