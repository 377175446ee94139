//! Allocation of objects and arrays.
//!
//! Memory is reference counted; the heap only hands out identity numbers,
//! which feed `hashCode()` and `Name@hex` rendering.

use crate::vm::object::{Array, Native, Object};
use crate::vm::value::Value;
use std::cell::Cell;
use std::rc::Rc;

/// Identity allocator shared by the interpreter and the builtins.
#[derive(Debug)]
pub struct Heap {
    next_id: Cell<u32>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
        }
    }

    /// Fresh identity number.
    pub fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }

    /// Allocate an object with no fields.
    pub fn object(&self, class: &str, native: Native) -> Rc<Object> {
        Rc::new(Object::new(self.next_id(), class, native))
    }

    /// Allocate an array value.
    pub fn array(&self, component: &str, dims: u32, items: Vec<Value>) -> Value {
        Value::Array(Rc::new(Array::new(self.next_id(), component, dims, items)))
    }

    /// Allocate a `String[]`.
    pub fn string_array(&self, items: impl IntoIterator<Item = String>) -> Value {
        self.array("String", 1, items.into_iter().map(Value::str).collect())
    }

    /// Allocate a `char[]`.
    pub fn char_array(&self, items: impl IntoIterator<Item = char>) -> Value {
        self.array("char", 1, items.into_iter().map(Value::Char).collect())
    }
}

/// Initial element of an array with the given component and dimensions.
pub fn element_default(component: &str, dims: u32) -> Value {
    if dims > 1 {
        return Value::Null;
    }
    match component {
        "int" | "long" | "short" | "byte" => Value::Int(0),
        "double" | "float" => Value::Double(0.0),
        "char" => Value::Char('\0'),
        "boolean" => Value::Bool(false),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let heap = Heap::new();
        let a = heap.object("Point", Native::None);
        let b = heap.object("Point", Native::None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_element_defaults() {
        assert!(matches!(element_default("int", 1), Value::Int(0)));
        assert!(matches!(element_default("double", 1), Value::Double(_)));
        assert!(matches!(element_default("int", 2), Value::Null));
        assert!(matches!(element_default("String", 1), Value::Null));
    }
}
