//! Object model: objects, arrays, and built-in native state

use crate::vm::builtins::scanner::ScannerState;
use crate::vm::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Object instance.
///
/// Fields live in one flat map per object, so a field redeclared by a
/// subclass shares the slot of the inherited one.
#[derive(Debug)]
pub struct Object {
    /// Identity (assigned on allocation, drives the default `hashCode`)
    pub id: u32,
    /// Runtime class name
    pub class: Rc<str>,
    /// Field values
    pub fields: RefCell<FxHashMap<String, Value>>,
    /// State of built-in classes
    pub native: RefCell<Native>,
}

impl Object {
    /// Create an object.
    pub fn new(id: u32, class: impl Into<Rc<str>>, native: Native) -> Self {
        Self {
            id,
            class: class.into(),
            fields: RefCell::new(FxHashMap::default()),
            native: RefCell::new(native),
        }
    }

    /// Read a field.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    /// Write a field, returning false if the object has no such field.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        match self.fields.borrow_mut().get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Message of a throwable, if this is one.
    pub fn throwable_message(&self) -> Option<Option<String>> {
        match &*self.native.borrow() {
            Native::Throwable(t) => Some(t.message.clone()),
            _ => None,
        }
    }
}

/// Array instance.
#[derive(Debug)]
pub struct Array {
    /// Identity
    pub id: u32,
    /// Component type name (`int`, `String`, a class)
    pub component: Rc<str>,
    /// Dimensions of this array (`int[][]` has 2)
    pub dims: u32,
    /// Elements
    pub items: RefCell<Vec<Value>>,
}

impl Array {
    /// Create an array.
    pub fn new(id: u32, component: impl Into<Rc<str>>, dims: u32, items: Vec<Value>) -> Self {
        Self {
            id,
            component: component.into(),
            dims,
            items: RefCell::new(items),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Returns true if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// JVM-style type descriptor, e.g. `[I` or `[Ljava.lang.String;`.
    pub fn descriptor(&self) -> String {
        let prefix = "[".repeat(self.dims.max(1) as usize);
        let code = match &*self.component {
            "int" => "I".to_string(),
            "long" => "J".to_string(),
            "double" => "D".to_string(),
            "float" => "F".to_string(),
            "char" => "C".to_string(),
            "boolean" => "Z".to_string(),
            "byte" => "B".to_string(),
            "short" => "S".to_string(),
            "String" | "Object" => format!("Ljava.lang.{};", self.component),
            other => format!("L{};", other),
        };
        format!("{}{}", prefix, code)
    }
}

/// One captured stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// Class of the frame
    pub class: String,
    /// Method (`<init>`, `<clinit>` for initializers)
    pub method: String,
    /// Source position; `None` renders as `Unknown Source`
    pub location: Option<(String, u32)>,
}

/// Exception state.
#[derive(Debug, Clone, Default)]
pub struct Throwable {
    /// `getMessage()`
    pub message: Option<String>,
    /// `getCause()`
    pub cause: Option<Value>,
    /// Stack at construction, innermost first
    pub stack: Vec<FrameInfo>,
}

/// Standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// `System.out`
    Out,
    /// `System.err`
    Err,
    /// `System.in`
    In,
}

/// Native state of built-in objects.
#[derive(Debug, Default)]
pub enum Native {
    /// Plain object
    #[default]
    None,
    /// Any throwable, built-in or user subclass
    Throwable(Throwable),
    /// `StringBuilder`
    Builder(String),
    /// `Scanner`
    Scanner(Box<ScannerState>),
    /// `File`
    File(PathBuf),
    /// `Path`
    Path(PathBuf),
    /// `System.out`, `System.err`, `System.in`
    Stream(Stream),
}
