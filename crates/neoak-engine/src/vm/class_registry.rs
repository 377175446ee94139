//! Class registry for runtime class metadata and static state

use crate::compiler::ir::ClassDef;
use crate::vm::builtins::catalog::is_builtin_interface;
use crate::vm::exceptions::{package_of, parent_of};
use crate::vm::value::Value;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Static initialization state of a class.
///
/// Flipped from `Pending` exactly once; `Running` lets the initializer
/// itself reference the class it is initializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Not yet referenced
    Pending,
    /// Static initializer on the stack
    Running,
    /// Initialized
    Done,
    /// Static initializer threw; later references fail
    Failed,
}

/// A class with its static state.
#[derive(Debug)]
pub struct RuntimeClass {
    /// Lowered definition
    pub def: ClassDef,
    /// Static initialization record
    pub init: Cell<InitState>,
    /// Static field values
    pub statics: RefCell<FxHashMap<String, Value>>,
}

impl RuntimeClass {
    fn new(def: ClassDef) -> Self {
        let statics = def
            .static_fields
            .iter()
            .map(|f| (f.name.clone(), Value::from(&f.default)))
            .collect();
        Self {
            def,
            init: Cell::new(InitState::Pending),
            statics: RefCell::new(statics),
        }
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.def.name
    }
}

/// Class registry for the VM
#[derive(Debug, Default)]
pub struct ClassRegistry {
    /// Classes indexed by ID
    classes: Vec<Rc<RuntimeClass>>,
    /// Class name to ID mapping
    name_to_id: FxHashMap<String, usize>,
}

impl ClassRegistry {
    /// Register every class of a program.
    pub fn from_classes(defs: Vec<ClassDef>) -> Self {
        let mut registry = Self::default();
        for def in defs {
            registry.register_class(def);
        }
        registry
    }

    /// Register a new class
    pub fn register_class(&mut self, def: ClassDef) -> usize {
        let id = self.classes.len();
        self.name_to_id.insert(def.name.clone(), id);
        self.classes.push(Rc::new(RuntimeClass::new(def)));
        id
    }

    /// Get class by name
    pub fn get(&self, name: &str) -> Option<&Rc<RuntimeClass>> {
        self.name_to_id.get(name).and_then(|id| self.classes.get(*id))
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no class is registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Direct superclass of a user or built-in class.
    pub fn superclass_of(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(class) => Some(
                class
                    .def
                    .superclass
                    .clone()
                    .unwrap_or_else(|| "Object".to_string()),
            ),
            None if name == "Object" => None,
            None => parent_of(name).map(str::to_string),
        }
    }

    /// User classes from `name` up its superclass chain, leaf first.
    pub fn chain(&self, name: &str) -> Vec<Rc<RuntimeClass>> {
        let mut out: Vec<Rc<RuntimeClass>> = Vec::new();
        let mut current = self.get(name).cloned();
        while let Some(class) = current {
            if out.iter().any(|c| Rc::ptr_eq(c, &class)) {
                break;
            }
            current = class.def.superclass.as_deref().and_then(|s| self.get(s)).cloned();
            out.push(class);
        }
        out
    }

    /// Returns true if `name` equals or transitively extends or implements
    /// `ancestor`. Every class extends `Object`.
    pub fn is_subclass(&self, name: &str, ancestor: &str) -> bool {
        if name == ancestor || ancestor == "Object" {
            return true;
        }
        let mut seen = Vec::new();
        self.reaches(name, ancestor, &mut seen)
    }

    fn reaches(&self, name: &str, ancestor: &str, seen: &mut Vec<String>) -> bool {
        if name == ancestor {
            return true;
        }
        if seen.iter().any(|s| s == name) {
            return false;
        }
        seen.push(name.to_string());
        if let Some(class) = self.get(name) {
            let class = class.clone();
            if class.def.interfaces.iter().any(|i| self.reaches(i, ancestor, seen)) {
                return true;
            }
        }
        match self.superclass_of(name) {
            Some(parent) => self.reaches(&parent, ancestor, seen),
            None => false,
        }
    }

    /// Returns true for user and built-in throwables.
    pub fn is_throwable(&self, name: &str) -> bool {
        name != "Object" && self.is_subclass(name, "Throwable")
    }

    /// Returns true if the name denotes an interface.
    pub fn is_interface(&self, name: &str) -> bool {
        match self.get(name) {
            Some(class) => class.def.kind == crate::parser::ClassKind::Interface,
            None => is_builtin_interface(name),
        }
    }

    /// Java-style qualified name: `java.lang.ArithmeticException`, or the
    /// package tag and simple name of a user class.
    pub fn qualified_name(&self, name: &str) -> String {
        match self.get(name) {
            Some(class) => match &class.def.package {
                Some(package) => format!("{}.{}", package, name),
                None => name.to_string(),
            },
            None if parent_of(name).is_some() || name == "Object" => {
                format!("{}.{}", package_of(name), name)
            }
            None => name.to_string(),
        }
    }

    /// Returns true if both classes share an outermost enclosing class.
    pub fn same_nest(&self, a: &str, b: &str) -> bool {
        self.nest_host(a) == self.nest_host(b)
    }

    fn nest_host(&self, name: &str) -> String {
        let mut current = name.to_string();
        for _ in 0..self.classes.len() {
            match self.get(&current).and_then(|c| c.def.outer.clone()) {
                Some(outer) => current = outer,
                None => break,
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lower;
    use crate::parser::{parse_unit, SourceUnit};

    fn registry(src: &str) -> ClassRegistry {
        let unit = parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap();
        ClassRegistry::from_classes(lower(&[unit]).unwrap().classes)
    }

    #[test]
    fn test_subclass_queries() {
        let registry = registry(
            "interface Shape { double area(); }
class Base implements Shape { public double area() { return 0; } }
class Main extends Base {
    static class Oops extends IllegalStateException {}
    public static void main(String[] args) {}
}",
        );
        assert!(registry.is_subclass("Main", "Shape"));
        assert!(registry.is_subclass("Main", "Object"));
        assert!(!registry.is_subclass("Base", "Main"));
        assert!(registry.is_subclass("Oops", "RuntimeException"));
        assert!(registry.is_throwable("Oops"));
        assert!(!registry.is_throwable("Main"));
        assert!(registry.is_interface("Shape"));
        assert_eq!(registry.chain("Main").len(), 2);
        assert!(registry.same_nest("Oops", "Main"));
        assert!(!registry.same_nest("Oops", "Base"));
    }

    #[test]
    fn test_qualified_names() {
        let registry = registry("class Main { public static void main(String[] a) {} }");
        assert_eq!(registry.qualified_name("ArithmeticException"), "java.lang.ArithmeticException");
        assert_eq!(registry.qualified_name("IOException"), "java.io.IOException");
        assert_eq!(registry.qualified_name("Main"), "Main");
    }

    #[test]
    fn test_statics_start_at_defaults() {
        let registry = registry(
            "class Main { static int n = 5; static String s; public static void main(String[] a) {} }",
        );
        let main = registry.get("Main").unwrap();
        assert_eq!(main.init.get(), InitState::Pending);
        assert!(matches!(main.statics.borrow().get("n"), Some(Value::Int(0))));
        assert!(matches!(main.statics.borrow().get("s"), Some(Value::Null)));
    }
}
