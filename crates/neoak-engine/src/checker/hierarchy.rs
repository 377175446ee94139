//! Class table and the hierarchy pass.
//!
//! The [`ClassTable`] indexes every declaration by simple name and answers
//! inheritance queries; every walk is cycle-safe so it can be used before
//! cycles have been rejected.

use crate::checker::error::CheckError;
use crate::parser::ast::{ClassDecl, CompilationUnit, FieldDecl, MethodDecl};
use crate::parser::error::Location;
use crate::vm::builtins::catalog::{is_builtin, is_builtin_interface, is_extendable};
use rustc_hash::{FxHashMap, FxHashSet};

/// Every user declaration, indexed by simple name.
pub struct ClassTable<'a> {
    by_name: FxHashMap<&'a str, &'a ClassDecl>,
    order: Vec<&'a ClassDecl>,
}

impl<'a> ClassTable<'a> {
    /// Index all classes; later duplicates are reported and ignored.
    pub fn build(units: &'a [CompilationUnit]) -> (Self, Vec<CheckError>) {
        let mut by_name = FxHashMap::default();
        let mut order = Vec::new();
        let mut errors = Vec::new();
        for unit in units {
            for class in &unit.classes {
                if by_name.contains_key(class.name.as_str()) {
                    errors.push(CheckError::DuplicateClass {
                        class: class.name.clone(),
                        location: class_location(class),
                    });
                    continue;
                }
                by_name.insert(class.name.as_str(), class);
                order.push(class);
            }
        }
        (Self { by_name, order }, errors)
    }

    /// Look up a class by simple name.
    pub fn get(&self, name: &str) -> Option<&'a ClassDecl> {
        self.by_name.get(name).copied()
    }

    /// All classes in declaration order.
    pub fn classes(&self) -> &[&'a ClassDecl] {
        &self.order
    }

    /// The class followed by its user-declared superclasses, nearest first.
    pub fn chain(&self, class: &'a ClassDecl) -> Vec<&'a ClassDecl> {
        let mut chain = vec![class];
        let mut seen = FxHashSet::default();
        seen.insert(class.name.as_str());
        let mut current = class;
        while let Some(parent) = current.superclass.as_deref().and_then(|s| self.get(s)) {
            if !seen.insert(parent.name.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Every user interface reachable from the class, its superclasses, and
    /// interface `extends` links.
    pub fn interfaces(&self, class: &'a ClassDecl) -> Vec<&'a ClassDecl> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack: Vec<&'a str> = Vec::new();
        for c in self.chain(class) {
            if c.is_interface() {
                continue;
            }
            stack.extend(c.interfaces.iter().rev().map(String::as_str));
        }
        if class.is_interface() {
            stack.extend(class.interfaces.iter().rev().map(String::as_str));
        }
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            if let Some(iface) = self.get(name) {
                if iface.is_interface() {
                    out.push(iface);
                    stack.extend(iface.interfaces.iter().rev().map(String::as_str));
                }
            }
        }
        out
    }

    /// Returns true if `name` names an abstract class or any interface
    /// (user-declared or built-in).
    pub fn is_abstract(&self, name: &str) -> bool {
        match self.get(name) {
            Some(class) => class.is_abstract(),
            None => is_builtin_interface(name),
        }
    }

    /// Returns true if `sub` equals or inherits from `ancestor`.
    pub fn is_subclass(&self, sub: &str, ancestor: &str) -> bool {
        match self.get(sub) {
            Some(class) => {
                if self.chain(class).iter().any(|c| c.name == ancestor) {
                    return true;
                }
                self.interfaces(class).iter().any(|i| i.name == ancestor)
            }
            None => sub == ancestor,
        }
    }

    /// Find a field along the class chain, most-derived first, with its
    /// declaring class.
    pub fn find_field(&self, class: &'a ClassDecl, name: &str) -> Option<(&'a ClassDecl, &'a FieldDecl)> {
        for c in self.chain(class) {
            if let Some(field) = c.field(name) {
                return Some((c, field));
            }
        }
        // interface constants
        for iface in self.interfaces(class) {
            if let Some(field) = iface.field(name) {
                return Some((iface, field));
            }
        }
        None
    }

    /// Find the nearest class along the chain declaring a method named `name`.
    pub fn find_methods(&self, class: &'a ClassDecl, name: &str) -> Option<(&'a ClassDecl, Vec<&'a MethodDecl>)> {
        for c in self.chain(class) {
            let methods: Vec<&MethodDecl> = c.methods.iter().filter(|m| m.name == name).collect();
            if !methods.is_empty() {
                return Some((c, methods));
            }
        }
        for iface in self.interfaces(class) {
            let methods: Vec<&MethodDecl> = iface.methods.iter().filter(|m| m.name == name).collect();
            if !methods.is_empty() {
                return Some((iface, methods));
            }
        }
        None
    }
}

/// Class-level diagnostic location: `file:line (in Class)`.
pub fn class_location(class: &ClassDecl) -> Location {
    Location::new(class.file.clone(), class.line).within(class.name.clone())
}

/// Check supertypes: unknown names, kind mismatches, and cycles.
pub fn check_hierarchy(table: &ClassTable<'_>, errors: &mut Vec<CheckError>) {
    for class in table.classes() {
        if let Some(parent) = &class.superclass {
            match table.get(parent) {
                Some(decl) if decl.is_interface() => errors.push(CheckError::NoInterfaceExpected {
                    name: parent.clone(),
                    location: class_location(class),
                }),
                Some(_) => {}
                None if is_builtin_interface(parent) => {
                    errors.push(CheckError::NoInterfaceExpected {
                        name: parent.clone(),
                        location: class_location(class),
                    })
                }
                None if is_extendable(parent) => {}
                None if is_builtin(parent) => errors.push(CheckError::BuiltinSuperclass {
                    name: parent.clone(),
                    location: class_location(class),
                }),
                None => errors.push(CheckError::UnknownType {
                    name: parent.clone(),
                    location: class_location(class),
                }),
            }
        }
        for iface in &class.interfaces {
            match table.get(iface) {
                Some(decl) if !decl.is_interface() => errors.push(CheckError::InterfaceExpected {
                    name: iface.clone(),
                    location: class_location(class),
                }),
                Some(_) => {}
                None if is_builtin_interface(iface) => {}
                None if is_builtin(iface) => errors.push(CheckError::InterfaceExpected {
                    name: iface.clone(),
                    location: class_location(class),
                }),
                None => errors.push(CheckError::UnknownType {
                    name: iface.clone(),
                    location: class_location(class),
                }),
            }
        }
        if reaches_itself(table, class) {
            errors.push(CheckError::CyclicInheritance {
                class: class.name.clone(),
                location: class_location(class),
            });
        }
    }
}

/// Depth-first search over supertype edges looking for the start class.
fn reaches_itself(table: &ClassTable<'_>, start: &ClassDecl) -> bool {
    let mut seen = FxHashSet::default();
    let mut stack: Vec<&str> = supertypes(start).collect();
    while let Some(name) = stack.pop() {
        if name == start.name {
            return true;
        }
        if !seen.insert(name) {
            continue;
        }
        if let Some(decl) = table.get(name) {
            stack.extend(supertypes(decl));
        }
    }
    false
}

fn supertypes(class: &ClassDecl) -> impl Iterator<Item = &str> {
    class
        .superclass
        .iter()
        .chain(class.interfaces.iter())
        .map(String::as_str)
}
