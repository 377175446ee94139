//! Abstract-method completeness pass.

use crate::checker::error::CheckError;
use crate::checker::hierarchy::{class_location, ClassTable};
use crate::parser::ast::{ClassDecl, MethodDecl};
use rustc_hash::FxHashSet;

/// Every concrete class must implement each abstract method it inherits.
pub fn check_completeness(table: &ClassTable<'_>, errors: &mut Vec<CheckError>) {
    for class in table.classes() {
        if class.is_abstract() {
            continue;
        }
        let implementations = implementations(table, class);
        let mut reported = FxHashSet::default();
        for (declaring, required) in requirements(table, class) {
            let covered = implementations.iter().any(|m| overrides(m, required));
            if !covered && reported.insert(required.describe()) {
                errors.push(CheckError::MissingImplementation {
                    class: class.name.clone(),
                    method: required.describe(),
                    declaring: declaring.name.clone(),
                    location: class_location(class),
                });
            }
        }
    }
}

/// Abstract methods owed by `class`, with their declaring type.
fn requirements<'a>(table: &ClassTable<'a>, class: &'a ClassDecl) -> Vec<(&'a ClassDecl, &'a MethodDecl)> {
    let mut out = Vec::new();
    for ancestor in table.chain(class).into_iter().skip(1) {
        if !ancestor.modifiers.is_abstract {
            continue;
        }
        for method in &ancestor.methods {
            if method.is_abstract() && !method.modifiers.is_static {
                out.push((ancestor, method));
            }
        }
    }
    for iface in table.interfaces(class) {
        for method in &iface.methods {
            if method.is_abstract() && !method.modifiers.is_static && !method.modifiers.is_default {
                out.push((iface, method));
            }
        }
    }
    out
}

/// Concrete instance methods along the chain plus reachable `default` methods.
fn implementations<'a>(table: &ClassTable<'a>, class: &'a ClassDecl) -> Vec<&'a MethodDecl> {
    let mut out: Vec<&MethodDecl> = table
        .chain(class)
        .into_iter()
        .flat_map(|c| c.methods.iter())
        .filter(|m| !m.is_abstract() && !m.modifiers.is_static)
        .collect();
    for iface in table.interfaces(class) {
        out.extend(iface.methods.iter().filter(|m| m.body.is_some() && !m.modifiers.is_static));
    }
    out
}

/// Same name, same arity, and coarse-compatible parameters.
fn overrides(candidate: &MethodDecl, required: &MethodDecl) -> bool {
    candidate.name == required.name
        && candidate.params.len() == required.params.len()
        && candidate
            .params
            .iter()
            .zip(&required.params)
            .all(|(a, b)| a.ty.coarse.compatible(&b.ty.coarse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::CompilationUnit;
    use crate::parser::{parse_unit, SourceUnit};

    fn check(src: &str) -> Vec<String> {
        let units: Vec<CompilationUnit> =
            vec![parse_unit(&SourceUnit::preprocess("Shapes.java", src)).unwrap()];
        let (table, mut errors) = ClassTable::build(&units);
        check_completeness(&table, &mut errors);
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_interface_method_missing() {
        let errors = check(
            "interface Shape { double area(); }
class Square implements Shape {
    double side;
}",
        );
        assert_eq!(
            errors,
            vec!["Square is not abstract and does not override abstract method area() in Shape at Shapes.java:2 (in Square)"]
        );
    }

    #[test]
    fn test_transitive_requirements() {
        let errors = check(
            "interface Named { String name(); }
interface Shape extends Named { double area(); }
abstract class Base implements Shape {
    public double area() { return 0; }
    abstract void draw(int scale);
}
class Circle extends Base {
    public String name() { return \"circle\"; }
}",
        );
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(errors[0].contains("does not override abstract method draw(int) in Base"));
    }

    #[test]
    fn test_coverage_rules() {
        let errors = check(
            "interface Greeter {
    void greet(String who);
    default void wave() { }
    static Greeter create() { return null; }
}
class Hello implements Greeter {
    public void greet(Object who) { }
}
class Wrong implements Greeter {
    public void greet(int who) { }
}",
        );
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(errors[0].starts_with("Wrong is not abstract"));
        assert!(errors[0].contains("greet(String)"));
    }
}
