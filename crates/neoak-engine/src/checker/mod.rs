//! Semantic checker.
//!
//! Runs every pass over the whole declaration table and aggregates the
//! diagnostics, so one run reports each independent violation:
//!
//! - [`hierarchy`]: duplicate classes, unknown or mismatched supertypes, cycles
//! - [`termination`]: statements missing their `;`
//! - [`completeness`]: concrete classes missing abstract method implementations
//! - [`instantiation`]: `new` on abstract classes and interfaces

pub mod completeness;
pub mod error;
pub mod hierarchy;
pub mod instantiation;
pub mod termination;

pub use error::{CheckError, CheckErrors};
pub use hierarchy::ClassTable;

use crate::parser::ast::CompilationUnit;

/// Check a compilation; `Err` carries every diagnostic found.
pub fn check(units: &[CompilationUnit]) -> Result<(), CheckErrors> {
    let (table, mut errors) = ClassTable::build(units);
    log::debug!("checking {} classes", table.classes().len());

    hierarchy::check_hierarchy(&table, &mut errors);
    termination::check_termination(&table, &mut errors);
    completeness::check_completeness(&table, &mut errors);
    instantiation::check_instantiation(&table, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        log::debug!("checker reported {} diagnostics", errors.len());
        Err(CheckErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_unit, SourceUnit};

    #[test]
    fn test_passes_aggregate() {
        let src = "interface Shape { double area(); }
class Box implements Shape {
    void fill() {
        int x = 1
        Shape s = new Shape();
    }
}";
        let units = vec![parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap()];
        let errors = check(&units).unwrap_err();
        let messages: Vec<String> = errors.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), 3, "{:?}", messages);
        assert_eq!(messages[0], "';' expected at Main.java:4 (in Box.fill)");
        assert!(messages[1].starts_with("Box is not abstract"));
        assert_eq!(
            messages[2],
            "Shape is abstract; cannot be instantiated at Main.java:5 (in Box.fill)"
        );
        assert_eq!(errors.to_string().lines().count(), 3);
    }

    #[test]
    fn test_clean_program() {
        let src = "class Main { public static void main(String[] args) { System.out.println(1); } }";
        let units = vec![parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap()];
        assert!(check(&units).is_ok());
    }
}
