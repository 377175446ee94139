//! Source compilation pipeline.
//!
//! Parse → Check → Lower to IR. Every unit is parsed before any error is
//! reported, and the checker runs over the whole declaration table, so one
//! run reports every independent diagnostic.

use neoak_engine::{check, lower, parse_unit, CompilationUnit, Program, SourceUnit};

use crate::error::RuntimeError;

/// Parse every unit, collecting all parse errors.
pub fn parse_units(units: &[SourceUnit]) -> Result<Vec<CompilationUnit>, RuntimeError> {
    let mut parsed = Vec::with_capacity(units.len());
    let mut errors = Vec::new();
    for unit in units {
        match parse_unit(unit) {
            Ok(unit) => parsed.push(unit),
            Err(err) => errors.push(err),
        }
    }
    if !errors.is_empty() {
        log::debug!("{} units failed to parse", errors.len());
        return Err(RuntimeError::Parse(errors));
    }
    let classes: usize = parsed.iter().map(|u| u.classes.len()).sum();
    log::debug!("parsed {} units, {} classes", parsed.len(), classes);
    Ok(parsed)
}

/// Parse and check without generating code.
pub fn check_units(units: &[SourceUnit]) -> Result<Vec<CompilationUnit>, RuntimeError> {
    let parsed = parse_units(units)?;
    check(&parsed)?;
    Ok(parsed)
}

/// Parse, check, and lower a set of units; the first unit is the entry.
pub fn compile_units(units: &[SourceUnit]) -> Result<Program, RuntimeError> {
    let parsed = check_units(units)?;
    let program = lower(&parsed)?;
    log::debug!(
        "compiled {} classes, entry {}",
        program.classes.len(),
        program.entry_class
    );
    Ok(program)
}

/// Compile a single source text.
pub fn compile_source(path: &str, source: &str) -> Result<Program, RuntimeError> {
    compile_units(&[SourceUnit::preprocess(path, source)])
}
