//! Semantic check errors.

use crate::parser::error::Location;
use std::fmt;
use thiserror::Error;

/// A fatal semantic diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// A simple statement without its terminating `;`
    #[error("';' expected at {location}")]
    MissingSemicolon {
        /// Line of the statement's last token
        location: Location,
    },

    /// A concrete class that leaves an abstract method unimplemented
    #[error(
        "{class} is not abstract and does not override abstract method {method} in {declaring} at {location}"
    )]
    MissingImplementation {
        /// The concrete class
        class: String,
        /// Method signature, e.g. `area()`
        method: String,
        /// Class or interface declaring the abstract method
        declaring: String,
        /// Class declaration site
        location: Location,
    },

    /// `new` on an abstract class or interface
    #[error("{class} is abstract; cannot be instantiated at {location}")]
    AbstractInstantiation {
        /// The abstract type
        class: String,
        /// Construction site
        location: Location,
    },

    /// Two classes with the same simple name
    #[error("duplicate class: {class} at {location}")]
    DuplicateClass {
        /// Class name
        class: String,
        /// Second declaration site
        location: Location,
    },

    /// A supertype that names no known class or interface
    #[error("cannot find symbol: class {name} at {location}")]
    UnknownType {
        /// The unknown name
        name: String,
        /// Declaring class site
        location: Location,
    },

    /// `implements` (or interface `extends`) naming a class
    #[error("interface expected here: {name} at {location}")]
    InterfaceExpected {
        /// The class name
        name: String,
        /// Declaring class site
        location: Location,
    },

    /// Class `extends` naming an interface
    #[error("no interface expected here: {name} at {location}")]
    NoInterfaceExpected {
        /// The interface name
        name: String,
        /// Declaring class site
        location: Location,
    },

    /// Class `extends` naming a built-in that cannot be subclassed
    #[error("cannot inherit from built-in class {name} at {location}")]
    BuiltinSuperclass {
        /// The built-in name
        name: String,
        /// Declaring class site
        location: Location,
    },

    /// A class reachable from itself through `extends`/`implements`
    #[error("cyclic inheritance involving {class} at {location}")]
    CyclicInheritance {
        /// A class on the cycle
        class: String,
        /// Its declaration site
        location: Location,
    },
}

impl CheckError {
    /// Location of the diagnostic.
    pub fn location(&self) -> &Location {
        match self {
            CheckError::MissingSemicolon { location }
            | CheckError::MissingImplementation { location, .. }
            | CheckError::AbstractInstantiation { location, .. }
            | CheckError::DuplicateClass { location, .. }
            | CheckError::UnknownType { location, .. }
            | CheckError::InterfaceExpected { location, .. }
            | CheckError::NoInterfaceExpected { location, .. }
            | CheckError::BuiltinSuperclass { location, .. }
            | CheckError::CyclicInheritance { location, .. } => location,
        }
    }
}

/// All diagnostics from one checker run, in pass order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckErrors(pub Vec<CheckError>);

impl CheckErrors {
    /// The individual diagnostics.
    pub fn errors(&self) -> &[CheckError] {
        &self.0
    }
}

impl fmt::Display for CheckErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckErrors {}
