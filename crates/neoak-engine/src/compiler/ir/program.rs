//! IR Program
//!
//! Top-level container for a lowered program: classes, their functions, and
//! the origin table.

use super::node::{CastKind, Const, Stmt};
use crate::parser::ast::{ClassKind, CoarseType, Visibility};
use serde::{Deserialize, Serialize};

/// Index into [`Program::origins`].
pub type OriginId = u32;

/// Maps a position in the IR back to the source: file, line, and the
/// enclosing class and method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginMarker {
    /// Display path of the source file
    pub file: String,
    /// Original 1-based line
    pub line: u32,
    /// Enclosing class
    pub class: String,
    /// Enclosing method (`<init>` for constructors, `<clinit>` for static init)
    pub method: String,
}

/// A lowered program, ready to execute or serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Artifact format version
    pub version: u32,
    /// Class holding `static void main(String[])`
    pub entry_class: String,
    /// All user classes, entry unit first
    pub classes: Vec<ClassDef>,
    /// Origin table
    pub origins: Vec<OriginMarker>,
}

impl Program {
    /// Look up a class by simple name.
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Look up an origin marker.
    pub fn origin(&self, id: OriginId) -> Option<&OriginMarker> {
        self.origins.get(id as usize)
    }

    /// Total number of IR functions, for logging.
    pub fn function_count(&self) -> usize {
        self.classes
            .iter()
            .map(|c| {
                2 + c.constructors.len()
                    + c.methods.iter().map(|g| g.overloads.len()).sum::<usize>()
            })
            .sum()
    }
}

/// A field slot with its type default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared access level
    pub visibility: Visibility,
    /// Value before any initializer runs (`0`, `false`, `null`, ...)
    pub default: Const,
}

/// A lowered class or interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Simple name
    pub name: String,
    /// Class or interface
    pub kind: ClassKind,
    /// `abstract` class or interface; refuses instantiation
    pub is_abstract: bool,
    /// Superclass (user or built-in)
    pub superclass: Option<String>,
    /// Implemented or extended interfaces
    pub interfaces: Vec<String>,
    /// Package tag, used by package-private access checks
    pub package: Option<String>,
    /// Declaring file
    pub file: String,
    /// Declaring line
    pub line: u32,
    /// Enclosing class of a hoisted nested class
    pub outer: Option<String>,
    /// Instance fields declared by this class
    pub fields: Vec<FieldDef>,
    /// Static fields declared by this class
    pub static_fields: Vec<FieldDef>,
    /// Constructors, declaration order (an implicit one if none declared)
    pub constructors: Vec<Function>,
    /// Overload groups, in order of first declaration
    pub methods: Vec<MethodGroup>,
    /// Instance field initializers and instance blocks, in order
    pub field_init: Function,
    /// Static field initializers, then static blocks
    pub static_init: Function,
}

impl ClassDef {
    /// Overload group by name.
    pub fn group(&self, name: &str) -> Option<&MethodGroup> {
        self.methods.iter().find(|g| g.name == name)
    }
}

/// All same-named methods declared by one class, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodGroup {
    /// Shared name
    pub name: String,
    /// Candidates; first compatible wins
    pub overloads: Vec<Function>,
}

/// A formal parameter with its coarse tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Parameter name
    pub name: String,
    /// Coarse type tag used for overload selection
    pub coarse: CoarseType,
    /// Declared as a reference type, boxed primitives included; accepts `null`
    pub nullable: bool,
    /// Conversion applied on entry for primitive parameters
    pub cast: Option<CastKind>,
}

/// A lowered function: method, constructor, or initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Method name (`<init>` / `<clinit>` for constructors and initializers)
    pub name: String,
    /// Declaring class
    pub class: String,
    /// Parameters; they occupy local slots `0..params.len()`
    pub params: Vec<ParamDef>,
    /// Last parameter is `T...`
    pub varargs: bool,
    /// Number of local slots, parameters included
    pub locals: u32,
    /// Body
    pub body: Vec<Stmt>,
    /// Declared access level
    pub visibility: Visibility,
    /// `static`
    pub is_static: bool,
    /// Conversion applied to returned values for primitive return types
    pub return_cast: Option<CastKind>,
    /// No body (abstract or interface method)
    pub is_abstract: bool,
    /// Declaration site
    pub origin: OriginId,
}

impl Function {
    /// Returns true if an argument count can reach this function.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.varargs {
            count + 1 >= self.params.len()
        } else {
            count == self.params.len()
        }
    }
}
