//! Declaration table: classes, interfaces, and their members.

use crate::parser::token::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// Class or interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// No modifier
    PackagePrivate,
    /// `private`
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::PackagePrivate
    }
}

/// Modifier set for classes and members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Access level
    pub visibility: Visibility,
    /// `static`
    pub is_static: bool,
    /// `final`
    pub is_final: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// `default` (interface method with a body)
    pub is_default: bool,
    /// `synchronized`
    pub is_synchronized: bool,
    /// `native`
    pub is_native: bool,
}

/// Coarse type tag, the only typing information kept after erasure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoarseType {
    /// `boolean` / `Boolean`
    Boolean,
    /// Any primitive number, `char`, or boxed number
    Numeric,
    /// `String` / `CharSequence`
    Textual,
    /// Any array
    Array,
    /// A named reference type
    Class(String),
    /// `Object`, erased type parameters, `var`
    Any,
}

impl CoarseType {
    /// Coarse compatibility between two declared tags.
    pub fn compatible(&self, other: &CoarseType) -> bool {
        matches!(self, CoarseType::Any) || matches!(other, CoarseType::Any) || self == other
    }
}

/// A type reference after generic erasure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Simple name (`java.util.List<T>` becomes `List`)
    pub name: String,
    /// Array dimensions
    pub dims: u32,
    /// Coarse tag
    pub coarse: CoarseType,
}

impl TypeRef {
    /// Element type of an array type.
    pub fn element(&self) -> TypeRef {
        let dims = self.dims.saturating_sub(1);
        TypeRef {
            name: self.name.clone(),
            dims,
            coarse: if dims > 0 {
                CoarseType::Array
            } else {
                coarse_of(&self.name, &[])
            },
        }
    }

    /// Returns true for `int`, `double`, and the other primitive names.
    pub fn is_primitive(&self) -> bool {
        self.dims == 0 && PRIMITIVES.contains(&self.name.as_str())
    }
}

/// Primitive type names.
pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "float", "double", "char",
];

/// Coarse tag for a simple type name with no array dimensions.
pub fn coarse_of(name: &str, type_params: &[String]) -> CoarseType {
    if type_params.iter().any(|p| p == name) {
        return CoarseType::Any;
    }
    match name {
        "boolean" | "Boolean" => CoarseType::Boolean,
        "byte" | "short" | "int" | "long" | "float" | "double" | "char" | "Byte" | "Short"
        | "Integer" | "Long" | "Float" | "Double" | "Character" | "Number" => CoarseType::Numeric,
        "String" | "CharSequence" => CoarseType::Textual,
        "Object" | "var" | "void" => CoarseType::Any,
        other => CoarseType::Class(other.to_string()),
    }
}

/// A token block kept opaque until lowering: a member body or initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBlock {
    /// Tokens between the delimiters
    pub tokens: Vec<Spanned>,
    /// Span of the opening delimiter or first token
    pub span: Span,
}

impl TokenBlock {
    /// Line the block starts on.
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type (varargs already turned into an array)
    pub ty: TypeRef,
    /// `T... xs`
    pub is_varargs: bool,
}

/// A field declaration (one per declarator).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Declared type
    pub ty: TypeRef,
    /// Initializer expression tokens
    pub init: Option<TokenBlock>,
    /// Declaring line
    pub line: u32,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Method name
    pub name: String,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Method type parameters
    pub type_params: Vec<String>,
    /// Return type; `None` for `void`
    pub return_type: Option<TypeRef>,
    /// Parameters
    pub params: Vec<Param>,
    /// `throws` clause names
    pub throws: Vec<String>,
    /// Body tokens; absent for abstract and interface methods
    pub body: Option<TokenBlock>,
    /// Declaration order within the class (overload tie-break)
    pub order: usize,
    /// Declaring line
    pub line: u32,
}

impl MethodDecl {
    /// Returns true if the method has no implementation.
    pub fn is_abstract(&self) -> bool {
        self.body.is_none() && !self.modifiers.is_native
    }

    /// Coarse parameter tags.
    pub fn signature(&self) -> Vec<CoarseType> {
        self.params.iter().map(|p| p.ty.coarse.clone()).collect()
    }

    /// Human-readable signature, e.g. `area(numeric, text)`.
    pub fn describe(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.name.clone()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

/// A constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    /// Modifiers
    pub modifiers: Modifiers,
    /// Parameters
    pub params: Vec<Param>,
    /// Body tokens
    pub body: TokenBlock,
    /// Declaration order among constructors
    pub order: usize,
    /// Declaring line
    pub line: u32,
}

/// An instance initializer step, kept in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceInit {
    /// Initializer of the field at this index
    Field(usize),
    /// An instance initializer block
    Block(TokenBlock),
}

/// A class or interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Simple name
    pub name: String,
    /// Class or interface
    pub kind: ClassKind,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Class type parameters (erased)
    pub type_params: Vec<String>,
    /// Superclass simple name
    pub superclass: Option<String>,
    /// Implemented (or, for interfaces, extended) interfaces, in order
    pub interfaces: Vec<String>,
    /// Fields, in order
    pub fields: Vec<FieldDecl>,
    /// Constructors, in order
    pub constructors: Vec<ConstructorDecl>,
    /// Methods, in order
    pub methods: Vec<MethodDecl>,
    /// `static { ... }` blocks, in order
    pub static_blocks: Vec<TokenBlock>,
    /// Instance field initializers and `{ ... }` blocks, in order
    pub instance_inits: Vec<InstanceInit>,
    /// Package tag of the declaring unit
    pub package: Option<String>,
    /// Declaring file (display path)
    pub file: String,
    /// Declaring line
    pub line: u32,
    /// Enclosing class, for hoisted static nested classes
    pub outer: Option<String>,
}

impl ClassDecl {
    /// Returns true for interfaces and `abstract` classes.
    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::Interface || self.modifiers.is_abstract
    }

    /// Returns true for interfaces.
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Methods grouped by name, in order of first appearance.
    pub fn overload_sets(&self) -> Vec<OverloadSet<'_>> {
        let mut sets: Vec<OverloadSet<'_>> = Vec::new();
        for method in &self.methods {
            match sets.iter_mut().find(|s| s.name == method.name) {
                Some(set) => set.methods.push(method),
                None => sets.push(OverloadSet {
                    name: &method.name,
                    methods: vec![method],
                }),
            }
        }
        sets
    }
}

/// All same-named methods of one declaring class.
#[derive(Debug, Clone)]
pub struct OverloadSet<'a> {
    /// Shared name
    pub name: &'a str,
    /// Members in declaration order
    pub methods: Vec<&'a MethodDecl>,
}

/// The declaration table of one source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// Display path
    pub file: String,
    /// Package tag
    pub package: Option<String>,
    /// Top-level and hoisted nested classes, in order
    pub classes: Vec<ClassDecl>,
}
