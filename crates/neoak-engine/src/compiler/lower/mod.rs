//! Declarations to IR Lowering
//!
//! Parses every member body and rewrites the checked declaration table into
//! a [`Program`]. The rewrites with fixed insertion points:
//!
//! - bare field names become `this.f` or `Declaring.f`
//! - bare calls become `this.m(..)` or `Declaring.m(..)`
//! - constructors without `super(..)` / `this(..)` get `super()` first
//! - classes without constructors get an implicit one
//! - instance initializers collect into one `field_init` function per class,
//!   static field initializers and `static` blocks into `static_init`

mod expr;
pub mod scope;
mod stmt;

use crate::checker::ClassTable;
use crate::compiler::error::CompileError;
use crate::compiler::ir::{
    self, CastKind, ClassDef, Const, FieldDef, Function, MethodGroup, OriginId, OriginMarker,
    ParamDef, Place, Program, IR_VERSION,
};
use crate::parser::ast::{
    ClassDecl, CompilationUnit, InstanceInit, Param, Stmt, TokenBlock, TypeRef, Visibility,
};
use crate::parser::error::Location;
use crate::parser::parse_body;
use scope::{JumpTargets, LocalScopes, OriginTable};

/// Lower a checked compilation into an IR program.
///
/// The entry class is the first class of the first unit declaring
/// `static void main(String[] args)`, falling back to any unit.
pub fn lower(units: &[CompilationUnit]) -> Result<Program, CompileError> {
    let (table, _) = ClassTable::build(units);
    let entry_file = units.first().map(|u| u.file.clone()).ok_or(CompileError::EmptyProgram)?;
    let entry_class = find_entry(units).ok_or_else(|| CompileError::MissingMain {
        file: entry_file.clone(),
    })?;

    let mut origins = OriginTable::default();
    let mut classes = Vec::new();
    for class in table.classes() {
        classes.push(lower_class(&table, &mut origins, *class)?);
    }

    let program = Program {
        version: IR_VERSION,
        entry_class,
        classes,
        origins: origins.into_markers(),
    };
    log::debug!(
        "lowered {} classes into {} functions, {} origins",
        program.classes.len(),
        program.function_count(),
        program.origins.len()
    );
    Ok(program)
}

fn find_entry(units: &[CompilationUnit]) -> Option<String> {
    units.iter().find_map(|unit| {
        unit.classes
            .iter()
            .find(|c| {
                c.methods.iter().any(|m| {
                    m.name == "main"
                        && m.modifiers.is_static
                        && m.return_type.is_none()
                        && m.params.len() == 1
                        && m.params[0].ty.dims == 1
                        && m.body.is_some()
                })
            })
            .map(|c| c.name.clone())
    })
}

// ============================================================================
// Classes
// ============================================================================

fn lower_class<'a>(
    table: &ClassTable<'a>,
    origins: &mut OriginTable,
    class: &'a ClassDecl,
) -> Result<ClassDef, CompileError> {
    let (instance_fields, static_fields): (Vec<_>, Vec<_>) = class
        .fields
        .iter()
        .partition(|f| !f.modifiers.is_static && !class.is_interface());
    let field_def = |f: &&crate::parser::ast::FieldDecl| FieldDef {
        name: f.name.clone(),
        visibility: f.modifiers.visibility,
        default: default_value(&f.ty),
    };

    let mut constructors = Vec::new();
    for ctor in &class.constructors {
        let mut lowerer = FnLowerer::new(table, origins, class, "<init>", false, &ctor.params, &[]);
        lowerer.in_constructor = true;
        let body = lowerer.lower_body(&ctor.body)?;
        constructors.push(lowerer.finish(
            body,
            &ctor.params,
            None,
            ctor.modifiers.visibility,
            false,
            ctor.line,
        ));
    }
    if constructors.is_empty() {
        constructors.push(implicit_constructor(table, origins, class));
    }

    let mut methods: Vec<MethodGroup> = Vec::new();
    for set in class.overload_sets() {
        let mut overloads = Vec::new();
        for method in &set.methods {
            let is_static = method.modifiers.is_static;
            let mut lowerer = FnLowerer::new(
                table,
                origins,
                class,
                &method.name,
                is_static,
                &method.params,
                &method.type_params,
            );
            let body = match &method.body {
                Some(block) => lowerer.lower_body(block)?,
                None => Vec::new(),
            };
            let mut function = lowerer.finish(
                body,
                &method.params,
                method.return_type.as_ref(),
                method.modifiers.visibility,
                is_static,
                method.line,
            );
            function.is_abstract = method.body.is_none();
            overloads.push(function);
        }
        methods.push(MethodGroup {
            name: set.name.to_string(),
            overloads,
        });
    }

    let field_init = lower_field_init(table, origins, class)?;
    let static_init = lower_static_init(table, origins, class)?;

    Ok(ClassDef {
        name: class.name.clone(),
        kind: class.kind,
        is_abstract: class.is_abstract(),
        superclass: class.superclass.clone(),
        interfaces: class.interfaces.clone(),
        package: class.package.clone(),
        file: class.file.clone(),
        line: class.line,
        outer: class.outer.clone(),
        fields: instance_fields.iter().map(field_def).collect(),
        static_fields: static_fields.iter().map(field_def).collect(),
        constructors,
        methods,
        field_init,
        static_init,
    })
}

fn implicit_constructor<'a>(
    table: &ClassTable<'a>,
    origins: &mut OriginTable,
    class: &'a ClassDecl,
) -> Function {
    let mut lowerer = FnLowerer::new(table, origins, class, "<init>", false, &[], &[]);
    let origin = lowerer.origin(class.line);
    let body = match &class.superclass {
        Some(parent) => vec![ir::Stmt::SuperInit {
            class: parent.clone(),
            args: Vec::new(),
            origin,
        }],
        None => Vec::new(),
    };
    lowerer.finish(body, &[], None, Visibility::Public, false, class.line)
}

/// Instance field initializers and instance blocks, in declaration order.
fn lower_field_init<'a>(
    table: &ClassTable<'a>,
    origins: &mut OriginTable,
    class: &'a ClassDecl,
) -> Result<Function, CompileError> {
    let mut lowerer = FnLowerer::new(table, origins, class, "<init>", false, &[], &[]);
    let mut body = Vec::new();
    for init in &class.instance_inits {
        match init {
            InstanceInit::Field(index) => {
                let Some(field) = class.fields.get(*index) else {
                    continue;
                };
                let Some(block) = &field.init else {
                    continue;
                };
                let target = Place::Field {
                    target: Box::new(ir::Expr::This),
                    name: field.name.clone(),
                };
                body.push(lowerer.lower_field_initializer(block, &field.ty, target)?);
            }
            InstanceInit::Block(block) => {
                let origin = lowerer.origin(block.line());
                let stmts = lowerer.lower_body(block)?;
                body.push(ir::Stmt::Block {
                    label: None,
                    body: stmts,
                    origin,
                });
            }
        }
    }
    Ok(lowerer.finish(body, &[], None, Visibility::Private, false, class.line))
}

/// Static field initializers in order, then `static` blocks in order.
fn lower_static_init<'a>(
    table: &ClassTable<'a>,
    origins: &mut OriginTable,
    class: &'a ClassDecl,
) -> Result<Function, CompileError> {
    let mut lowerer = FnLowerer::new(table, origins, class, "<clinit>", true, &[], &[]);
    let mut body = Vec::new();
    for field in &class.fields {
        if !field.modifiers.is_static && !class.is_interface() {
            continue;
        }
        if let Some(block) = &field.init {
            let target = Place::StaticField {
                class: class.name.clone(),
                name: field.name.clone(),
            };
            body.push(lowerer.lower_field_initializer(block, &field.ty, target)?);
        }
    }
    for block in &class.static_blocks {
        let origin = lowerer.origin(block.line());
        let stmts = lowerer.lower_body(block)?;
        body.push(ir::Stmt::Block {
            label: None,
            body: stmts,
            origin,
        });
    }
    Ok(lowerer.finish(body, &[], None, Visibility::Private, true, class.line))
}

/// Value of a field or array element before initialization.
pub fn default_value(ty: &TypeRef) -> Const {
    if ty.dims > 0 {
        return Const::Null;
    }
    default_for_component(&ty.name)
}

/// Conversion that keeps a store within a declared primitive type.
pub fn primitive_cast(ty: &TypeRef) -> Option<CastKind> {
    if ty.dims > 0 {
        return None;
    }
    match ty.name.as_str() {
        "int" => Some(CastKind::Int),
        "long" => Some(CastKind::Long),
        "short" => Some(CastKind::Short),
        "byte" => Some(CastKind::Byte),
        "char" => Some(CastKind::Char),
        "double" => Some(CastKind::Double),
        "float" => Some(CastKind::Float),
        _ => None,
    }
}

/// Default for a component type name.
pub fn default_for_component(name: &str) -> Const {
    match name {
        "boolean" => Const::Bool(false),
        "byte" | "short" | "int" | "long" => Const::Int(0),
        "float" | "double" => Const::Double(0.0),
        "char" => Const::Char('\0'),
        _ => Const::Null,
    }
}

// ============================================================================
// Function lowering state
// ============================================================================

/// Lowers one function body.
pub(crate) struct FnLowerer<'l, 'a> {
    table: &'l ClassTable<'a>,
    origins: &'l mut OriginTable,
    class: &'a ClassDecl,
    method: String,
    is_static: bool,
    type_params: Vec<String>,
    scopes: LocalScopes,
    targets: JumpTargets,
    in_constructor: bool,
    /// Set while lowering the first statement of a constructor body
    ctor_call_allowed: bool,
}

impl<'l, 'a> FnLowerer<'l, 'a> {
    fn new(
        table: &'l ClassTable<'a>,
        origins: &'l mut OriginTable,
        class: &'a ClassDecl,
        method: &str,
        is_static: bool,
        params: &[Param],
        method_type_params: &[String],
    ) -> Self {
        let mut type_params = class.type_params.clone();
        type_params.extend(method_type_params.iter().cloned());
        let mut scopes = LocalScopes::with_params(params.iter().map(|p| p.name.as_str()));
        for (slot, param) in params.iter().enumerate() {
            scopes.set_cast(slot as u32, primitive_cast(&param.ty));
        }
        Self {
            table,
            origins,
            class,
            method: method.to_string(),
            is_static,
            type_params,
            scopes,
            targets: JumpTargets::default(),
            in_constructor: false,
            ctor_call_allowed: false,
        }
    }

    /// `Class.method` context used by diagnostics.
    fn context(&self) -> String {
        format!("{}.{}", self.class.name, self.method)
    }

    fn location(&self, line: u32) -> Location {
        Location::new(self.class.file.clone(), line).within(self.context())
    }

    /// Intern an origin for a line of the current function.
    fn origin(&mut self, line: u32) -> OriginId {
        self.origins.intern(OriginMarker {
            file: self.class.file.clone(),
            line,
            class: self.class.name.clone(),
            method: self.method.clone(),
        })
    }

    /// Parse and lower a body block, adding `super()` to constructors that
    /// do not start with an explicit constructor call.
    fn lower_body(&mut self, block: &TokenBlock) -> Result<Vec<ir::Stmt>, CompileError> {
        let stmts = parse_body(block, &self.class.file, &self.context(), &self.type_params)?;
        let mut body = Vec::with_capacity(stmts.len() + 1);
        for (i, stmt) in stmts.iter().enumerate() {
            self.ctor_call_allowed = self.in_constructor && i == 0;
            body.extend(self.lower_stmt(stmt)?);
        }
        self.ctor_call_allowed = false;

        if self.in_constructor {
            let explicit = matches!(
                stmts.first(),
                Some(Stmt::SuperInit { .. }) | Some(Stmt::ThisInit { .. })
            );
            if !explicit {
                if let Some(parent) = self.class.superclass.clone() {
                    let origin = self.origin(block.line());
                    body.insert(
                        0,
                        ir::Stmt::SuperInit {
                            class: parent,
                            args: Vec::new(),
                            origin,
                        },
                    );
                }
            }
        }
        Ok(body)
    }

    /// `target = <initializer>` for a field declaration.
    fn lower_field_initializer(
        &mut self,
        block: &TokenBlock,
        ty: &TypeRef,
        target: Place,
    ) -> Result<ir::Stmt, CompileError> {
        let expr = crate::parser::parse_initializer(
            block,
            &self.class.file,
            &self.context(),
            &self.type_params,
        )?;
        let origin = self.origin(block.line());
        let value = self.lower_var_init(&expr, ty)?;
        Ok(ir::Stmt::Expr {
            expr: ir::Expr::Assign {
                place: Box::new(target),
                op: None,
                value: Box::new(value),
                cast: primitive_cast(ty),
                origin,
            },
            origin,
        })
    }

    fn finish(
        self,
        body: Vec<ir::Stmt>,
        params: &[Param],
        return_type: Option<&TypeRef>,
        visibility: Visibility,
        is_static: bool,
        line: u32,
    ) -> Function {
        let origin = self.origins.intern(OriginMarker {
            file: self.class.file.clone(),
            line,
            class: self.class.name.clone(),
            method: self.method.clone(),
        });
        Function {
            name: self.method.clone(),
            class: self.class.name.clone(),
            params: params
                .iter()
                .map(|p| ParamDef {
                    name: p.name.clone(),
                    coarse: p.ty.coarse.clone(),
                    nullable: !p.ty.is_primitive(),
                    cast: primitive_cast(&p.ty),
                })
                .collect(),
            varargs: params.last().map(|p| p.is_varargs).unwrap_or(false),
            locals: self.scopes.slot_count(),
            body,
            visibility,
            is_static,
            return_cast: return_type.and_then(primitive_cast),
            is_abstract: false,
            origin,
        }
    }
}
