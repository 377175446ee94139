//! Method dispatch and member access.
//!
//! Virtual calls walk the receiver's class chain leaf first, then interface
//! default methods; calls that no user class answers fall back to the
//! built-in `Object` and `Throwable` methods.

use super::execution::{EvalResult, Unwind};
use super::state::Interpreter;
use crate::compiler::ir::Function;
use crate::vm::builtins::{self, file, string};
use crate::vm::class_registry::RuntimeClass;
use crate::vm::dispatch;
use crate::vm::object::{Array, Native, Object, Stream};
use crate::vm::ops;
use crate::vm::trace;
use crate::vm::value::Value;
use std::rc::Rc;

/// A method found by lookup: class, overload group, overload.
struct MethodRef {
    class: Rc<RuntimeClass>,
    group: usize,
    index: usize,
}

impl MethodRef {
    fn function(&self) -> &Function {
        &self.class.def.methods[self.group].overloads[self.index]
    }
}

/// Which method table answers a built-in object.
enum Handler {
    Object,
    Builder,
    Scanner,
    Path,
    Stream,
}

impl Interpreter {
    // ========================================================================
    // Lookup
    // ========================================================================

    /// First concrete overload of `name` in one class accepting `args`.
    fn find_in(&self, class: &Rc<RuntimeClass>, name: &str, args: &[Value]) -> Option<MethodRef> {
        let group = class.def.methods.iter().position(|g| g.name == name)?;
        let index = class.def.methods[group].overloads.iter().position(|f| {
            !f.is_abstract && dispatch::accepts(&self.registry, f, args)
        })?;
        Some(MethodRef {
            class: class.clone(),
            group,
            index,
        })
    }

    /// Virtual lookup: the class chain leaf first, then default methods of
    /// every implemented interface.
    fn find_virtual(&self, class: &str, name: &str, args: &[Value]) -> Option<MethodRef> {
        let chain = self.registry.chain(class);
        if let Some(found) = chain.iter().find_map(|c| self.find_in(c, name, args)) {
            return Some(found);
        }
        let mut pending: Vec<String> = chain.iter().flat_map(|c| c.def.interfaces.clone()).collect();
        let mut seen: Vec<String> = Vec::new();
        while let Some(interface) = pending.pop() {
            if seen.contains(&interface) {
                continue;
            }
            if let Some(class) = self.registry.get(&interface) {
                if let Some(found) = self.find_in(class, name, args) {
                    return Some(found);
                }
                pending.extend(class.def.interfaces.iter().cloned());
            }
            seen.push(interface);
        }
        None
    }

    /// Non-virtual lookup up the chain of `class`.
    fn find_static(&self, class: &str, name: &str, args: &[Value]) -> Option<MethodRef> {
        self.registry
            .chain(class)
            .iter()
            .find_map(|c| self.find_in(c, name, args))
    }

    fn call_method(&mut self, method: &MethodRef, receiver: Option<Rc<Object>>, args: Vec<Value>) -> EvalResult {
        let function = method.function();
        // static members are reachable from anywhere
        if function.is_static {
            return self.call_function(function, None, args);
        }
        self.check_access(function.visibility, &function.class, "method", &function.name)?;
        self.call_function(function, receiver, args)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// `receiver.name(args)`.
    pub(super) fn invoke_virtual(&mut self, receiver: Value, name: &str, args: Vec<Value>) -> EvalResult {
        match receiver {
            Value::Null => {
                let message = format!("Cannot invoke \"{}()\" because value is null", name);
                self.raise("NullPointerException", message)
            }
            Value::Object(object) => {
                if self.registry.get(&object.class).is_some() {
                    if let Some(method) = self.find_virtual(&object.class, name, &args) {
                        return self.call_method(&method, Some(object), args);
                    }
                    return self.object_method(object, name, args);
                }
                self.native_method(object, name, args)
            }
            Value::Str(text) => {
                if name == "getClass" && args.is_empty() {
                    return Ok(Value::Class(Rc::from("String")));
                }
                let result = string::string_method(&self.heap, &text, name, &args);
                self.native(result)
            }
            Value::Array(array) => self.array_method(array, name, args),
            Value::Class(class) => self.class_method(&class, name, &args),
            primitive => {
                if name == "getClass" && args.is_empty() {
                    return Ok(Value::Class(Rc::from(primitive.class_name())));
                }
                let result = builtins::boxed_method(&primitive, name, &args);
                self.native(result)
            }
        }
    }

    /// `super.name(args)`: non-virtual lookup starting at the superclass.
    pub(super) fn invoke_super(&mut self, class: &str, name: &str, args: Vec<Value>) -> EvalResult {
        let this = self.this_object()?;
        if let Some(method) = self.find_static(class, name, &args) {
            return self.call_method(&method, Some(this), args);
        }
        self.object_method(this, name, args)
    }

    /// `Class.name(args)`.
    pub(super) fn invoke_static(&mut self, class: &str, name: &str, args: Vec<Value>) -> EvalResult {
        if self.registry.get(class).is_none() {
            return self.library_call(class, name, args);
        }
        self.ensure_init(class)?;
        let Some(method) = self.find_static(class, name, &args) else {
            return self.raise("NoSuchMethodError", format!("{}.{}", class, name));
        };
        let receiver = self.frames.last().and_then(|f| f.this.clone());
        self.call_method(&method, receiver, args)
    }

    // ========================================================================
    // Built-in methods
    // ========================================================================

    /// `Object` and `Throwable` methods of any object.
    fn object_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        match (name, args.len()) {
            ("getClass", 0) => return Ok(Value::Class(object.class.clone())),
            ("equals", 1) => return Ok(Value::Bool(Value::Object(object).same_ref(&args[0]))),
            ("hashCode", 0) => return Ok(Value::Int(ops::identity_hash(object.id) as i64)),
            ("wait", 0..=2) | ("notify" | "notifyAll", 0) => return Ok(Value::Null),
            _ => {}
        }
        if matches!(&*object.native.borrow(), Native::Throwable(_)) {
            return self.throwable_method(object, name, args);
        }
        match (name, args.len()) {
            ("toString", 0) => Ok(Value::str(format!(
                "{}@{:x}",
                self.registry.qualified_name(&object.class),
                ops::identity_hash(object.id)
            ))),
            _ => self.raise("NoSuchMethodError", format!("{}.{}", object.class, name)),
        }
    }

    fn throwable_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        let (message, cause) = match &*object.native.borrow() {
            Native::Throwable(state) => (state.message.clone(), state.cause.clone()),
            _ => (None, None),
        };
        match (name, args.len()) {
            ("getMessage" | "getLocalizedMessage", 0) => Ok(message.map_or(Value::Null, Value::str)),
            ("getCause", 0) => Ok(cause.unwrap_or(Value::Null)),
            ("toString", 0) => {
                let qualified = self.registry.qualified_name(&object.class);
                // an overridden getMessage() shows up in toString()
                let shown = self.invoke_virtual(Value::Object(object), "getMessage", Vec::new())?;
                Ok(Value::str(match shown {
                    Value::Null => qualified,
                    other => format!("{}: {}", qualified, self.stringify(&other)?),
                }))
            }
            ("initCause", 1) => {
                if let Native::Throwable(state) = &mut *object.native.borrow_mut() {
                    state.cause = Some(args[0].clone()).filter(|c| !c.is_null());
                }
                Ok(Value::Object(object))
            }
            ("fillInStackTrace", 0) => {
                let stack = self.capture_stack();
                if let Native::Throwable(state) = &mut *object.native.borrow_mut() {
                    state.stack = stack;
                }
                Ok(Value::Object(object))
            }
            ("getStackTrace", 0) => {
                let lines: Vec<String> = match &*object.native.borrow() {
                    Native::Throwable(state) => state.stack.iter().map(trace::frame_line).collect(),
                    _ => Vec::new(),
                };
                Ok(self.heap.string_array(lines))
            }
            ("printStackTrace", 0) => {
                let data = self.trace_data(&Value::Object(object));
                let text = trace::render(&data);
                self.console.err(&text);
                Ok(Value::Null)
            }
            ("addSuppressed", 1) => Ok(Value::Null),
            _ => self.raise("NoSuchMethodError", format!("{}.{}", object.class, name)),
        }
    }

    /// Methods of built-in objects: builders, scanners, files, streams.
    fn native_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        let handler = match &*object.native.borrow() {
            Native::None | Native::Throwable(_) => Handler::Object,
            Native::Builder(_) => Handler::Builder,
            Native::Scanner(_) => Handler::Scanner,
            Native::File(_) | Native::Path(_) => Handler::Path,
            Native::Stream(_) => Handler::Stream,
        };
        match handler {
            Handler::Object => self.object_method(object, name, args),
            Handler::Builder => self.builder_method(object, name, args),
            Handler::Scanner => self.scanner_method(object, name, args),
            Handler::Path => self.path_method(object, name, args),
            Handler::Stream => self.stream_method(object, name, args),
        }
    }

    fn builder_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        if matches!(name, "getClass" | "equals" | "hashCode") {
            return self.object_method(object, name, args);
        }
        let texts = if matches!(name, "append" | "insert") {
            self.texts(&args)?
        } else {
            Vec::new()
        };
        let result = match &mut *object.native.borrow_mut() {
            Native::Builder(buffer) => string::builder_method(buffer, name, &args, &texts),
            _ => Err(builtins::NativeError::no_such_method("StringBuilder", name)),
        };
        match self.native(result)? {
            Some(value) => Ok(value),
            None => Ok(Value::Object(object)),
        }
    }

    fn scanner_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        if matches!(name, "getClass" | "equals" | "hashCode" | "toString") {
            return self.object_method(object, name, args);
        }
        let pattern = match (name, args.first()) {
            ("useDelimiter", Some(_)) => {
                let pattern = builtins::str_arg(&args, 0);
                Some(self.native(pattern)?)
            }
            _ => None,
        };
        let result = {
            let mut native = object.native.borrow_mut();
            let Native::Scanner(scanner) = &mut *native else {
                return self.raise("NoSuchMethodError", format!("Scanner.{}", name));
            };
            match (name, args.len()) {
                ("hasNext", 0) => scanner.has_next().map(Value::Bool),
                ("hasNextLine", 0) => scanner.has_next_line().map(Value::Bool),
                ("hasNextInt" | "hasNextLong", 0) => scanner.has_next_int().map(Value::Bool),
                ("hasNextDouble", 0) => scanner.has_next_double().map(Value::Bool),
                ("hasNextBoolean", 0) => scanner.has_next_boolean().map(Value::Bool),
                ("next", 0) => scanner.next().map(Value::str),
                ("nextLine", 0) => scanner.next_line().map(Value::str),
                ("nextInt" | "nextShort" | "nextByte", 0) => scanner.next_int().map(Value::Int),
                ("nextLong", 0) => scanner.next_long().map(Value::Int),
                ("nextDouble" | "nextFloat", 0) => scanner.next_double().map(Value::Double),
                ("nextBoolean", 0) => scanner.next_boolean().map(Value::Bool),
                ("close", 0) => {
                    scanner.close();
                    Ok(Value::Null)
                }
                ("useDelimiter", 1) => {
                    let pattern = pattern.as_deref().unwrap_or_default();
                    match scanner.use_delimiter(pattern) {
                        Ok(()) => Ok(Value::Object(object.clone())),
                        Err(e) => return self.raise("IllegalArgumentException", e.to_string()),
                    }
                }
                _ => return self.raise("NoSuchMethodError", format!("Scanner.{}", name)),
            }
        };
        let result = result.map_err(builtins::NativeError::from);
        self.native(result)
    }

    fn path_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        if matches!(name, "getClass" | "hashCode") {
            return self.object_method(object, name, args);
        }
        let (path, is_file) = match &*object.native.borrow() {
            Native::File(path) => (path.clone(), true),
            Native::Path(path) => (path.clone(), false),
            _ => return Ok(Value::Null),
        };
        if name == "equals" && args.len() == 1 {
            let same = file::path_of(&args[0]).map_or(false, |other| other == path);
            return Ok(Value::Bool(same));
        }
        let result = if is_file {
            file::file_method(&self.heap, &path, name, &args)
        } else {
            file::path_method(&self.heap, &path, name, &args)
        };
        self.native(result)
    }

    fn stream_method(&mut self, object: Rc<Object>, name: &str, args: Vec<Value>) -> EvalResult {
        let stream = match &*object.native.borrow() {
            Native::Stream(stream) => *stream,
            _ => Stream::Out,
        };
        if stream == Stream::In {
            return match name {
                "close" => Ok(Value::Null),
                _ => self.object_method(object, name, args),
            };
        }
        let text = match (name, args.len()) {
            ("println", 0) => "\n".to_string(),
            ("println", 1) => {
                let mut text = self.print_text(&args[0])?;
                text.push('\n');
                text
            }
            ("print", 1) => self.print_text(&args[0])?,
            ("printf" | "format", n) if n >= 1 => {
                let text = self.format_call(&args)?;
                self.write_stream(stream, &text);
                return Ok(Value::Object(object));
            }
            ("write", 1) => match args[0].as_int() {
                Some(code) => ops::char_from_code(code).to_string(),
                None => return self.raise("IllegalArgumentException", "argument type mismatch"),
            },
            ("flush", 0) => {
                self.console.flush();
                return Ok(Value::Null);
            }
            ("close", 0) => return Ok(Value::Null),
            ("checkError", 0) => return Ok(Value::Bool(false)),
            _ => return self.object_method(object, name, args),
        };
        self.write_stream(stream, &text);
        Ok(Value::Null)
    }

    fn write_stream(&mut self, stream: Stream, text: &str) {
        match stream {
            Stream::Err => self.console.err(text),
            _ => self.console.out(text),
        }
    }

    /// `print` text: `char[]` prints its characters.
    fn print_text(&mut self, value: &Value) -> Result<String, Unwind> {
        if let Value::Array(array) = value {
            if &*array.component == "char" && array.dims == 1 {
                return Ok(array
                    .items
                    .borrow()
                    .iter()
                    .filter_map(|v| match v {
                        Value::Char(c) => Some(*c),
                        _ => None,
                    })
                    .collect());
            }
        }
        self.stringify(value)
    }

    fn array_method(&mut self, array: Rc<Array>, name: &str, args: Vec<Value>) -> EvalResult {
        match (name, args.len()) {
            ("clone", 0) => {
                let items = array.items.borrow().clone();
                Ok(self.heap.array(&array.component, array.dims, items))
            }
            ("getClass", 0) => Ok(Value::Class(Rc::from(array.descriptor()))),
            ("equals", 1) => Ok(Value::Bool(Value::Array(array).same_ref(&args[0]))),
            ("hashCode", 0) => Ok(Value::Int(ops::identity_hash(array.id) as i64)),
            ("toString", 0) => Ok(Value::str(format!(
                "{}@{:x}",
                array.descriptor(),
                ops::identity_hash(array.id)
            ))),
            _ => self.raise("NoSuchMethodError", format!("{}.{}", array.descriptor(), name)),
        }
    }

    fn class_method(&mut self, class: &Rc<str>, name: &str, args: &[Value]) -> EvalResult {
        match (name, args.len()) {
            ("getName" | "getTypeName", 0) => Ok(Value::str(self.registry.qualified_name(class))),
            ("getSimpleName", 0) => Ok(Value::str(class.as_ref())),
            ("toString", 0) => Ok(Value::str(self.class_text(class))),
            ("equals", 1) => Ok(Value::Bool(Value::Class(class.clone()).same_ref(&args[0]))),
            ("hashCode", 0) => Ok(Value::Int(ops::string_hash(class) as i64)),
            ("isInstance", 1) => Ok(Value::Bool(self.instance_of(&args[0], class, 0))),
            ("isInterface", 0) => Ok(Value::Bool(self.registry.is_interface(class))),
            ("getSuperclass", 0) => Ok(match self.registry.superclass_of(class) {
                Some(parent) => Value::Class(Rc::from(parent.as_str())),
                None => Value::Null,
            }),
            _ => self.raise("NoSuchMethodError", format!("Class.{}", name)),
        }
    }

    // ========================================================================
    // Fields
    // ========================================================================

    /// `target.name`.
    pub(super) fn get_field(&mut self, target: Value, name: &str) -> EvalResult {
        match target {
            Value::Array(array) if name == "length" => Ok(Value::Int(array.len() as i64)),
            Value::Null => {
                let message = format!("Cannot read field \"{}\" because value is null", name);
                self.raise("NullPointerException", message)
            }
            Value::Object(object) => {
                self.check_field_access(&object.class, name)?;
                match object.get_field(name) {
                    Some(value) => Ok(value),
                    None => self.raise("NoSuchFieldError", name.to_string()),
                }
            }
            _ => self.raise("NoSuchFieldError", name.to_string()),
        }
    }

    /// `target.name = value`.
    pub(super) fn set_field(&mut self, target: Value, name: &str, value: Value) -> Result<(), Unwind> {
        match target {
            Value::Null => {
                let message = format!("Cannot assign field \"{}\" because value is null", name);
                self.raise("NullPointerException", message)
            }
            Value::Object(object) => {
                self.check_field_access(&object.class, name)?;
                if object.set_field(name, value) {
                    Ok(())
                } else {
                    self.raise("NoSuchFieldError", name.to_string())
                }
            }
            _ => self.raise("NoSuchFieldError", name.to_string()),
        }
    }

    fn check_field_access(&mut self, class: &str, name: &str) -> Result<(), Unwind> {
        let declared = self.registry.chain(class).iter().find_map(|c| {
            c.def
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| (c.def.name.clone(), f.visibility))
        });
        match declared {
            Some((declaring, visibility)) => self.check_access(visibility, &declaring, "field", name),
            None => Ok(()),
        }
    }

    /// `Class.name`, initializing the class first.
    pub(super) fn get_static(&mut self, class: &str, name: &str) -> EvalResult {
        if self.registry.get(class).is_some() {
            self.ensure_init(class)?;
            for owner in self.registry.chain(class) {
                let value = owner.statics.borrow().get(name).cloned();
                if let Some(value) = value {
                    return Ok(value);
                }
            }
            return self.raise("NoSuchFieldError", format!("{}.{}", class, name));
        }
        match (class, name) {
            ("System", "out") => Ok(self.stream(Stream::Out)),
            ("System", "err") => Ok(self.stream(Stream::Err)),
            ("System", "in") => Ok(self.stream(Stream::In)),
            _ => match builtins::static_field(class, name) {
                Some(value) => Ok(value),
                None => self.raise("NoSuchFieldError", format!("{}.{}", class, name)),
            },
        }
    }

    /// `Class.name = value`.
    pub(super) fn put_static(&mut self, class: &str, name: &str, value: Value) -> Result<(), Unwind> {
        if self.registry.get(class).is_some() {
            self.ensure_init(class)?;
            for owner in self.registry.chain(class) {
                let mut statics = owner.statics.borrow_mut();
                if let Some(slot) = statics.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
            }
        }
        self.raise("NoSuchFieldError", format!("{}.{}", class, name))
    }
}
