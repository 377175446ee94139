//! Interpreter state: frames, calls, class initialization, construction.

use super::execution::{Completion, EvalResult, Unwind};
use crate::compiler::ir::{CastKind, Function, OriginId, OriginMarker, Program};
use crate::parser::{ClassKind, Visibility};
use crate::vm::access::AccessContext;
use crate::vm::builtins::scanner::SharedInput;
use crate::vm::builtins::{self, NativeError, NativeResult};
use crate::vm::class_registry::{ClassRegistry, InitState};
use crate::vm::console::Console;
use crate::vm::dispatch;
use crate::vm::exceptions::is_builtin_throwable;
use crate::vm::heap::Heap;
use crate::vm::object::{FrameInfo, Native, Object, Stream, Throwable};
use crate::vm::ops::{self, OpError};
use crate::vm::trace::TraceData;
use crate::vm::value::Value;
use crate::vm::{VmError, VmOptions};
use std::io::{BufReader, Cursor};
use std::rc::Rc;

/// Frames kept in a captured stack trace.
const MAX_TRACE_FRAMES: usize = 1024;

/// One activation record.
#[derive(Debug)]
pub(super) struct Frame {
    /// Class declaring the running function
    pub class: Rc<str>,
    /// Method name (`<init>`, `<clinit>` for initializers)
    pub method: Rc<str>,
    /// Local slots, parameters first
    pub locals: Vec<Value>,
    /// Receiver of an instance function
    pub this: Option<Rc<Object>>,
    /// Origin of the statement being executed
    pub origin: OriginId,
}

/// The interpreter.
pub struct Interpreter {
    pub(super) registry: ClassRegistry,
    pub(super) origins: Vec<OriginMarker>,
    pub(super) entry: String,
    pub(super) heap: Heap,
    pub(super) frames: Vec<Frame>,
    pub(super) console: Console,
    pub(super) stdin: SharedInput,
    streams: [Option<Rc<Object>>; 3],
    max_depth: usize,
}

impl Interpreter {
    /// Create an interpreter for a program.
    pub fn new(program: &Program, options: &VmOptions) -> Self {
        let stdin = match &options.stdin {
            Some(text) => SharedInput::new(Box::new(Cursor::new(text.clone().into_bytes()))),
            None => SharedInput::new(Box::new(BufReader::new(std::io::stdin()))),
        };
        Self {
            registry: ClassRegistry::from_classes(program.classes.clone()),
            origins: program.origins.clone(),
            entry: program.entry_class.clone(),
            heap: Heap::new(),
            frames: Vec::new(),
            console: Console::new(options.capture_output),
            stdin,
            streams: [None, None, None],
            max_depth: options.max_call_depth,
        }
    }

    /// Entry class name.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Number of loaded classes.
    pub fn class_count(&self) -> usize {
        self.registry.len()
    }

    /// Program output.
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Initialize the entry class and run `main(args)`.
    pub fn run_main(&mut self, args: &[String]) -> Result<(), Unwind> {
        let entry = self.entry.clone();
        let class = self
            .registry
            .get(&entry)
            .cloned()
            .ok_or_else(|| VmError::UnknownClass(entry.clone()))?;
        let main = class
            .def
            .group("main")
            .and_then(|g| g.overloads.iter().find(|f| f.is_static && f.params.len() == 1))
            .ok_or_else(|| VmError::MissingEntry(entry.clone()))?;
        self.ensure_init(&entry)?;
        let argv = self.heap.string_array(args.iter().cloned());
        self.call_function(main, None, vec![argv])?;
        Ok(())
    }

    // ========================================================================
    // Frames
    // ========================================================================

    fn frame(&self) -> Result<&Frame, Unwind> {
        self.frames
            .last()
            .ok_or_else(|| Unwind::Fatal(VmError::Internal("no active frame".to_string())))
    }

    /// Class whose code is running.
    pub(super) fn current_class(&self) -> Rc<str> {
        match self.frames.last() {
            Some(frame) => frame.class.clone(),
            None => Rc::from(self.entry.as_str()),
        }
    }

    /// Record the origin of the code about to run.
    pub(super) fn mark(&mut self, origin: OriginId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.origin = origin;
        }
    }

    pub(super) fn load_local(&self, slot: u32) -> EvalResult {
        let frame = self.frame()?;
        frame.locals.get(slot as usize).cloned().ok_or_else(|| {
            Unwind::Fatal(VmError::InvalidSlot {
                slot,
                method: frame.method.to_string(),
            })
        })
    }

    pub(super) fn store_local(&mut self, slot: u32, value: Value) -> Result<(), Unwind> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| Unwind::Fatal(VmError::Internal("no active frame".to_string())))?;
        match frame.locals.get_mut(slot as usize) {
            Some(local) => {
                *local = value;
                Ok(())
            }
            None => Err(Unwind::Fatal(VmError::InvalidSlot {
                slot,
                method: frame.method.to_string(),
            })),
        }
    }

    /// Receiver of the running function.
    pub(super) fn this_object(&self) -> Result<Rc<Object>, Unwind> {
        self.frame()?
            .this
            .clone()
            .ok_or_else(|| Unwind::Fatal(VmError::Internal("`this` in a static context".to_string())))
    }

    /// Current stack, innermost first, mapped to source positions.
    pub(super) fn capture_stack(&self) -> Vec<FrameInfo> {
        self.frames
            .iter()
            .rev()
            .take(MAX_TRACE_FRAMES)
            .map(|frame| FrameInfo {
                class: self.registry.qualified_name(&frame.class),
                method: frame.method.to_string(),
                location: self
                    .origins
                    .get(frame.origin as usize)
                    .map(|o| (o.file.clone(), o.line)),
            })
            .collect()
    }

    // ========================================================================
    // Raising exceptions
    // ========================================================================

    /// Allocate a built-in throwable with the current stack.
    pub(super) fn new_throwable(&mut self, kind: &str, message: Option<String>, cause: Option<Value>) -> Value {
        let throwable = Throwable {
            message,
            cause,
            stack: self.capture_stack(),
        };
        Value::Object(self.heap.object(kind, Native::Throwable(throwable)))
    }

    /// Throw a built-in exception with a message.
    pub(super) fn raise<T>(&mut self, kind: &str, message: impl Into<String>) -> Result<T, Unwind> {
        let exception = self.new_throwable(kind, Some(message.into()), None);
        Err(Unwind::Throw(exception))
    }

    /// Throw a built-in exception without a message.
    pub(super) fn raise_bare<T>(&mut self, kind: &str) -> Result<T, Unwind> {
        let exception = self.new_throwable(kind, None, None);
        Err(Unwind::Throw(exception))
    }

    /// Convert a built-in failure into a thrown exception.
    pub(super) fn native<T>(&mut self, result: NativeResult<T>) -> Result<T, Unwind> {
        result.or_else(|e: NativeError| {
            let exception = self.new_throwable(e.kind, e.message, None);
            Err(Unwind::Throw(exception))
        })
    }

    /// Convert an operator failure into a thrown exception.
    pub(super) fn operator<T>(&mut self, result: Result<T, OpError>) -> Result<T, Unwind> {
        result.or_else(|e| {
            let (kind, message) = e.exception();
            self.raise(kind, message)
        })
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Invoke a user function with bound arguments.
    pub(super) fn call_function(
        &mut self,
        function: &Function,
        this: Option<Rc<Object>>,
        args: Vec<Value>,
    ) -> EvalResult {
        if self.frames.len() >= self.max_depth {
            return self.raise_bare("StackOverflowError");
        }
        let locals = self.bind_args(function, args);
        self.frames.push(Frame {
            class: Rc::from(function.class.as_str()),
            method: Rc::from(function.name.as_str()),
            locals,
            this,
            origin: function.origin,
        });
        let result = self.exec_block(&function.body);
        self.frames.pop();
        match result? {
            Completion::Return(value) => Ok(apply_cast(function.return_cast.as_ref(), value)),
            _ => Ok(Value::Null),
        }
    }

    fn bind_args(&self, function: &Function, mut args: Vec<Value>) -> Vec<Value> {
        if dispatch::needs_packing(function, &args) {
            let rest = args.split_off(function.params.len() - 1);
            let component = varargs_component(&rest);
            args.push(self.heap.array(component, 1, rest));
        }
        let mut locals = vec![Value::Null; (function.locals as usize).max(function.params.len())];
        for (slot, (param, value)) in function.params.iter().zip(args).enumerate() {
            locals[slot] = apply_cast(param.cast.as_ref(), value);
        }
        locals
    }

    /// Check access to a member of a user class from the running code.
    pub(super) fn check_access(
        &mut self,
        visibility: Visibility,
        declaring: &str,
        kind: &str,
        member: &str,
    ) -> Result<(), Unwind> {
        if visibility == Visibility::Public {
            return Ok(());
        }
        let caller = self.current_class();
        let context = AccessContext {
            visibility,
            declaring,
            caller: &caller,
        };
        if context.permits(&self.registry) {
            return Ok(());
        }
        let message = context.denial(kind, member);
        self.raise("IllegalAccessException", message)
    }

    // ========================================================================
    // Class initialization
    // ========================================================================

    /// Run the static initialization of a class once, superclass first.
    pub(super) fn ensure_init(&mut self, name: &str) -> Result<(), Unwind> {
        let Some(class) = self.registry.get(name).cloned() else {
            return Ok(());
        };
        match class.init.get() {
            InitState::Done | InitState::Running => return Ok(()),
            InitState::Failed => {
                let message = format!("Could not initialize class {}", self.registry.qualified_name(name));
                return self.raise("NoClassDefFoundError", message);
            }
            InitState::Pending => {}
        }
        class.init.set(InitState::Running);
        if let Some(parent) = class.def.superclass.clone() {
            if let Err(unwind) = self.ensure_init(&parent) {
                class.init.set(InitState::Failed);
                return Err(unwind);
            }
        }
        log::trace!("initializing class {}", name);
        match self.call_function(&class.def.static_init, None, Vec::new()) {
            Ok(_) => {
                class.init.set(InitState::Done);
                Ok(())
            }
            Err(Unwind::Throw(exception)) => {
                class.init.set(InitState::Failed);
                if self.registry.is_subclass(exception.class_name(), "Error") {
                    return Err(Unwind::Throw(exception));
                }
                let wrapped = self.new_throwable("ExceptionInInitializerError", None, Some(exception));
                Err(Unwind::Throw(wrapped))
            }
            Err(other) => {
                class.init.set(InitState::Failed);
                Err(other)
            }
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// `new Class(args)`.
    pub(super) fn instantiate(&mut self, name: &str, args: Vec<Value>) -> EvalResult {
        let Some(class) = self.registry.get(name).cloned() else {
            return self.instantiate_builtin(name, args);
        };
        if class.def.is_abstract || class.def.kind == ClassKind::Interface {
            let qualified = self.registry.qualified_name(name);
            return self.raise("InstantiationException", qualified);
        }
        self.ensure_init(name)?;

        let chain = self.registry.chain(name);
        let native = if self.registry.is_throwable(name) {
            Native::Throwable(Throwable {
                stack: self.capture_stack(),
                ..Throwable::default()
            })
        } else {
            Native::None
        };
        let object = self.heap.object(name, native);
        {
            let mut fields = object.fields.borrow_mut();
            for ancestor in chain.iter().rev() {
                for field in &ancestor.def.fields {
                    fields.insert(field.name.clone(), Value::from(&field.default));
                }
            }
        }
        for ancestor in chain.iter().rev() {
            self.call_function(&ancestor.def.field_init, Some(object.clone()), Vec::new())?;
        }

        let Some((_, constructor)) = dispatch::select(&self.registry, &class.def.constructors, &args) else {
            return self.raise("NoSuchMethodError", format!("{}.<init>", name));
        };
        self.check_access(constructor.visibility, name, "constructor", "<init>")?;
        self.call_function(constructor, Some(object.clone()), args)?;
        Ok(Value::Object(object))
    }

    fn instantiate_builtin(&mut self, name: &str, args: Vec<Value>) -> EvalResult {
        if is_builtin_throwable(name) {
            let exception = self.new_throwable(name, None, None);
            if let Value::Object(object) = &exception {
                self.init_throwable(object, &args)?;
            }
            return Ok(exception);
        }
        let result = builtins::construct(&self.heap, &self.stdin, name, &args);
        self.native(result)
    }

    /// Apply a `Throwable` constructor: `()`, `(message)`, `(cause)`,
    /// `(message, cause)`.
    pub(super) fn init_throwable(&mut self, object: &Rc<Object>, args: &[Value]) -> Result<(), Unwind> {
        let (message, cause) = match args {
            [] => (None, None),
            [Value::Str(message)] => (Some(message.to_string()), None),
            [Value::Null] => (None, None),
            [cause @ Value::Object(_)] => (Some(self.throwable_text(cause)), Some(cause.clone())),
            [Value::Str(message), cause] => (Some(message.to_string()), Some(cause.clone())),
            [Value::Null, cause] => (None, Some(cause.clone())),
            _ => return self.raise("NoSuchMethodError", format!("{}.<init>", object.class)),
        };
        if let Native::Throwable(state) = &mut *object.native.borrow_mut() {
            state.message = message;
            state.cause = cause.filter(|c| !c.is_null());
        }
        Ok(())
    }

    // ========================================================================
    // Strings and traces
    // ========================================================================

    /// String conversion as done by `+` and `print`: `toString()` for
    /// objects.
    pub(super) fn stringify(&mut self, value: &Value) -> Result<String, Unwind> {
        if let Some(text) = ops::primitive_string(value) {
            return Ok(text);
        }
        match value {
            Value::Array(array) => Ok(format!("{}@{:x}", array.descriptor(), ops::identity_hash(array.id))),
            Value::Class(name) => Ok(self.class_text(name)),
            _ => match self.invoke_virtual(value.clone(), "toString", Vec::new())? {
                Value::Null => Ok("null".to_string()),
                other => Ok(ops::primitive_string(&other).unwrap_or_default()),
            },
        }
    }

    /// `toString()` of every value.
    pub(super) fn texts(&mut self, values: &[Value]) -> Result<Vec<String>, Unwind> {
        values.iter().map(|v| self.stringify(v)).collect()
    }

    /// `Class.toString()`.
    pub(super) fn class_text(&self, name: &str) -> String {
        let kind = if self.registry.is_interface(name) { "interface" } else { "class" };
        format!("{} {}", kind, self.registry.qualified_name(name))
    }

    /// `toString()` of a throwable; never fails.
    pub(super) fn throwable_text(&mut self, exception: &Value) -> String {
        match self.invoke_virtual(exception.clone(), "toString", Vec::new()) {
            Ok(Value::Str(text)) => text.to_string(),
            _ => match exception {
                Value::Object(object) => {
                    let qualified = self.registry.qualified_name(&object.class);
                    match object.throwable_message().flatten() {
                        Some(message) => format!("{}: {}", qualified, message),
                        None => qualified,
                    }
                }
                other => format!("{:?}", other),
            },
        }
    }

    /// Rendering input for a throwable and its cause chain.
    pub fn trace_data(&mut self, exception: &Value) -> TraceData {
        let mut seen = Vec::new();
        self.trace_chain(exception, &mut seen)
    }

    fn trace_chain(&mut self, exception: &Value, seen: &mut Vec<u32>) -> TraceData {
        let header = self.throwable_text(exception);
        let (frames, cause) = match exception {
            Value::Object(object) => {
                seen.push(object.id);
                match &*object.native.borrow() {
                    Native::Throwable(state) => (state.stack.clone(), state.cause.clone()),
                    _ => (Vec::new(), None),
                }
            }
            _ => (Vec::new(), None),
        };
        let cause = cause
            .filter(|c| !matches!(c, Value::Object(o) if seen.contains(&o.id)))
            .map(|c| Box::new(self.trace_chain(&c, seen)));
        TraceData { header, frames, cause }
    }

    /// Shared `System.out` / `System.err` / `System.in` object.
    pub(super) fn stream(&mut self, which: Stream) -> Value {
        let index = match which {
            Stream::Out => 0,
            Stream::Err => 1,
            Stream::In => 2,
        };
        if let Some(object) = &self.streams[index] {
            return Value::Object(object.clone());
        }
        let class = if which == Stream::In { "InputStream" } else { "PrintStream" };
        let object = self.heap.object(class, Native::Stream(which));
        self.streams[index] = Some(object.clone());
        Value::Object(object)
    }
}

/// Primitive conversion on store; references pass through.
pub(super) fn apply_cast(cast: Option<&CastKind>, value: Value) -> Value {
    match cast {
        Some(kind) if !value.is_null() => ops::convert(kind, &value).unwrap_or(value),
        _ => value,
    }
}

/// Component type of a packed varargs array, from its elements.
fn varargs_component(values: &[Value]) -> &'static str {
    let all = |f: fn(&Value) -> bool| !values.is_empty() && values.iter().all(f);
    if all(|v| matches!(v, Value::Int(_))) {
        "int"
    } else if all(|v| matches!(v, Value::Int(_) | Value::Double(_))) {
        "double"
    } else if all(|v| matches!(v, Value::Char(_))) {
        "char"
    } else if all(|v| matches!(v, Value::Bool(_))) {
        "boolean"
    } else if all(|v| matches!(v, Value::Str(_) | Value::Null)) {
        "String"
    } else {
        "Object"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varargs_component() {
        assert_eq!(varargs_component(&[Value::Int(1), Value::Int(2)]), "int");
        assert_eq!(varargs_component(&[Value::Int(1), Value::Double(2.0)]), "double");
        assert_eq!(varargs_component(&[Value::str("a"), Value::Null]), "String");
        assert_eq!(varargs_component(&[Value::str("a"), Value::Int(1)]), "Object");
        assert_eq!(varargs_component(&[]), "Object");
    }

    #[test]
    fn test_apply_cast() {
        assert!(matches!(apply_cast(Some(&CastKind::Int), Value::Int(1 << 32)), Value::Int(0)));
        assert!(matches!(apply_cast(Some(&CastKind::Double), Value::Int(2)), Value::Double(d) if d == 2.0));
        assert!(matches!(apply_cast(Some(&CastKind::Int), Value::Null), Value::Null));
        assert!(matches!(apply_cast(None, Value::Char('a')), Value::Char('a')));
    }
}
