//! Built-in Library
//!
//! The Java standard-library surface available to programs: static helpers
//! (`Math`, `Integer`, `Arrays`, `Files`, ...), constants, constructors of
//! the built-in classes, and methods on boxed primitives. Calls that need
//! the interpreter (printing, `toString()` on user objects, `System.exit`)
//! are handled there; everything here is a function of its arguments.

pub mod catalog;
pub mod file;
pub mod format;
pub mod scanner;
pub mod string;

use crate::vm::heap::{element_default, Heap};
use crate::vm::object::{Native, Stream};
use crate::vm::ops::{self, identity_hash, primitive_equals};
use crate::vm::value::Value;
use rand::Rng;
use scanner::{ScanError, ScannerState, SharedInput};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ============================================================================
// Errors
// ============================================================================

/// A Java exception raised by a built-in: kind and optional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Built-in exception class
    pub kind: &'static str,
    /// Exception message
    pub message: Option<String>,
}

impl NativeError {
    /// Exception with a message.
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Exception without a message.
    pub fn bare(kind: &'static str) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// No built-in method of that name and arity.
    pub fn no_such_method(class: &str, name: &str) -> Self {
        Self::new("NoSuchMethodError", format!("{}.{}", class, name))
    }

    /// An argument of the wrong kind.
    pub fn argument_mismatch() -> Self {
        Self::new("IllegalArgumentException", "argument type mismatch")
    }
}

impl From<format::FormatError> for NativeError {
    fn from(e: format::FormatError) -> Self {
        Self {
            kind: e.kind,
            message: Some(e.message),
        }
    }
}

impl From<ScanError> for NativeError {
    fn from(e: ScanError) -> Self {
        let (kind, message) = e.exception();
        Self { kind, message }
    }
}

impl From<ops::OpError> for NativeError {
    fn from(e: ops::OpError) -> Self {
        let (kind, message) = e.exception();
        Self::new(kind, message)
    }
}

/// Result of a built-in call.
pub type NativeResult<T> = Result<T, NativeError>;

// ============================================================================
// Argument access
// ============================================================================

fn arg(args: &[Value], i: usize) -> NativeResult<&Value> {
    match args.get(i) {
        Some(Value::Null) => Err(NativeError::bare("NullPointerException")),
        Some(v) => Ok(v),
        None => Err(NativeError::argument_mismatch()),
    }
}

/// Integral argument (chars widen to their code).
pub fn int_arg(args: &[Value], i: usize) -> NativeResult<i64> {
    arg(args, i)?.as_int().ok_or_else(NativeError::argument_mismatch)
}

/// Floating argument (integers widen).
pub fn double_arg(args: &[Value], i: usize) -> NativeResult<f64> {
    arg(args, i)?.as_double().ok_or_else(NativeError::argument_mismatch)
}

/// String argument; `null` raises `NullPointerException`.
pub fn str_arg(args: &[Value], i: usize) -> NativeResult<Rc<str>> {
    match arg(args, i)? {
        Value::Str(s) => Ok(s.clone()),
        _ => Err(NativeError::argument_mismatch()),
    }
}

/// Char argument (an int is taken as a code point).
pub fn char_arg(args: &[Value], i: usize) -> NativeResult<char> {
    match arg(args, i)? {
        Value::Char(c) => Ok(*c),
        Value::Int(code) => Ok(ops::char_from_code(*code)),
        _ => Err(NativeError::argument_mismatch()),
    }
}

fn bool_arg(args: &[Value], i: usize) -> NativeResult<bool> {
    match arg(args, i)? {
        Value::Bool(b) => Ok(*b),
        _ => Err(NativeError::argument_mismatch()),
    }
}

fn array_arg(args: &[Value], i: usize) -> NativeResult<Rc<crate::vm::object::Array>> {
    match arg(args, i)? {
        Value::Array(a) => Ok(a.clone()),
        _ => Err(NativeError::argument_mismatch()),
    }
}

/// Store conversion for an element of a one-dimensional primitive array.
pub fn coerce_element(component: &str, dims: u32, value: Value) -> Value {
    if dims != 1 {
        return value;
    }
    let kind = match component {
        "int" => crate::compiler::ir::CastKind::Int,
        "long" => crate::compiler::ir::CastKind::Long,
        "short" => crate::compiler::ir::CastKind::Short,
        "byte" => crate::compiler::ir::CastKind::Byte,
        "char" => crate::compiler::ir::CastKind::Char,
        "double" | "float" => crate::compiler::ir::CastKind::Double,
        _ => return value,
    };
    if value.is_numeric() {
        ops::convert(&kind, &value).unwrap_or(value)
    } else {
        value
    }
}

// ============================================================================
// Static fields
// ============================================================================

/// Constant static field of a built-in class.
pub fn static_field(class: &str, name: &str) -> Option<Value> {
    let value = match (class, name) {
        ("Math", "PI") => Value::Double(std::f64::consts::PI),
        ("Math", "E") => Value::Double(std::f64::consts::E),
        ("Integer", "MAX_VALUE") => Value::Int(i32::MAX as i64),
        ("Integer", "MIN_VALUE") => Value::Int(i32::MIN as i64),
        ("Long", "MAX_VALUE") => Value::Int(i64::MAX),
        ("Long", "MIN_VALUE") => Value::Int(i64::MIN),
        ("Short", "MAX_VALUE") => Value::Int(i16::MAX as i64),
        ("Short", "MIN_VALUE") => Value::Int(i16::MIN as i64),
        ("Byte", "MAX_VALUE") => Value::Int(i8::MAX as i64),
        ("Byte", "MIN_VALUE") => Value::Int(i8::MIN as i64),
        ("Character", "MAX_VALUE") => Value::Char('\u{FFFF}'),
        ("Character", "MIN_VALUE") => Value::Char('\0'),
        ("Double", "MAX_VALUE") => Value::Double(f64::MAX),
        ("Double", "MIN_VALUE") => Value::Double(f64::from_bits(1)),
        ("Double", "POSITIVE_INFINITY") => Value::Double(f64::INFINITY),
        ("Double", "NEGATIVE_INFINITY") => Value::Double(f64::NEG_INFINITY),
        ("Double", "NaN") => Value::Double(f64::NAN),
        ("Float", "MAX_VALUE") => Value::Double(f32::MAX as f64),
        ("Boolean", "TRUE") => Value::Bool(true),
        ("Boolean", "FALSE") => Value::Bool(false),
        ("File", "separator") => Value::str(std::path::MAIN_SEPARATOR.to_string()),
        _ => return None,
    };
    Some(value)
}

// ============================================================================
// Static methods
// ============================================================================

/// Static method of a built-in class.
pub fn static_call(heap: &Heap, class: &str, name: &str, args: &[Value]) -> NativeResult<Value> {
    match class {
        "Math" => math(name, args),
        "Integer" | "Long" | "Short" | "Byte" => integer(class, name, args),
        "Double" | "Float" => double(class, name, args),
        "Boolean" => boolean(name, args),
        "Character" => character(name, args),
        "String" => string_static(name, args),
        "Arrays" => arrays(heap, name, args),
        "Files" => file::files_static(heap, name, args),
        "Paths" | "Path" if matches!(name, "get" | "of") => {
            Ok(file::new_path(heap, file::join_path(args)?))
        }
        "System" => system(name, args),
        "Thread" => thread(name, args),
        "Objects" => objects(name, args),
        _ => Err(NativeError::no_such_method(class, name)),
    }
}

fn math(name: &str, args: &[Value]) -> NativeResult<Value> {
    let unary = |f: fn(f64) -> f64| -> NativeResult<Value> { Ok(Value::Double(f(double_arg(args, 0)?))) };
    let both_int = args.len() == 2
        && matches!(args[0], Value::Int(_) | Value::Char(_))
        && matches!(args[1], Value::Int(_) | Value::Char(_));
    match (name, args.len()) {
        ("abs", 1) => match arg(args, 0)? {
            Value::Double(d) => Ok(Value::Double(d.abs())),
            _ => Ok(Value::Int(int_arg(args, 0)?.wrapping_abs())),
        },
        ("max", 2) if both_int => Ok(Value::Int(int_arg(args, 0)?.max(int_arg(args, 1)?))),
        ("min", 2) if both_int => Ok(Value::Int(int_arg(args, 0)?.min(int_arg(args, 1)?))),
        ("max", 2) => {
            let (a, b) = (double_arg(args, 0)?, double_arg(args, 1)?);
            Ok(Value::Double(if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }))
        }
        ("min", 2) => {
            let (a, b) = (double_arg(args, 0)?, double_arg(args, 1)?);
            Ok(Value::Double(if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }))
        }
        ("pow", 2) => Ok(Value::Double(double_arg(args, 0)?.powf(double_arg(args, 1)?))),
        ("hypot", 2) => Ok(Value::Double(double_arg(args, 0)?.hypot(double_arg(args, 1)?))),
        ("atan2", 2) => Ok(Value::Double(double_arg(args, 0)?.atan2(double_arg(args, 1)?))),
        ("sqrt", 1) => unary(f64::sqrt),
        ("cbrt", 1) => unary(f64::cbrt),
        ("floor", 1) => unary(f64::floor),
        ("ceil", 1) => unary(f64::ceil),
        ("rint", 1) => unary(|x| {
            let r = x.round();
            if (x - x.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
                r - x.signum()
            } else {
                r
            }
        }),
        ("exp", 1) => unary(f64::exp),
        ("log", 1) => unary(f64::ln),
        ("log10", 1) => unary(f64::log10),
        ("sin", 1) => unary(f64::sin),
        ("cos", 1) => unary(f64::cos),
        ("tan", 1) => unary(f64::tan),
        ("asin", 1) => unary(f64::asin),
        ("acos", 1) => unary(f64::acos),
        ("atan", 1) => unary(f64::atan),
        ("toRadians", 1) => unary(f64::to_radians),
        ("toDegrees", 1) => unary(f64::to_degrees),
        ("signum", 1) => unary(|x| if x == 0.0 || x.is_nan() { x } else { x.signum() }),
        ("round", 1) => match arg(args, 0)? {
            Value::Double(d) if d.is_nan() => Ok(Value::Int(0)),
            Value::Double(d) => Ok(Value::Int((d + 0.5).floor() as i64)),
            _ => Ok(Value::Int(int_arg(args, 0)?)),
        },
        ("random", 0) => Ok(Value::Double(rand::thread_rng().gen::<f64>())),
        ("floorDiv" | "floorMod", 2) => {
            let (a, b) = (int_arg(args, 0)?, int_arg(args, 1)?);
            if b == 0 {
                return Err(ops::OpError::DivideByZero.into());
            }
            let div = a.div_euclid(b) - if b < 0 && a.rem_euclid(b) != 0 { 1 } else { 0 };
            if name == "floorDiv" {
                Ok(Value::Int(div))
            } else {
                Ok(Value::Int(a - div * b))
            }
        }
        _ => Err(NativeError::no_such_method("Math", name)),
    }
}

fn number_format(text: &str, radix: u32) -> NativeError {
    if radix == 10 {
        NativeError::new("NumberFormatException", format!("For input string: \"{}\"", text))
    } else {
        NativeError::new(
            "NumberFormatException",
            format!("For input string: \"{}\" under radix {}", text, radix),
        )
    }
}

/// `Integer.parseInt` and friends; `bits` bounds the accepted range.
fn parse_integral(args: &[Value], bits: u32) -> NativeResult<i64> {
    let radix = if args.len() > 1 { int_arg(args, 1)? as u32 } else { 10 };
    let text = match args.first() {
        Some(Value::Str(s)) => s.clone(),
        Some(Value::Null) | None => {
            return Err(NativeError::new("NumberFormatException", "Cannot parse null string: null"))
        }
        Some(_) => return Err(NativeError::argument_mismatch()),
    };
    if !(2..=36).contains(&radix) {
        return Err(number_format(&text, radix));
    }
    let parsed = i64::from_str_radix(&text, radix).map_err(|_| number_format(&text, radix))?;
    let (min, max) = if bits == 64 {
        (i64::MIN, i64::MAX)
    } else {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    };
    if parsed < min || parsed > max {
        return Err(number_format(&text, radix));
    }
    Ok(parsed)
}

fn radix_string(v: i64, radix: u32, bits: u32) -> String {
    let unsigned = if bits == 32 { v as i32 as u32 as u64 } else { v as u64 };
    match radix {
        2 => format!("{:b}", unsigned),
        8 => format!("{:o}", unsigned),
        _ => format!("{:x}", unsigned),
    }
}

fn signed_radix(mut v: i64, radix: u32) -> String {
    if !(2..=36).contains(&radix) || radix == 10 {
        return v.to_string();
    }
    let negative = v < 0;
    let mut digits = Vec::new();
    loop {
        let d = (v % radix as i64).unsigned_abs() as u32;
        digits.push(std::char::from_digit(d, radix).unwrap_or('?'));
        v /= radix as i64;
        if v == 0 {
            break;
        }
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn integer(class: &str, name: &str, args: &[Value]) -> NativeResult<Value> {
    let bits = match class {
        "Long" => 64,
        "Short" => 16,
        "Byte" => 8,
        _ => 32,
    };
    match (name, args.len()) {
        ("parseInt" | "parseLong" | "parseShort" | "parseByte", 1 | 2) => {
            Ok(Value::Int(parse_integral(args, bits)?))
        }
        ("valueOf" | "decode", 1) if matches!(args[0], Value::Str(_) | Value::Null) => {
            Ok(Value::Int(parse_integral(args, bits)?))
        }
        ("valueOf", 1) => Ok(Value::Int(int_arg(args, 0)?)),
        ("valueOf", 2) => Ok(Value::Int(parse_integral(args, bits)?)),
        ("toString", 1) => Ok(Value::str(int_arg(args, 0)?.to_string())),
        ("toString", 2) => Ok(Value::str(signed_radix(int_arg(args, 0)?, int_arg(args, 1)? as u32))),
        ("toBinaryString", 1) => Ok(Value::str(radix_string(int_arg(args, 0)?, 2, bits))),
        ("toOctalString", 1) => Ok(Value::str(radix_string(int_arg(args, 0)?, 8, bits))),
        ("toHexString", 1) => Ok(Value::str(radix_string(int_arg(args, 0)?, 16, bits))),
        ("max", 2) => Ok(Value::Int(int_arg(args, 0)?.max(int_arg(args, 1)?))),
        ("min", 2) => Ok(Value::Int(int_arg(args, 0)?.min(int_arg(args, 1)?))),
        ("sum", 2) => Ok(Value::Int(int_arg(args, 0)?.wrapping_add(int_arg(args, 1)?))),
        ("compare", 2) => Ok(Value::Int(cmp_int(int_arg(args, 0)?.cmp(&int_arg(args, 1)?)))),
        ("signum", 1) => Ok(Value::Int(int_arg(args, 0)?.signum())),
        ("abs", 1) => Ok(Value::Int(int_arg(args, 0)?.wrapping_abs())),
        ("bitCount", 1) => {
            let v = int_arg(args, 0)?;
            let ones = if bits == 32 { (v as i32).count_ones() } else { v.count_ones() };
            Ok(Value::Int(ones as i64))
        }
        ("hashCode", 1) => Ok(Value::Int(int_arg(args, 0)?)),
        _ => Err(NativeError::no_such_method(class, name)),
    }
}

fn cmp_int(ordering: Ordering) -> i64 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// `Double.parseDouble`: surrounding whitespace is ignored, `NaN` and
/// `Infinity` are spelled out, and a trailing `d`/`f` suffix is allowed.
pub fn parse_double(text: &str) -> NativeResult<f64> {
    let trimmed = text.trim_matches(|c: char| c <= ' ');
    if trimmed.is_empty() {
        return Err(NativeError::new("NumberFormatException", "empty String"));
    }
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let negative = trimmed.starts_with('-');
    match unsigned {
        "NaN" => return Ok(f64::NAN),
        "Infinity" => return Ok(if negative { f64::NEG_INFINITY } else { f64::INFINITY }),
        _ => {}
    }
    let body = trimmed.strip_suffix(['d', 'D', 'f', 'F']).unwrap_or(trimmed);
    let valid = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !valid {
        return Err(number_format(text, 10));
    }
    body.parse::<f64>().map_err(|_| number_format(text, 10))
}

fn double(class: &str, name: &str, args: &[Value]) -> NativeResult<Value> {
    match (name, args.len()) {
        ("parseDouble" | "parseFloat" | "valueOf", 1) if matches!(args[0], Value::Str(_)) => {
            Ok(Value::Double(parse_double(&str_arg(args, 0)?)?))
        }
        ("parseDouble" | "parseFloat", 1) => Err(NativeError::bare("NullPointerException")),
        ("valueOf", 1) => Ok(Value::Double(double_arg(args, 0)?)),
        ("toString", 1) => Ok(Value::str(format::double_to_string(double_arg(args, 0)?))),
        ("isNaN", 1) => Ok(Value::Bool(double_arg(args, 0)?.is_nan())),
        ("isInfinite", 1) => Ok(Value::Bool(double_arg(args, 0)?.is_infinite())),
        ("isFinite", 1) => Ok(Value::Bool(double_arg(args, 0)?.is_finite())),
        ("compare", 2) => Ok(Value::Int(cmp_int(
            double_arg(args, 0)?.total_cmp(&double_arg(args, 1)?),
        ))),
        ("max", 2) => Ok(Value::Double(double_arg(args, 0)?.max(double_arg(args, 1)?))),
        ("min", 2) => Ok(Value::Double(double_arg(args, 0)?.min(double_arg(args, 1)?))),
        ("sum", 2) => Ok(Value::Double(double_arg(args, 0)? + double_arg(args, 1)?)),
        _ => Err(NativeError::no_such_method(class, name)),
    }
}

fn boolean(name: &str, args: &[Value]) -> NativeResult<Value> {
    let parse = |v: &Value| matches!(v, Value::Str(s) if s.eq_ignore_ascii_case("true"));
    match (name, args.len()) {
        ("parseBoolean", 1) => Ok(Value::Bool(parse(&args[0]))),
        ("valueOf", 1) => match &args[0] {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            other => Ok(Value::Bool(parse(other))),
        },
        ("toString", 1) => Ok(Value::str(bool_arg(args, 0)?.to_string())),
        ("compare", 2) => Ok(Value::Int(cmp_int(bool_arg(args, 0)?.cmp(&bool_arg(args, 1)?)))),
        ("logicalAnd", 2) => Ok(Value::Bool(bool_arg(args, 0)? && bool_arg(args, 1)?)),
        ("logicalOr", 2) => Ok(Value::Bool(bool_arg(args, 0)? || bool_arg(args, 1)?)),
        ("logicalXor", 2) => Ok(Value::Bool(bool_arg(args, 0)? ^ bool_arg(args, 1)?)),
        _ => Err(NativeError::no_such_method("Boolean", name)),
    }
}

fn character(name: &str, args: &[Value]) -> NativeResult<Value> {
    let c = match args.first() {
        Some(_) => char_arg(args, 0)?,
        None => return Err(NativeError::no_such_method("Character", name)),
    };
    // case mapping keeps an int argument an int
    let same_kind = |mapped: char| match args[0] {
        Value::Int(_) => Value::Int(mapped as i64),
        _ => Value::Char(mapped),
    };
    let value = match (name, args.len()) {
        ("isDigit", 1) => Value::Bool(c.is_numeric()),
        ("isLetter" | "isAlphabetic", 1) => Value::Bool(c.is_alphabetic()),
        ("isLetterOrDigit", 1) => Value::Bool(c.is_alphanumeric()),
        ("isUpperCase", 1) => Value::Bool(c.is_uppercase()),
        ("isLowerCase", 1) => Value::Bool(c.is_lowercase()),
        ("isWhitespace", 1) => Value::Bool(c.is_whitespace() && c != '\u{00A0}'),
        ("isSpaceChar", 1) => Value::Bool(c == ' ' || c == '\u{00A0}' || c.is_whitespace() && !c.is_control()),
        ("toUpperCase", 1) => same_kind(c.to_uppercase().next().unwrap_or(c)),
        ("toLowerCase", 1) => same_kind(c.to_lowercase().next().unwrap_or(c)),
        ("getNumericValue", 1) => Value::Int(c.to_digit(36).map_or(-1, i64::from)),
        ("digit", 2) => {
            let radix = int_arg(args, 1)? as u32;
            Value::Int(if (2..=36).contains(&radix) {
                c.to_digit(radix).map_or(-1, i64::from)
            } else {
                -1
            })
        }
        ("toString", 1) => Value::str(c.to_string()),
        ("valueOf", 1) => Value::Char(c),
        ("compare", 2) => Value::Int(c as i64 - char_arg(args, 1)? as i64),
        ("hashCode", 1) => Value::Int(c as i64),
        _ => return Err(NativeError::no_such_method("Character", name)),
    };
    Ok(value)
}

fn string_static(name: &str, args: &[Value]) -> NativeResult<Value> {
    match name {
        "join" if !args.is_empty() => {
            let separator = str_arg(args, 0)?;
            let mut parts = Vec::new();
            let push = |parts: &mut Vec<String>, v: &Value| match v {
                Value::Str(s) => parts.push(s.to_string()),
                Value::Null => parts.push("null".to_string()),
                other => parts.push(ops::primitive_string(other).unwrap_or_default()),
            };
            for v in &args[1..] {
                match v {
                    Value::Array(a) => a.items.borrow().iter().for_each(|item| push(&mut parts, item)),
                    other => push(&mut parts, other),
                }
            }
            Ok(Value::str(parts.join(&separator)))
        }
        "copyValueOf" => {
            let chars = array_arg(args, 0)?;
            let text: String = chars.items.borrow().iter().filter_map(|c| match c {
                Value::Char(c) => Some(*c),
                _ => None,
            }).collect();
            Ok(Value::str(text))
        }
        _ => Err(NativeError::no_such_method("String", name)),
    }
}

/// Ordering for `Arrays.sort` over primitives and strings.
fn natural_order(a: &Value, b: &Value) -> NativeResult<Ordering> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(string::ordering(x, y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Char(x), Value::Char(y)) => Ok(x.cmp(y)),
        (Value::Null, _) | (_, Value::Null) => Err(NativeError::bare("NullPointerException")),
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => Ok(x.total_cmp(&y)),
            _ => Err(NativeError::new(
                "ClassCastException",
                format!("class {} cannot be cast to class java.lang.Comparable", a.class_name()),
            )),
        },
    }
}

/// Stable merge sort with a fallible comparator.
pub fn sort_by<E>(
    items: &mut Vec<Value>,
    compare: &mut dyn FnMut(&Value, &Value) -> Result<Ordering, E>,
) -> Result<(), E> {
    if items.len() < 2 {
        return Ok(());
    }
    let mut right = items.split_off(items.len() / 2);
    sort_by(items, compare)?;
    sort_by(&mut right, compare)?;
    let left = std::mem::take(items);
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        if compare(r, l)? == Ordering::Less {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    *items = merged;
    Ok(())
}

/// Bounds of an `Arrays` range operation.
fn range(args: &[Value], from: usize, length: usize) -> NativeResult<(usize, usize)> {
    let (start, end) = (int_arg(args, from)?, int_arg(args, from + 1)?);
    if start > end {
        return Err(NativeError::new(
            "IllegalArgumentException",
            format!("fromIndex({}) > toIndex({})", start, end),
        ));
    }
    if start < 0 || end as usize > length {
        let bad = if start < 0 { start } else { end };
        return Err(NativeError::new(
            "ArrayIndexOutOfBoundsException",
            format!("Array index out of range: {}", bad),
        ));
    }
    Ok((start as usize, end as usize))
}

fn arrays(heap: &Heap, name: &str, args: &[Value]) -> NativeResult<Value> {
    match (name, args.len()) {
        ("sort", 1 | 3) => {
            let array = array_arg(args, 0)?;
            let length = array.len();
            let (start, end) = if args.len() == 3 { range(args, 1, length)? } else { (0, length) };
            let mut slice: Vec<Value> = array.items.borrow()[start..end].to_vec();
            sort_by(&mut slice, &mut natural_order)?;
            array.items.borrow_mut().splice(start..end, slice);
            Ok(Value::Null)
        }
        ("fill", 2 | 4) => {
            let array = array_arg(args, 0)?;
            let length = array.len();
            let (start, end) = if args.len() == 4 { range(args, 1, length)? } else { (0, length) };
            let value = coerce_element(&array.component, array.dims, args[args.len() - 1].clone());
            array.items.borrow_mut()[start..end].fill(value);
            Ok(Value::Null)
        }
        ("copyOf", 2) => {
            let array = array_arg(args, 0)?;
            let n = int_arg(args, 1)?;
            if n < 0 {
                return Err(NativeError::new("NegativeArraySizeException", n.to_string()));
            }
            let mut items: Vec<Value> = array.items.borrow().iter().take(n as usize).cloned().collect();
            items.resize(n as usize, element_default(&array.component, array.dims));
            Ok(heap.array(&array.component, array.dims, items))
        }
        ("copyOfRange", 3) => {
            let array = array_arg(args, 0)?;
            let (start, end) = (int_arg(args, 1)?, int_arg(args, 2)?);
            if start < 0 || start as usize > array.len() {
                return Err(NativeError::new(
                    "ArrayIndexOutOfBoundsException",
                    format!("Array index out of range: {}", start),
                ));
            }
            if start > end {
                return Err(NativeError::new(
                    "IllegalArgumentException",
                    format!("{} > {}", start, end),
                ));
            }
            let default = element_default(&array.component, array.dims);
            let items = array.items.borrow();
            let copied = (start..end)
                .map(|i| items.get(i as usize).cloned().unwrap_or_else(|| default.clone()))
                .collect();
            Ok(heap.array(&array.component, array.dims, copied))
        }
        ("equals", 2) => match (&args[0], &args[1]) {
            (Value::Null, Value::Null) => Ok(Value::Bool(true)),
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.items.borrow(), b.items.borrow());
                Ok(Value::Bool(
                    a.len() == b.len()
                        && a.iter().zip(b.iter()).all(|(x, y)| {
                            primitive_equals(x, y).unwrap_or_else(|| x.same_ref(y))
                        }),
                ))
            }
            _ => Ok(Value::Bool(false)),
        },
        _ => Err(NativeError::no_such_method("Arrays", name)),
    }
}

fn system(name: &str, args: &[Value]) -> NativeResult<Value> {
    let since_epoch = || SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    match (name, args.len()) {
        ("currentTimeMillis", 0) => Ok(Value::Int(since_epoch().as_millis() as i64)),
        ("nanoTime", 0) => Ok(Value::Int(since_epoch().as_nanos() as i64)),
        ("lineSeparator", 0) => Ok(Value::str("\n")),
        ("identityHashCode", 1) => Ok(Value::Int(match &args[0] {
            Value::Object(o) => identity_hash(o.id) as i64,
            Value::Array(a) => identity_hash(a.id) as i64,
            Value::Str(s) => ops::string_hash(s) as i64,
            _ => 0,
        })),
        ("getenv", 1) => Ok(std::env::var(&*str_arg(args, 0)?).map_or(Value::Null, Value::str)),
        ("getProperty", 1) => {
            let key = str_arg(args, 0)?;
            Ok(match &*key {
                "line.separator" => Value::str("\n"),
                "file.separator" => Value::str(std::path::MAIN_SEPARATOR.to_string()),
                "user.dir" => std::env::current_dir()
                    .map_or(Value::Null, |d| Value::str(d.display().to_string())),
                "os.name" => Value::str(std::env::consts::OS),
                "java.version" => Value::str("17"),
                _ => Value::Null,
            })
        }
        ("arraycopy", 5) => {
            let src = array_arg(args, 0)?;
            let dst = array_arg(args, 2)?;
            let (src_pos, dst_pos, length) = (int_arg(args, 1)?, int_arg(args, 3)?, int_arg(args, 4)?);
            let (src_len, dst_len) = (src.len() as i64, dst.len() as i64);
            if src_pos < 0 || dst_pos < 0 || length < 0 || src_pos + length > src_len || dst_pos + length > dst_len {
                let message = if src_pos + length > src_len {
                    format!("arraycopy: last source index {} out of bounds for length {}", src_pos + length, src_len)
                } else {
                    format!("arraycopy: last destination index {} out of bounds for length {}", dst_pos + length, dst_len)
                };
                return Err(NativeError::new("ArrayIndexOutOfBoundsException", message));
            }
            let copied: Vec<Value> =
                src.items.borrow()[src_pos as usize..(src_pos + length) as usize].to_vec();
            dst.items
                .borrow_mut()
                .splice(dst_pos as usize..(dst_pos + length) as usize, copied);
            Ok(Value::Null)
        }
        _ => Err(NativeError::no_such_method("System", name)),
    }
}

fn thread(name: &str, args: &[Value]) -> NativeResult<Value> {
    match (name, args.len()) {
        ("sleep", 1 | 2) => {
            let ms = int_arg(args, 0)?;
            if ms < 0 {
                return Err(NativeError::new("IllegalArgumentException", "timeout value is negative"));
            }
            std::thread::sleep(Duration::from_millis(ms as u64));
            Ok(Value::Null)
        }
        ("onSpinWait" | "yield", 0) => Ok(Value::Null),
        _ => Err(NativeError::no_such_method("Thread", name)),
    }
}

fn objects(name: &str, args: &[Value]) -> NativeResult<Value> {
    match (name, args.len()) {
        ("isNull", 1) => Ok(Value::Bool(args[0].is_null())),
        ("nonNull", 1) => Ok(Value::Bool(!args[0].is_null())),
        ("requireNonNull", 1 | 2) => match &args[0] {
            Value::Null => Err(match args.get(1) {
                Some(Value::Str(message)) => NativeError::new("NullPointerException", message.to_string()),
                _ => NativeError::bare("NullPointerException"),
            }),
            other => Ok(other.clone()),
        },
        _ => Err(NativeError::no_such_method("Objects", name)),
    }
}

// ============================================================================
// Constructors
// ============================================================================

fn chars_of(array: &crate::vm::object::Array) -> Vec<char> {
    array
        .items
        .borrow()
        .iter()
        .filter_map(|v| match v {
            Value::Char(c) => Some(*c),
            _ => None,
        })
        .collect()
}

/// `new` on a constructible built-in other than a throwable.
pub fn construct(heap: &Heap, stdin: &SharedInput, class: &str, args: &[Value]) -> NativeResult<Value> {
    match (class, args.len()) {
        ("Object", 0) => Ok(Value::Object(heap.object("Object", Native::None))),
        ("String", 0) => Ok(Value::str("")),
        ("String", 1) => match arg(args, 0)? {
            Value::Str(s) => Ok(Value::Str(s.clone())),
            Value::Array(a) => Ok(Value::str(chars_of(a).into_iter().collect::<String>())),
            Value::Object(o) => match &*o.native.borrow() {
                Native::Builder(b) => Ok(Value::str(b.as_str())),
                _ => Err(NativeError::argument_mismatch()),
            },
            _ => Err(NativeError::argument_mismatch()),
        },
        ("String", 3) => {
            let array = array_arg(args, 0)?;
            let chars = chars_of(&array);
            let (offset, count) = (int_arg(args, 1)?, int_arg(args, 2)?);
            let end = offset
                .checked_add(count)
                .filter(|end| offset >= 0 && count >= 0 && (*end as usize) <= chars.len());
            let Some(end) = end else {
                return Err(NativeError::new(
                    "StringIndexOutOfBoundsException",
                    format!("offset {}, count {}, length {}", offset, count, chars.len()),
                ));
            };
            Ok(Value::str(
                chars[offset as usize..end as usize].iter().collect::<String>(),
            ))
        }
        ("StringBuilder", 0) => Ok(Value::Object(heap.object("StringBuilder", Native::Builder(String::new())))),
        ("StringBuilder", 1) => {
            let initial = match arg(args, 0)? {
                Value::Int(_) => String::new(),
                Value::Str(s) => s.to_string(),
                _ => return Err(NativeError::argument_mismatch()),
            };
            Ok(Value::Object(heap.object("StringBuilder", Native::Builder(initial))))
        }
        ("Scanner", 1) => {
            let state = match arg(args, 0)? {
                Value::Str(text) => ScannerState::from_text(text.to_string()),
                Value::Object(o) => {
                    let native = o.native.borrow();
                    match &*native {
                        Native::Stream(Stream::In) => ScannerState::from_input(stdin.clone()),
                        Native::File(path) | Native::Path(path) => {
                            let text = std::fs::read_to_string(path).map_err(|_| {
                                NativeError::new(
                                    "FileNotFoundException",
                                    format!("{} (No such file or directory)", path.display()),
                                )
                            })?;
                            ScannerState::from_text(text)
                        }
                        _ => return Err(NativeError::argument_mismatch()),
                    }
                }
                _ => return Err(NativeError::argument_mismatch()),
            };
            Ok(Value::Object(heap.object("Scanner", Native::Scanner(Box::new(state)))))
        }
        ("File", 1) => Ok(file::new_file(heap, PathBuf::from(&*str_arg(args, 0)?))),
        ("File", 2) => {
            let child = str_arg(args, 1)?;
            let path = match &args[0] {
                Value::Null => PathBuf::from(&*child),
                parent => file::path_of(parent)?.join(&*child),
            };
            Ok(file::new_file(heap, path))
        }
        _ => Err(NativeError::no_such_method(class, "<init>")),
    }
}

// ============================================================================
// Boxed primitives
// ============================================================================

/// Method called on a primitive value (`Integer x; x.compareTo(y)`).
pub fn boxed_method(value: &Value, name: &str, args: &[Value]) -> NativeResult<Value> {
    let result = match (name, args.len()) {
        ("intValue" | "longValue" | "shortValue" | "byteValue", 0) => match value {
            Value::Double(d) => ops::convert(&crate::compiler::ir::CastKind::Long, &Value::Double(*d))
                .unwrap_or(Value::Int(0)),
            other => Value::Int(other.as_int().ok_or_else(NativeError::argument_mismatch)?),
        },
        ("doubleValue" | "floatValue", 0) => {
            Value::Double(value.as_double().ok_or_else(NativeError::argument_mismatch)?)
        }
        ("charValue" | "booleanValue", 0) => value.clone(),
        ("toString", 0) => Value::str(ops::primitive_string(value).unwrap_or_default()),
        ("equals", 1) => Value::Bool(
            std::mem::discriminant(value) == std::mem::discriminant(&args[0])
                && primitive_equals(value, &args[0]).unwrap_or(false),
        ),
        ("hashCode", 0) => Value::Int(match value {
            Value::Bool(true) => 1231,
            Value::Bool(false) => 1237,
            Value::Double(d) => {
                let bits = d.to_bits();
                (bits ^ (bits >> 32)) as u32 as i32 as i64
            }
            Value::Int(v) if *v >= i32::MIN as i64 && *v <= i32::MAX as i64 => *v,
            Value::Int(v) => (*v ^ ((*v as u64) >> 32) as i64) as i32 as i64,
            other => other.as_int().unwrap_or(0),
        }),
        ("compareTo" | "compare", 1) => match (value, arg(args, 0)?) {
            (Value::Bool(a), Value::Bool(b)) => Value::Int(cmp_int(a.cmp(b))),
            (Value::Char(a), Value::Char(b)) => Value::Int(*a as i64 - *b as i64),
            (Value::Int(a), Value::Int(b)) => Value::Int(cmp_int(a.cmp(b))),
            (a, b) => match (a.as_double(), b.as_double()) {
                (Some(x), Some(y)) => Value::Int(cmp_int(x.total_cmp(&y))),
                _ => return Err(NativeError::argument_mismatch()),
            },
        },
        ("isNaN", 0) => Value::Bool(matches!(value, Value::Double(d) if d.is_nan())),
        ("isInfinite", 0) => Value::Bool(matches!(value, Value::Double(d) if d.is_infinite())),
        _ => return Err(NativeError::no_such_method(value.class_name(), name)),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(class: &str, name: &str, args: &[Value]) -> NativeResult<Value> {
        static_call(&Heap::new(), class, name, args)
    }

    #[test]
    fn test_math() {
        assert!(matches!(call("Math", "max", &[Value::Int(3), Value::Int(7)]).unwrap(), Value::Int(7)));
        assert!(matches!(call("Math", "max", &[Value::Int(3), Value::Double(1.5)]).unwrap(), Value::Double(d) if d == 3.0));
        assert!(matches!(call("Math", "round", &[Value::Double(2.5)]).unwrap(), Value::Int(3)));
        assert!(matches!(call("Math", "round", &[Value::Double(-2.5)]).unwrap(), Value::Int(-2)));
        assert!(matches!(call("Math", "abs", &[Value::Int(-4)]).unwrap(), Value::Int(4)));
        assert!(matches!(call("Math", "sqrt", &[Value::Int(16)]).unwrap(), Value::Double(d) if d == 4.0));
        assert!(matches!(call("Math", "floorMod", &[Value::Int(-7), Value::Int(3)]).unwrap(), Value::Int(2)));
        assert!(matches!(call("Math", "floorDiv", &[Value::Int(-7), Value::Int(3)]).unwrap(), Value::Int(-3)));
        match call("Math", "random", &[]).unwrap() {
            Value::Double(d) => assert!((0.0..1.0).contains(&d)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_integer_parsing() {
        assert!(matches!(call("Integer", "parseInt", &[Value::str("-42")]).unwrap(), Value::Int(-42)));
        assert!(matches!(call("Integer", "parseInt", &[Value::str("ff"), Value::Int(16)]).unwrap(), Value::Int(255)));
        let err = call("Integer", "parseInt", &[Value::str("12a")]).unwrap_err();
        assert_eq!(err.kind, "NumberFormatException");
        assert_eq!(err.message.as_deref(), Some("For input string: \"12a\""));
        assert!(call("Integer", "parseInt", &[Value::str("3000000000")]).is_err());
        assert!(call("Long", "parseLong", &[Value::str("3000000000")]).is_ok());
        let hex = call("Integer", "toHexString", &[Value::Int(-1)]).unwrap();
        assert!(matches!(hex, Value::Str(s) if &*s == "ffffffff"));
        let bin = call("Integer", "toString", &[Value::Int(-5), Value::Int(2)]).unwrap();
        assert!(matches!(bin, Value::Str(s) if &*s == "-101"));
    }

    #[test]
    fn test_double_parsing() {
        assert_eq!(parse_double(" 2.5 ").unwrap(), 2.5);
        assert_eq!(parse_double("1e3").unwrap(), 1000.0);
        assert_eq!(parse_double("-Infinity").unwrap(), f64::NEG_INFINITY);
        assert!(parse_double("NaN").unwrap().is_nan());
        assert_eq!(parse_double("").unwrap_err().message.as_deref(), Some("empty String"));
        assert!(parse_double("inf").is_err());
        assert!(parse_double("abc").is_err());
    }

    #[test]
    fn test_character_predicates() {
        assert!(matches!(call("Character", "isDigit", &[Value::Char('7')]).unwrap(), Value::Bool(true)));
        assert!(matches!(call("Character", "isLetter", &[Value::Char('7')]).unwrap(), Value::Bool(false)));
        assert!(matches!(call("Character", "toUpperCase", &[Value::Char('q')]).unwrap(), Value::Char('Q')));
        assert!(matches!(call("Character", "getNumericValue", &[Value::Char('b')]).unwrap(), Value::Int(11)));
    }

    #[test]
    fn test_arrays() {
        let heap = Heap::new();
        let nums = heap.array("int", 1, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        static_call(&heap, "Arrays", "sort", &[nums.clone()]).unwrap();
        let Value::Array(a) = &nums else { panic!() };
        assert!(matches!(a.items.borrow()[..], [Value::Int(1), Value::Int(2), Value::Int(3)]));
        let bigger = static_call(&heap, "Arrays", "copyOf", &[nums.clone(), Value::Int(5)]).unwrap();
        let Value::Array(b) = &bigger else { panic!() };
        assert!(matches!(b.items.borrow()[4], Value::Int(0)));
        static_call(&heap, "Arrays", "fill", &[bigger.clone(), Value::Int(9)]).unwrap();
        assert!(b.items.borrow().iter().all(|v| matches!(v, Value::Int(9))));
        let same = static_call(&heap, "Arrays", "equals", &[nums.clone(), nums]).unwrap();
        assert!(matches!(same, Value::Bool(true)));
    }

    #[test]
    fn test_fill_coerces_to_component() {
        let heap = Heap::new();
        let ds = heap.array("double", 1, vec![Value::Double(0.0); 2]);
        static_call(&heap, "Arrays", "fill", &[ds.clone(), Value::Int(1)]).unwrap();
        let Value::Array(a) = &ds else { panic!() };
        assert!(matches!(a.items.borrow()[0], Value::Double(d) if d == 1.0));
    }

    #[test]
    fn test_arraycopy_bounds() {
        let heap = Heap::new();
        let src = heap.array("int", 1, vec![Value::Int(1); 3]);
        let dst = heap.array("int", 1, vec![Value::Int(0); 2]);
        let err = static_call(
            &heap,
            "System",
            "arraycopy",
            &[src, Value::Int(0), dst, Value::Int(0), Value::Int(3)],
        )
        .unwrap_err();
        assert_eq!(err.kind, "ArrayIndexOutOfBoundsException");
    }

    #[test]
    fn test_string_join_and_constructors() {
        let heap = Heap::new();
        let joined = static_call(&heap, "String", "join", &[Value::str(", "), Value::str("a"), Value::str("b")]).unwrap();
        assert!(matches!(joined, Value::Str(s) if &*s == "a, b"));
        let stdin = SharedInput::new(Box::new(std::io::Cursor::new(String::new())));
        let chars = heap.char_array("hey".chars());
        let s = construct(&heap, &stdin, "String", &[chars]).unwrap();
        assert!(matches!(s, Value::Str(s) if &*s == "hey"));
        let missing = construct(&heap, &stdin, "File", &[Value::str("/no/such/input.txt")]).unwrap();
        let err = construct(&heap, &stdin, "Scanner", &[missing]).unwrap_err();
        assert_eq!(err.kind, "FileNotFoundException");
        assert_eq!(err.message.as_deref(), Some("/no/such/input.txt (No such file or directory)"));
    }

    #[test]
    fn test_boxed_methods() {
        assert!(matches!(boxed_method(&Value::Int(3), "compareTo", &[Value::Int(5)]).unwrap(), Value::Int(-1)));
        assert!(matches!(boxed_method(&Value::Int(3), "equals", &[Value::Double(3.0)]).unwrap(), Value::Bool(false)));
        assert!(matches!(boxed_method(&Value::Double(2.9), "intValue", &[]).unwrap(), Value::Int(2)));
        assert!(matches!(boxed_method(&Value::Bool(true), "hashCode", &[]).unwrap(), Value::Int(1231)));
    }
}
