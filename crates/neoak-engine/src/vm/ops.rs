//! Operator semantics on runtime values
//!
//! Pure functions over [`Value`]s; anything that needs an object's
//! `toString()` or identity is left to the interpreter.

use crate::compiler::ir::CastKind;
use crate::parser::ast::{BinaryOp, UnaryOp};
use crate::vm::builtins::format::double_to_string;
use crate::vm::value::Value;

/// Failure of an operator, mapped to an exception by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum OpError {
    /// Integer `/` or `%` by zero
    DivideByZero,
    /// Operand kinds the operator does not accept
    BadOperands(&'static str),
}

impl OpError {
    /// Exception kind and message.
    pub fn exception(&self) -> (&'static str, String) {
        match self {
            OpError::DivideByZero => ("ArithmeticException", "/ by zero".to_string()),
            OpError::BadOperands(op) => (
                "RuntimeException",
                format!("bad operand types for binary operator '{}'", op),
            ),
        }
    }
}

/// Numeric pair after promotion.
enum Num {
    Int(i64, i64),
    Double(f64, f64),
}

fn promote(a: &Value, b: &Value) -> Option<Num> {
    match (a, b) {
        (Value::Double(_), _) | (_, Value::Double(_)) => {
            Some(Num::Double(a.as_double()?, b.as_double()?))
        }
        _ => Some(Num::Int(a.as_int()?, b.as_int()?)),
    }
}

/// Evaluate a binary operator other than `+`, `&&`, `||`, and reference
/// `==` / `!=`.
pub fn binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, OpError> {
    use BinaryOp::*;
    if let (Value::Bool(x), Value::Bool(y)) = (a, b) {
        return match op {
            BitAnd => Ok(Value::Bool(*x & *y)),
            BitOr => Ok(Value::Bool(*x | *y)),
            BitXor => Ok(Value::Bool(*x ^ *y)),
            Eq => Ok(Value::Bool(x == y)),
            Ne => Ok(Value::Bool(x != y)),
            _ => Err(OpError::BadOperands(op.symbol())),
        };
    }
    let nums = promote(a, b).ok_or(OpError::BadOperands(op.symbol()))?;
    Ok(match nums {
        Num::Int(x, y) => match op {
            Add => Value::Int(x.wrapping_add(y)),
            Sub => Value::Int(x.wrapping_sub(y)),
            Mul => Value::Int(x.wrapping_mul(y)),
            Div if y == 0 => return Err(OpError::DivideByZero),
            Div => Value::Int(x.wrapping_div(y)),
            Rem if y == 0 => return Err(OpError::DivideByZero),
            Rem => Value::Int(x.wrapping_rem(y)),
            Shl => Value::Int(x.wrapping_shl((y & 63) as u32)),
            Shr => Value::Int(x.wrapping_shr((y & 63) as u32)),
            UShr => Value::Int(unsigned_shift(x, y)),
            BitAnd => Value::Int(x & y),
            BitOr => Value::Int(x | y),
            BitXor => Value::Int(x ^ y),
            Lt => Value::Bool(x < y),
            Le => Value::Bool(x <= y),
            Gt => Value::Bool(x > y),
            Ge => Value::Bool(x >= y),
            Eq => Value::Bool(x == y),
            Ne => Value::Bool(x != y),
            And | Or => return Err(OpError::BadOperands(op.symbol())),
        },
        Num::Double(x, y) => match op {
            Add => Value::Double(x + y),
            Sub => Value::Double(x - y),
            Mul => Value::Double(x * y),
            Div => Value::Double(x / y),
            Rem => Value::Double(x % y),
            Lt => Value::Bool(x < y),
            Le => Value::Bool(x <= y),
            Gt => Value::Bool(x > y),
            Ge => Value::Bool(x >= y),
            Eq => Value::Bool(x == y),
            Ne => Value::Bool(x != y),
            _ => return Err(OpError::BadOperands(op.symbol())),
        },
    })
}

/// `>>>`: negative values in `int` range shift as 32-bit.
fn unsigned_shift(x: i64, y: i64) -> i64 {
    if x < 0 && x >= i32::MIN as i64 {
        ((x as i32 as u32) >> (y & 31)) as i64
    } else {
        ((x as u64) >> (y & 63)) as i64
    }
}

/// Numeric `+` for the `+` chain; `None` when either side is not numeric.
pub fn numeric_add(a: &Value, b: &Value) -> Option<Value> {
    if matches!(a, Value::Bool(_)) || matches!(b, Value::Bool(_)) {
        return None;
    }
    match promote(a, b)? {
        Num::Int(x, y) => Some(Value::Int(x.wrapping_add(y))),
        Num::Double(x, y) => Some(Value::Double(x + y)),
    }
}

/// Evaluate a unary operator.
pub fn unary(op: UnaryOp, v: &Value) -> Result<Value, OpError> {
    match (op, v) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Neg, _) => v
            .as_int()
            .map(|i| Value::Int(i.wrapping_neg()))
            .ok_or(OpError::BadOperands("-")),
        (UnaryOp::Plus, Value::Double(d)) => Ok(Value::Double(*d)),
        (UnaryOp::Plus, _) => v.as_int().map(Value::Int).ok_or(OpError::BadOperands("+")),
        (UnaryOp::BitNot, _) => v.as_int().map(|i| Value::Int(!i)).ok_or(OpError::BadOperands("~")),
        (UnaryOp::Not, _) => Err(OpError::BadOperands("!")),
    }
}

/// `++` / `--`, keeping `char` and floating kinds.
pub fn step(v: &Value, increment: bool) -> Result<Value, OpError> {
    let delta = if increment { 1 } else { -1 };
    match v {
        Value::Int(i) => Ok(Value::Int(i.wrapping_add(delta))),
        Value::Double(d) => Ok(Value::Double(d + delta as f64)),
        Value::Char(c) => Ok(Value::Char(char_from_code(*c as i64 + delta))),
        _ => Err(OpError::BadOperands(if increment { "++" } else { "--" })),
    }
}

/// A UTF-16 code unit as a `char`; surrogates become U+FFFD.
pub fn char_from_code(code: i64) -> char {
    char::from_u32(code as u16 as u32).unwrap_or('\u{FFFD}')
}

/// Primitive conversions. Reference casts are checked by the interpreter;
/// this returns `None` for them and for non-convertible values.
pub fn convert(kind: &CastKind, v: &Value) -> Option<Value> {
    let from_double = |d: f64| -> i64 { d as i64 };
    Some(match kind {
        CastKind::Int => Value::Int(match v {
            Value::Double(d) => *d as i32 as i64,
            other => other.as_int()? as i32 as i64,
        }),
        CastKind::Long => Value::Int(match v {
            Value::Double(d) => from_double(*d),
            other => other.as_int()?,
        }),
        CastKind::Short => Value::Int(match v {
            Value::Double(d) => *d as i32 as i16 as i64,
            other => other.as_int()? as i16 as i64,
        }),
        CastKind::Byte => Value::Int(match v {
            Value::Double(d) => *d as i32 as i8 as i64,
            other => other.as_int()? as i8 as i64,
        }),
        CastKind::Char => Value::Char(match v {
            Value::Double(d) => char_from_code(*d as i64),
            other => char_from_code(other.as_int()?),
        }),
        CastKind::Double | CastKind::Float => Value::Double(v.as_double()?),
        CastKind::Boolean => match v {
            Value::Bool(b) => Value::Bool(*b),
            _ => return None,
        },
        CastKind::Class { .. } => return None,
    })
}

/// String form of a non-reference value.
pub fn primitive_string(v: &Value) -> Option<String> {
    Some(match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => double_to_string(*d),
        Value::Char(c) => c.to_string(),
        Value::Str(s) => s.to_string(),
        _ => return None,
    })
}

/// Java's `String.hashCode`: `s[0]*31^(n-1) + ... + s[n-1]` over UTF-16
/// units, wrapping at 32 bits.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Identity hash shown by the default `toString`.
pub fn identity_hash(id: u32) -> u32 {
    id.wrapping_mul(0x9E37_79B1).rotate_left(7) & 0x7FFF_FFFF
}

/// Numeric or boolean equality for `==`; `None` for references.
pub fn primitive_equals(a: &Value, b: &Value) -> Option<bool> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x == y),
        _ if a.is_numeric() && b.is_numeric() => match promote(a, b)? {
            Num::Int(x, y) => Some(x == y),
            Num::Double(x, y) => Some(x == y),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert!(matches!(binary(BinaryOp::Div, &Value::Int(7), &Value::Int(2)), Ok(Value::Int(3))));
        assert!(matches!(binary(BinaryOp::Rem, &Value::Int(-7), &Value::Int(2)), Ok(Value::Int(-1))));
        assert_eq!(
            binary(BinaryOp::Div, &Value::Int(1), &Value::Int(0)).unwrap_err(),
            OpError::DivideByZero
        );
        assert!(matches!(binary(BinaryOp::Add, &Value::Char('a'), &Value::Int(1)), Ok(Value::Int(98))));
        assert!(matches!(binary(BinaryOp::UShr, &Value::Int(-1), &Value::Int(28)), Ok(Value::Int(15))));
    }

    #[test]
    fn test_mixed_and_floating() {
        assert!(matches!(binary(BinaryOp::Div, &Value::Int(1), &Value::Double(2.0)), Ok(Value::Double(d)) if d == 0.5));
        assert!(matches!(binary(BinaryOp::Div, &Value::Double(1.0), &Value::Int(0)), Ok(Value::Double(d)) if d.is_infinite()));
        assert!(matches!(binary(BinaryOp::Lt, &Value::Int(1), &Value::Double(1.5)), Ok(Value::Bool(true))));
        assert!(binary(BinaryOp::Mul, &Value::str("a"), &Value::Int(2)).is_err());
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(convert(&CastKind::Int, &Value::Double(3.99)), Some(Value::Int(3))));
        assert!(matches!(convert(&CastKind::Int, &Value::Double(-3.99)), Some(Value::Int(-3))));
        assert!(matches!(convert(&CastKind::Int, &Value::Int(2147483648)), Some(Value::Int(-2147483648))));
        assert!(matches!(convert(&CastKind::Char, &Value::Int(65)), Some(Value::Char('A'))));
        assert!(matches!(convert(&CastKind::Int, &Value::Char('a')), Some(Value::Int(97))));
        assert!(matches!(convert(&CastKind::Byte, &Value::Int(200)), Some(Value::Int(-56))));
        assert!(matches!(convert(&CastKind::Double, &Value::Int(2)), Some(Value::Double(d)) if d == 2.0));
        assert!(convert(&CastKind::Int, &Value::str("1")).is_none());
    }

    #[test]
    fn test_step_keeps_kind() {
        assert!(matches!(step(&Value::Char('a'), true), Ok(Value::Char('b'))));
        assert!(matches!(step(&Value::Double(1.5), false), Ok(Value::Double(d)) if d == 0.5));
    }

    #[test]
    fn test_string_hash_matches_java() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("hello"), 99162322);
        assert_eq!(string_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_primitive_equality() {
        assert_eq!(primitive_equals(&Value::Int(97), &Value::Char('a')), Some(true));
        assert_eq!(primitive_equals(&Value::Int(1), &Value::Double(1.0)), Some(true));
        assert_eq!(primitive_equals(&Value::str("a"), &Value::str("a")), None);
    }
}
