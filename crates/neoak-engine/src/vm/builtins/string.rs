//! `String` and `StringBuilder` methods.
//!
//! Indices count `char`s.

use super::{char_arg, int_arg, str_arg, NativeError, NativeResult};
use crate::vm::heap::Heap;
use crate::vm::object::Native;
use crate::vm::ops::string_hash;
use crate::vm::value::Value;
use regex::Regex;
use std::cmp::Ordering;

fn out_of_bounds(index: i64, length: usize) -> NativeError {
    NativeError::new(
        "StringIndexOutOfBoundsException",
        format!("Index {} out of bounds for length {}", index, length),
    )
}

fn range_error(begin: i64, end: i64, length: usize) -> NativeError {
    NativeError::new(
        "StringIndexOutOfBoundsException",
        format!("begin {}, end {}, length {}", begin, end, length),
    )
}

fn compile(pattern: &str) -> NativeResult<Regex> {
    Regex::new(pattern).map_err(|e| NativeError::new("IllegalArgumentException", e.to_string()))
}

/// Char index of a byte offset.
fn char_index(s: &str, byte: usize) -> i64 {
    s[..byte].chars().count() as i64
}

/// Byte offset of a char index, clamped to the end.
fn byte_offset(s: &str, index: usize) -> usize {
    s.char_indices().nth(index).map_or(s.len(), |(b, _)| b)
}

/// Needle of `indexOf` / `contains`: a string or a char (or char code).
fn needle(args: &[Value], i: usize) -> NativeResult<String> {
    match args.get(i) {
        Some(Value::Str(s)) => Ok(s.to_string()),
        Some(Value::Char(c)) => Ok(c.to_string()),
        Some(Value::Int(code)) => Ok(crate::vm::ops::char_from_code(*code).to_string()),
        Some(Value::Null) => Err(NativeError::bare("NullPointerException")),
        _ => Err(NativeError::argument_mismatch()),
    }
}

/// Java `compareTo`: first differing char, else length difference.
pub fn compare(a: &str, b: &str) -> i64 {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return x as i64 - y as i64;
        }
    }
    a.chars().count() as i64 - b.chars().count() as i64
}

/// Java `String.split`: a limit of zero drops trailing empty strings, and a
/// zero-width match at the start never yields a leading empty string.
pub fn split(s: &str, pattern: &str, limit: i64) -> NativeResult<Vec<String>> {
    let re = compile(pattern)?;
    let mut parts = Vec::new();
    let mut last = 0;
    for m in re.find_iter(s) {
        if limit > 0 && parts.len() as i64 == limit - 1 {
            break;
        }
        if m.end() == 0 {
            continue;
        }
        if m.start() == m.end() && m.start() >= s.len() {
            break;
        }
        parts.push(s[last..m.start()].to_string());
        last = m.end();
    }
    if parts.is_empty() {
        return Ok(vec![s.to_string()]);
    }
    parts.push(s[last..].to_string());
    if limit == 0 {
        while parts.len() > 1 && parts.last().map_or(false, |p| p.is_empty()) {
            parts.pop();
        }
        if parts.len() == 1 && parts[0].is_empty() && !s.is_empty() {
            parts.clear();
        }
    }
    Ok(parts)
}

fn substring(s: &str, begin: i64, end: Option<i64>) -> NativeResult<String> {
    let length = s.chars().count();
    let end = end.unwrap_or(length as i64);
    if begin < 0 || end > length as i64 || begin > end {
        return Err(range_error(begin, end, length));
    }
    Ok(s.chars().skip(begin as usize).take((end - begin) as usize).collect())
}

/// Instance method on a string receiver.
pub fn string_method(heap: &Heap, s: &str, name: &str, args: &[Value]) -> NativeResult<Value> {
    let value = match (name, args.len()) {
        ("length", 0) => Value::Int(s.chars().count() as i64),
        ("isEmpty", 0) => Value::Bool(s.is_empty()),
        ("isBlank", 0) => Value::Bool(s.trim().is_empty()),
        ("charAt", 1) => {
            let index = int_arg(args, 0)?;
            let length = s.chars().count();
            if index < 0 || index as usize >= length {
                return Err(out_of_bounds(index, length));
            }
            Value::Char(s.chars().nth(index as usize).unwrap_or('\0'))
        }
        ("codePointAt", 1) => {
            let index = int_arg(args, 0)?;
            match s.chars().nth(index.max(0) as usize) {
                Some(c) if index >= 0 => Value::Int(c as i64),
                _ => return Err(out_of_bounds(index, s.chars().count())),
            }
        }
        ("substring", 1) => Value::str(substring(s, int_arg(args, 0)?, None)?),
        ("substring", 2) => Value::str(substring(s, int_arg(args, 0)?, Some(int_arg(args, 1)?))?),
        ("indexOf", 1 | 2) => {
            let needle = needle(args, 0)?;
            let from = if args.len() == 2 { int_arg(args, 1)?.max(0) as usize } else { 0 };
            let start = byte_offset(s, from);
            Value::Int(s[start..].find(&needle).map_or(-1, |b| char_index(s, start + b)))
        }
        ("lastIndexOf", 1) => {
            let needle = needle(args, 0)?;
            Value::Int(s.rfind(&needle).map_or(-1, |b| char_index(s, b)))
        }
        ("contains", 1) => Value::Bool(s.contains(needle(args, 0)?.as_str())),
        ("startsWith", 1) => Value::Bool(s.starts_with(&*str_arg(args, 0)?)),
        ("startsWith", 2) => {
            let offset = int_arg(args, 1)?;
            let prefix = str_arg(args, 0)?;
            Value::Bool(offset >= 0 && s.chars().skip(offset as usize).collect::<String>().starts_with(&*prefix))
        }
        ("endsWith", 1) => Value::Bool(s.ends_with(&*str_arg(args, 0)?)),
        ("equals", 1) => Value::Bool(matches!(&args[0], Value::Str(o) if &**o == s)),
        ("equalsIgnoreCase", 1) => Value::Bool(
            matches!(&args[0], Value::Str(o) if o.to_lowercase() == s.to_lowercase()),
        ),
        ("compareTo", 1) => Value::Int(compare(s, &str_arg(args, 0)?)),
        ("compareToIgnoreCase", 1) => {
            Value::Int(compare(&s.to_lowercase(), &str_arg(args, 0)?.to_lowercase()))
        }
        ("hashCode", 0) => Value::Int(string_hash(s) as i64),
        ("toString" | "intern", 0) => Value::str(s),
        ("toUpperCase", 0) => Value::str(s.to_uppercase()),
        ("toLowerCase", 0) => Value::str(s.to_lowercase()),
        ("trim", 0) => Value::str(s.trim_matches(|c: char| c <= ' ')),
        ("strip", 0) => Value::str(s.trim()),
        ("stripLeading", 0) => Value::str(s.trim_start()),
        ("stripTrailing", 0) => Value::str(s.trim_end()),
        ("concat", 1) => Value::str(format!("{}{}", s, str_arg(args, 0)?)),
        ("repeat", 1) => {
            let count = int_arg(args, 0)?;
            if count < 0 {
                return Err(NativeError::new(
                    "IllegalArgumentException",
                    format!("count is negative: {}", count),
                ));
            }
            Value::str(s.repeat(count as usize))
        }
        ("replace", 2) => match (&args[0], &args[1]) {
            (Value::Char(from), Value::Char(to)) => Value::str(s.replace(*from, &to.to_string())),
            _ => Value::str(s.replace(&*str_arg(args, 0)?, &str_arg(args, 1)?)),
        },
        ("replaceAll", 2) => {
            let re = compile(&str_arg(args, 0)?)?;
            Value::str(re.replace_all(s, &*str_arg(args, 1)?).into_owned())
        }
        ("replaceFirst", 2) => {
            let re = compile(&str_arg(args, 0)?)?;
            Value::str(re.replace(s, &*str_arg(args, 1)?).into_owned())
        }
        ("matches", 1) => {
            let re = compile(&format!("^(?:{})$", str_arg(args, 0)?))?;
            Value::Bool(re.is_match(s))
        }
        ("split", 1) => heap.string_array(split(s, &str_arg(args, 0)?, 0)?),
        ("split", 2) => heap.string_array(split(s, &str_arg(args, 0)?, int_arg(args, 1)?)?),
        ("toCharArray", 0) => heap.char_array(s.chars()),
        _ => return Err(NativeError::no_such_method("String", name)),
    };
    Ok(value)
}

/// Instance method on a `StringBuilder`. `texts` holds the string form of
/// each argument. `None` means the call returns the builder itself.
pub fn builder_method(
    buf: &mut String,
    name: &str,
    args: &[Value],
    texts: &[String],
) -> NativeResult<Option<Value>> {
    let length = buf.chars().count();
    let check = |index: i64, limit: usize| {
        if index < 0 || index as usize > limit {
            Err(out_of_bounds(index, length))
        } else {
            Ok(index as usize)
        }
    };
    let value = match (name, args.len()) {
        ("append", 1) => {
            buf.push_str(&texts[0]);
            return Ok(None);
        }
        ("insert", 2) => {
            let at = byte_offset(buf, check(int_arg(args, 0)?, length)?);
            buf.insert_str(at, &texts[1]);
            return Ok(None);
        }
        ("reverse", 0) => {
            *buf = buf.chars().rev().collect();
            return Ok(None);
        }
        ("deleteCharAt", 1) => {
            let index = int_arg(args, 0)?;
            if index < 0 || index as usize >= length {
                return Err(out_of_bounds(index, length));
            }
            let at = byte_offset(buf, index as usize);
            buf.remove(at);
            return Ok(None);
        }
        ("delete", 2) => {
            let start = int_arg(args, 0)?;
            let end = int_arg(args, 1)?.min(length as i64);
            if start < 0 || start > end {
                return Err(range_error(start, end, length));
            }
            let (from, to) = (byte_offset(buf, start as usize), byte_offset(buf, end as usize));
            buf.replace_range(from..to, "");
            return Ok(None);
        }
        ("replace", 3) => {
            let start = int_arg(args, 0)?;
            let end = int_arg(args, 1)?.min(length as i64);
            if start < 0 || start > end {
                return Err(range_error(start, end, length));
            }
            let (from, to) = (byte_offset(buf, start as usize), byte_offset(buf, end as usize));
            buf.replace_range(from..to, &str_arg(args, 2)?);
            return Ok(None);
        }
        ("setCharAt", 2) => {
            let index = int_arg(args, 0)?;
            if index < 0 || index as usize >= length {
                return Err(out_of_bounds(index, length));
            }
            let c = char_arg(args, 1)?;
            *buf = buf
                .chars()
                .enumerate()
                .map(|(i, old)| if i == index as usize { c } else { old })
                .collect();
            Value::Null
        }
        ("setLength", 1) => {
            let n = int_arg(args, 0)?;
            if n < 0 {
                return Err(out_of_bounds(n, length));
            }
            let n = n as usize;
            if n < length {
                *buf = buf.chars().take(n).collect();
            } else {
                buf.extend(std::iter::repeat('\0').take(n - length));
            }
            Value::Null
        }
        ("toString", 0) => Value::str(buf.as_str()),
        ("length", 0) => Value::Int(length as i64),
        ("isEmpty", 0) => Value::Bool(buf.is_empty()),
        ("charAt", 1) => {
            let index = int_arg(args, 0)?;
            match buf.chars().nth(index.max(0) as usize) {
                Some(c) if index >= 0 => Value::Char(c),
                _ => return Err(out_of_bounds(index, length)),
            }
        }
        ("indexOf", 1) => {
            let needle = str_arg(args, 0)?;
            Value::Int(buf.find(&*needle).map_or(-1, |b| char_index(buf, b)))
        }
        ("lastIndexOf", 1) => {
            let needle = str_arg(args, 0)?;
            Value::Int(buf.rfind(&*needle).map_or(-1, |b| char_index(buf, b)))
        }
        ("substring", 1) => Value::str(substring(buf, int_arg(args, 0)?, None)?),
        ("substring", 2) => Value::str(substring(buf, int_arg(args, 0)?, Some(int_arg(args, 1)?))?),
        ("compareTo", 1) => match args.first() {
            Some(Value::Object(other)) => match &*other.native.borrow() {
                Native::Builder(o) => Value::Int(compare(buf, o)),
                _ => return Err(NativeError::argument_mismatch()),
            },
            _ => return Err(NativeError::argument_mismatch()),
        },
        _ => return Err(NativeError::no_such_method("StringBuilder", name)),
    };
    Ok(Some(value))
}

/// Ordering of two strings for `Arrays.sort`.
pub fn ordering(a: &str, b: &str) -> Ordering {
    compare(a, b).cmp(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(s: &str, name: &str, args: &[Value]) -> NativeResult<Value> {
        string_method(&Heap::new(), s, name, args)
    }

    fn strings(v: Value) -> Vec<String> {
        match v {
            Value::Array(a) => a
                .items
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Str(s) => s.to_string(),
                    other => format!("{:?}", other),
                })
                .collect(),
            other => panic!("not an array: {:?}", other),
        }
    }

    #[test]
    fn test_split_drops_trailing_empties() {
        assert_eq!(split("a,b,,c,,", ",", 0).unwrap(), vec!["a", "b", "", "c"]);
        assert_eq!(split("a,b,,c,,", ",", -1).unwrap(), vec!["a", "b", "", "c", "", ""]);
        assert_eq!(split("a,b,c", ",", 2).unwrap(), vec!["a", "b,c"]);
        assert_eq!(split(",a", ",", 0).unwrap(), vec!["", "a"]);
        assert_eq!(split("", ",", 0).unwrap(), vec![""]);
        assert_eq!(split("  hi  there ", "\\s+", 0).unwrap(), vec!["", "hi", "there"]);
        assert_eq!(split("abc", "", 0).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_common_methods() {
        assert!(matches!(call("hello", "length", &[]).unwrap(), Value::Int(5)));
        assert!(matches!(call("hello", "charAt", &[Value::Int(1)]).unwrap(), Value::Char('e')));
        assert!(matches!(call("hello", "indexOf", &[Value::str("l")]).unwrap(), Value::Int(2)));
        assert!(matches!(call("hello", "indexOf", &[Value::Char('l'), Value::Int(3)]).unwrap(), Value::Int(3)));
        assert!(matches!(call("hello", "lastIndexOf", &[Value::str("z")]).unwrap(), Value::Int(-1)));
        assert!(matches!(call("b", "compareTo", &[Value::str("a")]).unwrap(), Value::Int(1)));
        assert!(matches!(call("Hi", "equalsIgnoreCase", &[Value::str("hI")]).unwrap(), Value::Bool(true)));
        assert!(matches!(call("x", "equals", &[Value::Null]).unwrap(), Value::Bool(false)));
        let parts = call("1 2  3", "split", &[Value::str(" +")]).unwrap();
        assert_eq!(strings(parts), vec!["1", "2", "3"]);
        let sub = call("hello", "substring", &[Value::Int(1), Value::Int(3)]).unwrap();
        assert!(matches!(sub, Value::Str(s) if &*s == "el"));
    }

    #[test]
    fn test_string_errors() {
        let err = call("abc", "charAt", &[Value::Int(5)]).unwrap_err();
        assert_eq!(err.kind, "StringIndexOutOfBoundsException");
        assert_eq!(err.message.as_deref(), Some("Index 5 out of bounds for length 3"));
        let err = call("abc", "substring", &[Value::Int(2), Value::Int(1)]).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("begin 2, end 1, length 3"));
        assert_eq!(call("abc", "frobnicate", &[]).unwrap_err().kind, "NoSuchMethodError");
    }

    #[test]
    fn test_builder() {
        let mut buf = String::from("abc");
        assert!(builder_method(&mut buf, "append", &[Value::Int(1)], &["1".into()]).unwrap().is_none());
        builder_method(&mut buf, "insert", &[Value::Int(0), Value::str(">")], &["0".into(), ">".into()]).unwrap();
        assert_eq!(buf, ">abc1");
        builder_method(&mut buf, "reverse", &[], &[]).unwrap();
        assert_eq!(buf, "1cba>");
        builder_method(&mut buf, "deleteCharAt", &[Value::Int(0)], &["0".into()]).unwrap();
        builder_method(&mut buf, "setCharAt", &[Value::Int(0), Value::Char('C')], &["0".into(), "C".into()]).unwrap();
        assert_eq!(buf, "Cba>");
        let len = builder_method(&mut buf, "length", &[], &[]).unwrap();
        assert!(matches!(len, Some(Value::Int(4))));
    }
}
