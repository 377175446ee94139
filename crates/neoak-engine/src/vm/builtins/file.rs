//! `java.io.File`, `java.nio.file.Path`, and `Files`.
//!
//! `File` probes never fail: errors collapse to `false`, `0`, or `null`.
//! `Files` operations raise `IOException` subclasses.

use super::{str_arg, NativeError, NativeResult};
use crate::vm::heap::Heap;
use crate::vm::object::Native;
use crate::vm::value::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Map an I/O error on `path` to a Java exception.
pub fn io_error(path: &Path, err: &std::io::Error) -> NativeError {
    let shown = path.display().to_string();
    match err.kind() {
        ErrorKind::NotFound => NativeError::new("NoSuchFileException", shown),
        ErrorKind::AlreadyExists => NativeError::new("FileAlreadyExistsException", shown),
        _ => NativeError::new("IOException", format!("{}: {}", shown, err)),
    }
}

/// Path held by a `File` or `Path` object, or a plain string.
pub fn path_of(value: &Value) -> NativeResult<PathBuf> {
    match value {
        Value::Str(s) => Ok(PathBuf::from(&**s)),
        Value::Object(obj) => match &*obj.native.borrow() {
            Native::File(p) | Native::Path(p) => Ok(p.clone()),
            _ => Err(NativeError::argument_mismatch()),
        },
        Value::Null => Err(NativeError::bare("NullPointerException")),
        _ => Err(NativeError::argument_mismatch()),
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn text(path: &Path) -> Value {
    Value::str(path.display().to_string())
}

/// Wrap a path in a new `Path` object.
pub fn new_path(heap: &Heap, path: PathBuf) -> Value {
    Value::Object(heap.object("Path", Native::Path(path)))
}

/// Wrap a path in a new `File` object.
pub fn new_file(heap: &Heap, path: PathBuf) -> Value {
    Value::Object(heap.object("File", Native::File(path)))
}

/// Instance method on a `File`.
pub fn file_method(heap: &Heap, path: &Path, name: &str, args: &[Value]) -> NativeResult<Value> {
    let value = match (name, args.len()) {
        ("exists", 0) => Value::Bool(path.exists()),
        ("isDirectory", 0) => Value::Bool(path.is_dir()),
        ("isFile", 0) => Value::Bool(path.is_file()),
        ("canRead" | "canWrite", 0) => Value::Bool(path.exists()),
        ("length", 0) => Value::Int(fs::metadata(path).map_or(0, |m| m.len() as i64)),
        ("lastModified", 0) => Value::Int(
            fs::metadata(path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_millis() as i64),
        ),
        ("getName", 0) => Value::str(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ),
        ("getPath" | "toString", 0) => text(path),
        ("getAbsolutePath", 0) => text(&absolute(path)),
        ("getAbsoluteFile", 0) => new_file(heap, absolute(path)),
        ("getParent", 0) => match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => text(parent),
            None => Value::Null,
        },
        ("getParentFile", 0) => match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => new_file(heap, parent.to_path_buf()),
            None => Value::Null,
        },
        ("mkdir", 0) => Value::Bool(fs::create_dir(path).is_ok()),
        ("mkdirs", 0) => Value::Bool(!path.exists() && fs::create_dir_all(path).is_ok()),
        ("delete", 0) => Value::Bool(if path.is_dir() {
            fs::remove_dir(path).is_ok()
        } else {
            fs::remove_file(path).is_ok()
        }),
        ("createNewFile", 0) => Value::Bool(
            fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .is_ok(),
        ),
        ("list", 0) => match fs::read_dir(path) {
            Ok(entries) => {
                let mut names: Vec<String> = entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                names.sort();
                heap.string_array(names)
            }
            Err(_) => Value::Null,
        },
        ("toPath", 0) => new_path(heap, path.to_path_buf()),
        _ => return Err(NativeError::no_such_method("File", name)),
    };
    Ok(value)
}

/// Instance method on a `Path`.
pub fn path_method(heap: &Heap, path: &Path, name: &str, args: &[Value]) -> NativeResult<Value> {
    let value = match (name, args.len()) {
        ("toString", 0) => text(path),
        ("getFileName", 0) => match path.file_name() {
            Some(n) => new_path(heap, PathBuf::from(n)),
            None => Value::Null,
        },
        ("getParent", 0) => match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => new_path(heap, parent.to_path_buf()),
            None => Value::Null,
        },
        ("toAbsolutePath", 0) => new_path(heap, absolute(path)),
        ("isAbsolute", 0) => Value::Bool(path.is_absolute()),
        ("resolve", 1) => new_path(heap, path.join(path_of(&args[0])?)),
        ("toFile", 0) => new_file(heap, path.to_path_buf()),
        _ => return Err(NativeError::no_such_method("Path", name)),
    };
    Ok(value)
}

/// `Paths.get(first, more...)` / `Path.of(...)`.
pub fn join_path(args: &[Value]) -> NativeResult<PathBuf> {
    let mut path = PathBuf::new();
    for arg in args {
        match arg {
            Value::Array(items) => {
                for item in items.items.borrow().iter() {
                    path.push(path_of(item)?);
                }
            }
            other => path.push(path_of(other)?),
        }
    }
    Ok(path)
}

/// Static method of `Files`.
pub fn files_static(heap: &Heap, name: &str, args: &[Value]) -> NativeResult<Value> {
    let path = match args.first() {
        Some(first) => path_of(first)?,
        None => return Err(NativeError::no_such_method("Files", name)),
    };
    let value = match (name, args.len()) {
        ("exists", _) => Value::Bool(path.exists()),
        ("notExists", _) => Value::Bool(!path.exists()),
        ("isDirectory", _) => Value::Bool(path.is_dir()),
        ("isRegularFile", _) => Value::Bool(path.is_file()),
        ("readString", 1) => match fs::read_to_string(&path) {
            Ok(content) => Value::str(content),
            Err(e) => return Err(io_error(&path, &e)),
        },
        ("writeString", 2) => {
            let content = str_arg(args, 1)?;
            fs::write(&path, content.as_bytes()).map_err(|e| io_error(&path, &e))?;
            new_path(heap, path)
        }
        ("createDirectories", 1) => {
            fs::create_dir_all(&path).map_err(|e| io_error(&path, &e))?;
            new_path(heap, path)
        }
        ("createDirectory", 1) => {
            fs::create_dir(&path).map_err(|e| io_error(&path, &e))?;
            new_path(heap, path)
        }
        ("createFile", 1) => {
            fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| io_error(&path, &e))?;
            new_path(heap, path)
        }
        ("size", 1) => Value::Int(
            fs::metadata(&path)
                .map_err(|e| io_error(&path, &e))?
                .len() as i64,
        ),
        ("delete", 1) => {
            let removed = if path.is_dir() {
                fs::remove_dir(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| io_error(&path, &e))?;
            Value::Null
        }
        ("deleteIfExists", 1) => Value::Bool(if path.is_dir() {
            fs::remove_dir(&path).is_ok()
        } else {
            fs::remove_file(&path).is_ok()
        }),
        _ => return Err(NativeError::no_such_method("Files", name)),
    };
    Ok(value)
}
