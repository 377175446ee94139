//! Names of the built-in classes and interfaces known to every program.

use crate::vm::exceptions::is_builtin_throwable;

/// How a built-in type may be used from source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// `Object`, the root
    Root,
    /// Member of the exception taxonomy; constructible and extendable
    Throwable,
    /// Constructible with `new`, not extendable
    Constructible,
    /// Only reachable through static members or returned values
    Utility,
    /// Marker interface; may be implemented, never instantiated
    Interface,
}

const CONSTRUCTIBLE: &[&str] = &["Scanner", "File", "StringBuilder", "String", "Object"];

const UTILITY: &[&str] = &[
    "System", "Math", "Integer", "Long", "Double", "Float", "Short", "Byte", "Boolean",
    "Character", "Number", "Arrays", "Files", "Paths", "Path", "Thread", "Objects", "Class",
    "PrintStream", "InputStream",
];

const INTERFACES: &[&str] = &[
    "Comparable",
    "Runnable",
    "Cloneable",
    "Serializable",
    "Iterable",
    "AutoCloseable",
    "Closeable",
    "CharSequence",
];

/// Classify a built-in name.
pub fn builtin_kind(name: &str) -> Option<BuiltinKind> {
    if name == "Object" {
        Some(BuiltinKind::Root)
    } else if is_builtin_throwable(name) {
        Some(BuiltinKind::Throwable)
    } else if CONSTRUCTIBLE.contains(&name) {
        Some(BuiltinKind::Constructible)
    } else if UTILITY.contains(&name) {
        Some(BuiltinKind::Utility)
    } else if INTERFACES.contains(&name) {
        Some(BuiltinKind::Interface)
    } else {
        None
    }
}

/// Returns true for any built-in type name.
pub fn is_builtin(name: &str) -> bool {
    builtin_kind(name).is_some()
}

/// Returns true if a user class may `extends` this built-in.
pub fn is_extendable(name: &str) -> bool {
    matches!(
        builtin_kind(name),
        Some(BuiltinKind::Root | BuiltinKind::Throwable)
    )
}

/// Returns true for built-in interfaces.
pub fn is_builtin_interface(name: &str) -> bool {
    builtin_kind(name) == Some(BuiltinKind::Interface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(builtin_kind("Object"), Some(BuiltinKind::Root));
        assert_eq!(builtin_kind("IOException"), Some(BuiltinKind::Throwable));
        assert_eq!(builtin_kind("Scanner"), Some(BuiltinKind::Constructible));
        assert_eq!(builtin_kind("Math"), Some(BuiltinKind::Utility));
        assert_eq!(builtin_kind("Comparable"), Some(BuiltinKind::Interface));
        assert_eq!(builtin_kind("Dog"), None);
        assert!(is_extendable("RuntimeException"));
        assert!(!is_extendable("Scanner"));
    }
}
