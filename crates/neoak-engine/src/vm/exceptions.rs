//! Built-in exception taxonomy.
//!
//! A fixed table of (name, parent) nodes rooted at `Throwable`. User classes
//! join the taxonomy through their `extends` link.

/// Built-in throwable nodes as `(name, parent)`.
pub const TAXONOMY: &[(&str, &str)] = &[
    ("Throwable", "Object"),
    ("Exception", "Throwable"),
    ("Error", "Throwable"),
    // checked
    ("IOException", "Exception"),
    ("FileNotFoundException", "IOException"),
    ("FileSystemException", "IOException"),
    ("NoSuchFileException", "FileSystemException"),
    ("FileAlreadyExistsException", "FileSystemException"),
    ("InterruptedException", "Exception"),
    ("CloneNotSupportedException", "Exception"),
    ("ReflectiveOperationException", "Exception"),
    ("IllegalAccessException", "ReflectiveOperationException"),
    ("InstantiationException", "ReflectiveOperationException"),
    ("ClassNotFoundException", "ReflectiveOperationException"),
    // unchecked
    ("RuntimeException", "Exception"),
    ("ArithmeticException", "RuntimeException"),
    ("ArrayStoreException", "RuntimeException"),
    ("ClassCastException", "RuntimeException"),
    ("IllegalArgumentException", "RuntimeException"),
    ("NumberFormatException", "IllegalArgumentException"),
    ("IllegalFormatException", "IllegalArgumentException"),
    ("IllegalFormatConversionException", "IllegalFormatException"),
    ("MissingFormatArgumentException", "IllegalFormatException"),
    ("UnknownFormatConversionException", "IllegalFormatException"),
    ("IllegalStateException", "RuntimeException"),
    ("IndexOutOfBoundsException", "RuntimeException"),
    ("ArrayIndexOutOfBoundsException", "IndexOutOfBoundsException"),
    ("StringIndexOutOfBoundsException", "IndexOutOfBoundsException"),
    ("NegativeArraySizeException", "RuntimeException"),
    ("NullPointerException", "RuntimeException"),
    ("UnsupportedOperationException", "RuntimeException"),
    ("NoSuchElementException", "RuntimeException"),
    ("InputMismatchException", "NoSuchElementException"),
    ("ConcurrentModificationException", "RuntimeException"),
    ("UncheckedIOException", "RuntimeException"),
    // errors
    ("VirtualMachineError", "Error"),
    ("StackOverflowError", "VirtualMachineError"),
    ("OutOfMemoryError", "VirtualMachineError"),
    ("AssertionError", "Error"),
    ("LinkageError", "Error"),
    ("ExceptionInInitializerError", "LinkageError"),
    ("NoClassDefFoundError", "LinkageError"),
    ("IncompatibleClassChangeError", "LinkageError"),
    ("NoSuchMethodError", "IncompatibleClassChangeError"),
    ("NoSuchFieldError", "IncompatibleClassChangeError"),
];

/// Java package of a built-in throwable, used in rendered names.
pub fn package_of(name: &str) -> &'static str {
    match name {
        "IOException" | "FileNotFoundException" | "UncheckedIOException" => "java.io",
        "FileSystemException" | "NoSuchFileException" | "FileAlreadyExistsException" => {
            "java.nio.file"
        }
        "NoSuchElementException"
        | "InputMismatchException"
        | "ConcurrentModificationException"
        | "IllegalFormatException"
        | "IllegalFormatConversionException"
        | "MissingFormatArgumentException"
        | "UnknownFormatConversionException" => "java.util",
        _ => "java.lang",
    }
}

/// Parent of a built-in throwable.
pub fn parent_of(name: &str) -> Option<&'static str> {
    TAXONOMY.iter().find(|(n, _)| *n == name).map(|(_, p)| *p)
}

/// Returns true if `name` is a built-in throwable.
pub fn is_builtin_throwable(name: &str) -> bool {
    parent_of(name).is_some()
}
