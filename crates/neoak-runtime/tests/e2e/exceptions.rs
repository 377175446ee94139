//! Exceptions thrown and caught by programs, uncaught traces, and exit
//! status.

use super::harness::*;

#[test]
fn test_custom_exception_hierarchy() {
    expect_output(
        r#"class ValidationException extends Exception {
    private final String field;

    ValidationException(String field, String message) {
        super(message);
        this.field = field;
    }

    String getField() { return field; }
}

class RangeException extends ValidationException {
    RangeException(String field, int value) {
        super(field, value + " out of range");
    }
}

public class Main {
    static void validate(int age) throws ValidationException {
        if (age < 0 || age > 150) throw new RangeException("age", age);
        if (age == 0) throw new ValidationException("age", "zero");
    }

    public static void main(String[] args) {
        int[] inputs = { 30, -4, 0 };
        for (int age : inputs) {
            try {
                validate(age);
                System.out.println("ok " + age);
            } catch (RangeException e) {
                System.out.println("range: " + e.getMessage());
            } catch (ValidationException e) {
                System.out.println(e.getField() + ": " + e.getMessage());
            }
        }
    }
}
"#,
        "ok 30\nrange: -4 out of range\nage: zero\n",
    );
}

#[test]
fn test_rethrow_with_cause() {
    expect_output(
        r#"public class Main {
    static int parse(String text) {
        try {
            return Integer.parseInt(text);
        } catch (NumberFormatException e) {
            throw new IllegalArgumentException("bad number", e);
        }
    }

    public static void main(String[] args) {
        try {
            parse("12x");
        } catch (IllegalArgumentException e) {
            System.out.println(e.getMessage());
            System.out.println(e.getCause().getClass().getSimpleName());
            System.out.println(e.getCause().getMessage());
        }
    }
}
"#,
        "bad number\nNumberFormatException\nFor input string: \"12x\"\n",
    );
}

#[test]
fn test_finally_runs_on_every_path() {
    expect_output(
        r#"public class Main {
    static int attempts;

    static String run(int mode) {
        try {
            attempts++;
            if (mode == 1) return "returned";
            if (mode == 2) throw new RuntimeException("thrown");
            return "normal";
        } catch (RuntimeException e) {
            return "caught " + e.getMessage();
        } finally {
            System.out.println("finally " + mode);
        }
    }

    public static void main(String[] args) {
        for (int mode = 0; mode < 3; mode++) {
            System.out.println(run(mode));
        }
        System.out.println(attempts);
    }
}
"#,
        "finally 0\nnormal\nfinally 1\nreturned\nfinally 2\ncaught thrown\n3\n",
    );
}

#[test]
fn test_uncaught_custom_exception_trace() {
    let project = Project::new();
    project
        .file(
            "Main.java",
            r#"public class Main {
    public static void main(String[] args) {
        Inventory inv = new Inventory();
        inv.take(5);
    }
}
"#,
        )
        .file(
            "Inventory.java",
            r#"class OutOfStockException extends RuntimeException {
    OutOfStockException(String message) { super(message); }
}

class Inventory {
    private int stock = 2;

    void take(int n) {
        if (n > stock) {
            throw new OutOfStockException("wanted " + n + ", have " + stock);
        }
        stock -= n;
    }
}
"#,
        );
    let outcome = project.run().unwrap();
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.stdout, "");
    assert_eq!(outcome.uncaught.as_deref(), Some("OutOfStockException: wanted 5, have 2"));
    assert_eq!(
        outcome.stderr,
        "Exception in thread \"main\" OutOfStockException: wanted 5, have 2\n\
         \tat Inventory.take(Inventory.java:10)\n\
         \tat Main.main(Main.java:4)\n"
    );
}

#[test]
fn test_print_stack_trace_goes_to_stderr() {
    let outcome = run_main(
        r#"public class Main {
    static void fail() {
        throw new IllegalStateException("not ready");
    }

    public static void main(String[] args) {
        try {
            fail();
        } catch (IllegalStateException e) {
            e.printStackTrace();
        }
        System.out.println("after");
    }
}
"#,
    );
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout, "after\n");
    assert_eq!(
        outcome.stderr,
        "java.lang.IllegalStateException: not ready\n\
         \tat Main.fail(Main.java:3)\n\
         \tat Main.main(Main.java:8)\n"
    );
}

#[test]
fn test_runtime_failures_map_to_java_exceptions() {
    expect_output(
        r#"public class Main {
    public static void main(String[] args) {
        int[] a = new int[2];
        String s = null;
        Object o = "text";
        try { a[2] = 1; } catch (ArrayIndexOutOfBoundsException e) { System.out.println(e.getMessage()); }
        try { s.length(); } catch (NullPointerException e) { System.out.println("npe"); }
        try { Integer n = (Integer) o; } catch (ClassCastException e) { System.out.println("cce"); }
        try { System.out.println(1 / 0); } catch (ArithmeticException e) { System.out.println(e.getMessage()); }
        try { int[] bad = new int[-1]; } catch (NegativeArraySizeException e) { System.out.println("negative " + e.getMessage()); }
        try { "abc".substring(5); } catch (StringIndexOutOfBoundsException e) { System.out.println("sioobe"); }
        try { a[0] = 1; throw new Error("custom"); } catch (Throwable t) { System.out.println(t); }
    }
}
"#,
        "Index 2 out of bounds for length 2\nnpe\ncce\n/ by zero\nnegative -1\nsioobe\njava.lang.Error: custom\n",
    );
}

#[test]
fn test_exit_status_from_system_exit() {
    let outcome = run_main(
        r#"public class Main {
    public static void main(String[] args) {
        System.out.println("bye");
        if (args.length == 0) {
            System.exit(42);
        }
        System.out.println("unreachable");
    }
}
"#,
    );
    assert_eq!(outcome.exit_code, 42);
    assert_eq!(outcome.stdout, "bye\n");
    assert_eq!(outcome.uncaught, None);
}
