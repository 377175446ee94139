//! Integration tests for the NeOak interpreter
//!
//! Tests cover:
//! - Java `+` semantics and numeric behavior
//! - Overload selection and inherited overloads
//! - Static initialization order and once-only semantics
//! - Constructor chaining and field initializer order
//! - Access control on instance members
//! - try/catch/finally and multi-catch
//! - Uncaught exception traces and exit codes
//! - Scanner over standard input
//! - Emit-then-exec equivalence

use neoak_engine::compiler::{from_json, to_json};
use neoak_engine::{check, lower, parse_unit, Program, RunOutcome, SourceUnit, Vm, VmOptions};

// ============================================================================
// Harness
// ============================================================================

fn compile(sources: &[(&str, &str)]) -> Program {
    let units: Vec<_> = sources
        .iter()
        .map(|(path, text)| parse_unit(&SourceUnit::preprocess(*path, text)).expect("parse"))
        .collect();
    check(&units).expect("check");
    lower(&units).expect("lower")
}

fn execute(program: Program, stdin: &str, args: &[&str]) -> RunOutcome {
    let options = VmOptions {
        args: args.iter().map(|a| a.to_string()).collect(),
        stdin: Some(stdin.to_string()),
        capture_output: true,
        ..VmOptions::default()
    };
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || Vm::new(&program, options).run().expect("vm"))
        .expect("spawn")
        .join()
        .expect("join")
}

fn run_files(sources: &[(&str, &str)]) -> RunOutcome {
    execute(compile(sources), "", &[])
}

fn run(source: &str) -> RunOutcome {
    run_files(&[("Main.java", source)])
}

fn output(source: &str) -> String {
    let outcome = run(source);
    assert_eq!(outcome.exit_code, 0, "stderr: {}", outcome.stderr);
    outcome.stdout
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_plus_is_left_to_right() {
    let out = output(
        r#"public class Main {
    public static void main(String[] args) {
        System.out.println(1 + 2);
        System.out.println("A" + 2);
        System.out.println(1 + 2 + "x" + 3);
        System.out.println("x" + 1 + 2);
        String s = "n=";
        s += 4;
        System.out.println(s);
    }
}"#,
    );
    assert_eq!(out, "3\nA2\n3x3\nx12\nn=4\n");
}

#[test]
fn test_integer_and_double_arithmetic() {
    let out = output(
        r#"public class Main {
    public static void main(String[] args) {
        int a = 7;
        System.out.println(a / 2);
        System.out.println(a % 3);
        System.out.println(a / 2.0);
        double d = 3;
        System.out.println(d);
        System.out.println((int) 3.9);
        int total = 0;
        for (int i = 1; i <= 10; i++) {
            total += i;
        }
        System.out.println(total);
    }
}"#,
    );
    assert_eq!(out, "3\n1\n3.5\n3.0\n3\n55\n");
}

#[test]
fn test_division_by_zero_is_arithmetic_exception() {
    let out = output(
        r#"public class Main {
    public static void main(String[] args) {
        try {
            int zero = 0;
            System.out.println(10 / zero);
        } catch (ArithmeticException e) {
            System.out.println(e.getMessage());
        }
    }
}"#,
    );
    assert_eq!(out, "/ by zero\n");
}

#[test]
fn test_string_equality_and_hash() {
    let out = output(
        r#"public class Main {
    public static void main(String[] args) {
        String a = "hello";
        String b = "hel" + "lo";
        System.out.println(a.equals(b));
        System.out.println("abc".hashCode());
        System.out.println(a.length() + " " + a.charAt(1) + " " + a.toUpperCase());
    }
}"#,
    );
    assert_eq!(out, "true\n96354\n5 e HELLO\n");
}

// ============================================================================
// Overloads
// ============================================================================

#[test]
fn test_first_declared_overload_wins() {
    let out = output(
        r#"public class Main {
    static String describe(Object o) { return "object"; }
    static String describe(String s) { return "string"; }
    static String describe(int n) { return "int"; }
    static String describe(int n, int m) { return "pair"; }

    public static void main(String[] args) {
        System.out.println(describe("x"));
        System.out.println(describe(3));
        System.out.println(describe(1, 2));
    }
}"#,
    );
    assert_eq!(out, "object\nobject\npair\n");
}

#[test]
fn test_overloads_by_coarse_type() {
    let out = output(
        r#"public class Main {
    static String show(int n) { return "number " + n; }
    static String show(String s) { return "text " + s; }
    static String show(boolean b) { return "flag " + b; }

    public static void main(String[] args) {
        System.out.println(show("a"));
        System.out.println(show(true));
        System.out.println(show(2));
    }
}"#,
    );
    assert_eq!(out, "text a\nflag true\nnumber 2\n");
}

#[test]
fn test_null_argument_for_boxed_parameter() {
    let out = output(
        r#"public class Main {
    static String describe(int n) { return "int " + n; }
    static String describe(Integer n) { return n == null ? "missing" : "boxed " + n; }

    static String flag(Boolean b) { return "flag " + b; }

    public static void main(String[] args) {
        System.out.println(describe(3));
        System.out.println(describe(null));
        System.out.println(flag(null));
        System.out.println(flag(false));
    }
}"#,
    );
    assert_eq!(out, "int 3\nmissing\nflag null\nflag false\n");
}

#[test]
fn test_inherited_overloads_and_overrides() {
    let out = output(
        r#"class Animal {
    String sound() { return "..."; }
    String greet(String name) { return "hi " + name; }
}

class Dog extends Animal {
    String sound() { return "woof"; }
    String greet(int times) { return "wag x" + times; }
}

public class Main {
    public static void main(String[] args) {
        Animal a = new Dog();
        Dog d = new Dog();
        System.out.println(a.sound());
        System.out.println(d.greet("rex"));
        System.out.println(d.greet(2));
    }
}"#,
    );
    assert_eq!(out, "woof\nhi rex\nwag x2\n");
}

#[test]
fn test_unmatched_call_is_no_such_method() {
    let outcome = run(
        r#"class Util {
    static int twice(int n) { return n * 2; }
}

public class Main {
    public static void main(String[] args) {
        System.out.println(Util.twice(true));
    }
}"#,
    );
    assert_eq!(outcome.exit_code, 1);
    assert!(
        outcome.stderr.starts_with("Exception in thread \"main\" java.lang.NoSuchMethodError"),
        "{}",
        outcome.stderr
    );
}

// ============================================================================
// Static initialization
// ============================================================================

#[test]
fn test_static_block_runs_once_after_field_initializers() {
    let out = output(
        r#"class Config {
    static int base = trace("field");
    static int count;

    static {
        System.out.println("block base=" + base);
        count = base + 1;
    }

    static int trace(String what) {
        System.out.println(what);
        return 41;
    }
}

public class Main {
    public static void main(String[] args) {
        System.out.println("start");
        System.out.println(Config.count);
        System.out.println(Config.count);
        Config.count = 5;
        System.out.println(Config.base + Config.count);
    }
}"#,
    );
    assert_eq!(out, "start\nfield\nblock base=41\n42\n42\n46\n");
}

#[test]
fn test_superclass_initializes_first() {
    let out = output(
        r#"class Base {
    static { System.out.println("Base"); }
}

class Derived extends Base {
    static { System.out.println("Derived"); }
    static void touch() {}
}

public class Main {
    public static void main(String[] args) {
        Derived.touch();
        Derived.touch();
        new Derived();
    }
}"#,
    );
    assert_eq!(out, "Base\nDerived\n");
}

#[test]
fn test_failed_static_initializer() {
    let out = output(
        r#"class Broken {
    static int value = 1 / 0;
    static int get() { return value; }
}

public class Main {
    public static void main(String[] args) {
        try {
            Broken.get();
        } catch (ExceptionInInitializerError e) {
            System.out.println("first: " + e.getCause());
        }
        try {
            Broken.get();
        } catch (NoClassDefFoundError e) {
            System.out.println("second: " + e.getMessage());
        }
    }
}"#,
    );
    assert_eq!(
        out,
        "first: java.lang.ArithmeticException: / by zero\nsecond: Could not initialize class Broken\n"
    );
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_implicit_super_and_field_init_order() {
    let out = output(
        r#"class A {
    int a = log("A.field");
    { log("A.block"); }
    A() { log("A()"); }
    static int log(String s) {
        System.out.println(s);
        return 1;
    }
}

class B extends A {
    int b = log("B.field");
    B() { log("B()"); }
}

class C extends B {
    int c = log("C.field");
    C(int x) { log("C(" + x + ")"); }
}

public class Main {
    public static void main(String[] args) {
        new C(7);
    }
}"#,
    );
    assert_eq!(out, "A.field\nA.block\nB.field\nC.field\nA()\nB()\nC(7)\n");
}

#[test]
fn test_constructor_chaining_with_this_and_super() {
    let out = output(
        r#"class Point {
    protected int x;
    protected int y;

    Point(int x, int y) {
        this.x = x;
        this.y = y;
    }

    Point() {
        this(0, 0);
    }

    public String toString() {
        return "(" + x + ", " + y + ")";
    }
}

class Pixel extends Point {
    private String color;

    Pixel(int x, int y, String color) {
        super(x, y);
        this.color = color;
    }

    public String toString() {
        return super.toString() + " " + color;
    }
}

public class Main {
    public static void main(String[] args) {
        System.out.println(new Point());
        System.out.println(new Pixel(3, 4, "red"));
    }
}"#,
    );
    assert_eq!(out, "(0, 0)\n(3, 4) red\n");
}

#[test]
fn test_abstract_instantiation_backstop_at_run_time() {
    // the checker is skipped here so the VM backstop is exercised
    let unit = parse_unit(&SourceUnit::preprocess(
        "Main.java",
        r#"abstract class Shape {
    abstract double area();
}

public class Main {
    public static void main(String[] args) {
        Shape s = new Shape();
    }
}"#,
    ))
    .unwrap();
    assert!(check(&[unit.clone()]).is_err());
    let program = lower(&[unit]).unwrap();
    let outcome = execute(program, "", &[]);
    assert_eq!(outcome.exit_code, 1);
    assert!(
        outcome.stderr.contains("java.lang.InstantiationException"),
        "{}",
        outcome.stderr
    );
}

#[test]
fn test_equality_identity_and_overrides() {
    let out = output(
        r#"class Plain {}

class Money {
    private int cents;
    Money(int cents) { this.cents = cents; }
    public boolean equals(Object other) {
        if (!(other instanceof Money)) return false;
        return ((Money) other).cents == cents;
    }
    public int hashCode() { return cents; }
}

public class Main {
    public static void main(String[] args) {
        Plain p = new Plain();
        System.out.println(p.equals(p) + " " + p.equals(new Plain()));
        System.out.println(new Money(5).equals(new Money(5)));
        System.out.println(new Money(5) == new Money(5));
        System.out.println(new Money(9).hashCode());
        System.out.println(p.getClass().getName());
        System.out.println(p.getClass() == new Plain().getClass());
        System.out.println(p.toString().startsWith("Plain@"));
    }
}"#,
    );
    assert_eq!(out, "true false\ntrue\nfalse\n9\nPlain\ntrue\ntrue\n");
}

// ============================================================================
// Access control
// ============================================================================

#[test]
fn test_private_member_denied_from_unrelated_class() {
    let out = output(
        r#"class Vault {
    private int secret = 42;
    private int peek() { return secret; }
}

public class Main {
    public static void main(String[] args) {
        Vault v = new Vault();
        try {
            System.out.println(v.secret);
        } catch (IllegalAccessException e) {
            System.out.println("field denied");
        }
        try {
            v.peek();
        } catch (Exception e) {
            System.out.println(e.getClass().getSimpleName());
        }
    }
}"#,
    );
    assert_eq!(out, "field denied\nIllegalAccessException\n");
}

#[test]
fn test_protected_member_from_subclass_and_stranger() {
    let out = output(
        r#"class Account {
    protected int balance = 10;
    protected void deposit(int n) { balance += n; }
    public int getBalance() { return balance; }
}

class Savings extends Account {
    void addInterest() {
        deposit(balance / 10);
    }
}

class Stranger {
    void poke(Account a) {
        a.deposit(1);
    }
}

public class Main {
    public static void main(String[] args) {
        Savings s = new Savings();
        s.addInterest();
        System.out.println(s.getBalance());
        try {
            new Stranger().poke(s);
            System.out.println("allowed");
        } catch (IllegalAccessException e) {
            System.out.println(e.getMessage());
        }
    }
}"#,
    );
    assert_eq!(
        out,
        "11\nclass Stranger cannot access a protected method Account.deposit\n"
    );
}

#[test]
fn test_static_members_are_not_access_checked() {
    let outcome = run_files(&[
        (
            "Main.java",
            r#"public class Main {
    public static void main(String[] args) {
        System.out.println(Util.hidden);
        System.out.println(Util.secret() + 1);
        System.out.println(Calc.twice(4));
    }
}
"#,
        ),
        (
            "Util.java",
            "class Util {\n    private static int hidden = 1;\n    private static int secret() { return 41; }\n}\n",
        ),
        (
            "util/Calc.java",
            "package util;\n\nclass Calc {\n    static int twice(int n) { return n * 2; }\n}\n",
        ),
    ]);
    assert_eq!(outcome.stderr, "");
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout, "1\n42\n8\n");
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_finally_runs_once_for_every_exit() {
    let out = output(
        r#"public class Main {
    static int counter = 0;

    static int viaReturn() {
        try {
            return 1;
        } finally {
            counter++;
        }
    }

    static void viaThrow() {
        try {
            throw new IllegalStateException("boom");
        } finally {
            counter++;
        }
    }

    public static void main(String[] args) {
        viaReturn();
        try {
            viaThrow();
        } catch (IllegalStateException e) {
            System.out.println("caught " + e.getMessage());
        }
        for (int i = 0; i < 3; i++) {
            try {
                if (i == 0) continue;
                if (i == 1) break;
            } finally {
                counter++;
            }
        }
        try {
            counter += 10;
        } finally {
            counter++;
        }
        System.out.println(counter);
    }
}"#,
    );
    assert_eq!(out, "caught boom\n15\n");
}

#[test]
fn test_multi_catch_and_hierarchy() {
    let out = output(
        r#"import java.io.IOException;

class AppException extends RuntimeException {
    AppException(String message) { super(message); }
}

public class Main {
    static void fail(int which) throws Exception {
        if (which == 0) throw new AppException("app");
        if (which == 1) throw new IOException("io");
        int[] xs = new int[1];
        xs[which] = 1;
    }

    public static void main(String[] args) {
        for (int i = 0; i < 3; i++) {
            try {
                fail(i);
            } catch (AppException | IOException e) {
                System.out.println("first " + e);
            } catch (RuntimeException e) {
                System.out.println("second " + e.getMessage());
            } catch (Exception e) {
                System.out.println("never");
            }
        }
    }
}"#,
    );
    assert_eq!(
        out,
        "first AppException: app\nfirst java.io.IOException: io\nsecond Index 2 out of bounds for length 1\n"
    );
}

#[test]
fn test_exception_cause_and_stack_trace() {
    let out = output(
        r#"public class Main {
    public static void main(String[] args) {
        RuntimeException wrapped = new RuntimeException("outer", new IllegalArgumentException("inner"));
        System.out.println(wrapped.getCause().getMessage());
        System.out.println(wrapped.getStackTrace().length > 0);
    }
}"#,
    );
    assert_eq!(out, "inner\ntrue\n");
}

// ============================================================================
// Uncaught failures and exit codes
// ============================================================================

#[test]
fn test_uncaught_trace_uses_source_lines() {
    let outcome = run_files(&[
        (
            "Main.java",
            "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"before\");\n        Calc.divide(4, 0);\n    }\n}\n",
        ),
        (
            "util/Calc.java",
            "package util;\n\nclass Calc {\n    static int divide(int a, int b) {\n        return a / b;\n    }\n}\n",
        ),
    ]);
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.stdout, "before\n");
    assert_eq!(
        outcome.stderr,
        "Exception in thread \"main\" java.lang.ArithmeticException: / by zero\n\
         \tat util.Calc.divide(Calc.java:5)\n\
         \tat Main.main(Main.java:4)\n"
    );
    assert_eq!(
        outcome.uncaught.as_deref(),
        Some("java.lang.ArithmeticException: / by zero")
    );
}

#[test]
fn test_system_exit_code() {
    let outcome = run(
        r#"public class Main {
    public static void main(String[] args) {
        System.out.println("bye");
        try {
            System.exit(3);
        } finally {
            System.out.println("not printed");
        }
    }
}"#,
    );
    assert_eq!(outcome.exit_code, 3);
    assert_eq!(outcome.stdout, "bye\n");
    assert!(outcome.uncaught.is_none());
}

#[test]
fn test_deep_recursion_is_stack_overflow() {
    let out = output(
        r#"public class Main {
    static int depth(int n) { return depth(n + 1); }

    public static void main(String[] args) {
        try {
            depth(0);
        } catch (StackOverflowError e) {
            System.out.println("overflow");
        }
    }
}"#,
    );
    assert_eq!(out, "overflow\n");
}

#[test]
fn test_null_receiver_message() {
    let outcome = run(
        r#"public class Main {
    public static void main(String[] args) {
        String s = null;
        s.length();
    }
}"#,
    );
    assert_eq!(outcome.exit_code, 1);
    assert!(
        outcome
            .stderr
            .starts_with("Exception in thread \"main\" java.lang.NullPointerException"),
        "{}",
        outcome.stderr
    );
    assert!(outcome.stderr.contains("\tat Main.main(Main.java:4)"));
}

// ============================================================================
// Library surface
// ============================================================================

#[test]
fn test_scanner_reads_stdin() {
    let program = compile(&[(
        "Main.java",
        r#"import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        int n = in.nextInt();
        int sum = 0;
        for (int i = 0; i < n; i++) {
            sum += in.nextInt();
        }
        in.nextLine();
        String name = in.nextLine();
        System.out.println(name + ": " + sum);
        System.out.println(in.hasNextLine());
    }
}"#,
    )]);
    let outcome = execute(program, "3\n10 20 30\nAda Lovelace\n", &[]);
    assert_eq!(outcome.stdout, "Ada Lovelace: 60\nfalse\n");
}

#[test]
fn test_scanner_mismatch_and_exhaustion() {
    let program = compile(&[(
        "Main.java",
        r#"import java.util.*;

public class Main {
    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        try {
            in.nextInt();
        } catch (InputMismatchException e) {
            System.out.println("mismatch " + in.next());
        }
        try {
            in.next();
        } catch (NoSuchElementException e) {
            System.out.println("exhausted");
        }
    }
}"#,
    )]);
    let outcome = execute(program, "abc", &[]);
    assert_eq!(outcome.stdout, "mismatch abc\nexhausted\n");
}

#[test]
fn test_program_arguments() {
    let program = compile(&[(
        "Main.java",
        r#"public class Main {
    public static void main(String[] args) {
        System.out.println(args.length);
        for (String arg : args) {
            System.out.println(arg);
        }
    }
}"#,
    )]);
    let outcome = execute(program, "", &["one", "two"]);
    assert_eq!(outcome.stdout, "2\none\ntwo\n");
}

#[test]
fn test_string_builder_format_and_arrays() {
    let out = output(
        r#"import java.util.Arrays;

public class Main {
    public static void main(String[] args) {
        StringBuilder sb = new StringBuilder();
        for (int i = 0; i < 3; i++) {
            sb.append(i).append(',');
        }
        System.out.println(sb.toString());
        System.out.println(String.format("%d-%s-%.2f", 7, "x", 1.5));
        System.out.printf("%5d|%n", 42);
        int[] xs = {5, 3, 9, 1};
        Arrays.sort(xs);
        System.out.println(Arrays.toString(xs));
        System.out.println(String.join("/", "a", "b", "c"));
        System.out.println(Math.max(3, 8) + " " + Math.abs(-2.5));
        System.out.println(Integer.parseInt("123") + 1);
    }
}"#,
    );
    assert_eq!(out, "0,1,2,\n7-x-1.50\n   42|\n[1, 3, 5, 9]\na/b/c\n8 2.5\n124\n");
}

#[test]
fn test_string_from_char_range_and_wide_format() {
    let out = output(
        r#"public class Main {
    public static void main(String[] args) {
        char[] cs = {'h', 'e', 'l', 'l', 'o'};
        System.out.println(new String(cs, 1, 3));
        System.out.println(new String(cs, 5, 0).isEmpty());
        try {
            new String(cs, 3, 4);
        } catch (StringIndexOutOfBoundsException e) {
            System.out.println(e.getMessage());
        }
        try {
            new String(cs, 1, Long.MAX_VALUE);
        } catch (IndexOutOfBoundsException e) {
            System.out.println("too long");
        }
        try {
            String wide = String.format("%.70000f", 1.0);
            System.out.println(wide.length() + " " + wide.substring(0, 4));
        } catch (Exception e) {
            System.out.println("failed");
        }
    }
}"#,
    );
    assert_eq!(
        out,
        "ell\ntrue\noffset 3, count 4, length 5\ntoo long\n70002 1.00\n"
    );
}

#[test]
fn test_switch_with_fallthrough_and_labels() {
    let out = output(
        r#"public class Main {
    static String name(int day) {
        String result = "";
        switch (day) {
            case 1:
                result += "one";
            case 2:
                result += "two";
                break;
            case 3:
                return "three";
            default:
                result = "other";
        }
        return result;
    }

    public static void main(String[] args) {
        System.out.println(name(1) + " " + name(2) + " " + name(3) + " " + name(9));
        outer:
        for (int i = 0; i < 3; i++) {
            for (int j = 0; j < 3; j++) {
                if (j == 2) continue outer;
                if (i == 2) break outer;
                System.out.print(i + "" + j + " ");
            }
        }
        System.out.println();
    }
}"#,
    );
    assert_eq!(out, "onetwo two three other\n00 01 10 11 \n");
}

#[test]
fn test_interfaces_and_abstract_classes() {
    let out = output(
        r#"interface Shape {
    double area();
    default String label() { return "shape " + area(); }
}

abstract class Polygon implements Shape {
    abstract int sides();
    public String toString() { return sides() + " sides"; }
}

class Square extends Polygon {
    private double side;
    Square(double side) { this.side = side; }
    public double area() { return side * side; }
    int sides() { return 4; }
}

public class Main {
    public static void main(String[] args) {
        Shape[] shapes = { new Square(2) };
        for (Shape s : shapes) {
            System.out.println(s.label());
            System.out.println(s);
            System.out.println(s instanceof Polygon);
        }
    }
}"#,
    );
    assert_eq!(out, "shape 4.0\n4 sides\ntrue\n");
}

// ============================================================================
// Artifacts
// ============================================================================

#[test]
fn test_emit_then_exec_matches_direct_run() {
    let sources = [
        (
            "Main.java",
            r#"public class Main {
    static int calls;
    static { calls = 100; }

    public static void main(String[] args) {
        Counter c = new Counter();
        for (int i = 0; i < 4; i++) c.bump();
        System.out.println(c + " " + calls);
        System.out.println(1 + 2 + "x" + 3);
        throw new IllegalStateException("done");
    }
}"#,
        ),
        (
            "Counter.java",
            r#"class Counter {
    private int n;
    void bump() { n++; }
    public String toString() { return "Counter(" + n + ")"; }
}"#,
        ),
    ];
    let program = compile(&sources);
    let json = to_json(&program).unwrap();
    let reloaded = from_json(&json).unwrap();
    assert_eq!(reloaded, program);

    let direct = execute(program, "", &[]);
    let replayed = execute(reloaded, "", &[]);
    assert_eq!(direct, replayed);
    assert_eq!(direct.stdout, "Counter(4) 100\n3x3\n");
    assert_eq!(direct.exit_code, 1);
}

// ============================================================================
// Monitors
// ============================================================================

#[test]
fn test_monitor_calls_never_block() {
    let out = output(
        r#"class Mailbox {
    private String message;

    synchronized void put(String m) {
        message = m;
        notifyAll();
    }

    String take() throws InterruptedException {
        synchronized (this) {
            if (message == null) {
                wait(10);
            }
            notify();
            return message;
        }
    }
}

public class Main {
    public static void main(String[] args) throws InterruptedException {
        Mailbox box = new Mailbox();
        System.out.println(box.take());
        box.put("hi");
        System.out.println(box.take());
    }
}"#,
    );
    assert_eq!(out, "null\nhi\n");
}
