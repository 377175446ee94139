//! Compile-time diagnostics and exit status for failures before a program
//! starts.

use super::harness::*;
use neoak_runtime::{CheckReport, RuntimeError, EXIT_COMPILE, EXIT_DISCOVERY};

#[test]
fn test_check_reports_every_diagnostic() {
    let (code, lines) = expect_diagnostics(
        r#"interface Shape {
    double area();
}

class Square implements Shape {
    double side;
}

public class Main {
    public static void main(String[] args) {
        int x = 1
        Shape s = new Shape();
        System.out.println(x);
    }
}
"#,
    );
    assert_eq!(code, EXIT_COMPILE);
    assert_eq!(
        lines,
        vec![
            "';' expected at Main.java:11 (in Main.main)".to_string(),
            "Square is not abstract and does not override abstract method area() in Shape at Main.java:5 (in Square)"
                .to_string(),
            "Shape is abstract; cannot be instantiated at Main.java:12 (in Main.main)".to_string(),
        ]
    );
}

#[test]
fn test_unknown_superclass() {
    let (code, lines) = expect_diagnostics(
        "class Child extends Missing {}\n\npublic class Main { public static void main(String[] args) {} }\n",
    );
    assert_eq!(code, EXIT_COMPILE);
    assert_eq!(lines, vec!["cannot find symbol: class Missing at Main.java:1 (in Child)".to_string()]);
}

#[test]
fn test_parse_errors_name_the_file() {
    let project = Project::with_main(
        "public class Main { public static void main(String[] args) { System.out.println(Color.RED); } }\n",
    );
    project.file("Color.java", "enum Color { RED }\n");
    let err = project.run().unwrap_err();
    assert!(matches!(err, RuntimeError::Parse(_)));
    assert_eq!(err.exit_code(), EXIT_COMPILE);
    assert_eq!(err.diagnostics(), vec!["enum declaration is not supported at Color.java:1".to_string()]);
}

#[test]
fn test_static_context_is_a_compile_error() {
    let (code, lines) = expect_diagnostics(
        r#"public class Main {
    int count;

    public static void main(String[] args) {
        count = 3;
    }
}
"#,
    );
    assert_eq!(code, EXIT_COMPILE);
    assert_eq!(
        lines,
        vec!["non-static variable count cannot be referenced from a static context at Main.java:5 (in Main.main)"
            .to_string()]
    );
}

#[test]
fn test_missing_main_method() {
    let (code, lines) = expect_diagnostics("public class Main { static void helper() {} }\n");
    assert_eq!(code, EXIT_COMPILE);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("no entry point"), "{}", lines[0]);
}

#[test]
fn test_missing_entry_file_is_a_discovery_error() {
    let project = Project::new();
    project.file("Helper.java", "class Helper {}\n");
    let err = project.run().unwrap_err();
    assert!(matches!(err, RuntimeError::Discovery(_)));
    assert_eq!(err.exit_code(), EXIT_DISCOVERY);
    assert!(err.to_string().starts_with("no entry file (Main.nk, Main.nk.java, Main.java)"));
}

#[test]
fn test_missing_path_and_bad_config() {
    let project = Project::new();
    let err = neoak_runtime::run_path(&project.path("nowhere"), options("", &[])).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_DISCOVERY);
    assert!(err.to_string().starts_with("path not found"));

    let project = Project::with_main("public class Main { public static void main(String[] a) {} }\n");
    project.file("neoak.toml", "[project]\nentries = [\"Main.java\"]\n");
    let err = project.run().unwrap_err();
    assert_eq!(err.exit_code(), EXIT_DISCOVERY);
    assert!(err.to_string().starts_with("failed to parse"), "{}", err);
}

#[test]
fn test_check_counts_units_and_classes() {
    let project = Project::with_main(
        "public class Main { public static void main(String[] args) { new Util(); } }\n",
    );
    project.file("util/Util.java", "class Util {}\ninterface Marker {}\n");
    assert_eq!(project.check().unwrap(), CheckReport { units: 2, classes: 3 });
}

#[test]
fn test_check_does_not_run_the_program() {
    let project = Project::with_main(
        "public class Main { public static void main(String[] args) { System.exit(9); } }\n",
    );
    assert_eq!(project.check().unwrap(), CheckReport { units: 1, classes: 1 });
}
