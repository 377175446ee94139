//! Multi-file projects: discovery order, entry precedence, packages,
//! excluded material, and `neoak.toml`.

use super::harness::*;

#[test]
fn test_classes_across_files_and_packages() {
    let project = Project::new();
    project
        .file(
            "Main.java",
            r#"package app;

import shapes.Circle;
import shapes.Shape;

public class Main {
    public static void main(String[] args) {
        Shape[] shapes = { new Circle(1), new Rect(2, 3) };
        double total = 0;
        for (Shape s : shapes) {
            total += s.area();
            System.out.println(s.name());
        }
        System.out.println(total > 9.0);
    }
}
"#,
        )
        .file(
            "shapes/Shape.java",
            "package shapes;\n\npublic interface Shape {\n    double area();\n    String name();\n}\n",
        )
        .file(
            "shapes/Circle.java",
            r#"package shapes;

public class Circle implements Shape {
    private final double r;

    public Circle(double r) {
        this.r = r;
    }

    public double area() {
        return Math.PI * r * r;
    }

    public String name() {
        return "circle";
    }
}
"#,
        )
        .file(
            "Rect.java",
            r#"package app;

import shapes.Shape;

class Rect implements Shape {
    private int w, h;

    Rect(int w, int h) {
        this.w = w;
        this.h = h;
    }

    public double area() { return w * h; }

    public String name() { return "rect " + w + "x" + h; }
}
"#,
        );
    let outcome = project.run().unwrap();
    assert_eq!(outcome.exit_code, 0, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, "circle\nrect 2x3\ntrue\n");
}

#[test]
fn test_nk_entry_takes_precedence() {
    let project = Project::new();
    project
        .file(
            "Main.java",
            "public class Main { public static void main(String[] args) { System.out.println(\"java\"); } }\n",
        )
        .file(
            "src/Main.nk",
            "public class Launcher { public static void main(String[] args) { System.out.println(\"nk\"); } }\n",
        );
    let outcome = project.run().unwrap();
    assert_eq!(outcome.stdout, "nk\n");
}

#[test]
fn test_excluded_and_hidden_sources_are_not_compiled() {
    let project = Project::with_main(
        "public class Main { public static void main(String[] args) { System.out.println(\"ok\"); } }\n",
    );
    project
        .file("build/Broken.java", "class Broken { this is not java }\n")
        .file(".cache/Old.java", "class Main {}\n")
        .file("target/Gen.java", "enum Gen { A }\n");
    let outcome = project.run().unwrap();
    assert_eq!(outcome.stdout, "ok\n");
}

#[test]
fn test_config_selects_entry_and_excludes() {
    let project = Project::new();
    project
        .file(
            "neoak.toml",
            "[project]\nentry = [\"App.java\"]\nexclude = [\"drafts/**\"]\n",
        )
        .file(
            "App.java",
            "public class App { public static void main(String[] args) { System.out.println(Helper.greet()); } }\n",
        )
        .file("lib/Helper.java", "class Helper { static String greet() { return \"hello\"; } }\n")
        .file("drafts/Helper.java", "class Helper {}\n");
    let outcome = project.run().unwrap();
    assert_eq!(outcome.stdout, "hello\n");
}

#[test]
fn test_file_argument_runs_that_entry() {
    let project = Project::new();
    project
        .file(
            "Main.java",
            "public class Main { public static void main(String[] args) { System.out.println(\"main\"); } }\n",
        )
        .file(
            "Tool.java",
            "public class Tool { public static void main(String[] args) { System.out.println(\"tool \" + Shared.VALUE); } }\n",
        )
        .file("Shared.java", "class Shared { static final int VALUE = 7; }\n");
    let outcome = neoak_runtime::run_path(&project.path("Tool.java"), options("", &[])).unwrap();
    assert_eq!(outcome.stdout, "tool 7\n");
}

#[test]
fn test_static_nested_classes_are_hoisted() {
    expect_output(
        r#"public class Main {
    static class Node {
        int value;
        Node next;

        Node(int value, Node next) {
            this.value = value;
            this.next = next;
        }
    }

    public static void main(String[] args) {
        Node list = null;
        for (int i = 1; i <= 4; i++) {
            list = new Node(i, list);
        }
        int sum = 0;
        for (Node n = list; n != null; n = n.next) {
            sum += n.value;
        }
        System.out.println(sum);
    }
}
"#,
        "10\n",
    );
}

#[test]
fn test_call_depth_setting_is_honored() {
    let project = Project::with_main(
        r#"public class Main {
    static int depth(int n) { return n == 0 ? 0 : 1 + depth(n - 1); }

    public static void main(String[] args) {
        System.out.println(depth(200));
    }
}
"#,
    );
    assert_eq!(project.run().unwrap().stdout, "200\n");

    project.file("neoak.toml", "[run]\nmax_call_depth = 100\nstack_size_mb = 32\n");
    let outcome = project.run().unwrap();
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.uncaught.as_deref(), Some("java.lang.StackOverflowError"));
}
