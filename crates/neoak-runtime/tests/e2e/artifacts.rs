//! Emitting IR artifacts and executing them.

use super::harness::*;
use neoak_runtime::{RuntimeError, EXIT_DISCOVERY};

const PROGRAM: &str = r#"import java.util.Scanner;

public class Main {
    static int calls;

    static int square(int n) {
        calls++;
        return n * n;
    }

    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        int sum = 0;
        while (in.hasNextInt()) {
            sum += square(in.nextInt());
        }
        System.out.println(sum + " from " + calls + " values, args=" + args.length);
        if (sum > 100) {
            throw new IllegalStateException("too big: " + sum);
        }
    }
}
"#;

#[test]
fn test_exec_matches_run() {
    let project = Project::with_main(PROGRAM);
    let artifact = project.emit("program.json").unwrap();

    for input in ["1 2 3\n", "", "10 1\n"] {
        let direct = project.run_with(input, &["a", "b"]).unwrap();
        let replayed = neoak_runtime::exec_artifact(&artifact, options(input, &["a", "b"])).unwrap();
        assert_eq!(direct, replayed, "input {:?}", input);
    }
    let empty = project.exec(&artifact).unwrap();
    assert_eq!(empty.stdout, "0 from 0 values, args=0\n");

    let big = neoak_runtime::exec_artifact(&artifact, options("11", &[])).unwrap();
    assert_eq!(big.exit_code, 1);
    assert_eq!(big.stdout, "121 from 1 values, args=0\n");
    assert_eq!(
        big.stderr,
        "Exception in thread \"main\" java.lang.IllegalStateException: too big: 121\n\
         \tat Main.main(Main.java:19)\n"
    );
}

#[test]
fn test_artifact_is_versioned_json() {
    let project = Project::with_main(PROGRAM);
    let artifact = project.emit("program.json").unwrap();
    let text = std::fs::read_to_string(&artifact).unwrap();
    assert!(text.contains("\"version\": 1"), "{}", &text[..text.len().min(200)]);
    assert!(text.contains("\"entry_class\": \"Main\""));
}

#[test]
fn test_exec_honors_config_next_to_artifact() {
    let project = Project::with_main(
        r#"public class Main {
    static int depth(int n) { return n == 0 ? 0 : 1 + depth(n - 1); }

    public static void main(String[] args) {
        System.out.println(depth(300));
    }
}
"#,
    );
    let artifact = project.emit("deep.json").unwrap();
    assert_eq!(project.exec(&artifact).unwrap().stdout, "300\n");

    project.file("neoak.toml", "[run]\nmax_call_depth = 64\n");
    let outcome = project.exec(&artifact).unwrap();
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.uncaught.as_deref(), Some("java.lang.StackOverflowError"));
}

#[test]
fn test_unreadable_artifacts() {
    let project = Project::new();
    project.file("garbage.json", "{ not json");
    let err = project.exec(&project.path("garbage.json")).unwrap_err();
    assert!(matches!(err, RuntimeError::Artifact(_)));
    assert_eq!(err.exit_code(), EXIT_DISCOVERY);

    project.file(
        "future.json",
        "{\"version\": 99, \"entry_class\": \"Main\", \"classes\": [], \"origins\": []}",
    );
    let err = project.exec(&project.path("future.json")).unwrap_err();
    assert_eq!(err.to_string(), "artifact version 99 is not supported (expected 1)");

    let err = project.exec(&project.path("absent.json")).unwrap_err();
    assert!(matches!(err, RuntimeError::Io(_)));
    assert_eq!(err.exit_code(), EXIT_DISCOVERY);
}
