//! Console and file input/output.

use super::harness::*;

#[test]
fn test_scanner_reads_standard_input() {
    let project = Project::with_main(
        r#"import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        int n = in.nextInt();
        in.nextLine();
        String title = in.nextLine();
        int total = 0;
        for (int i = 0; i < n; i++) {
            total += in.nextInt();
        }
        System.out.println(title + ": " + total);
        while (in.hasNext()) {
            System.out.print("[" + in.next() + "]");
        }
        System.out.println();
    }
}
"#,
    );
    let outcome = project.run_with("3\nscores\n10 20\n30 extra words\n", &[]).unwrap();
    assert_eq!(outcome.exit_code, 0, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, "scores: 60\n[extra][words]\n");
}

#[test]
fn test_scanner_on_empty_input() {
    let project = Project::with_main(
        r#"import java.util.Scanner;

public class Main {
    public static void main(String[] args) {
        Scanner in = new Scanner(System.in);
        System.out.println(in.hasNextLine());
        in.nextInt();
    }
}
"#,
    );
    let outcome = project.run_with("", &[]).unwrap();
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.stdout, "false\n");
    assert_eq!(
        outcome.uncaught.as_deref(),
        Some("java.util.NoSuchElementException")
    );
}

#[test]
fn test_scanner_reads_file_named_by_argument() {
    let project = Project::with_main(
        r#"import java.io.File;
import java.io.FileNotFoundException;
import java.util.Scanner;

public class Main {
    public static void main(String[] args) throws FileNotFoundException {
        File data = new File(args[0]);
        System.out.println(data.exists() + " " + data.getName());
        Scanner in = new Scanner(data);
        int lines = 0;
        while (in.hasNextLine()) {
            String line = in.nextLine();
            if (!line.isEmpty()) lines++;
        }
        System.out.println(lines);
        try {
            new Scanner(new File(args[1]));
        } catch (FileNotFoundException e) {
            System.out.println("missing");
        }
    }
}
"#,
    );
    project.file("data/input.txt", "alpha\n\nbeta\ngamma\n");
    let input = project.path("data/input.txt");
    let missing = project.path("data/none.txt");
    let outcome = project
        .run_with("", &[input.to_str().unwrap(), missing.to_str().unwrap()])
        .unwrap();
    assert_eq!(outcome.exit_code, 0, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, "true input.txt\n3\nmissing\n");
}

#[test]
fn test_files_write_then_read() {
    let project = Project::with_main(
        r#"import java.io.IOException;
import java.nio.file.Files;
import java.nio.file.Path;

public class Main {
    public static void main(String[] args) throws IOException {
        Path out = Path.of(args[0], "report.txt");
        Files.writeString(out, "total=" + (6 * 7) + "\n");
        System.out.println(Files.exists(out));
        System.out.print(Files.readString(out));
        try {
            Files.readString(Path.of(args[0], "absent.txt"));
        } catch (IOException e) {
            System.out.println("io error");
        }
    }
}
"#,
    );
    let root = project.root().to_str().unwrap().to_string();
    let outcome = project.run_with("", &[&root]).unwrap();
    assert_eq!(outcome.exit_code, 0, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, "true\ntotal=42\nio error\n");
    let written = std::fs::read_to_string(project.path("report.txt")).unwrap();
    assert_eq!(written, "total=42\n");
}

#[test]
fn test_print_variants_and_stderr() {
    let outcome = run_main(
        r#"public class Main {
    public static void main(String[] args) {
        System.out.print(1);
        System.out.print('-');
        System.out.print(2.0);
        System.out.println();
        System.out.printf("%s=%d%n", "x", 5);
        System.err.println("warning");
        System.out.println((Object) null);
    }
}
"#,
    );
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout, "1-2.0\nx=5\nnull\n");
    assert_eq!(outcome.stderr, "warning\n");
}
