//! Whole programs of the kind the language is used for in teaching:
//! small object models, recursion, arrays, and string processing.

use super::harness::*;

#[test]
fn test_bank_accounts() {
    expect_output(
        r##"import java.util.Arrays;

abstract class Account {
    private static int nextId = 1;

    protected final int id;
    protected double balance;

    Account(double opening) {
        id = nextId++;
        balance = opening;
    }

    abstract double monthlyFee();

    void endOfMonth() {
        balance -= monthlyFee();
    }

    public String toString() {
        return String.format("#%d %.2f", id, balance);
    }
}

class Checking extends Account {
    Checking(double opening) { super(opening); }
    double monthlyFee() { return balance < 100 ? 5 : 0; }
}

class Savings extends Account {
    private double rate;

    Savings(double opening, double rate) {
        super(opening);
        this.rate = rate;
    }

    double monthlyFee() { return -balance * rate; }
}

public class Main {
    public static void main(String[] args) {
        Account[] accounts = { new Checking(50), new Checking(500), new Savings(1000, 0.01) };
        for (Account a : accounts) {
            a.endOfMonth();
        }
        System.out.println(Arrays.toString(accounts));
    }
}
"##,
        "[#1 45.00, #2 500.00, #3 1010.00]\n",
    );
}

#[test]
fn test_recursion_and_memo_array() {
    expect_output(
        r#"public class Main {
    static long[] memo = new long[91];

    static long fib(int n) {
        if (n < 2) return n;
        if (memo[n] != 0) return memo[n];
        memo[n] = fib(n - 1) + fib(n - 2);
        return memo[n];
    }

    static int gcd(int a, int b) {
        return b == 0 ? a : gcd(b, a % b);
    }

    public static void main(String[] args) {
        System.out.println(fib(10));
        System.out.println(fib(90));
        System.out.println(gcd(84, 36));
    }
}
"#,
        "55\n2880067194370816120\n12\n",
    );
}

#[test]
fn test_two_dimensional_arrays() {
    expect_output(
        r#"import java.util.Arrays;

public class Main {
    public static void main(String[] args) {
        int[][] grid = new int[3][4];
        for (int r = 0; r < grid.length; r++) {
            for (int c = 0; c < grid[r].length; c++) {
                grid[r][c] = r * c;
            }
        }
        int[][] jagged = { {1}, {2, 3}, {} };
        StringBuilder sb = new StringBuilder();
        for (int[] row : grid) {
            int sum = 0;
            for (int v : row) sum += v;
            sb.append(sum).append(' ');
        }
        System.out.println(sb.toString().trim());
        System.out.println(jagged[1][1] + jagged.length + jagged[2].length);
        System.out.println(Arrays.deepToString(jagged));
    }
}
"#,
        "0 6 12\n6\n[[1], [2, 3], []]\n",
    );
}

#[test]
fn test_string_processing() {
    expect_output(
        r#"public class Main {
    static boolean isPalindrome(String s) {
        String clean = s.toLowerCase().replaceAll("[^a-z]", "");
        int i = 0, j = clean.length() - 1;
        while (i < j) {
            if (clean.charAt(i++) != clean.charAt(j--)) return false;
        }
        return true;
    }

    static String caesar(String text, int shift) {
        StringBuilder out = new StringBuilder();
        for (char c : text.toCharArray()) {
            if (Character.isUpperCase(c)) {
                out.append((char) ('A' + (c - 'A' + shift) % 26));
            } else {
                out.append(c);
            }
        }
        return out.toString();
    }

    public static void main(String[] args) {
        System.out.println(isPalindrome("A man, a plan, a canal: Panama"));
        System.out.println(isPalindrome("NeOak"));
        System.out.println(caesar("HELLO, WORLD", 3));
        String[] words = "the quick  brown fox".split("\\s+");
        System.out.println(words.length + " " + String.join("-", words));
        System.out.println("banana".indexOf("an") + " " + "banana".lastIndexOf("an"));
    }
}
"#,
        "true\nfalse\nKHOOR, ZRUOG\n4 the-quick-brown-fox\n1 3\n",
    );
}

#[test]
fn test_comparable_objects_sort() {
    expect_output(
        r#"import java.util.Arrays;

class Student implements Comparable<Student> {
    private String name;
    private int grade;

    Student(String name, int grade) {
        this.name = name;
        this.grade = grade;
    }

    public int compareTo(Student other) {
        if (grade != other.grade) return other.grade - grade;
        return name.compareTo(other.name);
    }

    public String toString() { return name + ":" + grade; }
}

public class Main {
    public static void main(String[] args) {
        Student[] roster = {
            new Student("Lin", 88),
            new Student("Ada", 95),
            new Student("Bo", 88),
        };
        Arrays.sort(roster);
        System.out.println(Arrays.toString(roster));
    }
}
"#,
        "[Ada:95, Bo:88, Lin:88]\n",
    );
}

#[test]
fn test_static_counters_and_instance_state() {
    expect_output(
        r#"class Ticket {
    static int issued;
    static final String PREFIX;

    static {
        PREFIX = "T-";
    }

    private final int number;

    Ticket() {
        issued++;
        number = issued;
    }

    String code() { return PREFIX + number; }
}

public class Main {
    public static void main(String[] args) {
        System.out.println(Ticket.issued);
        Ticket a = new Ticket();
        Ticket b = new Ticket();
        System.out.println(a.code() + " " + b.code() + " " + Ticket.issued);
    }
}
"#,
        "0\nT-1 T-2 2\n",
    );
}

#[test]
fn test_char_and_integer_helpers() {
    expect_output(
        r#"public class Main {
    public static void main(String[] args) {
        char c = 'a';
        c += 2;
        System.out.println(c);
        System.out.println((int) c);
        System.out.println(Character.isDigit('7') + " " + Character.toUpperCase('q'));
        System.out.println(Integer.MAX_VALUE);
        System.out.println(Integer.parseInt("ff", 16) + Long.parseLong("10"));
        System.out.println(Double.parseDouble("2.5") * 2);
    }
}
"#,
        "c\n99\ntrue Q\n2147483647\n265\n5.0\n",
    );
}

#[test]
fn test_do_while_and_ternary_chains() {
    expect_output(
        r#"public class Main {
    static String grade(int score) {
        return score >= 90 ? "A" : score >= 80 ? "B" : score >= 70 ? "C" : "F";
    }

    public static void main(String[] args) {
        int n = 0;
        do {
            n += 3;
        } while (n < 10);
        System.out.println(n);
        System.out.println(grade(95) + grade(85) + grade(75) + grade(10));
    }
}
"#,
        "12\nABCF\n",
    );
}
