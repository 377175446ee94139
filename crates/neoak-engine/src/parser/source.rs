//! Source units and preprocessing.
//!
//! A [`SourceUnit`] is the origin-tagged form of one input file: comments,
//! `package` and `import` headers, and blank lines are removed, and every
//! retained line keeps the line number it had in the original file.

/// One line kept after preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedLine {
    /// 1-based line number in the original file
    pub line: u32,
    /// Line text with comments removed
    pub text: String,
}

/// An origin-tagged sequence of retained lines from one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Display path, relative to the project root
    pub path: String,
    /// Package name from the `package` header, if any
    pub package: Option<String>,
    lines: Vec<RetainedLine>,
}

impl SourceUnit {
    /// Preprocess raw file text into a source unit.
    pub fn preprocess(path: impl Into<String>, text: &str) -> Self {
        let stripped = strip_comments(text);
        let mut package = None;
        let mut lines = Vec::new();

        for (index, raw) in stripped.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = header_body(trimmed, "package") {
                package = Some(rest.to_string());
                continue;
            }
            if header_body(trimmed, "import").is_some() {
                continue;
            }
            lines.push(RetainedLine {
                line: index as u32 + 1,
                text: raw.trim_end().to_string(),
            });
        }

        Self {
            path: path.into(),
            package,
            lines,
        }
    }

    /// Retained lines in order.
    pub fn lines(&self) -> &[RetainedLine] {
        &self.lines
    }

    /// Retained text joined with newlines; the lexer runs over this.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }

    /// Original line number of a retained line index.
    pub fn origin_line(&self, retained_index: usize) -> u32 {
        self.lines
            .get(retained_index)
            .or_else(|| self.lines.last())
            .map(|l| l.line)
            .unwrap_or(1)
    }

    /// Simple file name, used in diagnostics headers.
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}

/// Returns the body of a `package x;` or `import x;` header line.
fn header_body<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Remove `//` and `/* */` comments, keeping string and char literals intact
/// and preserving every newline so line numbers stay aligned.
pub fn strip_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Code,
        Line,
        Block,
        Str,
        Char,
    }

    let mut out = String::with_capacity(text.len());
    let mut mode = Mode::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    mode = Mode::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push(' ');
                    mode = Mode::Block;
                }
                '"' => {
                    out.push(c);
                    mode = Mode::Str;
                }
                '\'' => {
                    out.push(c);
                    mode = Mode::Char;
                }
                _ => out.push(c),
            },
            Mode::Line => {
                if c == '\n' {
                    out.push('\n');
                    mode = Mode::Code;
                }
            }
            Mode::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                } else if c == '\n' {
                    out.push('\n');
                }
            }
            Mode::Str | Mode::Char => {
                out.push(c);
                let close = if mode == Mode::Str { '"' } else { '\'' };
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == close || c == '\n' {
                    mode = Mode::Code;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_and_block_comments() {
        let text = "int a = 1; // one\n/* two\n three */ int b = 2;";
        let stripped = strip_comments(text);
        assert_eq!(stripped.lines().count(), 3);
        assert!(!stripped.contains("one"));
        assert!(!stripped.contains("three"));
        assert!(stripped.contains("int b = 2;"));
    }

    #[test]
    fn test_comment_markers_inside_literals_survive() {
        let text = "String s = \"http://x /* y */\"; char c = '/';";
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn test_preprocess_keeps_original_lines() {
        let text = "package app;\nimport java.util.Scanner;\n\nclass Main {\n\n  // hi\n  int x;\n}\n";
        let unit = SourceUnit::preprocess("app/Main.java", text);
        assert_eq!(unit.package.as_deref(), Some("app"));
        let numbers: Vec<u32> = unit.lines().iter().map(|l| l.line).collect();
        assert_eq!(numbers, vec![4, 7, 8]);
        assert_eq!(unit.origin_line(1), 7);
        assert_eq!(unit.file_name(), "Main.java");
    }

    #[test]
    fn test_identifier_named_important_is_not_an_import() {
        let unit = SourceUnit::preprocess("A.java", "class A {\nimportant();\n}");
        assert_eq!(unit.lines().len(), 3);
    }
}
