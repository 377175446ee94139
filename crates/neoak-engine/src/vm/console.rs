//! Program output: `System.out` and `System.err`.

use std::io::Write;

/// Output sink. Captured output is kept in memory for the caller; otherwise
/// it goes straight to the process streams.
#[derive(Debug, Default)]
pub struct Console {
    capture: bool,
    out: String,
    err: String,
}

impl Console {
    /// Create a console.
    pub fn new(capture: bool) -> Self {
        Self {
            capture,
            out: String::new(),
            err: String::new(),
        }
    }

    /// Write to standard output.
    pub fn out(&mut self, text: &str) {
        if self.capture {
            self.out.push_str(text);
        } else {
            // a closed pipe must not fail the program
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }

    /// Write to standard error.
    pub fn err(&mut self, text: &str) {
        if self.capture {
            self.err.push_str(text);
        } else {
            let _ = std::io::stdout().flush();
            let mut stderr = std::io::stderr().lock();
            let _ = stderr.write_all(text.as_bytes());
        }
    }

    /// Flush both streams.
    pub fn flush(&mut self) {
        if !self.capture {
            let _ = std::io::stdout().flush();
            let _ = std::io::stderr().flush();
        }
    }

    /// Captured output, `(stdout, stderr)`; empty unless capturing.
    pub fn take(&mut self) -> (String, String) {
        (std::mem::take(&mut self.out), std::mem::take(&mut self.err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture() {
        let mut console = Console::new(true);
        console.out("a");
        console.err("b");
        console.out("c\n");
        assert_eq!(console.take(), ("ac\n".to_string(), "b".to_string()));
        assert_eq!(console.take(), (String::new(), String::new()));
    }
}
