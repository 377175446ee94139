//! Colored terminal output for diagnostics and status lines.
//!
//! Uses `termcolor`. `NO_COLOR` in the environment overrides `--color`.

use neoak_runtime::RuntimeError;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// `--color` setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Terminal color choice; `NO_COLOR` wins over the flag.
    pub fn choice(self) -> ColorChoice {
        if std::env::var_os("NO_COLOR").is_some() {
            return ColorChoice::Never;
        }
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

/// Styled writer over stdout and stderr.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    /// Create a writer with the given color choice.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    /// `<label> <text>` on stdout, with the label in bold green.
    pub fn status(&mut self, label: &str, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Green)).set_bold(true);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", label);
        let _ = self.stdout.reset();
        let _ = writeln!(self.stdout, " {}", text);
    }

    /// Raw text on stdout.
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.flush();
    }

    /// `error: <line>` on stderr, prefix in bold red.
    pub fn error_line(&mut self, line: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "error");
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, ": {}", line);
    }

    /// Dimmed note on stderr.
    pub fn note(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Cyan));
        let _ = self.stderr.set_color(&spec);
        let _ = writeln!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }

    /// Print a failure and return the exit status it maps to.
    ///
    /// Pipeline errors print one line per diagnostic; anything else prints
    /// the error chain.
    pub fn report(&mut self, err: &anyhow::Error) -> i32 {
        match err.downcast_ref::<RuntimeError>() {
            Some(runtime) => {
                let lines = runtime.diagnostics();
                for line in &lines {
                    self.error_line(line);
                }
                if lines.len() > 1 {
                    self.note(&format!("{} errors", lines.len()));
                }
                runtime.exit_code()
            }
            None => {
                self.error_line(&format!("{:#}", err));
                1
            }
        }
    }
}
