//! Parse and lex error types, plus the shared diagnostic location.

use std::fmt;
use thiserror::Error;

/// Where a diagnostic points: original file, original line, and the enclosing
/// class or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Display path of the source file
    pub file: String,
    /// Original 1-based line
    pub line: u32,
    /// `Class` or `Class.method`, when known
    pub context: Option<String>,
}

impl Location {
    /// Create a location without enclosing context.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            context: None,
        }
    }

    /// Attach the enclosing `Class` or `Class.method` context.
    pub fn within(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(ctx) = &self.context {
            write!(f, " (in {})", ctx)?;
        }
        Ok(())
    }
}

/// Lexer errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A character sequence that does not start any token
    #[error("illegal character '{text}' at {location}")]
    UnexpectedCharacter {
        /// Offending text
        text: String,
        /// Where it occurred
        location: Location,
    },
}

/// Parse errors, for both declarations and bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Lexing failed
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token was required
    #[error("{expected} expected, found '{found}' at {location}")]
    Expected {
        /// What the parser needed
        expected: String,
        /// What it saw
        found: String,
        /// Where
        location: Location,
    },

    /// Input ended inside a construct
    #[error("reached end of file while parsing {what} at {location}")]
    UnexpectedEof {
        /// The construct being parsed
        what: String,
        /// Where the construct started
        location: Location,
    },

    /// A construct NeOak does not support
    #[error("{what} is not supported at {location}")]
    Unsupported {
        /// The construct (e.g. `enum`)
        what: String,
        /// Where
        location: Location,
    },

    /// Any other malformed construct
    #[error("{message} at {location}")]
    Malformed {
        /// Description
        message: String,
        /// Where
        location: Location,
    },
}

impl ParseError {
    /// Location of the error.
    pub fn location(&self) -> &Location {
        match self {
            ParseError::Lex(LexError::UnexpectedCharacter { location, .. }) => location,
            ParseError::Expected { location, .. }
            | ParseError::UnexpectedEof { location, .. }
            | ParseError::Unsupported { location, .. }
            | ParseError::Malformed { location, .. } => location,
        }
    }

    /// Attach enclosing context if the error has none yet.
    pub fn with_context(mut self, context: &str) -> Self {
        let location = match &mut self {
            ParseError::Lex(LexError::UnexpectedCharacter { location, .. }) => location,
            ParseError::Expected { location, .. }
            | ParseError::UnexpectedEof { location, .. }
            | ParseError::Unsupported { location, .. }
            | ParseError::Malformed { location, .. } => location,
        };
        if location.context.is_none() {
            location.context = Some(context.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new("app/Main.java", 12).within("Main.main");
        assert_eq!(loc.to_string(), "app/Main.java:12 (in Main.main)");
        assert_eq!(Location::new("A.java", 3).to_string(), "A.java:3");
    }

    #[test]
    fn test_with_context_keeps_existing() {
        let err = ParseError::Malformed {
            message: "bad".into(),
            location: Location::new("A.java", 1).within("A.f"),
        }
        .with_context("A");
        assert_eq!(err.to_string(), "bad at A.java:1 (in A.f)");
    }
}
