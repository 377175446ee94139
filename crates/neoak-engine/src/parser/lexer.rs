//! Lexer for NeOak source units.
//!
//! Runs logos over the retained text of a [`SourceUnit`] and maps every token
//! back to the original line it came from.

use crate::parser::error::{LexError, Location};
use crate::parser::source::SourceUnit;
use crate::parser::token::{Span, Spanned, Token};
use logos::Logos;

/// Tokenizer over one source unit.
pub struct Lexer<'a> {
    unit: &'a SourceUnit,
    text: String,
    line_starts: Vec<usize>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer for a source unit.
    pub fn new(unit: &'a SourceUnit) -> Self {
        let text = unit.text();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            unit,
            text,
            line_starts,
        }
    }

    /// Tokenize the whole unit.
    pub fn tokenize(&self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        let mut lex = Token::lexer(&self.text);
        while let Some(result) = lex.next() {
            let range = lex.span();
            let span = self.span_of(range.start, range.end);
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(LexError::UnexpectedCharacter {
                        text: lex.slice().to_string(),
                        location: Location::new(self.unit.path.clone(), span.line),
                    })
                }
            }
        }
        log::trace!("lexed {} tokens from {}", tokens.len(), self.unit.path);
        Ok(tokens)
    }

    fn span_of(&self, start: usize, end: usize) -> Span {
        let index = self.line_starts.partition_point(|&s| s <= start).saturating_sub(1);
        let column = start - self.line_starts[index] + 1;
        Span::new(start, end, self.unit.origin_line(index), column as u32)
    }
}

/// Tokenize a source unit.
pub fn tokenize(unit: &SourceUnit) -> Result<Vec<Spanned>, LexError> {
    Lexer::new(unit).tokenize()
}
