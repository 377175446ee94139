//! Parsers over token streams.
//!
//! Declarations are recognized structurally (see [`decl`]): a depth tracker
//! delimits nested constructs and an ordered set of member recognizers picks
//! out fields, constructors, methods, initializer blocks, and nested types.
//! Member bodies stay opaque token blocks until lowering, where [`stmt`] and
//! [`expr`] parse them by recursive descent.

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod types;

use crate::parser::error::{Location, ParseError};
use crate::parser::token::{Span, Spanned, Token};

// ============================================================================
// Depth tracking
// ============================================================================

/// Nesting depth of every bracket kind seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthTracker {
    /// `(` depth
    pub paren: u32,
    /// `{` depth
    pub brace: u32,
    /// `[` depth
    pub bracket: u32,
    /// `<` depth (only when angles are tracked)
    pub angle: u32,
    track_angles: bool,
}

impl DepthTracker {
    /// Tracker that ignores angle brackets (safe inside expressions).
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that also counts `<`/`>` (for signatures and type lists).
    pub fn with_angles() -> Self {
        Self {
            track_angles: true,
            ..Self::default()
        }
    }

    /// Account for one token.
    pub fn step(&mut self, token: &Token) {
        match token {
            Token::LParen => self.paren += 1,
            Token::RParen => self.paren = self.paren.saturating_sub(1),
            Token::LBrace => self.brace += 1,
            Token::RBrace => self.brace = self.brace.saturating_sub(1),
            Token::LBracket => self.bracket += 1,
            Token::RBracket => self.bracket = self.bracket.saturating_sub(1),
            Token::Lt if self.track_angles => self.angle += 1,
            Token::Gt if self.track_angles => self.angle = self.angle.saturating_sub(1),
            _ => {}
        }
    }

    /// Returns true when no bracket is open.
    pub fn at_top(&self) -> bool {
        self.paren == 0 && self.brace == 0 && self.bracket == 0 && self.angle == 0
    }
}

/// Split tokens on commas that are not nested inside any bracket.
pub fn split_top_level(tokens: &[Spanned], track_angles: bool) -> Vec<&[Spanned]> {
    let mut parts = Vec::new();
    let mut depth = if track_angles {
        DepthTracker::with_angles()
    } else {
        DepthTracker::new()
    };
    let mut start = 0;
    for (i, (token, _)) in tokens.iter().enumerate() {
        if *token == Token::Comma && depth.at_top() {
            parts.push(&tokens[start..i]);
            start = i + 1;
            continue;
        }
        depth.step(token);
    }
    if start < tokens.len() {
        parts.push(&tokens[start..]);
    }
    parts
}

// ============================================================================
// Cursor
// ============================================================================

/// A position in a token slice with error helpers.
pub struct Cursor<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    file: &'t str,
    context: Option<String>,
    fallback: Span,
}

impl<'t> Cursor<'t> {
    /// Create a cursor over a token slice.
    pub fn new(tokens: &'t [Spanned], file: &'t str) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            context: None,
            fallback: Span::default(),
        }
    }

    /// Span reported when the slice is empty.
    pub fn with_fallback(mut self, span: Span) -> Self {
        self.fallback = span;
        self
    }

    /// Set the enclosing `Class` / `Class.method` context for diagnostics.
    pub fn set_context(&mut self, context: Option<String>) {
        self.context = context;
    }

    /// Current diagnostic context.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Display path of the file.
    pub fn file(&self) -> &'t str {
        self.file
    }

    /// Current position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rewind or advance to a saved position.
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Returns true when all tokens are consumed.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current token.
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    /// Token `n` positions ahead.
    pub fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n).map(|(t, _)| t)
    }

    /// Span of the current token (or the last one at end of input).
    pub fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, s)| *s)
            .unwrap_or(self.fallback)
    }

    /// Span of the most recently consumed token.
    pub fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, s)| *s)
            .unwrap_or(self.fallback)
    }

    /// Returns true if the token `n` ahead starts exactly where the one
    /// before it ends.
    pub fn adjacent(&self, n: usize) -> bool {
        match (
            self.tokens.get(self.pos + n - 1),
            self.tokens.get(self.pos + n),
        ) {
            (Some((_, a)), Some((_, b))) => a.end == b.start,
            _ => false,
        }
    }

    /// Consume the current token.
    pub fn advance(&mut self) -> Option<&'t Spanned> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Returns true if the current token equals `token`.
    pub fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    /// Returns true if the current token is the identifier `name`.
    pub fn check_ident(&self, name: &str) -> bool {
        self.peek().map_or(false, |t| t.is_ident(name))
    }

    /// Consume `token` if present.
    pub fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `token` or fail.
    pub fn expect(&mut self, token: &Token) -> Result<Span, ParseError> {
        if self.check(token) {
            let span = self.span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.expected(format!("'{}'", token)))
        }
    }

    /// Consume an identifier or fail.
    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.tokens.get(self.pos) {
            Some((Token::Ident(name), span)) => {
                self.pos += 1;
                Ok((name.clone(), *span))
            }
            _ => Err(self.expected("<identifier>")),
        }
    }

    /// Location of a span in this file with the current context.
    pub fn location(&self, span: Span) -> Location {
        Location {
            file: self.file.to_string(),
            line: span.line,
            context: self.context.clone(),
        }
    }

    /// Error for a missing construct at the current position.
    pub fn expected(&self, what: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::Expected {
                expected: what.into(),
                found: found.to_string(),
                location: self.location(self.span()),
            },
            None => ParseError::UnexpectedEof {
                what: what.into(),
                location: self.location(self.prev_span()),
            },
        }
    }

    /// Malformed-construct error at a span.
    pub fn malformed(&self, message: impl Into<String>, span: Span) -> ParseError {
        ParseError::Malformed {
            message: message.into(),
            location: self.location(span),
        }
    }

    /// Consume a balanced `open ... close` group and return its inner tokens.
    pub fn balanced(
        &mut self,
        open: &Token,
        close: &Token,
    ) -> Result<(Span, &'t [Spanned]), ParseError> {
        let open_span = self.expect(open)?;
        let start = self.pos;
        let mut depth = 1usize;
        while let Some((token, _)) = self.tokens.get(self.pos) {
            if token == open {
                depth += 1;
            } else if token == close {
                depth -= 1;
                if depth == 0 {
                    let inner = &self.tokens[start..self.pos];
                    self.pos += 1;
                    return Ok((open_span, inner));
                }
            }
            self.pos += 1;
        }
        Err(ParseError::UnexpectedEof {
            what: format!("'{}' block", open),
            location: self.location(open_span),
        })
    }

    /// Skip a generic argument list starting at `<`. Fails without consuming
    /// anything if the tokens cannot be a type argument list.
    pub fn skip_type_args(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let open = self.expect(&Token::Lt)?;
        let mut depth = 1usize;
        while let Some((token, _)) = self.tokens.get(self.pos) {
            match token {
                Token::Lt => depth += 1,
                Token::Shl => depth += 2,
                Token::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                Token::Ident(_)
                | Token::Comma
                | Token::Dot
                | Token::Question
                | Token::Extends
                | Token::Super
                | Token::Amp
                | Token::LBracket
                | Token::RBracket
                | Token::At => {}
                _ => {
                    self.pos = start;
                    return Err(self.malformed("malformed type arguments", open));
                }
            }
            self.pos += 1;
        }
        self.pos = start;
        Err(ParseError::UnexpectedEof {
            what: "type arguments".into(),
            location: self.location(open),
        })
    }

    /// Skip any annotations (`@Name`, `@Name(...)`).
    pub fn skip_annotations(&mut self) -> Result<(), ParseError> {
        while self.check(&Token::At) && !matches!(self.peek_nth(1), Some(Token::Interface)) {
            self.advance();
            self.expect_ident()?;
            while self.check(&Token::Dot) {
                self.advance();
                self.expect_ident()?;
            }
            if self.check(&Token::LParen) {
                self.balanced(&Token::LParen, &Token::RParen)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::source::SourceUnit;

    fn lex(src: &str) -> Vec<Spanned> {
        tokenize(&SourceUnit::preprocess("T.java", src)).unwrap()
    }

    #[test]
    fn test_split_top_level_respects_generics() {
        let tokens = lex("Map<String, Integer> m, int[] xs, List<List<String>> ys");
        let parts = split_top_level(&tokens, true);
        assert_eq!(parts.len(), 3);
        assert!(parts[0].last().unwrap().0.is_ident("m"));
        assert!(parts[2].last().unwrap().0.is_ident("ys"));
    }

    #[test]
    fn test_skip_nested_type_args() {
        let tokens = lex("<String, List<Integer>> rest");
        let mut cursor = Cursor::new(&tokens, "T.java");
        cursor.skip_type_args().unwrap();
        assert!(cursor.check_ident("rest"));
    }

    #[test]
    fn test_skip_type_args_rejects_comparison() {
        let tokens = lex("< n; i++");
        let mut cursor = Cursor::new(&tokens, "T.java");
        assert!(cursor.skip_type_args().is_err());
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn test_balanced_braces() {
        let tokens = lex("{ a { b } c } d");
        let mut cursor = Cursor::new(&tokens, "T.java");
        let (_, inner) = cursor.balanced(&Token::LBrace, &Token::RBrace).unwrap();
        assert_eq!(inner.len(), 5);
        assert!(cursor.check_ident("d"));
    }
}
