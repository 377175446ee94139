//! `java.util.Scanner`: token and line reading over a buffer or a shared
//! input stream.

use regex::Regex;
use std::cell::RefCell;
use std::fmt;
use std::io::BufRead;
use std::rc::Rc;

/// A line-buffered reader shared by every scanner over `System.in`.
#[derive(Clone)]
pub struct SharedInput(Rc<RefCell<Box<dyn BufRead>>>);

impl SharedInput {
    /// Wrap a reader.
    pub fn new(reader: Box<dyn BufRead>) -> Self {
        Self(Rc::new(RefCell::new(reader)))
    }

    fn read_line(&self, into: &mut String) -> std::io::Result<usize> {
        self.0.borrow_mut().read_line(into)
    }
}

impl fmt::Debug for SharedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedInput")
    }
}

/// Scanner failure, mapped to a Java exception by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Input exhausted
    NoSuchElement(Option<String>),
    /// Next token does not parse as the requested type
    InputMismatch(Option<String>),
    /// Used after `close()`
    Closed,
    /// Underlying read failed
    Io(String),
}

impl ScanError {
    /// Exception kind and message.
    pub fn exception(&self) -> (&'static str, Option<String>) {
        match self {
            ScanError::NoSuchElement(m) => ("NoSuchElementException", m.clone()),
            ScanError::InputMismatch(m) => ("InputMismatchException", m.clone()),
            ScanError::Closed => ("IllegalStateException", Some("Scanner closed".to_string())),
            ScanError::Io(m) => ("IOException", Some(m.clone())),
        }
    }
}

/// Token separator.
#[derive(Debug)]
enum Delimiter {
    /// Runs of Unicode whitespace (the default)
    Whitespace,
    /// `useDelimiter(regex)`
    Pattern(Regex),
}

impl Delimiter {
    /// First non-empty delimiter match in `text`.
    fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Delimiter::Whitespace => {
                let start = text.find(char::is_whitespace)?;
                let end = text[start..]
                    .find(|c: char| !c.is_whitespace())
                    .map_or(text.len(), |n| start + n);
                Some((start, end))
            }
            Delimiter::Pattern(re) => re
                .find_iter(text)
                .find(|m| m.end() > m.start())
                .map(|m| (m.start(), m.end())),
        }
    }
}

/// Scanner state; `buffer[pos..]` is unread input.
#[derive(Debug)]
pub struct ScannerState {
    buffer: String,
    pos: usize,
    source: Option<SharedInput>,
    eof: bool,
    delimiter: Delimiter,
    closed: bool,
}

impl ScannerState {
    /// Scanner over a fixed text (`new Scanner(String)` or a whole file).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            buffer: text.into(),
            pos: 0,
            source: None,
            eof: true,
            delimiter: Delimiter::Whitespace,
            closed: false,
        }
    }

    /// Scanner over a shared stream, read a line at a time.
    pub fn from_input(input: SharedInput) -> Self {
        Self {
            buffer: String::new(),
            pos: 0,
            source: Some(input),
            eof: false,
            delimiter: Delimiter::Whitespace,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), ScanError> {
        if self.closed {
            Err(ScanError::Closed)
        } else {
            Ok(())
        }
    }

    /// Pull one more line into the buffer. Returns false at end of input.
    fn fill(&mut self) -> Result<bool, ScanError> {
        if self.eof {
            return Ok(false);
        }
        let Some(source) = &self.source else {
            self.eof = true;
            return Ok(false);
        };
        if self.pos > 4096 {
            self.buffer.drain(..self.pos);
            self.pos = 0;
        }
        match source.read_line(&mut self.buffer) {
            Ok(0) => {
                self.eof = true;
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) => Err(ScanError::Io(e.to_string())),
        }
    }

    /// Byte range of the next complete token, without consuming anything.
    fn peek_token(&mut self) -> Result<Option<(usize, usize)>, ScanError> {
        self.ensure_open()?;
        loop {
            let rest = &self.buffer[self.pos..];
            let start = match self.delimiter.find(rest) {
                Some((0, end)) => end,
                _ => 0,
            };
            if start == rest.len() {
                if self.fill()? {
                    continue;
                }
                return Ok(None);
            }
            let after = &rest[start..];
            let token_start = self.pos + start;
            match self.delimiter.find(after) {
                Some((m_start, m_end)) if m_end < after.len() || self.eof => {
                    return Ok(Some((token_start, token_start + m_start)));
                }
                _ => {
                    // the token or its delimiter may continue on the next line
                    if self.fill()? {
                        continue;
                    }
                    let after = &self.buffer[token_start..];
                    return Ok(Some(match self.delimiter.find(after) {
                        Some((m_start, _)) => (token_start, token_start + m_start),
                        None => (token_start, self.buffer.len()),
                    }));
                }
            }
        }
    }

    fn peek_text(&mut self) -> Result<Option<String>, ScanError> {
        Ok(self.peek_token()?.map(|(s, e)| self.buffer[s..e].to_string()))
    }

    /// `hasNext()`
    pub fn has_next(&mut self) -> Result<bool, ScanError> {
        Ok(self.peek_token()?.is_some())
    }

    /// `next()`
    pub fn next(&mut self) -> Result<String, ScanError> {
        match self.peek_token()? {
            Some((start, end)) => {
                self.pos = end;
                Ok(self.buffer[start..end].to_string())
            }
            None => Err(ScanError::NoSuchElement(None)),
        }
    }

    /// Parse the next token; a malformed token is left unread.
    fn next_parsed<T>(&mut self, parse: impl Fn(&str) -> Option<T>) -> Result<T, ScanError> {
        match self.peek_token()? {
            Some((start, end)) => match parse(&self.buffer[start..end]) {
                Some(v) => {
                    self.pos = end;
                    Ok(v)
                }
                None => Err(ScanError::InputMismatch(None)),
            },
            None => Err(ScanError::NoSuchElement(None)),
        }
    }

    fn has_next_parsed<T>(&mut self, parse: impl Fn(&str) -> Option<T>) -> Result<bool, ScanError> {
        Ok(self.peek_text()?.map_or(false, |t| parse(&t).is_some()))
    }

    /// `nextInt()`
    pub fn next_int(&mut self) -> Result<i64, ScanError> {
        self.next_parsed(parse_int)
    }

    /// `hasNextInt()`
    pub fn has_next_int(&mut self) -> Result<bool, ScanError> {
        self.has_next_parsed(parse_int)
    }

    /// `nextLong()`
    pub fn next_long(&mut self) -> Result<i64, ScanError> {
        self.next_parsed(|t| t.parse::<i64>().ok())
    }

    /// `nextDouble()`
    pub fn next_double(&mut self) -> Result<f64, ScanError> {
        self.next_parsed(parse_double)
    }

    /// `hasNextDouble()`
    pub fn has_next_double(&mut self) -> Result<bool, ScanError> {
        self.has_next_parsed(parse_double)
    }

    /// `nextBoolean()`
    pub fn next_boolean(&mut self) -> Result<bool, ScanError> {
        self.next_parsed(parse_bool)
    }

    /// `hasNextBoolean()`
    pub fn has_next_boolean(&mut self) -> Result<bool, ScanError> {
        self.has_next_parsed(parse_bool)
    }

    /// `hasNextLine()`
    pub fn has_next_line(&mut self) -> Result<bool, ScanError> {
        self.ensure_open()?;
        if self.pos < self.buffer.len() {
            return Ok(true);
        }
        self.fill()
    }

    /// `nextLine()`: the rest of the current line, terminator dropped.
    pub fn next_line(&mut self) -> Result<String, ScanError> {
        self.ensure_open()?;
        loop {
            if let Some(offset) = self.buffer[self.pos..].find('\n') {
                let line = self.buffer[self.pos..self.pos + offset]
                    .trim_end_matches('\r')
                    .to_string();
                self.pos += offset + 1;
                return Ok(line);
            }
            if !self.fill()? {
                break;
            }
        }
        if self.pos < self.buffer.len() {
            let line = self.buffer[self.pos..].to_string();
            self.pos = self.buffer.len();
            Ok(line)
        } else {
            Err(ScanError::NoSuchElement(Some("No line found".to_string())))
        }
    }

    /// `useDelimiter(pattern)`
    pub fn use_delimiter(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.delimiter = Delimiter::Pattern(Regex::new(pattern)?);
        Ok(())
    }

    /// `close()`; idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

fn parse_int(token: &str) -> Option<i64> {
    token.parse::<i32>().ok().map(i64::from)
}

fn parse_double(token: &str) -> Option<f64> {
    let lower = token.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") || lower.ends_with('d') || lower.ends_with('f') {
        return None;
    }
    token.parse::<f64>().ok()
}

fn parse_bool(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
