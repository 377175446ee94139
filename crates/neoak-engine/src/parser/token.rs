//! Token definitions for NeOak sources.
//!
//! The token set covers the Java subset NeOak accepts. Closing angle brackets
//! are always single `>` tokens so nested generic argument lists close
//! cleanly; the expression parser re-joins adjacent `>` tokens into shift and
//! comparison operators.

use logos::Logos;
use std::fmt;

/// A token in a NeOak source unit.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Declarations
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("throws")]
    Throws,
    #[token("void")]
    Void,
    #[token("package")]
    Package,
    #[token("import")]
    Import,

    // Modifiers
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("abstract")]
    Abstract,
    #[token("synchronized")]
    Synchronized,
    #[token("native")]
    Native,
    #[token("transient")]
    Transient,
    #[token("volatile")]
    Volatile,
    #[token("strictfp")]
    Strictfp,

    // Control flow
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,

    // Expressions
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("instanceof")]
    Instanceof,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[regex(r"[0-9][0-9_]*", parse_int)]
    #[regex(r"0[xX][0-9a-fA-F_]+", parse_hex)]
    IntLit(i64),
    #[regex(r"[0-9][0-9_]*[lL]", parse_long)]
    LongLit(i64),
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[dDfF]?", parse_double)]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[dDfF]?", parse_double)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[dDfF]?", parse_double)]
    #[regex(r"[0-9][0-9_]*[dDfF]", parse_double)]
    DoubleLit(f64),
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    StringLit(String),
    #[regex(r"'([^'\\\n]|\\.)+'", parse_char)]
    CharLit(char),

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("@")]
    At,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,

    // Operators
    #[token("=")]
    Assign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token("<<")]
    Shl,
    #[token(">")]
    Gt,
}

impl Token {
    /// Returns true for declaration and member modifiers.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Token::Public
                | Token::Private
                | Token::Protected
                | Token::Static
                | Token::Final
                | Token::Abstract
                | Token::Synchronized
                | Token::Native
                | Token::Transient
                | Token::Volatile
                | Token::Strictfp
                | Token::Default
        )
    }

    /// Identifier text, if this token is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this token is the identifier `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        self.ident() == Some(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Ident(name) => return write!(f, "{}", name),
            Token::IntLit(v) | Token::LongLit(v) => return write!(f, "{}", v),
            Token::DoubleLit(v) => return write!(f, "{}", v),
            Token::StringLit(s) => return write!(f, "\"{}\"", s),
            Token::CharLit(c) => return write!(f, "'{}'", c),
            Token::Class => "class",
            Token::Interface => "interface",
            Token::Enum => "enum",
            Token::Extends => "extends",
            Token::Implements => "implements",
            Token::Throws => "throws",
            Token::Void => "void",
            Token::Package => "package",
            Token::Import => "import",
            Token::Public => "public",
            Token::Private => "private",
            Token::Protected => "protected",
            Token::Static => "static",
            Token::Final => "final",
            Token::Abstract => "abstract",
            Token::Synchronized => "synchronized",
            Token::Native => "native",
            Token::Transient => "transient",
            Token::Volatile => "volatile",
            Token::Strictfp => "strictfp",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Do => "do",
            Token::For => "for",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Return => "return",
            Token::Throw => "throw",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::New => "new",
            Token::This => "this",
            Token::Super => "super",
            Token::Instanceof => "instanceof",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Ellipsis => "...",
            Token::At => "@",
            Token::Question => "?",
            Token::Colon => ":",
            Token::ColonColon => "::",
            Token::Arrow => "->",
            Token::Assign => "=",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Bang => "!",
            Token::Tilde => "~",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::AmpAmp => "&&",
            Token::PipePipe => "||",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::PlusEq => "+=",
            Token::MinusEq => "-=",
            Token::StarEq => "*=",
            Token::SlashEq => "/=",
            Token::PercentEq => "%=",
            Token::AmpEq => "&=",
            Token::PipeEq => "|=",
            Token::CaretEq => "^=",
            Token::ShlEq => "<<=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Shl => "<<",
            Token::Gt => ">",
        };
        f.write_str(text)
    }
}

/// Source span of a token.
///
/// `line` is the line in the original file (before preprocessing), so every
/// later stage can report `file:line` without consulting the origin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character in the retained text
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Original 1-based line number
    pub line: u32,
    /// 1-based column in the retained line
    pub column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span covering `self` through `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

/// A token with its span.
pub type Spanned = (Token, Span);

// ============================================================================
// Literal callbacks
// ============================================================================

fn parse_int(lex: &mut logos::Lexer<'_, Token>) -> Option<i64> {
    lex.slice().replace('_', "").parse().ok()
}

fn parse_hex(lex: &mut logos::Lexer<'_, Token>) -> Option<i64> {
    let digits = lex.slice()[2..].replace('_', "");
    u64::from_str_radix(&digits, 16).ok().map(|v| v as i64)
}

fn parse_long(lex: &mut logos::Lexer<'_, Token>) -> Option<i64> {
    let slice = lex.slice();
    slice[..slice.len() - 1].replace('_', "").parse().ok()
}

fn parse_double(lex: &mut logos::Lexer<'_, Token>) -> Option<f64> {
    let slice = lex.slice().replace('_', "");
    let trimmed = slice.trim_end_matches(['d', 'D', 'f', 'F']);
    trimmed.parse().ok()
}

fn parse_string(lex: &mut logos::Lexer<'_, Token>) -> Option<String> {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

fn parse_char(lex: &mut logos::Lexer<'_, Token>) -> Option<char> {
    let slice = lex.slice();
    let text = unescape(&slice[1..slice.len() - 1])?;
    let mut chars = text.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(c)
}

/// Resolve Java escape sequences.
pub fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            's' => out.push(' '),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}
