//! Statement termination pass.
//!
//! Scans each body's tokens with a depth tracker and finds statement
//! boundaries: a line break at paren depth zero outside an array initializer,
//! or a `}` closing a statement block. At every boundary the token before it
//! must be able to end a statement. The diagnostic points at that token's
//! line, which is the statement that lost its `;`.

use crate::checker::error::CheckError;
use crate::checker::hierarchy::ClassTable;
use crate::parser::ast::{InstanceInit, TokenBlock};
use crate::parser::error::Location;
use crate::parser::token::{Spanned, Token};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BraceKind {
    Block,
    Initializer,
}

/// Check every body block of every class.
pub fn check_termination(table: &ClassTable<'_>, errors: &mut Vec<CheckError>) {
    for class in table.classes() {
        for method in &class.methods {
            if let Some(body) = &method.body {
                let context = format!("{}.{}", class.name, method.name);
                scan_block(body, &class.file, &context, errors);
            }
        }
        let init_context = format!("{}.<init>", class.name);
        for ctor in &class.constructors {
            scan_block(&ctor.body, &class.file, &init_context, errors);
        }
        for init in &class.instance_inits {
            if let InstanceInit::Block(block) = init {
                scan_block(block, &class.file, &init_context, errors);
            }
        }
        let clinit_context = format!("{}.<clinit>", class.name);
        for block in &class.static_blocks {
            scan_block(block, &class.file, &clinit_context, errors);
        }
    }
}

/// Scan one block; at most one diagnostic per offending statement.
fn scan_block(block: &TokenBlock, file: &str, context: &str, errors: &mut Vec<CheckError>) {
    let mut report = |line: u32| {
        errors.push(CheckError::MissingSemicolon {
            location: Location::new(file, line).within(context),
        })
    };
    for line in missing_terminators(&block.tokens) {
        report(line);
    }
}

/// Lines of statements whose terminator is missing, in order.
pub fn missing_terminators(tokens: &[Spanned]) -> Vec<u32> {
    let mut missing = Vec::new();
    let mut paren = 0u32;
    let mut bracket = 0u32;
    let mut braces: Vec<(BraceKind, usize)> = Vec::new();
    // parens opened right after a control keyword, by nesting depth
    let mut header_parens: Vec<u32> = Vec::new();
    let mut header_closes: FxHashSet<usize> = FxHashSet::default();
    let mut init_closes: FxHashSet<usize> = FxHashSet::default();
    let mut do_body_closes: FxHashSet<usize> = FxHashSet::default();

    let ends_statement = |idx: usize, header_closes: &FxHashSet<usize>, init_closes: &FxHashSet<usize>| {
        let token = &tokens[idx].0;
        match token {
            Token::Semicolon
            | Token::LBrace
            | Token::Colon
            | Token::Else
            | Token::Do
            | Token::Try
            | Token::Finally
            | Token::Arrow => true,
            Token::RBrace => !init_closes.contains(&idx),
            Token::RParen => header_closes.contains(&idx),
            _ => false,
        }
    };

    for i in 0..tokens.len() {
        let (token, span) = &tokens[i];
        if i > 0 {
            let prev = i - 1;
            let in_initializer = matches!(braces.last(), Some((BraceKind::Initializer, _)));
            let closes_block = *token == Token::RBrace
                && paren == 0
                && matches!(braces.last(), Some((BraceKind::Block, _)));
            let new_line = span.line > tokens[prev].1.line
                && paren == 0
                && bracket == 0
                && !in_initializer;
            let at_boundary = closes_block
                || (new_line && !dangles(&tokens[prev].0) && !continues(token));
            if at_boundary && !ends_statement(prev, &header_closes, &init_closes) {
                let line = tokens[prev].1.line;
                if missing.last() != Some(&line) {
                    missing.push(line);
                }
            }
        }

        match token {
            Token::LParen => {
                paren += 1;
                let after_keyword = i > 0
                    && matches!(
                        tokens[i - 1].0,
                        Token::If
                            | Token::While
                            | Token::For
                            | Token::Switch
                            | Token::Catch
                            | Token::Synchronized
                    );
                // `do { } while (c);` still needs its `;`
                let do_trailer = i > 1
                    && tokens[i - 1].0 == Token::While
                    && do_body_closes.contains(&(i - 2));
                if after_keyword && !do_trailer {
                    header_parens.push(paren);
                }
            }
            Token::RParen => {
                if header_parens.last() == Some(&paren) {
                    header_parens.pop();
                    header_closes.insert(i);
                }
                paren = paren.saturating_sub(1);
            }
            Token::LBracket => bracket += 1,
            Token::RBracket => bracket = bracket.saturating_sub(1),
            Token::LBrace => {
                let prev = if i > 0 { Some(&tokens[i - 1].0) } else { None };
                let in_initializer = matches!(braces.last(), Some((BraceKind::Initializer, _)));
                let kind = match prev {
                    Some(Token::Assign) | Some(Token::RBracket) => BraceKind::Initializer,
                    Some(Token::Comma) | Some(Token::LBrace) if in_initializer => {
                        BraceKind::Initializer
                    }
                    _ => BraceKind::Block,
                };
                braces.push((kind, i));
            }
            Token::RBrace => {
                if let Some((kind, open)) = braces.pop() {
                    if kind == BraceKind::Initializer {
                        init_closes.insert(i);
                    } else if open > 0 && tokens[open - 1].0 == Token::Do {
                        do_body_closes.insert(i);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(last) = tokens.len().checked_sub(1) {
        if !ends_statement(last, &header_closes, &init_closes) {
            let line = tokens[last].1.line;
            if missing.last() != Some(&line) {
                missing.push(line);
            }
        }
    }
    missing
}

/// A token after which the statement cannot have ended.
fn dangles(token: &Token) -> bool {
    matches!(
        token,
        Token::Assign
            | Token::PlusEq
            | Token::MinusEq
            | Token::StarEq
            | Token::SlashEq
            | Token::PercentEq
            | Token::AmpEq
            | Token::PipeEq
            | Token::CaretEq
            | Token::ShlEq
            | Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::Percent
            | Token::AmpAmp
            | Token::PipePipe
            | Token::Amp
            | Token::Pipe
            | Token::Caret
            | Token::EqEq
            | Token::NotEq
            | Token::Lt
            | Token::LtEq
            | Token::Gt
            | Token::Shl
            | Token::Bang
            | Token::Tilde
            | Token::Question
            | Token::Dot
            | Token::Comma
            | Token::LParen
            | Token::LBracket
            | Token::Return
            | Token::Throw
            | Token::New
            | Token::Case
            | Token::Instanceof
            | Token::At
    )
}

/// A token that cannot start a statement, so it continues the previous one.
fn continues(token: &Token) -> bool {
    matches!(
        token,
        Token::Dot
            | Token::RParen
            | Token::RBracket
            | Token::LBracket
            | Token::Comma
            | Token::Semicolon
            | Token::Question
            | Token::Colon
            | Token::Assign
            | Token::PlusEq
            | Token::MinusEq
            | Token::StarEq
            | Token::SlashEq
            | Token::PercentEq
            | Token::AmpEq
            | Token::PipeEq
            | Token::CaretEq
            | Token::ShlEq
            | Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::Percent
            | Token::AmpAmp
            | Token::PipePipe
            | Token::Amp
            | Token::Pipe
            | Token::Caret
            | Token::EqEq
            | Token::NotEq
            | Token::Lt
            | Token::LtEq
            | Token::Gt
            | Token::Shl
            | Token::LBrace
            | Token::Else
            | Token::Catch
            | Token::Finally
            | Token::Instanceof
            | Token::Arrow
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_unit, SourceUnit};

    fn check(src: &str) -> Vec<String> {
        let units = vec![parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap()];
        let (table, mut errors) = ClassTable::build(&units);
        check_termination(&table, &mut errors);
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_well_formed_bodies_pass() {
        let errors = check(
            "class Main {
    static int[] data = {1, 2};
    public static void main(String[] args) {
        int[][] grid = {
            {1, 2},
            {3, 4}
        };
        String s = \"a\"
            + \"b\";
        if (s.length() > 1)
            System.out.println(s);
        else
            System.out.println(\"short\");
        for (int i = 0; i < 3; i++) {
            continue;
        }
        do {
            s = s + \"!\";
        } while (s.length() < 5);
        switch (s.length()) {
            case 5:
                break;
            default:
        }
        try {
            foo();
        } catch (RuntimeException e) {
        } finally {
        }
        outer:
        while (true) { break outer; }
        int x = true
            ? 1
            : 2;
    }
    static void foo() {}
}",
        );
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_missing_semicolon_reports_offending_line() {
        let errors = check(
            "class Main {
    public static void main(String[] args) {
        int x = 1
        System.out.println(x);
    }
}",
        );
        assert_eq!(errors, vec!["';' expected at Main.java:3 (in Main.main)"]);
    }

    #[test]
    fn test_missing_semicolon_before_closing_brace() {
        let errors = check(
            "class Main {
    Main() {
        if (true) { foo() }
    }
    void foo() {}
}",
        );
        assert_eq!(errors, vec!["';' expected at Main.java:3 (in Main.<init>)"]);
    }

    #[test]
    fn test_do_while_needs_terminator() {
        let errors = check(
            "class Main {
    static {
        int i = 0;
        do {
            i++;
        } while (i < 3)
    }
}",
        );
        assert_eq!(errors, vec!["';' expected at Main.java:6 (in Main.<clinit>)"]);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let errors = check(
            "class Main {
    void a() {
        int x = 1
        int y = 2
        return;
    }
    void b() {
        foo()
    }
    void foo() {}
}",
        );
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors[2].ends_with("Main.java:8 (in Main.b)"));
    }
}
