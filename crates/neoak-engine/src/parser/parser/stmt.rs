//! Recursive-descent statement parser for member bodies.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::parser::types::{parse_dims, try_parse_type, with_extra_dims};
use crate::parser::parser::Cursor;
use crate::parser::token::{Span, Token};

/// Parser over one member body (or initializer expression).
pub struct BodyParser<'t> {
    pub(super) cursor: Cursor<'t>,
    pub(super) type_params: Vec<String>,
}

/// Parse a body token block into statements.
pub fn parse_body(
    block: &TokenBlock,
    file: &str,
    context: &str,
    type_params: &[String],
) -> Result<Vec<Stmt>, ParseError> {
    let mut parser = BodyParser::new(block, file, context, type_params);
    let mut stmts = Vec::new();
    while !parser.cursor.is_eof() {
        stmts.push(parser.parse_stmt()?);
    }
    Ok(stmts)
}

/// Parse an initializer token block (`= ...` of a field) into an expression.
pub fn parse_initializer(
    block: &TokenBlock,
    file: &str,
    context: &str,
    type_params: &[String],
) -> Result<Expr, ParseError> {
    let mut parser = BodyParser::new(block, file, context, type_params);
    let expr = parser.parse_var_init()?;
    if !parser.cursor.is_eof() {
        return Err(parser.cursor.expected("';'"));
    }
    Ok(expr)
}

impl<'t> BodyParser<'t> {
    fn new(block: &'t TokenBlock, file: &'t str, context: &str, type_params: &[String]) -> Self {
        let mut cursor = Cursor::new(&block.tokens, file).with_fallback(block.span);
        cursor.set_context(Some(context.to_string()));
        Self {
            cursor,
            type_params: type_params.to_vec(),
        }
    }

    pub(super) fn unsupported(&self, what: &str, span: Span) -> ParseError {
        ParseError::Unsupported {
            what: what.into(),
            location: self.cursor.location(span),
        }
    }

    /// Consume the `;` ending a simple statement.
    fn end_statement(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(&Token::Semicolon) {
            return Ok(());
        }
        let mut err = self.cursor.expected("';'");
        if let ParseError::Expected { location, .. } = &mut err {
            location.line = self.cursor.prev_span().line;
        }
        Err(err)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse one statement.
    pub fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cursor.span();
        let Some(token) = self.cursor.peek() else {
            return Err(self.cursor.expected("statement"));
        };
        match token {
            Token::LBrace => Ok(Stmt::Block {
                body: self.parse_block()?,
                span,
            }),
            Token::Semicolon => {
                self.cursor.advance();
                Ok(Stmt::Empty { span })
            }
            Token::If => self.parse_if(),
            Token::While => {
                self.cursor.advance();
                let cond = self.parse_paren_expr()?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::While { cond, body, span })
            }
            Token::Do => {
                self.cursor.advance();
                let body = Box::new(self.parse_stmt()?);
                self.cursor.expect(&Token::While)?;
                let cond = self.parse_paren_expr()?;
                self.end_statement()?;
                Ok(Stmt::DoWhile { body, cond, span })
            }
            Token::For => self.parse_for(),
            Token::Switch => self.parse_switch(),
            Token::Return => {
                self.cursor.advance();
                let value = if self.cursor.check(&Token::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.end_statement()?;
                Ok(Stmt::Return { value, span })
            }
            Token::Break | Token::Continue => {
                let is_break = *token == Token::Break;
                self.cursor.advance();
                let label = match self.cursor.peek() {
                    Some(Token::Ident(name)) => {
                        self.cursor.advance();
                        Some(name.clone())
                    }
                    _ => None,
                };
                self.end_statement()?;
                Ok(if is_break {
                    Stmt::Break { label, span }
                } else {
                    Stmt::Continue { label, span }
                })
            }
            Token::Throw => {
                self.cursor.advance();
                let value = self.parse_expr()?;
                self.end_statement()?;
                Ok(Stmt::Throw { value, span })
            }
            Token::Try => self.parse_try(),
            Token::Synchronized if self.cursor.peek_nth(1) == Some(&Token::LParen) => {
                self.cursor.advance();
                let lock = self.parse_paren_expr()?;
                let body = self.parse_block()?;
                Ok(Stmt::Synchronized { lock, body, span })
            }
            Token::Class | Token::Interface | Token::Enum | Token::Abstract | Token::Static => {
                Err(self.unsupported("local class", span))
            }
            Token::This if self.cursor.peek_nth(1) == Some(&Token::LParen) => {
                self.cursor.advance();
                let args = self.parse_args()?;
                self.end_statement()?;
                Ok(Stmt::ThisInit { args, span })
            }
            Token::Super if self.cursor.peek_nth(1) == Some(&Token::LParen) => {
                self.cursor.advance();
                let args = self.parse_args()?;
                self.end_statement()?;
                Ok(Stmt::SuperInit { args, span })
            }
            Token::Ident(name) if self.cursor.peek_nth(1) == Some(&Token::Colon) => {
                let label = name.clone();
                self.cursor.advance();
                self.cursor.advance();
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::Labeled { label, body, span })
            }
            _ => {
                if self.cursor.check(&Token::Final) {
                    self.cursor.advance();
                    if matches!(self.cursor.peek(), Some(Token::Class)) {
                        return Err(self.unsupported("local class", span));
                    }
                }
                if let Some(ty) = self.try_local_type() {
                    let stmt = self.parse_local_rest(ty, span)?;
                    self.end_statement()?;
                    return Ok(stmt);
                }
                let expr = self.parse_expr()?;
                self.end_statement()?;
                Ok(Stmt::Expr { expr, span })
            }
        }
    }

    /// Parse `{ stmts }`.
    pub fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let open = self.cursor.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        loop {
            if self.cursor.eat(&Token::RBrace) {
                return Ok(stmts);
            }
            if self.cursor.is_eof() {
                return Err(ParseError::UnexpectedEof {
                    what: "block".into(),
                    location: self.cursor.location(open),
                });
            }
            stmts.push(self.parse_stmt()?);
        }
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.cursor.expect(&Token::LParen)?;
        let expr = self.parse_expr()?;
        self.cursor.expect(&Token::RParen)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cursor.expect(&Token::If)?;
        let cond = self.parse_paren_expr()?;
        let then = Box::new(self.parse_stmt()?);
        let els = if self.cursor.eat(&Token::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then,
            els,
            span,
        })
    }

    /// If a local variable declaration starts here, consume its type.
    fn try_local_type(&mut self) -> Option<TypeRef> {
        let start = self.cursor.pos();
        let ty = try_parse_type(&mut self.cursor, &self.type_params)?;
        let is_decl = matches!(self.cursor.peek(), Some(Token::Ident(_)))
            && matches!(
                self.cursor.peek_nth(1),
                Some(
                    Token::Assign
                        | Token::Semicolon
                        | Token::Comma
                        | Token::LBracket
                        | Token::Colon
                )
            );
        if is_decl {
            Some(ty)
        } else {
            self.cursor.reset(start);
            None
        }
    }

    fn parse_local_rest(&mut self, ty: TypeRef, span: Span) -> Result<Stmt, ParseError> {
        let mut decls = Vec::new();
        loop {
            let (name, name_span) = self.cursor.expect_ident()?;
            let dims = parse_dims(&mut self.cursor);
            let init = if self.cursor.eat(&Token::Assign) {
                Some(self.parse_var_init()?)
            } else {
                None
            };
            decls.push(Declarator {
                name,
                dims,
                init,
                span: name_span,
            });
            if !self.cursor.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Stmt::Local { ty, decls, span })
    }

    /// Variable initializer: an expression or a `{ ... }` array initializer.
    pub fn parse_var_init(&mut self) -> Result<Expr, ParseError> {
        if !self.cursor.check(&Token::LBrace) {
            return self.parse_expr();
        }
        let span = self.cursor.span();
        self.cursor.advance();
        let mut elements = Vec::new();
        while !self.cursor.check(&Token::RBrace) {
            elements.push(self.parse_var_init()?);
            if !self.cursor.eat(&Token::Comma) {
                break;
            }
        }
        self.cursor.expect(&Token::RBrace)?;
        Ok(Expr::ArrayInit { elements, span })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cursor.expect(&Token::For)?;
        self.cursor.expect(&Token::LParen)?;
        while self.cursor.eat(&Token::Final) {}

        // for-each
        let start = self.cursor.pos();
        if let Some(ty) = try_parse_type(&mut self.cursor, &self.type_params) {
            if let (Some(Token::Ident(name)), Some(Token::Colon)) =
                (self.cursor.peek(), self.cursor.peek_nth(1))
            {
                let name = name.clone();
                self.cursor.advance();
                self.cursor.advance();
                let iterable = self.parse_expr()?;
                self.cursor.expect(&Token::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                return Ok(Stmt::ForEach {
                    ty,
                    name,
                    iterable,
                    body,
                    span,
                });
            }
            self.cursor.reset(start);
        }

        let mut init = Vec::new();
        if !self.cursor.check(&Token::Semicolon) {
            let init_span = self.cursor.span();
            if let Some(ty) = self.try_local_type() {
                init.push(self.parse_local_rest(ty, init_span)?);
            } else {
                loop {
                    let expr_span = self.cursor.span();
                    let expr = self.parse_expr()?;
                    init.push(Stmt::Expr {
                        expr,
                        span: expr_span,
                    });
                    if !self.cursor.eat(&Token::Comma) {
                        break;
                    }
                }
            }
        }
        self.cursor.expect(&Token::Semicolon)?;
        let cond = if self.cursor.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&Token::Semicolon)?;
        let mut update = Vec::new();
        if !self.cursor.check(&Token::RParen) {
            loop {
                update.push(self.parse_expr()?);
                if !self.cursor.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(&Token::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
            span,
        })
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cursor.expect(&Token::Switch)?;
        let scrutinee = self.parse_paren_expr()?;
        self.cursor.expect(&Token::LBrace)?;
        let mut cases: Vec<SwitchCase> = Vec::new();
        loop {
            let label_span = self.cursor.span();
            match self.cursor.peek() {
                Some(Token::RBrace) => {
                    self.cursor.advance();
                    break;
                }
                Some(Token::Case) | Some(Token::Default) => {
                    let (labels, is_default) = self.parse_case_labels()?;
                    // consecutive labels share one group
                    match cases.last_mut() {
                        Some(last) if last.body.is_empty() => {
                            last.labels.extend(labels);
                            last.is_default |= is_default;
                        }
                        _ => cases.push(SwitchCase {
                            labels,
                            is_default,
                            body: Vec::new(),
                            span: label_span,
                        }),
                    }
                }
                Some(_) => {
                    let Some(current) = cases.last_mut() else {
                        return Err(self.cursor.expected("'case', 'default', or '}'"));
                    };
                    let stmt = self.parse_stmt()?;
                    current.body.push(stmt);
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        what: "switch".into(),
                        location: self.cursor.location(span),
                    })
                }
            }
        }
        Ok(Stmt::Switch {
            scrutinee,
            cases,
            span,
        })
    }

    fn parse_case_labels(&mut self) -> Result<(Vec<Expr>, bool), ParseError> {
        let span = self.cursor.span();
        if self.cursor.eat(&Token::Default) {
            if self.cursor.check(&Token::Arrow) {
                return Err(self.unsupported("switch rule", span));
            }
            self.cursor.expect(&Token::Colon)?;
            return Ok((Vec::new(), true));
        }
        self.cursor.expect(&Token::Case)?;
        let mut labels = vec![self.parse_ternary()?];
        while self.cursor.eat(&Token::Comma) {
            labels.push(self.parse_ternary()?);
        }
        if self.cursor.check(&Token::Arrow) {
            return Err(self.unsupported("switch rule", span));
        }
        self.cursor.expect(&Token::Colon)?;
        Ok((labels, false))
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cursor.expect(&Token::Try)?;
        if self.cursor.check(&Token::LParen) {
            return Err(self.unsupported("try-with-resources", span));
        }
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.cursor.check(&Token::Catch) {
            let catch_span = self.cursor.span();
            self.cursor.advance();
            self.cursor.expect(&Token::LParen)?;
            while self.cursor.eat(&Token::Final) {}
            let mut types = Vec::new();
            loop {
                let Some(ty) = try_parse_type(&mut self.cursor, &[]) else {
                    return Err(self.cursor.expected("exception type"));
                };
                types.push(ty.name);
                if !self.cursor.eat(&Token::Pipe) {
                    break;
                }
            }
            let (name, _) = self.cursor.expect_ident()?;
            self.cursor.expect(&Token::RParen)?;
            let handler = self.parse_block()?;
            catches.push(CatchClause {
                types,
                name,
                body: handler,
                span: catch_span,
            });
        }
        let finally = if self.cursor.eat(&Token::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return Err(self
                .cursor
                .malformed("'try' without 'catch' or 'finally'", span));
        }
        Ok(Stmt::Try {
            body,
            catches,
            finally,
            span,
        })
    }

    /// Element type for `new T[...]` after the name and generic arguments.
    pub(super) fn array_type(&self, name: String, dims: u32) -> TypeRef {
        with_extra_dims(
            crate::parser::parser::types::make_type(name, 0, &self.type_params),
            dims,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::source::SourceUnit;

    fn body(src: &str) -> Result<Vec<Stmt>, ParseError> {
        let unit = SourceUnit::preprocess("Main.java", src);
        let tokens = tokenize(&unit).unwrap();
        let block = TokenBlock {
            tokens,
            span: Span::default(),
        };
        parse_body(&block, "Main.java", "Main.main", &[])
    }

    #[test]
    fn test_local_declarations() {
        let stmts = body("int a = 1, b[] = {1, 2}; List<String> xs; var y = a;").unwrap();
        assert_eq!(stmts.len(), 3);
        match &stmts[0] {
            Stmt::Local { ty, decls, .. } => {
                assert_eq!(ty.name, "int");
                assert_eq!(decls.len(), 2);
                assert_eq!(decls[1].dims, 1);
                assert!(matches!(decls[1].init, Some(Expr::ArrayInit { .. })));
            }
            other => panic!("expected local, got {:?}", other),
        }
        assert!(matches!(&stmts[2], Stmt::Local { ty, .. } if ty.name == "var"));
    }

    #[test]
    fn test_expression_statement_is_not_a_declaration() {
        let stmts = body("System.out.println(x); a[i] = 3; x = y;").unwrap();
        assert!(stmts.iter().all(|s| matches!(s, Stmt::Expr { .. })));
    }

    #[test]
    fn test_for_forms() {
        let stmts = body(
            "for (int i = 0, j = 1; i < n; i++, j--) {}
             for (String s : names) {}
             for (;;) { break; }",
        )
        .unwrap();
        assert!(matches!(&stmts[0], Stmt::For { init, update, .. } if init.len() == 1 && update.len() == 2));
        assert!(matches!(&stmts[1], Stmt::ForEach { name, .. } if name == "s"));
        assert!(matches!(&stmts[2], Stmt::For { cond: None, .. }));
    }

    #[test]
    fn test_switch_groups_and_fallthrough() {
        let stmts = body(
            "switch (v) {
                case 1: a(); break;
                case 2:
                case 3: b(); break;
                default: c();
             }",
        )
        .unwrap();
        let Stmt::Switch { cases, .. } = &stmts[0] else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[1].labels.len(), 2);
        assert!(cases[2].is_default);
    }

    #[test]
    fn test_try_multi_catch_finally() {
        let stmts = body(
            "try { f(); } catch (IOException | IllegalStateException e) { g(); } finally { h(); }",
        )
        .unwrap();
        let Stmt::Try { catches, finally, .. } = &stmts[0] else {
            panic!("expected try");
        };
        assert_eq!(catches[0].types, vec!["IOException", "IllegalStateException"]);
        assert!(finally.is_some());
    }

    #[test]
    fn test_labeled_loop_and_constructor_calls() {
        let stmts = body("outer: while (true) { continue outer; } super(1); this(2, 3);").unwrap();
        assert!(matches!(&stmts[0], Stmt::Labeled { label, .. } if label == "outer"));
        assert!(matches!(&stmts[1], Stmt::SuperInit { args, .. } if args.len() == 1));
        assert!(matches!(&stmts[2], Stmt::ThisInit { args, .. } if args.len() == 2));
    }

    #[test]
    fn test_missing_semicolon_reports_statement_line() {
        let err = body("int a = 1\nint b = 2;").unwrap_err();
        assert_eq!(err.location().line, 1);
    }

    #[test]
    fn test_unsupported_constructs() {
        let err = body("Runnable r = () -> run();").unwrap_err();
        assert!(err.to_string().contains("lambda"), "{}", err);
        let err = body("try (Scanner s = open()) { }").unwrap_err();
        assert!(err.to_string().contains("try-with-resources"), "{}", err);
        let err = body("class Local {}").unwrap_err();
        assert!(err.to_string().contains("local class"), "{}", err);
    }
}
