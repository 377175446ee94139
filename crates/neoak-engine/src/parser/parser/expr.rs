//! Expression parser (precedence climbing).
//!
//! The lexer never produces `>>`, `>>>`, `>=`, or `>>=`; those are re-joined
//! here from adjacent `>` tokens so generic argument lists elsewhere can close
//! one bracket at a time.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::parser::stmt::BodyParser;
use crate::parser::parser::types::{parse_dims, try_parse_type};
use crate::parser::token::Token;

/// Tokens that can start an operand following a reference-type cast.
fn starts_cast_operand(token: Option<&Token>) -> bool {
    matches!(
        token,
        Some(
            Token::Ident(_)
                | Token::IntLit(_)
                | Token::LongLit(_)
                | Token::DoubleLit(_)
                | Token::StringLit(_)
                | Token::CharLit(_)
                | Token::True
                | Token::False
                | Token::Null
                | Token::This
                | Token::Super
                | Token::New
                | Token::LParen
                | Token::Bang
                | Token::Tilde
        )
    )
}

impl<'t> BodyParser<'t> {
    /// Parse a full expression (assignment level).
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.reject_lambda()?;
        let target = self.parse_ternary()?;
        let span = self.cursor.span();
        let Some((op, width)) = self.peek_assign_op() else {
            return Ok(target);
        };
        if !matches!(
            target,
            Expr::Name { .. } | Expr::FieldAccess { .. } | Expr::Index { .. } | Expr::SuperField { .. }
        ) {
            return Err(self.cursor.malformed("unexpected type; variable expected", span));
        }
        for _ in 0..width {
            self.cursor.advance();
        }
        let value = if self.cursor.check(&Token::LBrace) {
            self.parse_var_init()?
        } else {
            self.parse_expr()?
        };
        Ok(Expr::Assign {
            op,
            span: target.span(),
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// Lambdas are recognized only to be rejected.
    fn reject_lambda(&mut self) -> Result<(), ParseError> {
        let span = self.cursor.span();
        let is_lambda = match self.cursor.peek() {
            Some(Token::Ident(_)) => self.cursor.peek_nth(1) == Some(&Token::Arrow),
            Some(Token::LParen) => {
                let start = self.cursor.pos();
                let arrow = self
                    .cursor
                    .balanced(&Token::LParen, &Token::RParen)
                    .map(|_| self.cursor.check(&Token::Arrow))
                    .unwrap_or(false);
                self.cursor.reset(start);
                arrow
            }
            _ => false,
        };
        if is_lambda {
            return Err(self.unsupported("lambda expression", span));
        }
        Ok(())
    }

    /// Assignment operator at the cursor, with its token width.
    fn peek_assign_op(&self) -> Option<(Option<BinaryOp>, usize)> {
        let op = match self.cursor.peek()? {
            Token::Assign => return Some((None, 1)),
            Token::PlusEq => BinaryOp::Add,
            Token::MinusEq => BinaryOp::Sub,
            Token::StarEq => BinaryOp::Mul,
            Token::SlashEq => BinaryOp::Div,
            Token::PercentEq => BinaryOp::Rem,
            Token::AmpEq => BinaryOp::BitAnd,
            Token::PipeEq => BinaryOp::BitOr,
            Token::CaretEq => BinaryOp::BitXor,
            Token::ShlEq => BinaryOp::Shl,
            Token::Gt => {
                return match self.gt_run() {
                    (2, true) => Some((Some(BinaryOp::Shr), 3)),
                    (3, true) => Some((Some(BinaryOp::UShr), 4)),
                    _ => None,
                }
            }
            _ => return None,
        };
        Some((Some(op), 1))
    }

    /// Count adjacent `>` tokens at the cursor and whether an adjacent `=`
    /// follows them.
    fn gt_run(&self) -> (usize, bool) {
        let mut count = 1;
        while count < 3 && self.cursor.peek_nth(count) == Some(&Token::Gt) && self.cursor.adjacent(count)
        {
            count += 1;
        }
        let eq = self.cursor.peek_nth(count) == Some(&Token::Assign) && self.cursor.adjacent(count);
        (count, eq)
    }

    /// `cond ? a : b`
    pub fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if !self.cursor.check(&Token::Question) {
            return Ok(cond);
        }
        self.cursor.advance();
        let then = self.parse_expr()?;
        self.cursor.expect(&Token::Colon)?;
        self.reject_lambda()?;
        let els = self.parse_ternary()?;
        Ok(Expr::Conditional {
            span: cond.span(),
            cond: Box::new(cond),
            then: Box::new(then),
            els: Box::new(els),
        })
    }

    /// Binary operator at the cursor, with its token width.
    fn peek_binary_op(&self) -> Option<(BinaryOp, usize)> {
        let op = match self.cursor.peek()? {
            Token::PipePipe => BinaryOp::Or,
            Token::AmpAmp => BinaryOp::And,
            Token::Pipe => BinaryOp::BitOr,
            Token::Caret => BinaryOp::BitXor,
            Token::Amp => BinaryOp::BitAnd,
            Token::EqEq => BinaryOp::Eq,
            Token::NotEq => BinaryOp::Ne,
            Token::Lt => BinaryOp::Lt,
            Token::LtEq => BinaryOp::Le,
            Token::Shl => BinaryOp::Shl,
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Rem,
            Token::Gt => {
                return match self.gt_run() {
                    (1, false) => Some((BinaryOp::Gt, 1)),
                    (1, true) => Some((BinaryOp::Ge, 2)),
                    (2, false) => Some((BinaryOp::Shr, 2)),
                    (3, false) => Some((BinaryOp::UShr, 3)),
                    // `>>=` and `>>>=` are assignments
                    _ => None,
                }
            }
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            if self.cursor.check(&Token::Instanceof) {
                if 7 < min_prec {
                    break;
                }
                let span = self.cursor.span();
                self.cursor.advance();
                self.cursor.eat(&Token::Final);
                let Some(ty) = try_parse_type(&mut self.cursor, &self.type_params) else {
                    return Err(self.cursor.expected("type"));
                };
                if matches!(self.cursor.peek(), Some(Token::Ident(_))) {
                    return Err(self.unsupported("instanceof pattern", span));
                }
                lhs = Expr::InstanceOf {
                    span: lhs.span(),
                    expr: Box::new(lhs),
                    ty,
                };
                continue;
            }
            let Some((op, width)) = self.peek_binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            for _ in 0..width {
                self.cursor.advance();
            }
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary {
                op,
                span: lhs.span(),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let span = self.cursor.span();
        let op = match self.cursor.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Tilde) => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            // fold negative literals so `-2147483648` and `-1` stay literals
            if op == UnaryOp::Neg {
                if let Expr::Literal { value, .. } = &operand {
                    let folded = match value {
                        Literal::Int(v) => Some(Literal::Int(v.wrapping_neg())),
                        Literal::Long(v) => Some(Literal::Long(v.wrapping_neg())),
                        Literal::Double(v) => Some(Literal::Double(-v)),
                        _ => None,
                    };
                    if let Some(value) = folded {
                        return Ok(Expr::Literal { value, span });
                    }
                }
            }
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        if matches!(self.cursor.peek(), Some(Token::PlusPlus | Token::MinusMinus)) {
            let increment = self.cursor.check(&Token::PlusPlus);
            self.cursor.advance();
            let target = self.parse_unary()?;
            return Ok(Expr::IncDec {
                increment,
                prefix: true,
                target: Box::new(target),
                span,
            });
        }
        if self.cursor.check(&Token::LParen) {
            if let Some(cast) = self.try_cast()? {
                return Ok(cast);
            }
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// `(T) expr`, if the parenthesized tokens form a cast.
    fn try_cast(&mut self) -> Result<Option<Expr>, ParseError> {
        let start = self.cursor.pos();
        let span = self.cursor.span();
        self.cursor.advance();
        let Some(ty) = try_parse_type(&mut self.cursor, &self.type_params) else {
            self.cursor.reset(start);
            return Ok(None);
        };
        if !self.cursor.eat(&Token::RParen) {
            self.cursor.reset(start);
            return Ok(None);
        }
        let is_cast = if ty.is_primitive() {
            !matches!(self.cursor.peek(), Some(Token::RParen | Token::Semicolon) | None)
        } else {
            starts_cast_operand(self.cursor.peek())
        };
        if !is_cast {
            self.cursor.reset(start);
            return Ok(None);
        }
        let expr = self.parse_unary()?;
        Ok(Some(Expr::Cast {
            ty,
            expr: Box::new(expr),
            span,
        }))
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            let span = self.cursor.span();
            match self.cursor.peek() {
                Some(Token::Dot) => {
                    self.cursor.advance();
                    if self.cursor.check(&Token::Lt) {
                        self.cursor.skip_type_args()?;
                    }
                    match self.cursor.peek() {
                        Some(Token::Ident(_)) => {}
                        Some(Token::Class) => return Err(self.unsupported("class literal", span)),
                        Some(Token::New) => {
                            return Err(self.unsupported("qualified inner class creation", span))
                        }
                        Some(Token::This) => return Err(self.unsupported("qualified this", span)),
                        _ => return Err(self.cursor.expected("<identifier>")),
                    }
                    let (name, name_span) = self.cursor.expect_ident()?;
                    if self.cursor.check(&Token::LParen) {
                        let args = self.parse_args()?;
                        expr = Expr::Call {
                            target: Some(Box::new(expr)),
                            name,
                            args,
                            span: name_span,
                        };
                    } else {
                        expr = Expr::FieldAccess {
                            target: Box::new(expr),
                            name,
                            span: name_span,
                        };
                    }
                }
                Some(Token::LBracket) => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.expect(&Token::RBracket)?;
                    expr = Expr::Index {
                        span: expr.span(),
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Some(Token::PlusPlus | Token::MinusMinus) => {
                    let increment = self.cursor.check(&Token::PlusPlus);
                    self.cursor.advance();
                    expr = Expr::IncDec {
                        increment,
                        prefix: false,
                        span: expr.span(),
                        target: Box::new(expr),
                    };
                }
                Some(Token::ColonColon) => return Err(self.unsupported("method reference", span)),
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.cursor.span();
        let Some(token) = self.cursor.peek() else {
            return Err(self.cursor.expected("expression"));
        };
        let literal = match token {
            Token::IntLit(v) => Some(Literal::Int(*v)),
            Token::LongLit(v) => Some(Literal::Long(*v)),
            Token::DoubleLit(v) => Some(Literal::Double(*v)),
            Token::CharLit(c) => Some(Literal::Char(*c)),
            Token::StringLit(s) => Some(Literal::Str(s.clone())),
            Token::True => Some(Literal::Bool(true)),
            Token::False => Some(Literal::Bool(false)),
            Token::Null => Some(Literal::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.cursor.advance();
            return Ok(Expr::Literal { value, span });
        }
        match token {
            Token::Ident(name) => {
                let name = name.clone();
                self.cursor.advance();
                if self.cursor.check(&Token::LParen) {
                    let args = self.parse_args()?;
                    return Ok(Expr::Call {
                        target: None,
                        name,
                        args,
                        span,
                    });
                }
                Ok(Expr::Name { name, span })
            }
            Token::This => {
                self.cursor.advance();
                Ok(Expr::This { span })
            }
            Token::Super => {
                self.cursor.advance();
                self.cursor.expect(&Token::Dot)?;
                let (name, name_span) = self.cursor.expect_ident()?;
                if self.cursor.check(&Token::LParen) {
                    let args = self.parse_args()?;
                    return Ok(Expr::SuperCall {
                        name,
                        args,
                        span: name_span,
                    });
                }
                Ok(Expr::SuperField {
                    name,
                    span: name_span,
                })
            }
            Token::LParen => {
                self.cursor.advance();
                let expr = self.parse_expr()?;
                self.cursor.expect(&Token::RParen)?;
                Ok(expr)
            }
            Token::New => self.parse_new(),
            Token::Switch => Err(self.unsupported("switch expression", span)),
            _ => Err(self.cursor.expected("expression")),
        }
    }

    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let span = self.cursor.expect(&Token::New)?;
        let (mut name, _) = self.cursor.expect_ident()?;
        if self.cursor.check(&Token::Lt) {
            self.cursor.skip_type_args()?;
        }
        while self.cursor.check(&Token::Dot) {
            self.cursor.advance();
            let (segment, _) = self.cursor.expect_ident()?;
            name = segment;
            if self.cursor.check(&Token::Lt) {
                self.cursor.skip_type_args()?;
            }
        }

        if self.cursor.check(&Token::LBracket) {
            let mut dims = Vec::new();
            let mut extra_dims = 0;
            while self.cursor.check(&Token::LBracket) {
                if self.cursor.peek_nth(1) == Some(&Token::RBracket) {
                    extra_dims += parse_dims(&mut self.cursor);
                    break;
                }
                if extra_dims > 0 {
                    return Err(self.cursor.expected("']'"));
                }
                self.cursor.advance();
                dims.push(self.parse_expr()?);
                self.cursor.expect(&Token::RBracket)?;
            }
            let init = if dims.is_empty() {
                if !self.cursor.check(&Token::LBrace) {
                    return Err(self.cursor.malformed("array dimension missing", span));
                }
                match self.parse_var_init()? {
                    Expr::ArrayInit { elements, .. } => Some(elements),
                    _ => None,
                }
            } else {
                None
            };
            let total = dims.len() as u32 + extra_dims;
            return Ok(Expr::NewArray {
                elem: self.array_type(name, total.saturating_sub(1)),
                dims,
                extra_dims,
                init,
                span,
            });
        }

        let args = self.parse_args()?;
        if self.cursor.check(&Token::LBrace) {
            return Err(self.unsupported("anonymous class", span));
        }
        Ok(Expr::New {
            class: name,
            args,
            span,
        })
    }

    /// `( expr, ... )`
    pub fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.cursor.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if self.cursor.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.cursor.eat(&Token::Comma) {
                continue;
            }
            self.cursor.expect(&Token::RParen)?;
            return Ok(args);
        }
    }
}
