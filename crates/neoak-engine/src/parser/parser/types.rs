//! Type references: qualified names, erased generic arguments, array suffixes.

use crate::parser::ast::{coarse_of, CoarseType, TypeRef};
use crate::parser::error::ParseError;
use crate::parser::parser::Cursor;
use crate::parser::token::Token;

/// Parse a type reference, erasing generic arguments and qualification.
pub fn parse_type(cursor: &mut Cursor<'_>, type_params: &[String]) -> Result<TypeRef, ParseError> {
    cursor.skip_annotations()?;
    let (mut name, _) = cursor.expect_ident()?;
    if cursor.check(&Token::Lt) {
        cursor.skip_type_args()?;
    }
    while cursor.check(&Token::Dot) && matches!(cursor.peek_nth(1), Some(Token::Ident(_))) {
        cursor.advance();
        let (segment, _) = cursor.expect_ident()?;
        name = segment;
        if cursor.check(&Token::Lt) {
            cursor.skip_type_args()?;
        }
    }
    let dims = parse_dims(cursor);
    Ok(make_type(name, dims, type_params))
}

/// Parse a type if one starts here; restores the cursor otherwise.
pub fn try_parse_type(cursor: &mut Cursor<'_>, type_params: &[String]) -> Option<TypeRef> {
    let start = cursor.pos();
    match parse_type(cursor, type_params) {
        Ok(ty) => Some(ty),
        Err(_) => {
            cursor.reset(start);
            None
        }
    }
}

/// Consume `[]` pairs and return how many there were.
pub fn parse_dims(cursor: &mut Cursor<'_>) -> u32 {
    let mut dims = 0;
    while cursor.check(&Token::LBracket) && cursor.peek_nth(1) == Some(&Token::RBracket) {
        cursor.advance();
        cursor.advance();
        dims += 1;
    }
    dims
}

/// Build a type reference with its coarse tag.
pub fn make_type(name: String, dims: u32, type_params: &[String]) -> TypeRef {
    let coarse = if dims > 0 {
        CoarseType::Array
    } else {
        coarse_of(&name, type_params)
    };
    TypeRef { name, dims, coarse }
}

/// Add array dimensions to a type (`int a[]`, varargs).
pub fn with_extra_dims(ty: TypeRef, extra: u32) -> TypeRef {
    if extra == 0 {
        return ty;
    }
    TypeRef {
        dims: ty.dims + extra,
        coarse: CoarseType::Array,
        name: ty.name,
    }
}

/// Parse a `<T, U extends Bound>` type parameter list and return the names.
pub fn parse_type_params(cursor: &mut Cursor<'_>) -> Result<Vec<String>, ParseError> {
    let mut names = Vec::new();
    if !cursor.check(&Token::Lt) {
        return Ok(names);
    }
    let start = cursor.pos();
    cursor.skip_type_args()?;
    let end = cursor.pos();
    cursor.reset(start + 1);
    let mut depth = 1usize;
    let mut expect_name = true;
    while cursor.pos() < end {
        match cursor.advance().map(|(t, _)| t) {
            Some(Token::Lt) => depth += 1,
            Some(Token::Gt) => depth -= 1,
            Some(Token::Comma) if depth == 1 => expect_name = true,
            Some(Token::Ident(name)) if depth == 1 && expect_name => {
                names.push(name.clone());
                expect_name = false;
            }
            _ => {}
        }
    }
    cursor.reset(end);
    Ok(names)
}
