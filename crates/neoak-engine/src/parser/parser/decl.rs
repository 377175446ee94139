//! Structural declaration parser.
//!
//! Recognizes classes and interfaces, then walks each class body with an
//! ordered list of member recognizers: static block, instance block, nested
//! type, constructor, method, field. Member bodies are captured as opaque
//! token blocks.

use crate::parser::ast::*;
use crate::parser::error::ParseError;
use crate::parser::lexer::tokenize;
use crate::parser::parser::types::{make_type, parse_dims, parse_type, parse_type_params, with_extra_dims};
use crate::parser::parser::{split_top_level, Cursor, DepthTracker};
use crate::parser::source::SourceUnit;
use crate::parser::token::{Span, Spanned, Token};

/// Parse one source unit into its declaration table.
pub fn parse_unit(unit: &SourceUnit) -> Result<CompilationUnit, ParseError> {
    let tokens = tokenize(unit)?;
    let mut parser = DeclParser {
        cursor: Cursor::new(&tokens, &unit.path),
        package: unit.package.clone(),
        classes: Vec::new(),
    };
    parser.parse_top_level()?;
    log::debug!(
        "parsed {} class(es) from {}",
        parser.classes.len(),
        unit.path
    );
    Ok(CompilationUnit {
        file: unit.path.clone(),
        package: unit.package.clone(),
        classes: parser.classes,
    })
}

struct DeclParser<'t> {
    cursor: Cursor<'t>,
    package: Option<String>,
    classes: Vec<ClassDecl>,
}

/// What a member recognizer found after the modifiers.
enum Member {
    Constructor(ConstructorDecl),
    Method(MethodDecl),
    Fields(Vec<FieldDecl>),
}

impl<'t> DeclParser<'t> {
    fn parse_top_level(&mut self) -> Result<(), ParseError> {
        while !self.cursor.is_eof() {
            if self.cursor.eat(&Token::Semicolon) {
                continue;
            }
            let modifiers = self.parse_modifiers()?;
            self.parse_type_decl(modifiers, None)?;
        }
        Ok(())
    }

    // ========================================================================
    // Modifiers
    // ========================================================================

    fn parse_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::default();
        loop {
            self.cursor.skip_annotations()?;
            let Some(token) = self.cursor.peek() else {
                break;
            };
            if !token.is_modifier() {
                break;
            }
            // `static {` is an initializer block
            if *token == Token::Static && self.cursor.peek_nth(1) == Some(&Token::LBrace) {
                break;
            }
            match token {
                Token::Public => modifiers.visibility = Visibility::Public,
                Token::Private => modifiers.visibility = Visibility::Private,
                Token::Protected => modifiers.visibility = Visibility::Protected,
                Token::Static => modifiers.is_static = true,
                Token::Final => modifiers.is_final = true,
                Token::Abstract => modifiers.is_abstract = true,
                Token::Default => modifiers.is_default = true,
                Token::Synchronized => modifiers.is_synchronized = true,
                Token::Native => modifiers.is_native = true,
                _ => {}
            }
            self.cursor.advance();
        }
        Ok(modifiers)
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn parse_type_decl(
        &mut self,
        modifiers: Modifiers,
        outer: Option<&str>,
    ) -> Result<(), ParseError> {
        let span = self.cursor.span();
        let kind = match self.cursor.peek() {
            Some(Token::Class) => ClassKind::Class,
            Some(Token::Interface) => ClassKind::Interface,
            Some(Token::Enum) => return Err(self.unsupported("enum declaration", span)),
            Some(Token::At) => return Err(self.unsupported("annotation type declaration", span)),
            Some(t) if t.is_ident("record") => return Err(self.unsupported("record declaration", span)),
            _ => return Err(self.cursor.expected("class or interface")),
        };
        self.cursor.advance();
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.set_context(Some(name.clone()));
        let type_params = parse_type_params(&mut self.cursor)?;

        let mut superclass = None;
        let mut interfaces = Vec::new();
        if self.cursor.eat(&Token::Extends) {
            let supers = self.parse_type_list(&type_params)?;
            match kind {
                ClassKind::Class => {
                    if supers.len() > 1 {
                        return Err(self.cursor.malformed("'{' expected", span));
                    }
                    superclass = supers.into_iter().next();
                }
                ClassKind::Interface => interfaces.extend(supers),
            }
        }
        if self.cursor.eat(&Token::Implements) {
            if kind == ClassKind::Interface {
                return Err(self
                    .cursor
                    .malformed("'{' expected (interfaces use extends)", span));
            }
            interfaces.extend(self.parse_type_list(&type_params)?);
        }
        if self.cursor.check_ident("permits") {
            self.cursor.advance();
            self.parse_type_list(&type_params)?;
        }

        let mut class = ClassDecl {
            name: name.clone(),
            kind,
            modifiers,
            type_params,
            superclass,
            interfaces,
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            static_blocks: Vec::new(),
            instance_inits: Vec::new(),
            package: self.package.clone(),
            file: self.cursor.file().to_string(),
            line: span.line,
            outer: outer.map(str::to_string),
        };

        self.cursor.expect(&Token::LBrace)?;
        let index = self.classes.len();
        self.classes.push(class.clone());
        self.parse_class_body(&mut class)?;
        self.classes[index] = class;
        self.cursor.set_context(outer.map(str::to_string));
        Ok(())
    }

    fn parse_type_list(&mut self, type_params: &[String]) -> Result<Vec<String>, ParseError> {
        let mut names = vec![parse_type(&mut self.cursor, type_params)?.name];
        while self.cursor.eat(&Token::Comma) {
            names.push(parse_type(&mut self.cursor, type_params)?.name);
        }
        Ok(names)
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn parse_class_body(&mut self, class: &mut ClassDecl) -> Result<(), ParseError> {
        let in_interface = class.kind == ClassKind::Interface;
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ParseError::UnexpectedEof {
                        what: format!("class {}", class.name),
                        location: self.cursor.location(self.cursor.prev_span()),
                    })
                }
                Some(Token::RBrace) => {
                    self.cursor.advance();
                    return Ok(());
                }
                Some(Token::Semicolon) => {
                    self.cursor.advance();
                }
                Some(Token::Static) if self.cursor.peek_nth(1) == Some(&Token::LBrace) => {
                    self.cursor.advance();
                    let block = self.parse_block()?;
                    class.static_blocks.push(block);
                }
                Some(Token::LBrace) => {
                    let block = self.parse_block()?;
                    class.instance_inits.push(InstanceInit::Block(block));
                }
                Some(_) => {
                    let mut modifiers = self.parse_modifiers()?;
                    let nested_record = self.cursor.check_ident("record")
                        && matches!(self.cursor.peek_nth(1), Some(Token::Ident(_)));
                    if nested_record
                        || matches!(
                            self.cursor.peek(),
                            Some(Token::Class | Token::Interface | Token::Enum | Token::At)
                        )
                    {
                        self.parse_type_decl(modifiers, Some(&class.name))?;
                        self.cursor.set_context(Some(class.name.clone()));
                        continue;
                    }
                    if in_interface && modifiers.visibility == Visibility::PackagePrivate {
                        modifiers.visibility = Visibility::Public;
                    }
                    match self.parse_member(class, modifiers)? {
                        Member::Constructor(ctor) => class.constructors.push(ctor),
                        Member::Method(method) => class.methods.push(method),
                        Member::Fields(fields) => {
                            for mut field in fields {
                                if in_interface {
                                    field.modifiers.is_static = true;
                                    field.modifiers.is_final = true;
                                }
                                if field.init.is_some() && !field.modifiers.is_static {
                                    class
                                        .instance_inits
                                        .push(InstanceInit::Field(class.fields.len()));
                                }
                                class.fields.push(field);
                            }
                        }
                    }
                }
            }
        }
    }

    fn parse_member(
        &mut self,
        class: &ClassDecl,
        modifiers: Modifiers,
    ) -> Result<Member, ParseError> {
        let start = self.cursor.span();
        let mut type_params = class.type_params.clone();
        let method_params = parse_type_params(&mut self.cursor)?;
        type_params.extend(method_params.iter().cloned());

        // Constructor: `Name(`
        if self.cursor.check_ident(&class.name) && self.cursor.peek_nth(1) == Some(&Token::LParen)
        {
            if class.kind == ClassKind::Interface {
                return Err(self.cursor.malformed("interfaces cannot have constructors", start));
            }
            self.cursor.advance();
            self.cursor
                .set_context(Some(format!("{}.<init>", class.name)));
            let params = self.parse_params(&type_params)?;
            self.skip_throws()?;
            if !self.cursor.check(&Token::LBrace) {
                return Err(self.cursor.expected("'{'"));
            }
            let body = self.parse_block()?;
            self.cursor.set_context(Some(class.name.clone()));
            return Ok(Member::Constructor(ConstructorDecl {
                modifiers,
                params,
                body,
                order: class.constructors.len(),
                line: start.line,
            }));
        }

        // Return or field type
        let return_type = if self.cursor.eat(&Token::Void) {
            None
        } else {
            Some(parse_type(&mut self.cursor, &type_params)?)
        };
        let (name, name_span) = self.cursor.expect_ident()?;

        if self.cursor.check(&Token::LParen) {
            self.cursor
                .set_context(Some(format!("{}.{}", class.name, name)));
            let params = self.parse_params(&type_params)?;
            let extra = parse_dims(&mut self.cursor);
            let return_type = return_type.map(|t| with_extra_dims(t, extra));
            let throws = self.skip_throws()?;
            let mut modifiers = modifiers;
            let body = if self.cursor.eat(&Token::Semicolon) {
                if class.kind == ClassKind::Class
                    && !modifiers.is_abstract
                    && !modifiers.is_native
                {
                    return Err(self
                        .cursor
                        .malformed("missing method body, or declare abstract", name_span));
                }
                if class.kind == ClassKind::Interface {
                    modifiers.is_abstract = true;
                }
                None
            } else if self.cursor.check(&Token::LBrace) {
                if modifiers.is_abstract {
                    return Err(self
                        .cursor
                        .malformed("abstract methods cannot have a body", name_span));
                }
                if class.kind == ClassKind::Interface
                    && !modifiers.is_default
                    && !modifiers.is_static
                    && modifiers.visibility != Visibility::Private
                {
                    return Err(self
                        .cursor
                        .malformed("interface abstract methods cannot have body", name_span));
                }
                Some(self.parse_block()?)
            } else {
                return Err(self.cursor.expected("'{' or ';'"));
            };
            self.cursor.set_context(Some(class.name.clone()));
            return Ok(Member::Method(MethodDecl {
                name,
                modifiers,
                type_params: method_params,
                return_type,
                params,
                throws,
                body,
                order: class.methods.len(),
                line: name_span.line,
            }));
        }

        let Some(base) = return_type else {
            return Err(self.cursor.expected("'('"));
        };
        if !method_params.is_empty() {
            return Err(self.cursor.expected("'('"));
        }
        self.parse_fields(base, name, name_span, modifiers, &type_params)
            .map(Member::Fields)
    }

    fn parse_fields(
        &mut self,
        base: TypeRef,
        first_name: String,
        first_span: Span,
        modifiers: Modifiers,
        type_params: &[String],
    ) -> Result<Vec<FieldDecl>, ParseError> {
        let mut fields = Vec::new();
        let mut name = first_name;
        let mut span = first_span;
        loop {
            let extra = parse_dims(&mut self.cursor);
            let ty = with_extra_dims(
                make_type(base.name.clone(), base.dims, type_params),
                extra,
            );
            let init = if self.cursor.check(&Token::Assign) {
                let assign = self.cursor.span();
                self.cursor.advance();
                Some(self.capture_initializer(assign)?)
            } else {
                None
            };
            fields.push(FieldDecl {
                name,
                modifiers,
                ty,
                init,
                line: span.line,
            });
            if self.cursor.eat(&Token::Comma) {
                let (next, next_span) = self.cursor.expect_ident()?;
                name = next;
                span = next_span;
                continue;
            }
            if self.cursor.eat(&Token::Semicolon) {
                return Ok(fields);
            }
            return Err(self.missing_semicolon());
        }
    }

    /// Capture initializer tokens up to a top-level `,` or `;`.
    fn capture_initializer(&mut self, assign: Span) -> Result<TokenBlock, ParseError> {
        let mut tokens: Vec<Spanned> = Vec::new();
        let mut depth = DepthTracker::new();
        let mut after_new = false;
        let mut angle = 0u32;
        loop {
            let Some((token, span)) = self.cursor.peek().map(|t| (t.clone(), self.cursor.span()))
            else {
                return Err(ParseError::UnexpectedEof {
                    what: "field initializer".into(),
                    location: self.cursor.location(assign),
                });
            };
            if depth.at_top() && angle == 0 {
                if matches!(token, Token::Comma | Token::Semicolon) {
                    break;
                }
                if token == Token::RBrace {
                    return Err(self.missing_semicolon());
                }
            }
            // generic arguments after `new Type` may contain commas
            match &token {
                Token::New => after_new = true,
                Token::Lt if after_new => angle += 1,
                Token::Gt if angle > 0 => angle -= 1,
                Token::LParen | Token::LBracket | Token::LBrace => after_new = false,
                _ => {}
            }
            depth.step(&token);
            tokens.push((token, span));
            self.cursor.advance();
        }
        if tokens.is_empty() {
            return Err(self.cursor.expected("expression"));
        }
        Ok(TokenBlock { tokens, span: assign })
    }

    fn parse_params(&mut self, type_params: &[String]) -> Result<Vec<Param>, ParseError> {
        let (open, inner) = self.cursor.balanced(&Token::LParen, &Token::RParen)?;
        let mut params = Vec::new();
        for part in split_top_level(inner, true) {
            let mut cursor = Cursor::new(part, self.cursor.file()).with_fallback(open);
            cursor.set_context(self.cursor.context().map(str::to_string));
            while cursor.eat(&Token::Final) {
                cursor.skip_annotations()?;
            }
            cursor.skip_annotations()?;
            while cursor.eat(&Token::Final) {}
            let mut ty = parse_type(&mut cursor, type_params)?;
            let is_varargs = cursor.eat(&Token::Ellipsis);
            if is_varargs {
                ty = with_extra_dims(ty, 1);
            }
            let (name, _) = cursor.expect_ident()?;
            let extra = parse_dims(&mut cursor);
            ty = with_extra_dims(ty, extra);
            if !cursor.is_eof() {
                return Err(cursor.expected("',' or ')'"));
            }
            params.push(Param {
                name,
                ty,
                is_varargs,
            });
        }
        if let Some(pos) = params.iter().position(|p| p.is_varargs) {
            if pos + 1 != params.len() {
                return Err(self
                    .cursor
                    .malformed("varargs parameter must be the last parameter", open));
            }
        }
        Ok(params)
    }

    /// `';' expected` reported on the line of the last consumed token.
    fn missing_semicolon(&self) -> ParseError {
        ParseError::Expected {
            expected: "';'".into(),
            found: self
                .cursor
                .peek()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "<EOF>".into()),
            location: self.cursor.location(self.cursor.prev_span()),
        }
    }

    fn skip_throws(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        if self.cursor.eat(&Token::Throws) {
            names.push(parse_type(&mut self.cursor, &[])?.name);
            while self.cursor.eat(&Token::Comma) {
                names.push(parse_type(&mut self.cursor, &[])?.name);
            }
        }
        Ok(names)
    }

    fn parse_block(&mut self) -> Result<TokenBlock, ParseError> {
        let (span, inner) = self.cursor.balanced(&Token::LBrace, &Token::RBrace)?;
        Ok(TokenBlock {
            tokens: inner.to_vec(),
            span,
        })
    }

    fn unsupported(&self, what: &str, span: Span) -> ParseError {
        ParseError::Unsupported {
            what: what.into(),
            location: self.cursor.location(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<CompilationUnit, ParseError> {
        parse_unit(&SourceUnit::preprocess("Main.java", src))
    }

    #[test]
    fn test_class_with_members() {
        let unit = parse(
            "public class Point extends Shape implements Comparable<Point>, Cloneable {
                private int x, y = 2;
                static final String NAME = \"p\";
                public Point(int x) { this.x = x; }
                int getX() { return x; }
                int getX(int scale) { return x * scale; }
                static { count = 0; }
                { y = 3; }
            }",
        )
        .unwrap();
        let class = &unit.classes[0];
        assert_eq!(class.name, "Point");
        assert_eq!(class.superclass.as_deref(), Some("Shape"));
        assert_eq!(class.interfaces, vec!["Comparable", "Cloneable"]);
        assert_eq!(class.fields.len(), 3);
        assert_eq!(class.fields[0].modifiers.visibility, Visibility::Private);
        assert!(class.fields[2].modifiers.is_static);
        assert_eq!(class.constructors.len(), 1);
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class.static_blocks.len(), 1);
        // y's initializer, then the instance block
        assert_eq!(class.instance_inits.len(), 2);
        let sets = class.overload_sets();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].methods.len(), 2);
        assert_eq!(sets[0].methods[1].order, 1);
    }

    #[test]
    fn test_generic_params_split_on_top_level_commas() {
        let unit = parse(
            "class Util {
                static <K, V> void put(Map<String, List<Integer>> m, K key, String... rest) { }
            }",
        )
        .unwrap();
        let method = &unit.classes[0].methods[0];
        assert_eq!(method.params.len(), 3);
        assert_eq!(method.params[0].ty.name, "Map");
        assert_eq!(method.params[1].ty.coarse, CoarseType::Any);
        assert!(method.params[2].is_varargs);
        assert_eq!(method.params[2].ty.coarse, CoarseType::Array);
    }

    #[test]
    fn test_interface_methods_are_abstract_and_public() {
        let unit = parse(
            "interface Shape extends Named {
                double area();
                default String label() { return \"shape\"; }
                int SIDES = 0;
            }",
        )
        .unwrap();
        let shape = &unit.classes[0];
        assert!(shape.is_interface());
        assert_eq!(shape.interfaces, vec!["Named"]);
        assert!(shape.methods[0].is_abstract());
        assert_eq!(shape.methods[0].modifiers.visibility, Visibility::Public);
        assert!(!shape.methods[1].is_abstract());
        assert!(shape.fields[0].modifiers.is_static);
    }

    #[test]
    fn test_static_nested_class_is_hoisted() {
        let unit = parse(
            "class Outer {
                static class Inner { int v; }
                int w;
            }",
        )
        .unwrap();
        assert_eq!(unit.classes.len(), 2);
        assert_eq!(unit.classes[0].name, "Outer");
        assert_eq!(unit.classes[0].fields.len(), 1);
        assert_eq!(unit.classes[1].name, "Inner");
        assert_eq!(unit.classes[1].outer.as_deref(), Some("Outer"));
    }

    #[test]
    fn test_enum_is_unsupported() {
        let err = parse("class A {}\n\nenum Color { RED }").unwrap_err();
        assert_eq!(err.to_string(), "enum declaration is not supported at Main.java:3");
    }

    #[test]
    fn test_missing_field_semicolon() {
        let err = parse("class A {\n  int x = 1\n}").unwrap_err();
        assert!(err.to_string().contains("';' expected"), "{}", err);
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_field_initializer_with_generic_new() {
        let unit = parse("class A { Map<String, Integer> m = new HashMap<String, Integer>(), n; }")
            .unwrap();
        assert_eq!(unit.classes[0].fields.len(), 2);
        assert_eq!(unit.classes[0].fields[1].name, "n");
    }

    #[test]
    fn test_annotations_and_throws_are_skipped() {
        let unit = parse(
            "class A {
                @Override
                public String toString() throws IOException, RuntimeException { return \"a\"; }
            }",
        )
        .unwrap();
        let m = &unit.classes[0].methods[0];
        assert_eq!(m.name, "toString");
        assert_eq!(m.throws, vec!["IOException", "RuntimeException"]);
    }
}
