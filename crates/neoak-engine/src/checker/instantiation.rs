//! Instantiation guard: `new` must not name an abstract class or interface.

use crate::checker::error::CheckError;
use crate::checker::hierarchy::ClassTable;
use crate::parser::ast::{ClassDecl, InstanceInit};
use crate::parser::error::Location;
use crate::parser::token::{Spanned, Token};

/// Scan every body and field initializer for abstract construction.
pub fn check_instantiation(table: &ClassTable<'_>, errors: &mut Vec<CheckError>) {
    for class in table.classes() {
        for (tokens, context) in code_regions(class) {
            for (name, line) in constructions(tokens) {
                if table.is_abstract(&name) {
                    errors.push(CheckError::AbstractInstantiation {
                        class: name,
                        location: Location::new(class.file.clone(), line).within(context.clone()),
                    });
                }
            }
        }
    }
}

/// Every token region of a class with its diagnostic context.
fn code_regions(class: &ClassDecl) -> Vec<(&[Spanned], String)> {
    let init = format!("{}.<init>", class.name);
    let clinit = format!("{}.<clinit>", class.name);
    let mut regions: Vec<(&[Spanned], String)> = Vec::new();
    for field in &class.fields {
        if let Some(block) = &field.init {
            let context = if field.modifiers.is_static { &clinit } else { &init };
            regions.push((&block.tokens, context.clone()));
        }
    }
    for block in &class.static_blocks {
        regions.push((&block.tokens, clinit.clone()));
    }
    for item in &class.instance_inits {
        if let InstanceInit::Block(block) = item {
            regions.push((&block.tokens, init.clone()));
        }
    }
    for ctor in &class.constructors {
        regions.push((&ctor.body.tokens, init.clone()));
    }
    for method in &class.methods {
        if let Some(body) = &method.body {
            regions.push((&body.tokens, format!("{}.{}", class.name, method.name)));
        }
    }
    regions
}

/// Class names constructed with `new Name(...)`, with the line of `new`.
///
/// Array creation and anonymous class bodies are skipped.
pub fn constructions(tokens: &[Spanned]) -> Vec<(String, u32)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].0 != Token::New {
            i += 1;
            continue;
        }
        let line = tokens[i].1.line;
        let mut j = i + 1;
        let mut name = None;
        // qualified names keep their last segment
        while let Some(Token::Ident(segment)) = tokens.get(j).map(|t| &t.0) {
            name = Some(segment.clone());
            if tokens.get(j + 1).map(|t| &t.0) == Some(&Token::Dot) {
                j += 2;
            } else {
                j += 1;
                break;
            }
        }
        if tokens.get(j).map(|t| &t.0) == Some(&Token::Lt) {
            j = skip_angles(tokens, j);
        }
        if let (Some(name), Some(Token::LParen)) = (name, tokens.get(j).map(|t| &t.0)) {
            let close = skip_parens(tokens, j);
            let anonymous = tokens.get(close).map(|t| &t.0) == Some(&Token::LBrace);
            if !anonymous {
                found.push((name, line));
            }
        }
        i += 1;
    }
    found
}

/// Index just past the angle group starting at `start`.
fn skip_angles(tokens: &[Spanned], start: usize) -> usize {
    let mut depth = 0u32;
    let mut j = start;
    while let Some((token, _)) = tokens.get(j) {
        match token {
            Token::Lt => depth += 1,
            Token::Gt => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j + 1;
                }
            }
            Token::Shl => depth += 2,
            _ => {}
        }
        j += 1;
    }
    j
}

/// Index just past the paren group starting at `start`.
fn skip_parens(tokens: &[Spanned], start: usize) -> usize {
    let mut depth = 0u32;
    let mut j = start;
    while let Some((token, _)) = tokens.get(j) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j + 1;
                }
            }
            _ => {}
        }
        j += 1;
    }
    j
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::CompilationUnit;
    use crate::parser::{parse_unit, SourceUnit};

    fn check(src: &str) -> Vec<String> {
        let units: Vec<CompilationUnit> =
            vec![parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap()];
        let (table, mut errors) = ClassTable::build(&units);
        check_instantiation(&table, &mut errors);
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_abstract_construction_is_reported_at_site() {
        let errors = check(
            "abstract class Animal {}
interface Pet {}
class Dog extends Animal implements Pet {}
class Main {
    static Animal a = new Animal();
    public static void main(String[] args) {
        Dog d = new Dog();

        Pet p = new Pet();
        Runnable r = new Runnable();
    }
}",
        );
        assert_eq!(
            errors,
            vec![
                "Animal is abstract; cannot be instantiated at Main.java:5 (in Main.<clinit>)",
                "Pet is abstract; cannot be instantiated at Main.java:9 (in Main.main)",
                "Runnable is abstract; cannot be instantiated at Main.java:10 (in Main.main)",
            ]
        );
    }

    #[test]
    fn test_constructions_skip_arrays_and_generics() {
        let src = "x = new java.util.Box<Map<String, Integer>>(1); y = new Shape[3]; z = new Foo(new Bar());";
        let unit = SourceUnit::preprocess("T.java", src);
        let tokens = crate::parser::tokenize(&unit).unwrap();
        let names: Vec<String> = constructions(&tokens).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Box", "Foo", "Bar"]);
    }
}
