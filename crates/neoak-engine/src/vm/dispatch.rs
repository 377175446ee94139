//! Overload Resolution
//!
//! Call-time selection within one overload group: filter by arity, then by
//! coarse-type compatibility of every argument, and take the first match in
//! declaration order. `null` fits any reference position, boxed primitives
//! included. Resolution is a pure function of the argument values.

use crate::compiler::ir::Function;
use crate::parser::CoarseType;
use crate::vm::builtins::catalog::is_builtin;
use crate::vm::class_registry::ClassRegistry;
use crate::vm::value::Value;

/// Returns true if `value` may be passed where `tag` is declared.
pub fn compatible(registry: &ClassRegistry, tag: &CoarseType, value: &Value) -> bool {
    match tag {
        CoarseType::Any => true,
        CoarseType::Boolean => matches!(value, Value::Bool(_)),
        CoarseType::Numeric => value.is_numeric(),
        CoarseType::Textual => matches!(value, Value::Str(_) | Value::Null),
        CoarseType::Array => matches!(value, Value::Array(_) | Value::Null),
        CoarseType::Class(name) => match value {
            Value::Null => true,
            Value::Object(obj) => {
                registry.is_subclass(&obj.class, name) || !is_known(registry, name)
            }
            Value::Str(_) => matches!(name.as_str(), "Comparable" | "CharSequence")
                || !is_known(registry, name),
            Value::Class(_) => name == "Class" || !is_known(registry, name),
            _ => !is_known(registry, name),
        },
    }
}

/// Unknown names (erased generics we could not see, unsupported library
/// types) accept anything.
fn is_known(registry: &ClassRegistry, name: &str) -> bool {
    registry.get(name).is_some() || is_builtin(name)
}

/// Returns true if `function` accepts `args`.
pub fn accepts(registry: &ClassRegistry, function: &Function, args: &[Value]) -> bool {
    if !function.accepts_arity(args.len()) {
        return false;
    }
    let fixed = if function.varargs {
        function.params.len() - 1
    } else {
        function.params.len()
    };
    let fixed_ok = function.params[..fixed]
        .iter()
        .zip(args)
        .all(|(p, a)| (p.nullable && a.is_null()) || compatible(registry, &p.coarse, a));
    if !fixed_ok {
        return false;
    }
    if function.varargs {
        // an exact array in the varargs position passes through unpacked
        let direct = args.len() == function.params.len()
            && matches!(args[fixed], Value::Array(_) | Value::Null);
        return direct || args.len() >= fixed;
    }
    true
}

/// First compatible overload in declaration order.
pub fn select<'f>(
    registry: &ClassRegistry,
    overloads: &'f [Function],
    args: &[Value],
) -> Option<(usize, &'f Function)> {
    overloads
        .iter()
        .enumerate()
        .find(|(_, f)| accepts(registry, f, args))
}

/// Whether the varargs tail must be packed into a fresh array.
pub fn needs_packing(function: &Function, args: &[Value]) -> bool {
    if !function.varargs {
        return false;
    }
    let fixed = function.params.len() - 1;
    !(args.len() == function.params.len() && matches!(args[fixed], Value::Array(_) | Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lower;
    use crate::compiler::ir::Program;
    use crate::parser::{parse_unit, SourceUnit};

    fn program(src: &str) -> Program {
        let unit = parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap();
        lower(&[unit]).unwrap()
    }

    const SRC: &str = "class Animal {}
class Dog extends Animal {}
class Main {
    static void show(int x) {}
    static void show(String s) {}
    static void show(Object o) {}
    static void feed(Dog d) {}
    static void feed(Animal a) {}
    static void sum(String label, int... xs) {}
    static void boxed(int n) {}
    static void boxed(Integer n) {}
    static void boxed(Boolean b) {}
    public static void main(String[] args) {}
}";

    #[test]
    fn test_first_declared_match_wins() {
        let program = program(SRC);
        let registry = ClassRegistry::from_classes(program.classes.clone());
        let show = program.class("Main").unwrap().group("show").unwrap();
        assert_eq!(select(&registry, &show.overloads, &[Value::Int(1)]).unwrap().0, 0);
        assert_eq!(select(&registry, &show.overloads, &[Value::str("a")]).unwrap().0, 1);
        assert_eq!(select(&registry, &show.overloads, &[Value::Bool(true)]).unwrap().0, 2);
        // null matches the first reference position
        assert_eq!(select(&registry, &show.overloads, &[Value::Null]).unwrap().0, 1);
    }

    #[test]
    fn test_null_fits_boxed_but_not_primitive() {
        let program = program(SRC);
        let registry = ClassRegistry::from_classes(program.classes.clone());
        let boxed = program.class("Main").unwrap().group("boxed").unwrap();
        assert!(!boxed.overloads[0].params[0].nullable);
        assert!(boxed.overloads[1].params[0].nullable);
        assert_eq!(select(&registry, &boxed.overloads, &[Value::Int(2)]).unwrap().0, 0);
        assert_eq!(select(&registry, &boxed.overloads, &[Value::Null]).unwrap().0, 1);
        assert_eq!(select(&registry, &boxed.overloads, &[Value::Bool(true)]).unwrap().0, 2);
    }

    #[test]
    fn test_class_tags_follow_the_hierarchy() {
        let program = program(SRC);
        let registry = ClassRegistry::from_classes(program.classes.clone());
        let feed = program.class("Main").unwrap().group("feed").unwrap();
        let animal = Value::Object(std::rc::Rc::new(crate::vm::object::Object::new(
            1,
            "Animal",
            crate::vm::object::Native::None,
        )));
        assert_eq!(select(&registry, &feed.overloads, &[animal]).unwrap().0, 1);
        assert!(select(&registry, &feed.overloads, &[Value::Int(3)]).is_none());
    }

    #[test]
    fn test_varargs() {
        let program = program(SRC);
        let registry = ClassRegistry::from_classes(program.classes.clone());
        let sum = &program.class("Main").unwrap().group("sum").unwrap().overloads[0];
        assert!(accepts(&registry, sum, &[Value::str("n")]));
        assert!(accepts(&registry, sum, &[Value::str("n"), Value::Int(1), Value::Int(2)]));
        assert!(!accepts(&registry, sum, &[Value::Int(1)]));
        assert!(needs_packing(sum, &[Value::str("n"), Value::Int(1)]));
        assert!(!needs_packing(sum, &[Value::str("n"), Value::Null]));
    }
}
