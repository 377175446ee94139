//! Run-time access control for instance members of user classes.

use crate::parser::Visibility;
use crate::vm::class_registry::ClassRegistry;

/// Who is accessing what.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    /// Declared access level of the member
    pub visibility: Visibility,
    /// Class declaring the member
    pub declaring: &'a str,
    /// Class whose code performs the access
    pub caller: &'a str,
}

impl AccessContext<'_> {
    /// Returns true if the access is allowed.
    ///
    /// Private members are visible within the declaring class and its nest
    /// (hoisted nested classes). Protected members are visible from the
    /// declaring class and its subclasses. Package-private members need
    /// matching package tags.
    pub fn permits(&self, registry: &ClassRegistry) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private => {
                self.caller == self.declaring || registry.same_nest(self.caller, self.declaring)
            }
            Visibility::Protected => {
                registry.is_subclass(self.caller, self.declaring)
                    || registry.same_nest(self.caller, self.declaring)
            }
            Visibility::PackagePrivate => {
                let package = |name: &str| registry.get(name).and_then(|c| c.def.package.clone());
                package(self.caller) == package(self.declaring)
            }
        }
    }

    /// Message of the `IllegalAccessException` for a denied access.
    pub fn denial(&self, kind: &str, member: &str) -> String {
        format!(
            "class {} cannot access a {} {} {}.{}",
            self.caller,
            describe(self.visibility),
            kind,
            self.declaring,
            member
        )
    }
}

fn describe(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Protected => "protected",
        Visibility::PackagePrivate => "package-private",
        Visibility::Private => "private",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lower;
    use crate::parser::{parse_unit, SourceUnit};

    fn registry() -> ClassRegistry {
        let unit = parse_unit(&SourceUnit::preprocess(
            "Main.java",
            "class Account { private int balance; protected int id; }
class Savings extends Account {}
class Main {
    static class Helper {}
    public static void main(String[] args) {}
}",
        ))
        .unwrap();
        ClassRegistry::from_classes(lower(&[unit]).unwrap().classes)
    }

    fn ctx<'a>(visibility: Visibility, declaring: &'a str, caller: &'a str) -> AccessContext<'a> {
        AccessContext {
            visibility,
            declaring,
            caller,
        }
    }

    #[test]
    fn test_private_and_protected() {
        let registry = registry();
        assert!(ctx(Visibility::Private, "Account", "Account").permits(&registry));
        assert!(!ctx(Visibility::Private, "Account", "Main").permits(&registry));
        assert!(!ctx(Visibility::Private, "Account", "Savings").permits(&registry));
        assert!(ctx(Visibility::Protected, "Account", "Savings").permits(&registry));
        assert!(!ctx(Visibility::Protected, "Account", "Main").permits(&registry));
        assert!(ctx(Visibility::Private, "Main", "Helper").permits(&registry));
        assert!(ctx(Visibility::PackagePrivate, "Account", "Main").permits(&registry));
    }

    #[test]
    fn test_denial_message() {
        let denial = ctx(Visibility::Private, "Account", "Main").denial("field", "balance");
        assert_eq!(denial, "class Main cannot access a private field Account.balance");
    }
}
