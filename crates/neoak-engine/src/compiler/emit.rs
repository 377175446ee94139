//! Artifact emission: the IR program as JSON.

use crate::compiler::error::ArtifactError;
use crate::compiler::ir::{Program, IR_VERSION};

/// Serialize a program as pretty-printed JSON.
pub fn to_json(program: &Program) -> Result<String, ArtifactError> {
    Ok(serde_json::to_string_pretty(program)?)
}

/// Read a program back from JSON, checking its version and entry class.
pub fn from_json(text: &str) -> Result<Program, ArtifactError> {
    let program: Program = serde_json::from_str(text)?;
    if program.version != IR_VERSION {
        return Err(ArtifactError::Version {
            found: program.version,
            expected: IR_VERSION,
        });
    }
    if program.class(&program.entry_class).is_none() {
        return Err(ArtifactError::MissingEntry(program.entry_class.clone()));
    }
    log::debug!(
        "loaded artifact: {} classes, {} functions",
        program.classes.len(),
        program.function_count()
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lower;
    use crate::parser::{parse_unit, SourceUnit};

    fn program(src: &str) -> Program {
        let unit = parse_unit(&SourceUnit::preprocess("Main.java", src)).unwrap();
        lower(&[unit]).unwrap()
    }

    #[test]
    fn test_artifact_reload_is_identical() {
        let original = program(
            "class Main {
    static int count = 3;
    public static void main(String[] args) {
        for (int i = 0; i < count; i++) System.out.println(\"n\" + i);
    }
}",
        );
        let json = to_json(&original).unwrap();
        assert!(json.contains("\"entry_class\": \"Main\""));
        assert_eq!(from_json(&json).unwrap(), original);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut original = program("class Main { public static void main(String[] a) {} }");
        original.version = 99;
        let json = to_json(&original).unwrap();
        let err = from_json(&json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "artifact version 99 is not supported (expected 1)"
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(from_json("{\"nope\": 1}"), Err(ArtifactError::Json(_))));
    }
}
