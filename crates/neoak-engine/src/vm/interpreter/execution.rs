//! Statement completions and abrupt exits.

use crate::vm::value::Value;
use crate::vm::VmError;

/// How a statement finished.
#[derive(Debug)]
pub enum Completion {
    /// Fell through
    Normal,
    /// `break`, optionally labeled
    Break(Option<String>),
    /// `continue`, optionally labeled
    Continue(Option<String>),
    /// `return` with its value (`null` for `void`)
    Return(Value),
}

/// Abrupt exits that cross method boundaries.
#[derive(Debug)]
pub enum Unwind {
    /// A thrown Java exception
    Throw(Value),
    /// `System.exit(code)`
    Exit(i32),
    /// Not a Java exception; aborts the run
    Fatal(VmError),
}

impl From<VmError> for Unwind {
    fn from(error: VmError) -> Self {
        Unwind::Fatal(error)
    }
}

/// Result of executing a statement.
pub type ExecResult = Result<Completion, Unwind>;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, Unwind>;

/// Returns true if a `break`/`continue` with `target` exits the statement
/// labeled `label`.
pub(super) fn targets(target: &Option<String>, label: &Option<String>) -> bool {
    match target {
        None => true,
        Some(t) => label.as_deref() == Some(t.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_targeting() {
        let outer = Some("outer".to_string());
        assert!(targets(&None, &None));
        assert!(targets(&None, &outer));
        assert!(targets(&outer, &outer));
        assert!(!targets(&outer, &None));
        assert!(!targets(&Some("inner".to_string()), &outer));
    }
}
