//! `neoak emit`: write the lowered program as a JSON artifact.

use crate::output::StyledOutput;
use anyhow::Context;
use std::path::Path;

/// Emit the project at `path` to `output`, or to stdout.
pub fn execute(path: &Path, output: Option<&Path>, out: &mut StyledOutput) -> anyhow::Result<i32> {
    let json = neoak_runtime::emit_path(path)?;
    match output {
        Some(file) => {
            std::fs::write(file, format!("{}\n", json))
                .with_context(|| format!("failed to write {}", file.display()))?;
            out.status("wrote", &file.display().to_string());
        }
        None => out.plain(&format!("{}\n", json)),
    }
    Ok(0)
}
