//! `neoak exec`: run an emitted IR artifact.

use std::path::Path;

pub fn execute(file: &Path, args: Vec<String>) -> anyhow::Result<i32> {
    log::debug!("exec {}", file.display());
    let outcome = neoak_runtime::exec_artifact(file, super::console_options(args))?;
    Ok(outcome.exit_code)
}
