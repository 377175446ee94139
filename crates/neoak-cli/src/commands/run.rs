//! `neoak run`: compile a project and run its entry class.

use std::path::Path;

/// Run the project at `path` with `args` as the program arguments.
pub fn execute(path: &Path, args: Vec<String>) -> anyhow::Result<i32> {
    log::debug!("run {}", path.display());
    let outcome = neoak_runtime::run_path(path, super::console_options(args))?;
    Ok(outcome.exit_code)
}
