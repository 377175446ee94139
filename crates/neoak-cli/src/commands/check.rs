//! `neoak check`: parse and check without running.

use crate::output::StyledOutput;
use std::path::Path;

pub fn execute(path: &Path, out: &mut StyledOutput) -> anyhow::Result<i32> {
    let report = neoak_runtime::check_path(path)?;
    out.status(
        "ok",
        &format!(
            "{} ({} {}, {} {})",
            path.display(),
            report.units,
            plural(report.units, "unit", "units"),
            report.classes,
            plural(report.classes, "class", "classes"),
        ),
    );
    Ok(0)
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
