//! `oradm params` - parameter file checks

use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

use crate::Context;
use crate::resource::param_file;
use crate::ui;

/// Check a parameter file; returns whether every line is valid.
pub fn check(ctx: &Context, file: &Path) -> Result<bool> {
    let problems = param_file::check_file(file)
        .with_context(|| format!("Could not check {}", file.display()))?;

    if problems.is_empty() {
        if !ctx.quiet {
            ui::success(&format!("{} is valid", file.display()));
        }
        return Ok(true);
    }

    ui::header(&format!("{} has {} problem(s)", file.display(), problems.len()));
    for problem in &problems {
        ui::error(problem);
    }
    Ok(false)
}
