//! shrink command - Remove unused masters and report the size change

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::engine::{self, Context, ShrinkOptions, ShrinkReport};
use crate::ui::output;

/// Shrink a drawing and print the result.
///
/// `no_backup` overrides the configured backup setting.
pub fn shrink(
    ctx: &Context,
    config: &Config,
    input: &Path,
    output_path: Option<PathBuf>,
    no_backup: bool,
    json: bool,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let options = ShrinkOptions {
        output: output_path,
        backup: config.backup() && !no_backup,
        backup_suffix: config.backup_suffix().to_string(),
        compression_level: config.compression_level(),
    };

    let report = engine::shrink(input, &options, ctx)?;

    if report.masters_removed == 0 {
        output::debug("no unused masters found", verbosity);
    }
    if json {
        output::json(&report, verbosity).context("failed to serialize report")?;
    } else {
        output::print(render_shrink(input, &report), verbosity);
    }
    Ok(())
}

/// Human-readable shrink report.
pub fn render_shrink(input: &Path, report: &ShrinkReport) -> String {
    format!(
        "Shrunk: {}\n  \
         Original size:    {}\n  \
         New size:         {}\n  \
         Reduction:        {} ({:.1}%)\n  \
         Masters removed:  {}\n  \
         Output:           {}",
        input.display(),
        output::format_mb(report.original_size_mb),
        output::format_mb(report.new_size_mb),
        output::format_mb(report.reduction_mb),
        report.reduction_percent,
        report.masters_removed,
        report.output_path.display(),
    )
}
