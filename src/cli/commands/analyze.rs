//! analyze command - Report used and unused masters without modifying the drawing

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::engine::{self, AnalysisReport, Context};
use crate::ui::output;

/// Analyze a drawing and print the result.
pub fn analyze(ctx: &Context, config: &Config, input: &Path, json: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let report = engine::analyze(input, ctx)?;

    if json {
        output::json(&report, verbosity).context("failed to serialize report")?;
    } else {
        output::print(render_analysis(input, &report, config.display_limit()), verbosity);
    }
    Ok(())
}

/// Human-readable analysis report.
pub fn render_analysis(input: &Path, report: &AnalysisReport, display_limit: usize) -> String {
    let mut text = format!(
        "Analysis of: {}\n  \
         Total masters:      {}\n  \
         Used masters:       {}\n  \
         Unused masters:     {}\n  \
         Potential savings:  {}",
        input.display(),
        report.total_masters,
        report.used_masters,
        report.unused_masters,
        output::format_mb(report.potential_savings_mb),
    );

    if !report.unused_names.is_empty() {
        text.push_str(&format!("\n\nUnused masters ({}):\n", report.unused_names.len()));
        text.push_str(&output::format_truncated(
            &report.unused_names,
            "    ",
            display_limit,
        ));
    }
    text
}
