//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Merges command flags over configuration
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT modify drawings directly.

mod analyze;
mod completion;
mod shrink;

// Re-export command functions for testing and direct invocation
pub use analyze::{analyze, render_analysis};
pub use completion::completion;
pub use shrink::{render_shrink, shrink};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context, config: &Config) -> Result<()> {
    match command {
        Command::Analyze { input, json } => analyze::analyze(ctx, config, &input, json),
        Command::Shrink {
            input,
            output,
            no_backup,
            json,
        } => shrink::shrink(ctx, config, &input, output, no_backup, json),
        Command::Completion { shell } => completion::completion(shell),
    }
}
