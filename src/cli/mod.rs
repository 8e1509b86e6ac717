//! cli
//!
//! Command-line interface layer for vsdx-shrink.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration
//! - Delegate to command handlers
//! - Does NOT modify drawings directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::engine;
use crate::ui::output;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
    };

    let config = Config::load(cli.config.as_deref())?;
    if let Some(path) = config.loaded_from() {
        output::debug(format!("config loaded from {}", path.display()), ctx.verbosity());
    }

    commands::dispatch(cli.command, &ctx, &config)
}
