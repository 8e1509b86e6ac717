//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Errors only
//! - `--config <path>`: Use this configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vsdx-shrink - Remove unused master shapes from Visio drawings
#[derive(Parser, Debug)]
#[command(name = "vsdx-shrink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report which masters a drawing uses
    #[command(
        name = "analyze",
        long_about = "Report which masters a drawing uses.\n\n\
            Reads the drawing's master catalog and every page, and lists the masters \
            that no page references together with the space removing them would save. \
            The drawing is not modified.",
        after_help = "\
EXAMPLES:
    # Human-readable summary
    vsdx-shrink analyze drawing.vsdx

    # Machine-readable result
    vsdx-shrink analyze drawing.vsdx --json"
    )]
    Analyze {
        /// Drawing to analyze
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove unused masters from a drawing
    #[command(
        name = "shrink",
        long_about = "Remove unused masters from a drawing.\n\n\
            Masters that no page references are removed from the catalog together \
            with their relationships and backing files. The drawing is validated first; \
            a drawing the tool does not understand is rejected unchanged.\n\n\
            Without --output the drawing is replaced in place, after a backup copy \
            is written next to it.",
        after_help = "\
EXAMPLES:
    # Shrink in place, keeping drawing.vsdx.bak
    vsdx-shrink shrink drawing.vsdx

    # Write the result elsewhere
    vsdx-shrink shrink drawing.vsdx -o small.vsdx

    # In place, no backup
    vsdx-shrink shrink drawing.vsdx --no-backup"
    )]
    Shrink {
        /// Drawing to shrink
        input: PathBuf,

        /// Write the result here instead of replacing the input
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Do not keep a backup when replacing the input
        #[arg(long)]
        no_backup: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion.",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    vsdx-shrink completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    vsdx-shrink completion zsh >> ~/.zshrc

    # Fish
    vsdx-shrink completion fish > ~/.config/fish/completions/vsdx-shrink.fish

    # PowerShell
    vsdx-shrink completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
