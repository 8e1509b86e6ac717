//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! Reports go to stdout; debug lines, warnings and errors go to stderr.
//! When `--json` is enabled, reports are machine-readable JSON.

use std::fmt::Display;

use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON (respects quiet mode).
pub fn json<T: Serialize>(value: &T, verbosity: Verbosity) -> serde_json::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    print(text, verbosity);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format at most `limit` items, noting how many were left out.
pub fn format_truncated<T: Display>(items: &[T], prefix: &str, limit: usize) -> String {
    let shown = &items[..items.len().min(limit)];
    let mut text = format_list(shown, prefix);
    if items.len() > shown.len() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!("{}... and {} more", prefix, items.len() - shown.len()));
    }
    text
}

/// Format a size in MB for display.
pub fn format_mb(mb: f64) -> String {
    format!("{:.2} MB", mb)
}
