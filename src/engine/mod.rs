//! engine
//!
//! Orchestrates the command lifecycle: Extract -> Gate -> Scan -> Plan -> Execute -> Build.
//!
//! # Architecture
//!
//! The engine is the central coordinator for both operations. It enforces a
//! validated execution model:
//!
//! 1. **Extract**: Unpack the drawing into an ephemeral working tree
//! 2. **Gate**: Verify the package has a structure the engine understands
//! 3. **Scan**: Discover pages and resolve which masters they reference
//! 4. **Plan**: Compute a deterministic prune plan
//! 5. **Execute**: Apply the plan through the single executor
//! 6. **Build**: Repack the tree and move it into place
//!
//! Analysis stops after Scan. A drawing without a master catalog skips
//! everything after Extract.
//!
//! # Invariants
//!
//! - Operations execute only against a gated package
//! - The engine never mutates the working tree directly; all mutation flows
//!   through the executor
//! - If gating fails, nothing is written anywhere
//! - The final output path only ever receives a complete archive
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vsdx_shrink::engine::{self, Context, ShrinkOptions};
//!
//! let ctx = Context::default();
//! let analysis = engine::analyze(Path::new("drawing.vsdx"), &ctx)?;
//! println!("{} unused masters", analysis.unused_masters);
//!
//! let report = engine::shrink(Path::new("drawing.vsdx"), &ShrinkOptions::default(), &ctx)?;
//! println!("saved {} MB", report.reduction_mb);
//! # Ok::<(), vsdx_shrink::engine::EngineError>(())
//! ```

pub mod exec;
pub mod gate;
pub mod plan;
pub mod report;
pub mod scan;

// Re-exports for convenience
pub use exec::{ExecuteError, PruneOutcome};
pub use gate::{gate, FormatIssue, GateError, ValidatedPackage, ValidationFailure};
pub use plan::{PrunePlan, Reachability};
pub use report::{AnalysisReport, ShrinkReport};
pub use scan::{discover_pages, find_used_masters, ReferenceScan};

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::archive::{self, ArchiveError, WorkDir};
use crate::core::config::DEFAULT_BACKUP_SUFFIX;
use crate::core::paths::VsdxPaths;
use crate::core::xml::XmlError;
use crate::ui::output::{self, Verbosity};

/// File extension accepted as input, compared case-insensitively.
pub const VSDX_EXTENSION: &str = "vsdx";

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Options for [`shrink`].
#[derive(Debug, Clone)]
pub struct ShrinkOptions {
    /// Where to write the result. `None` replaces the input.
    pub output: Option<PathBuf>,
    /// Copy the input aside before replacing it.
    pub backup: bool,
    /// Appended to the input path to name the backup.
    pub backup_suffix: String,
    /// Deflate level, `None` for the library default.
    pub compression_level: Option<i64>,
}

impl Default for ShrinkOptions {
    fn default() -> Self {
        Self {
            output: None,
            backup: true,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            compression_level: None,
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input does not exist.
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The input is not a `.vsdx` file.
    #[error("Not a VSDX file: {}", .path.display())]
    WrongExtension { path: PathBuf },

    /// Gating failed.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// A page or document could not be read.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Execution failed.
    #[error("execution failed: {0}")]
    Execute(#[from] ExecuteError),

    /// The container could not be read or written.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Filesystem error outside the working tree.
    #[error("i/o error at '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl EngineError {
    fn io(path: &Path, source: io::Error) -> Self {
        EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error means the input is not a drawing the engine understands.
    pub fn is_format_error(&self) -> bool {
        match self {
            EngineError::Gate(GateError::Invalid(_)) => true,
            EngineError::Gate(GateError::Xml(e)) | EngineError::Xml(e) => e.is_format_error(),
            EngineError::Execute(ExecuteError::Xml(e)) => e.is_format_error(),
            EngineError::Archive(ArchiveError::Format { .. }) => true,
            _ => false,
        }
    }

    /// Process exit code: 2 for format errors, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        if self.is_format_error() {
            2
        } else {
            1
        }
    }
}

/// Check that `path` names an existing `.vsdx` file.
pub fn validate_input_path(path: &Path) -> Result<(), EngineError> {
    if !path.exists() {
        return Err(EngineError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let is_vsdx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(VSDX_EXTENSION));
    if !is_vsdx {
        return Err(EngineError::WrongExtension {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Path of the backup copy of `input`: the input path with `suffix` appended.
pub fn backup_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Report which masters a drawing uses, without changing it.
pub fn analyze(input: &Path, ctx: &Context) -> Result<AnalysisReport, EngineError> {
    let verbosity = ctx.verbosity();
    validate_input_path(input)?;

    // 1. Extract
    let work = WorkDir::extract(input)?;
    let paths = VsdxPaths::new(work.root().to_path_buf());
    output::debug(format!("extracted to {}", work.root().display()), verbosity);

    if !paths.has_catalog() {
        output::debug("no master catalog, nothing to analyze", verbosity);
        release(work, verbosity);
        return Ok(AnalysisReport::empty());
    }

    // 2. Gate
    let package = gate::gate(&paths)?;

    // 3. Scan
    let scan = scan_references(&paths, &package, verbosity)?;
    let reach = Reachability::compute(&package.catalog, &scan.used_names);
    let savings = report::unused_size(&paths, &package.catalog, &package.rels, &reach.unused);

    release(work, verbosity);
    Ok(AnalysisReport::new(&reach, savings))
}

/// Remove unused masters from a drawing.
///
/// Writes to `options.output`, or replaces the input when that is `None`
/// or names the input itself. The new archive is built next to its
/// destination and moved into place only once complete.
pub fn shrink(input: &Path, options: &ShrinkOptions, ctx: &Context) -> Result<ShrinkReport, EngineError> {
    let verbosity = ctx.verbosity();
    validate_input_path(input)?;

    let output_path = options.output.clone().unwrap_or_else(|| input.to_path_buf());
    let in_place = is_same_file(input, &output_path);
    let original_size = report::file_size(input);

    // 1. Extract
    let work = WorkDir::extract(input)?;
    let paths = VsdxPaths::new(work.root().to_path_buf());
    output::debug(format!("extracted to {}", work.root().display()), verbosity);

    if !paths.has_catalog() {
        output::debug("no master catalog, nothing to shrink", verbosity);
        if !in_place {
            fs::copy(input, &output_path).map_err(|e| EngineError::io(&output_path, e))?;
        }
        release(work, verbosity);
        let new_size = report::file_size(&output_path);
        return Ok(ShrinkReport::new(original_size, new_size, 0, output_path));
    }

    // 2. Gate
    let package = gate::gate(&paths)?;

    // 3. Scan
    let scan = scan_references(&paths, &package, verbosity)?;

    // 4. Plan
    let plan = PrunePlan::build(&package.catalog, &package.rels, &scan.used_names);
    if plan.is_empty() {
        output::debug("every master is used, rebuilding unchanged", verbosity);
    }
    output::debug(
        format!(
            "plan: remove {} masters, keep {} relationships",
            plan.removal_count(),
            plan.keep_rel_ids.len()
        ),
        verbosity,
    );

    // 5. Execute
    let outcome = exec::execute(&paths, &package, &plan, ctx)?;

    // 6. Build
    let staged = stage_archive(input, &output_path, work.root(), options.compression_level, verbosity)?;
    if in_place && options.backup {
        let backup = backup_path(input, &options.backup_suffix);
        fs::copy(input, &backup).map_err(|e| EngineError::io(&backup, e))?;
        output::debug(format!("backup written to {}", backup.display()), verbosity);
    }
    staged
        .persist(&output_path)
        .map_err(|e| EngineError::io(&output_path, e.error))?;
    release(work, verbosity);

    let new_size = report::file_size(&output_path);
    Ok(ShrinkReport::new(
        original_size,
        new_size,
        outcome.masters_removed,
        output_path,
    ))
}

/// Discover pages and scan them for references.
fn scan_references(
    paths: &VsdxPaths,
    package: &ValidatedPackage,
    verbosity: Verbosity,
) -> Result<ReferenceScan, EngineError> {
    let pages = scan::discover_pages(paths)?;
    output::debug(format!("found {} pages", pages.len()), verbosity);

    let scan = scan::find_used_masters(&pages, &package.catalog)?;
    output::debug(
        format!(
            "{} name references, {} id references, {} names used",
            scan.name_references,
            scan.id_references,
            scan.used_names.len()
        ),
        verbosity,
    );
    Ok(scan)
}

/// Remove the working directory, warning if it cannot be removed.
fn release(work: WorkDir, verbosity: Verbosity) {
    if let Err(err) = work.close() {
        output::warn(format!("failed to remove working directory: {}", err), verbosity);
    }
}

/// Build the archive into a temporary file beside `destination`.
fn stage_archive(
    input: &Path,
    destination: &Path,
    root: &Path,
    compression_level: Option<i64>,
    verbosity: Verbosity,
) -> Result<NamedTempFile, EngineError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir).map_err(|e| EngineError::io(dir, e))?;
    let file = staged.reopen().map_err(|e| EngineError::io(staged.path(), e))?;

    let entries = archive::build_into(root, file, destination, compression_level)?;
    output::debug(format!("archived {} entries", entries), verbosity);

    // Temporary files are created owner-only; carry the input's mode over.
    if let Ok(meta) = fs::metadata(input) {
        fs::set_permissions(staged.path(), meta.permissions())
            .map_err(|e| EngineError::io(staged.path(), e))?;
    }
    Ok(staged)
}

/// Whether two paths name the same file. A missing `b` is never the same.
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
