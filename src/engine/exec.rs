//! engine::exec
//!
//! The single executor of a prune plan.
//!
//! # Architecture
//!
//! The executor is the ONLY component allowed to mutate an extracted
//! package. It applies a [`PrunePlan`] to the working tree in a fixed
//! order:
//!
//! 1. Rewrite the master catalog without the removed entries
//! 2. Rewrite the relationship index keeping only retained ids
//! 3. Delete backing files that no retained entry points at
//!
//! Documents are rewritten before files are deleted so that a failure
//! while deleting never leaves a catalog pointing at a missing file.
//!
//! # Invariants
//!
//! - Only the executor mutates the working tree
//! - The original container is never touched here
//! - The catalog document itself is never deleted
//!
//! # Example
//!
//! ```ignore
//! let package = gate::gate(&paths)?;
//! let plan = PrunePlan::build(&package.catalog, &package.rels, &scan.used_names);
//! let outcome = exec::execute(&paths, &package, &plan, ctx)?;
//! println!("removed {} masters", outcome.masters_removed);
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use thiserror::Error;

use super::gate::ValidatedPackage;
use super::plan::PrunePlan;
use super::Context;
use crate::core::catalog::remove_entries;
use crate::core::paths::{VsdxPaths, MASTERS_XML, MASTER_FILE_PATTERN};
use crate::core::rels::retain_ids;
use crate::core::xml::{display_name, write_document, XmlError};
use crate::ui::output;

static MASTER_FILE: Lazy<glob::Pattern> =
    Lazy::new(|| glob::Pattern::new(MASTER_FILE_PATTERN).expect("valid master file pattern"));

/// Errors from execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A document could not be rewritten.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The backing-file directory could not be listed.
    #[error("failed to list '{path}': {source}")]
    List {
        /// Directory being listed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A backing file could not be deleted.
    #[error("failed to delete '{path}': {source}")]
    Delete {
        /// File being deleted
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// What an execution changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Catalog entries removed.
    pub masters_removed: usize,
    /// Relationship index entries removed.
    pub relationships_removed: usize,
    /// Backing files deleted, by file name.
    pub files_deleted: Vec<String>,
}

/// Apply `plan` to the working tree at `paths`.
///
/// `package` must come from gating the same tree.
pub fn execute(
    paths: &VsdxPaths,
    package: &ValidatedPackage,
    plan: &PrunePlan,
    ctx: &Context,
) -> Result<PruneOutcome, ExecuteError> {
    let verbosity = ctx.verbosity();

    // 1. Catalog
    let catalog_text = remove_entries(
        &package.catalog_source,
        &display_name(&paths.masters_xml),
        &plan.remove_indices,
    )?;
    write_document(&paths.masters_xml, &catalog_text)?;
    output::debug(
        format!("removed {} catalog entries", plan.removal_count()),
        verbosity,
    );

    // 2. Relationship index
    let keep: HashSet<&str> = plan.keep_rel_ids.iter().map(String::as_str).collect();
    let rels_text = retain_ids(&package.rels_source, &display_name(&paths.rels_path), &keep)?;
    write_document(&paths.rels_path, &rels_text)?;
    let relationships_removed = package
        .rels
        .relationships
        .iter()
        .filter(|r| !r.id.is_empty() && !keep.contains(r.id.as_str()))
        .count();
    output::debug(
        format!("removed {} relationships", relationships_removed),
        verbosity,
    );

    // 3. Backing files
    let files_deleted = delete_unreferenced(paths, plan)?;
    output::debug(
        format!("deleted {} backing files", files_deleted.len()),
        verbosity,
    );

    Ok(PruneOutcome {
        masters_removed: plan.removal_count(),
        relationships_removed,
        files_deleted,
    })
}

/// Delete every `master*.xml` not kept by `plan`. Returns deleted names, sorted.
fn delete_unreferenced(paths: &VsdxPaths, plan: &PrunePlan) -> Result<Vec<String>, ExecuteError> {
    let list_err = |source| ExecuteError::List {
        path: paths.masters_dir.clone(),
        source,
    };

    let mut deleted = Vec::new();
    for entry in fs::read_dir(&paths.masters_dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if name == MASTERS_XML || !MASTER_FILE.matches(&name) || plan.keep_files.contains(&name) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        fs::remove_file(&path).map_err(|source| ExecuteError::Delete { path, source })?;
        deleted.push(name);
    }

    deleted.sort();
    Ok(deleted)
}
