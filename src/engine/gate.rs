//! engine::gate
//!
//! Structural validation of an extracted package.
//!
//! # Architecture
//!
//! Gating runs after extraction and before anything reads page content or
//! touches a document. It either produces a [`ValidatedPackage`] holding the
//! parsed catalog and relationship index, or fails with every problem it
//! found at once.
//!
//! Problems are collected, not raised: one report should show a user every
//! way their file differs from what the engine understands.
//!
//! # Invariants
//!
//! - Gating never mutates the working tree
//! - Gating never produces a `ValidatedPackage` when any issue was found
//! - Malformed XML is fatal immediately; it is not collected
//!
//! # Example
//!
//! ```ignore
//! let paths = VsdxPaths::new(work.root().to_path_buf());
//! if paths.has_catalog() {
//!     let package = gate::gate(&paths)?;
//!     // package.catalog and package.rels are safe to use
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::core::catalog::MasterCatalog;
use crate::core::paths::VsdxPaths;
use crate::core::rels::RelationshipIndex;
use crate::core::xml::{display_name, read_document, XmlError, PKG_REL_NS, REL_NS, VISIO_NS};

/// Attributes every master entry must carry.
const REQUIRED_MASTER_ATTRS: [&str; 2] = ["ID", "NameU"];

/// A structural problem found while gating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatIssue {
    /// The catalog's relationship index is missing.
    #[error("Missing relationships file: {file}")]
    MissingRelationships {
        /// File name of the expected index.
        file: String,
    },

    /// The page directory is missing.
    #[error("Missing pages directory")]
    MissingPagesDir,

    /// The catalog root is in an unexpected namespace.
    #[error("Unexpected namespace: {found}\n    Expected: {}", VISIO_NS)]
    UnexpectedCatalogNamespace {
        /// Namespace found on the root element.
        found: String,
    },

    /// The sample entry lacks required attributes.
    #[error("Master elements missing required attributes: {}", .missing.join(", "))]
    MissingMasterAttributes {
        /// Missing attribute names, sorted.
        missing: Vec<String>,
    },

    /// The sample entry has no `Rel` element.
    #[error("Master elements missing Rel child element")]
    MissingRelElement,

    /// The sample `Rel` carries an id attribute in another namespace.
    #[error("Rel element uses unexpected namespace for id: {attribute}\n    Expected: {}", REL_NS)]
    UnexpectedRelIdNamespace {
        /// The attribute as found, `{namespace}id` or `id`.
        attribute: String,
    },

    /// The sample `Rel` has no relationship id at all.
    #[error("Rel element missing r:id attribute")]
    MissingRelId,

    /// The relationship index root is in an unexpected namespace.
    #[error("Unexpected relationships namespace: {found}\n    Expected: {}", PKG_REL_NS)]
    UnexpectedRelationshipsNamespace {
        /// Namespace found on the root element.
        found: String,
    },

    /// A catalog entry points at a relationship id the index lacks.
    #[error("Master '{master}' references non-existent relationship: {rel_id}")]
    DanglingRelationship {
        /// Entry label: name, else id.
        master: String,
        /// The unresolved relationship id.
        rel_id: String,
    },
}

/// Every issue found by one gating pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Issues in discovery order.
    pub issues: Vec<FormatIssue>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VSDX format validation failed:")?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        write!(f, "\n\nThis file may use a newer or different format version.")
    }
}

impl std::error::Error for ValidationFailure {}

/// Errors that stop gating.
#[derive(Debug, Error)]
pub enum GateError {
    /// One or more structural issues.
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),

    /// A document could not be read or parsed.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// A package that passed gating.
///
/// Holds both parsed documents and their source text so the pruner can
/// rewrite them without reading them again.
#[derive(Debug, Clone)]
pub struct ValidatedPackage {
    /// Parsed master catalog.
    pub catalog: MasterCatalog,
    /// Catalog source text.
    pub catalog_source: String,
    /// Parsed relationship index.
    pub rels: RelationshipIndex,
    /// Relationship index source text.
    pub rels_source: String,
}

/// Validate the package at `paths`.
///
/// Call only when [`VsdxPaths::has_catalog`] is true.
pub fn gate(paths: &VsdxPaths) -> Result<ValidatedPackage, GateError> {
    let mut issues = Vec::new();

    // 1. Required files
    let rels_present = paths.rels_path.is_file();
    if !rels_present {
        issues.push(FormatIssue::MissingRelationships {
            file: display_name(&paths.rels_path),
        });
    }
    if !paths.pages_dir.is_dir() {
        issues.push(FormatIssue::MissingPagesDir);
    }

    // 2-3. Catalog namespace and entry shape
    let catalog_source = read_document(&paths.masters_xml)?;
    let catalog = MasterCatalog::parse(&catalog_source, &display_name(&paths.masters_xml))?;
    check_catalog(&catalog, &mut issues);

    // 4. Relationship index namespace
    let rels = if rels_present {
        let source = read_document(&paths.rels_path)?;
        let parsed = RelationshipIndex::parse(&source, &display_name(&paths.rels_path))?;
        if let Some(found) = parsed.root_namespace.as_deref().filter(|ns| *ns != PKG_REL_NS) {
            issues.push(FormatIssue::UnexpectedRelationshipsNamespace {
                found: found.to_string(),
            });
        }
        Some((parsed, source))
    } else {
        None
    };

    // 5. Referential integrity
    if let Some((index, _)) = &rels {
        check_integrity(&catalog, index, &mut issues);
    }

    match rels {
        Some((rels, rels_source)) if issues.is_empty() => Ok(ValidatedPackage {
            catalog,
            catalog_source,
            rels,
            rels_source,
        }),
        _ => Err(ValidationFailure { issues }.into()),
    }
}

/// Namespace and sample-entry checks on the catalog.
pub fn check_catalog(catalog: &MasterCatalog, issues: &mut Vec<FormatIssue>) {
    if let Some(found) = catalog.root_namespace.as_deref().filter(|ns| *ns != VISIO_NS) {
        issues.push(FormatIssue::UnexpectedCatalogNamespace {
            found: found.to_string(),
        });
    }

    let Some(sample) = catalog.sample() else {
        return;
    };

    let missing: BTreeSet<&str> = REQUIRED_MASTER_ATTRS
        .iter()
        .copied()
        .filter(|attr| match *attr {
            "ID" => sample.id.is_none(),
            _ => sample.name.is_none(),
        })
        .collect();
    if !missing.is_empty() {
        issues.push(FormatIssue::MissingMasterAttributes {
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }

    match &sample.rel {
        None => issues.push(FormatIssue::MissingRelElement),
        Some(rel) if rel.has_recognized_id() => {}
        Some(rel) => match &rel.foreign_id_attr {
            Some(attribute) => issues.push(FormatIssue::UnexpectedRelIdNamespace {
                attribute: attribute.clone(),
            }),
            None => issues.push(FormatIssue::MissingRelId),
        },
    }
}

/// Every entry's relationship id must resolve in the index.
pub fn check_integrity(
    catalog: &MasterCatalog,
    index: &RelationshipIndex,
    issues: &mut Vec<FormatIssue>,
) {
    let ids = index.ids();
    for entry in &catalog.entries {
        let Some(rel_id) = entry.rel_id() else {
            continue;
        };
        if !ids.contains(rel_id) {
            issues.push(FormatIssue::DanglingRelationship {
                master: entry.label().to_string(),
                rel_id: rel_id.to_string(),
            });
        }
    }
}
