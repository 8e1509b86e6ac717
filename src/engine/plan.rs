//! engine::plan
//!
//! Reachability and prune planning.
//!
//! # Architecture
//!
//! Planning turns a validated package plus the set of used names into a
//! [`PrunePlan`]: which catalog entries go, which relationship ids and
//! backing files stay. The executor applies it; nothing here does I/O.
//!
//! # Invariants
//!
//! - Planner does not perform I/O
//! - Same inputs always produce the same plan
//! - Every relationship id of a retained entry is kept, so the rewritten
//!   catalog never points at a removed relationship
//! - Unnamed entries are never removed, and their relationships and
//!   backing files are kept with them
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use vsdx_shrink::core::catalog::MasterCatalog;
//! use vsdx_shrink::core::rels::RelationshipIndex;
//! use vsdx_shrink::engine::plan::PrunePlan;
//!
//! let catalog = MasterCatalog::parse(
//!     r#"<Masters xmlns="http://schemas.microsoft.com/office/visio/2012/main"
//!                 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
//!          <Master ID="1" NameU="A"><Rel r:id="rId1"/></Master>
//!          <Master ID="2" NameU="B"><Rel r:id="rId2"/></Master>
//!        </Masters>"#,
//!     "masters.xml",
//! ).unwrap();
//! let rels = RelationshipIndex::parse(
//!     r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
//!          <Relationship Id="rId1" Target="master1.xml"/>
//!          <Relationship Id="rId2" Target="master2.xml"/>
//!        </Relationships>"#,
//!     "masters.xml.rels",
//! ).unwrap();
//!
//! let used: BTreeSet<String> = ["A".to_string()].into_iter().collect();
//! let plan = PrunePlan::build(&catalog, &rels, &used);
//!
//! assert_eq!(plan.removed_names.len(), 1);
//! assert!(plan.keep_files.contains("master1.xml"));
//! assert!(!plan.keep_rel_ids.contains("rId2"));
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::core::catalog::MasterCatalog;
use crate::core::rels::RelationshipIndex;

/// Used and unused names of one catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reachability {
    /// Catalog names referenced by at least one page.
    pub used: BTreeSet<String>,
    /// Catalog names referenced by no page.
    pub unused: BTreeSet<String>,
}

impl Reachability {
    /// Split the catalog's names by `referenced`.
    ///
    /// Referenced names that are not in the catalog are dropped here.
    pub fn compute(catalog: &MasterCatalog, referenced: &BTreeSet<String>) -> Self {
        let all = catalog.names();
        let used = all.intersection(referenced).cloned().collect();
        let unused = all.difference(referenced).cloned().collect();
        Self { used, unused }
    }

    /// Number of distinct catalog names.
    pub fn total(&self) -> usize {
        self.used.len() + self.unused.len()
    }
}

/// What a shrink will remove and keep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrunePlan {
    /// Catalog entry indices to remove.
    pub remove_indices: BTreeSet<usize>,
    /// Names being removed.
    pub removed_names: BTreeSet<String>,
    /// Relationship ids that stay in the index.
    pub keep_rel_ids: BTreeSet<String>,
    /// Backing file names that stay on disk.
    pub keep_files: BTreeSet<String>,
}

impl PrunePlan {
    /// Plan the removal of every named entry not in `used`.
    pub fn build(catalog: &MasterCatalog, rels: &RelationshipIndex, used: &BTreeSet<String>) -> Self {
        let mut plan = PrunePlan::default();

        for entry in &catalog.entries {
            let removed = entry
                .symbolic_name()
                .is_some_and(|name| !used.contains(name));

            if removed {
                plan.remove_indices.insert(entry.index);
                if let Some(name) = entry.symbolic_name() {
                    plan.removed_names.insert(name.to_string());
                }
                continue;
            }

            let Some(rel_id) = entry.rel_id() else {
                continue;
            };
            plan.keep_rel_ids.insert(rel_id.to_string());
            if let Some(target) = rels.target(rel_id) {
                plan.keep_files.insert(target_file_name(target));
            }
        }

        plan
    }

    /// Number of catalog entries this plan removes.
    pub fn removal_count(&self) -> usize {
        self.remove_indices.len()
    }

    /// Whether applying the plan would change nothing in the catalog.
    pub fn is_empty(&self) -> bool {
        self.remove_indices.is_empty()
    }
}

/// File name component of a relationship target.
fn target_file_name(target: &str) -> String {
    Path::new(target)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.to_string())
}
