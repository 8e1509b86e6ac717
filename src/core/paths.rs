//! core::paths
//!
//! Centralized path routing inside an extracted `.vsdx` package.
//!
//! # Package Layout
//!
//! A drawing package extracted to `<root>/` keeps its documents at fixed
//! locations:
//! - `visio/masters/masters.xml` - Master catalog
//! - `visio/masters/_rels/masters.xml.rels` - Catalog relationship index
//! - `visio/masters/master*.xml` - Backing files, one per master
//! - `visio/pages/` - Page documents
//! - `visio/pages/_rels/pages.xml.rels` - Optional page relationship index
//!
//! **Hard rule:** No code outside this module joins these segments itself.
//! Everything goes through `VsdxPaths`.
//!
//! # Example
//!
//! ```
//! use vsdx_shrink::core::paths::VsdxPaths;
//! use std::path::PathBuf;
//!
//! let paths = VsdxPaths::new(PathBuf::from("/tmp/work"));
//!
//! assert_eq!(
//!     paths.masters_xml,
//!     PathBuf::from("/tmp/work/visio/masters/masters.xml")
//! );
//! ```

use std::path::PathBuf;

/// File name of the master catalog.
pub const MASTERS_XML: &str = "masters.xml";

/// Naming convention for master backing files.
pub const MASTER_FILE_PATTERN: &str = "master*.xml";

/// Naming convention for page documents.
pub const PAGE_FILE_PATTERN: &str = "page*.xml";

/// Resolved document locations for one extracted package.
///
/// Construction is pure path arithmetic; nothing here touches the
/// filesystem except [`VsdxPaths::has_catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsdxPaths {
    /// Directory holding page documents.
    pub pages_dir: PathBuf,
    /// Directory holding the catalog and its backing files.
    pub masters_dir: PathBuf,
    /// The master catalog document.
    pub masters_xml: PathBuf,
    /// The catalog's relationship index.
    pub rels_path: PathBuf,
}

impl VsdxPaths {
    /// Derive all package paths from an extraction root.
    pub fn new(root: PathBuf) -> Self {
        let visio = root.join("visio");
        let masters_dir = visio.join("masters");
        Self {
            pages_dir: visio.join("pages"),
            masters_xml: masters_dir.join(MASTERS_XML),
            rels_path: masters_dir.join("_rels").join("masters.xml.rels"),
            masters_dir,
        }
    }

    /// The page relationship index (`visio/pages/_rels/pages.xml.rels`).
    pub fn pages_rels_path(&self) -> PathBuf {
        self.pages_dir.join("_rels").join("pages.xml.rels")
    }

    /// Resolve a catalog relationship target to its backing file.
    pub fn master_file(&self, target: &str) -> PathBuf {
        self.masters_dir.join(target)
    }

    /// Resolve a page relationship target to its page document.
    pub fn page_file(&self, target: &str) -> PathBuf {
        self.pages_dir.join(target)
    }

    /// Whether the package has a master catalog at all.
    ///
    /// Packages without one have nothing to shrink.
    pub fn has_catalog(&self) -> bool {
        self.masters_xml.is_file()
    }
}
