//! engine::scan
//!
//! Page discovery and master reference resolution.
//!
//! # Reference Patterns
//!
//! Pages are scanned as raw text, not parsed. Two independent patterns mark
//! a master as used:
//!
//! - **By name**: a formula `USE("<name>")`, also in its attribute-escaped
//!   spelling `USE(&quot;<name>&quot;)`. Captured names are unescaped and
//!   taken as-is; names that are not in the catalog are simply inert.
//! - **By id**: a shape attribute `Master="<digits>"`. The id is mapped back
//!   to a name through the catalog; unknown ids are ignored.
//!
//! Scanning text rather than elements keeps references embedded in formula
//! text visible.
//!
//! # Page Discovery
//!
//! Pages listed in `pages.xml.rels` whose targets exist are used first. If
//! that yields nothing (no index, an unreadable index, or no existing
//! targets), every `page*.xml` in the page directory is used instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::catalog::MasterCatalog;
use crate::core::paths::{VsdxPaths, PAGE_FILE_PATTERN};
use crate::core::rels::RelationshipIndex;
use crate::core::xml::{display_name, read_document, read_text_lossy, XmlError};

static USE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"USE\("([^"]+)"\)|USE\(&quot;(.+?)&quot;\)"#).expect("valid USE pattern")
});

static MASTER_ATTR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bMaster=["'](\d+)["']"#).expect("valid Master pattern"));

static PAGE_FILE: Lazy<glob::Pattern> =
    Lazy::new(|| glob::Pattern::new(PAGE_FILE_PATTERN).expect("valid page file pattern"));

/// Result of scanning every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceScan {
    /// Names reachable from any page. May include names not in the catalog.
    pub used_names: BTreeSet<String>,
    /// Pages scanned.
    pub pages_scanned: usize,
    /// `USE(...)` occurrences seen.
    pub name_references: usize,
    /// `Master="..."` occurrences that resolved to a catalog name.
    pub id_references: usize,
}

/// Find the page documents of a package.
///
/// Returns an empty list for packages without pages. The result is sorted.
pub fn discover_pages(paths: &VsdxPaths) -> Result<Vec<PathBuf>, XmlError> {
    let mut pages = pages_from_rels(paths);
    if pages.is_empty() {
        pages = pages_from_glob(paths)?;
    }
    pages.sort();
    pages.dedup();
    Ok(pages)
}

/// Pages named by `pages.xml.rels` that exist on disk.
fn pages_from_rels(paths: &VsdxPaths) -> Vec<PathBuf> {
    let rels_path = paths.pages_rels_path();
    if !rels_path.is_file() {
        return Vec::new();
    }

    // An unreadable index falls back to the file name convention.
    let index = match read_document(&rels_path)
        .and_then(|text| RelationshipIndex::parse(&text, &display_name(&rels_path)))
    {
        Ok(index) => index,
        Err(_) => return Vec::new(),
    };

    index
        .relationships
        .iter()
        .filter(|r| !r.target.is_empty())
        .map(|r| paths.page_file(&r.target))
        .filter(|p| p.is_file())
        .collect()
}

/// Every `page*.xml` directly inside the page directory.
fn pages_from_glob(paths: &VsdxPaths) -> Result<Vec<PathBuf>, XmlError> {
    if !paths.pages_dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(&paths.pages_dir).map_err(|e| XmlError::Read {
        path: paths.pages_dir.clone(),
        source: e,
    })?;

    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| XmlError::Read {
            path: paths.pages_dir.clone(),
            source: e,
        })?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| PAGE_FILE.matches(n));
        if matches && path.is_file() {
            pages.push(path);
        }
    }
    Ok(pages)
}

/// Scan one page's text, adding every referenced name to `scan`.
pub fn scan_text(text: &str, id_to_name: &BTreeMap<&str, &str>, scan: &mut ReferenceScan) {
    for caps in USE_PATTERN.captures_iter(text) {
        let Some(raw) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let name = quick_xml::escape::unescape(raw.as_str())
            .map(|n| n.into_owned())
            .unwrap_or_else(|_| raw.as_str().to_string());
        scan.name_references += 1;
        scan.used_names.insert(name);
    }

    for caps in MASTER_ATTR_PATTERN.captures_iter(text) {
        if let Some(name) = id_to_name.get(&caps[1]) {
            scan.id_references += 1;
            scan.used_names.insert((*name).to_string());
        }
    }
}

/// Scan every page of the package for references into `catalog`.
pub fn find_used_masters(
    pages: &[PathBuf],
    catalog: &MasterCatalog,
) -> Result<ReferenceScan, XmlError> {
    let id_to_name = catalog.id_to_name();
    let mut scan = ReferenceScan::default();

    for page in pages {
        let text = read_text_lossy(page)?;
        scan_text(&text, &id_to_name, &mut scan);
        scan.pages_scanned += 1;
    }

    Ok(scan)
}
