//! engine::report
//!
//! Size accounting and result payloads.
//!
//! Sizes are reported in MB where 1 MB is 1024 * 1024 bytes, rounded to
//! two decimals. Percentages are rounded to one decimal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::plan::Reachability;
use crate::core::catalog::MasterCatalog;
use crate::core::paths::VsdxPaths;
use crate::core::rels::RelationshipIndex;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Result of analyzing a drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Distinct catalog names.
    pub total_masters: usize,
    /// Catalog names referenced by pages.
    pub used_masters: usize,
    /// Catalog names referenced by no page.
    pub unused_masters: usize,
    /// Used names, sorted.
    pub used_names: Vec<String>,
    /// Unused names, sorted.
    pub unused_names: Vec<String>,
    /// Size of backing files a shrink would delete.
    pub potential_savings_mb: f64,
}

impl AnalysisReport {
    /// Report for a drawing without a master catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a report from reachability and the bytes a shrink would free.
    pub fn new(reach: &Reachability, savings_bytes: u64) -> Self {
        Self {
            total_masters: reach.total(),
            used_masters: reach.used.len(),
            unused_masters: reach.unused.len(),
            used_names: reach.used.iter().cloned().collect(),
            unused_names: reach.unused.iter().cloned().collect(),
            potential_savings_mb: bytes_to_mb(savings_bytes),
        }
    }
}

/// Result of shrinking a drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShrinkReport {
    pub original_size_mb: f64,
    pub new_size_mb: f64,
    pub reduction_mb: f64,
    pub reduction_percent: f64,
    pub masters_removed: usize,
    pub output_path: PathBuf,
}

impl ShrinkReport {
    /// Build a report from raw byte sizes.
    pub fn new(original_bytes: u64, new_bytes: u64, masters_removed: usize, output_path: PathBuf) -> Self {
        Self {
            original_size_mb: bytes_to_mb(original_bytes),
            new_size_mb: bytes_to_mb(new_bytes),
            reduction_mb: round_to(reduction_bytes(original_bytes, new_bytes) / BYTES_PER_MB, 2),
            reduction_percent: reduction_percent(original_bytes, new_bytes),
            masters_removed,
            output_path,
        }
    }
}

/// Bytes to MB, rounded to two decimals.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_MB, 2)
}

/// Size reduction as a percentage of `original`, rounded to one decimal.
///
/// Negative when the file grew, zero when `original` is zero.
pub fn reduction_percent(original: u64, new: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    round_to(reduction_bytes(original, new) / original as f64 * 100.0, 1)
}

/// Signed `original - new` in bytes.
fn reduction_bytes(original: u64, new: u64) -> f64 {
    original as f64 - new as f64
}

/// Total size of the backing files of `names` that resolve through the catalog.
///
/// Names without a relationship id, with an id the index lacks, or whose
/// file is missing contribute nothing.
pub fn unused_size<'a>(
    paths: &VsdxPaths,
    catalog: &MasterCatalog,
    rels: &RelationshipIndex,
    names: impl IntoIterator<Item = &'a String>,
) -> u64 {
    let by_name = catalog.by_name();
    names
        .into_iter()
        .filter_map(|name| by_name.get(name.as_str()))
        .filter_map(|entry| entry.rel_id())
        .filter_map(|rel_id| rels.target(rel_id))
        .map(|target| file_size(&paths.master_file(target)))
        .sum()
}

/// Size of a file in bytes, zero if it cannot be read.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
