//! archive::workdir
//!
//! Ephemeral working directory for one operation.
//!
//! # Invariants
//!
//! - Each operation owns exactly one `WorkDir`; nothing outlives it
//! - The directory and everything under it is removed when the guard is
//!   dropped, on success, error and panic alike (RAII pattern)
//! - The original container is never written through a `WorkDir`
//!
//! # Example
//!
//! ```no_run
//! use vsdx_shrink::archive::WorkDir;
//! use std::path::Path;
//!
//! let work = WorkDir::extract(Path::new("drawing.vsdx"))?;
//! println!("extracted to {}", work.root().display());
//! // removed when `work` goes out of scope
//! # Ok::<(), vsdx_shrink::archive::ArchiveError>(())
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{extract, ArchiveError};

/// Name of the extraction root inside the working directory.
const EXTRACTED_DIR: &str = "extracted";

/// An extracted package living in a temporary directory.
#[derive(Debug)]
pub struct WorkDir {
    /// The owning temporary directory. Deleted on drop.
    dir: TempDir,
    /// Where the package was unpacked.
    root: PathBuf,
}

impl WorkDir {
    /// Create a fresh, empty working directory.
    pub fn new() -> Result<Self, ArchiveError> {
        let dir = tempfile::Builder::new()
            .prefix("vsdx-shrink-")
            .tempdir()
            .map_err(|e| ArchiveError::Io {
                path: std::env::temp_dir(),
                source: e,
            })?;
        let root = dir.path().join(EXTRACTED_DIR);
        Ok(Self { dir, root })
    }

    /// Create a working directory and unpack `archive` into it.
    pub fn extract(archive: &Path) -> Result<Self, ArchiveError> {
        let work = Self::new()?;
        extract(archive, &work.root)?;
        Ok(work)
    }

    /// The extraction root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the directory now, reporting failures.
    ///
    /// Dropping the guard also removes it but ignores errors.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
