//! archive
//!
//! ZIP container extraction and rebuilding.
//!
//! # Modules
//!
//! - [`workdir`] - Ephemeral working directory guard
//!
//! # Invariants
//!
//! - Extraction never writes outside the destination directory; entries
//!   whose names escape it are rejected by the `zip` crate
//! - Rebuilding writes regular files only, sorted by path, with forward
//!   slash separators and Deflate compression
//! - An archive is never modified in place; rebuilding always targets a
//!   fresh file

pub mod workdir;

pub use workdir::WorkDir;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Errors from archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file is not a readable ZIP container.
    #[error("not a valid archive '{path}': {message}")]
    Format { path: PathBuf, message: String },

    /// I/O error reading or writing archive contents.
    #[error("archive i/o error at '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    /// Failed while writing the rebuilt archive.
    #[error("failed to write archive '{path}': {message}")]
    Write { path: PathBuf, message: String },
}

impl ArchiveError {
    fn io(path: &Path, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Unpack every entry of `archive` under `dest`, preserving relative paths.
///
/// # Errors
///
/// Returns [`ArchiveError::Format`] if the file is not a valid ZIP container
/// or an entry cannot be decoded.
pub fn extract(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| ArchiveError::Format {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    zip.extract(dest).map_err(|e| match e {
        zip::result::ZipError::Io(source) if !is_corrupt_entry(&source) => ArchiveError::io(dest, source),
        other => ArchiveError::Format {
            path: archive.to_path_buf(),
            message: other.to_string(),
        },
    })
}

/// Entry decoding failures surface as I/O errors: bad deflate streams,
/// truncated data and checksum mismatches.
fn is_corrupt_entry(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof | io::ErrorKind::Other
    )
}

/// Write every regular file under `root` into a new archive in `file`.
///
/// Entry names are root-relative with `/` separators. Directory entries are
/// not written. `compression_level` of `None` uses the Deflate default.
/// `label` names the destination in errors.
///
/// Returns the number of entries written.
pub fn build_into(
    root: &Path,
    file: File,
    label: &Path,
    compression_level: Option<i64>,
) -> Result<usize, ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(compression_level);
    let write_err = |e: zip::result::ZipError| ArchiveError::Write {
        path: label.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = ZipWriter::new(file);
    let mut written = 0usize;

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ArchiveError::Io {
                source: e.into_io_error().unwrap_or_else(|| io::Error::other("directory walk failed")),
                path,
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry_name(root, entry.path());
        writer.start_file(name, options).map_err(write_err)?;
        let mut source = File::open(entry.path()).map_err(|e| ArchiveError::io(entry.path(), e))?;
        io::copy(&mut source, &mut writer).map_err(|e| ArchiveError::io(entry.path(), e))?;
        written += 1;
    }

    writer.finish().map_err(write_err)?;
    Ok(written)
}

/// Root-relative archive entry name with `/` separators.
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
