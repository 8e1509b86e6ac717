//! core::xml
//!
//! Shared XML plumbing for the package documents.
//!
//! # Overview
//!
//! The catalog and relationship documents are read with `quick-xml`'s
//! namespace-aware pull parser and rewritten as event streams. Rewriting
//! passes every event we do not drop straight back to the writer, so
//! comments, attribute order and unknown elements survive untouched.
//!
//! Documents are always decoded as UTF-8. A leading byte-order mark is
//! stripped before parsing.

use std::borrow::Cow;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesDecl;
use quick_xml::name::{Namespace, ResolveResult};
use thiserror::Error;

/// Namespace of the Visio 2012 master catalog.
pub const VISIO_NS: &str = "http://schemas.microsoft.com/office/visio/2012/main";

/// Namespace used for `r:id` attributes on `Rel` elements.
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Namespace of OPC package relationship documents (`*.rels`).
pub const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors from reading, parsing or writing XML documents.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Invalid XML in {file}: {message}")]
    Malformed { file: String, message: String },

    #[error("{file} is not valid UTF-8")]
    Encoding { file: String },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl XmlError {
    /// Build a `Malformed` error for the named document.
    pub fn malformed(file: &str, err: impl Display) -> Self {
        XmlError::Malformed {
            file: file.to_string(),
            message: err.to_string(),
        }
    }

    /// Whether this error describes document content rather than I/O.
    pub fn is_format_error(&self) -> bool {
        matches!(self, XmlError::Malformed { .. } | XmlError::Encoding { .. })
    }
}

/// File name used in error messages for a document path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Strip a leading UTF-8 byte-order mark, if any.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Read an XML document as UTF-8 text, with or without a BOM.
pub fn read_document(path: &Path) -> Result<String, XmlError> {
    let bytes = fs::read(path).map_err(|e| XmlError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let body = strip_bom(&bytes);
    String::from_utf8(body.to_vec()).map_err(|_| XmlError::Encoding {
        file: display_name(path),
    })
}

/// Read a document leniently: BOM stripped, invalid sequences replaced.
///
/// Used for page content, which is only ever scanned as text.
pub fn read_text_lossy(path: &Path) -> Result<String, XmlError> {
    let bytes = fs::read(path).map_err(|e| XmlError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(String::from_utf8_lossy(strip_bom(&bytes)).into_owned())
}

/// Write a rewritten document back to disk.
pub fn write_document(path: &Path, contents: &str) -> Result<(), XmlError> {
    fs::write(path, contents).map_err(|e| XmlError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The namespace URI a resolved name is bound to, if any.
pub fn bound_namespace(result: &ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
        _ => None,
    }
}

/// Whether a resolved name is bound to exactly `namespace`.
pub fn is_bound_to(result: &ResolveResult<'_>, namespace: &str) -> bool {
    matches!(result, ResolveResult::Bound(Namespace(ns)) if *ns == namespace.as_bytes())
}

/// Unescaped attribute value as an owned string.
pub fn attr_value(attr: &Attribute<'_>, file: &str) -> Result<String, XmlError> {
    attr.unescape_value()
        .map(Cow::into_owned)
        .map_err(|e| XmlError::malformed(file, e))
}

/// The declaration written at the top of every rewritten document.
///
/// Always `version="1.0" encoding="UTF-8"`; `standalone` is carried over
/// from the original declaration when there was one.
pub fn utf8_declaration(original: Option<&BytesDecl<'_>>) -> BytesDecl<'static> {
    let standalone = original
        .and_then(|decl| decl.standalone())
        .and_then(|value| value.ok())
        .map(|value| String::from_utf8_lossy(&value).into_owned());
    BytesDecl::new("1.0", Some("UTF-8"), standalone.as_deref())
}

/// Convert writer output back into a `String`.
pub fn into_text(bytes: Vec<u8>, file: &str) -> Result<String, XmlError> {
    String::from_utf8(bytes).map_err(|_| XmlError::Encoding {
        file: file.to_string(),
    })
}
